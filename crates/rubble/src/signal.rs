//! Signal definitions and configurations.
//!
//! Signals are integer scalar levels carried by every cell. Each signal has a
//! valid range that all writes are clamped into and a fixed amount it fades by
//! every round.

use serde::{Deserialize, Serialize};

/// Signal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Signal {
    /// Acoustic noise from movement, gunfire and explosions
    Sound = 0,
    /// Thermal residue from engines, muzzle flash and detonations
    Heat = 1,
}

impl Signal {
    /// Total number of signals.
    pub const COUNT: usize = 2;

    /// Get all signals as a slice.
    #[must_use]
    pub const fn all() -> &'static [Signal] {
        &[Signal::Sound, Signal::Heat]
    }

    /// Get the index of this signal.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name used in feed lines and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Signal::Sound => "sound",
            Signal::Heat => "heat",
        }
    }
}

/// Configuration for a single signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Which signal this configures
    pub signal: Signal,
    /// Valid range (min, max), inclusive
    pub range: (u8, u8),
    /// Amount subtracted from every cell each round
    pub decay_per_round: u8,
}

impl SignalConfig {
    /// Create a new signal configuration with the standard range `[0, 9]`.
    #[must_use]
    pub fn new(signal: Signal) -> Self {
        Self::default_for(signal)
    }

    /// Get default configuration for a signal.
    #[must_use]
    pub fn default_for(signal: Signal) -> Self {
        Self {
            signal,
            range: (0, 9),
            decay_per_round: 1,
        }
    }

    /// Override the per-round decay.
    #[must_use]
    pub fn with_decay(mut self, decay_per_round: u8) -> Self {
        self.decay_per_round = decay_per_round;
        self
    }

    /// Clamp a raw value into the valid range.
    #[must_use]
    pub fn clamp(&self, value: i32) -> u8 {
        let clamped = value.clamp(i32::from(self.range.0), i32::from(self.range.1));
        u8::try_from(clamped).unwrap_or(self.range.1)
    }
}

/// Per-cell signal levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalLevels {
    levels: [u8; Signal::COUNT],
}

impl SignalLevels {
    /// Get the level of one signal.
    #[must_use]
    pub fn get(&self, signal: Signal) -> u8 {
        self.levels[signal.index()]
    }

    /// Set the level of one signal, clamped by `config`.
    pub fn set(&mut self, config: &SignalConfig, value: i32) {
        self.levels[config.signal.index()] = config.clamp(value);
    }

    /// Raise the level of one signal, clamped by `config`.
    pub fn raise(&mut self, config: &SignalConfig, amount: i32) {
        let current = i32::from(self.get(config.signal));
        self.set(config, current + amount);
    }

    /// Lower the level of one signal by its configured decay.
    pub fn decay(&mut self, config: &SignalConfig) {
        self.raise(config, -i32::from(config.decay_per_round));
    }
}
