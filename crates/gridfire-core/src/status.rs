//! Per-robot capability status with timed recovery.
//!
//! Every robot tracks six capabilities. Each is either active or disabled, and
//! a disabled capability carries a recovery timer counted in rounds. The
//! coordinator calls [`StatusModel::advance`] once at the end of every round;
//! a capability whose timer reaches zero on that call becomes active again.
//!
//! # Example
//!
//! ```
//! use gridfire_core::status::{Capability, Recovery, StatusModel};
//!
//! let mut status = StatusModel::new();
//! status.set(Capability::Fire, false, Recovery::Rounds(2));
//!
//! status.advance();
//! assert!(!status.is_active(Capability::Fire));
//! status.advance();
//! assert!(status.is_active(Capability::Fire));
//! ```

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// A capability a robot can lose temporarily or permanently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Capability {
    /// End-of-round vision snapshot
    Vision = 0,
    /// Movement commands
    Move = 1,
    /// Sensor commands
    Sense = 2,
    /// Weapon commands
    Fire = 3,
    /// Gadget commands
    Gadget = 4,
    /// The robot is not destroyed
    Alive = 5,
}

impl Capability {
    /// Total number of capabilities.
    pub const COUNT: usize = 6;

    /// All capabilities in index order.
    pub const ALL: [Capability; Self::COUNT] = [
        Capability::Vision,
        Capability::Move,
        Capability::Sense,
        Capability::Fire,
        Capability::Gadget,
        Capability::Alive,
    ];

    /// Index into per-capability arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The flag bit of this capability.
    #[must_use]
    pub const fn flag(self) -> CapabilityFlags {
        match self {
            Capability::Vision => CapabilityFlags::VISION,
            Capability::Move => CapabilityFlags::MOVE,
            Capability::Sense => CapabilityFlags::SENSE,
            Capability::Fire => CapabilityFlags::FIRE,
            Capability::Gadget => CapabilityFlags::GADGET,
            Capability::Alive => CapabilityFlags::ALIVE,
        }
    }

    /// Feed line written when a command needs this capability while it is
    /// disabled.
    #[must_use]
    pub const fn blocked_message(self) -> &'static str {
        match self {
            Capability::Vision => "Robot vision is interrupted!",
            Capability::Move => "Movement system is disabled",
            Capability::Sense => "Sensors are disabled",
            Capability::Fire => "Weapons are disabled",
            Capability::Gadget => "Gadgets are disabled",
            Capability::Alive => "Robot destroyed, command ignored",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Vision => "vision",
            Capability::Move => "move",
            Capability::Sense => "sense",
            Capability::Fire => "fire",
            Capability::Gadget => "gadget",
            Capability::Alive => "alive",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// Snapshot of which capabilities are active.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CapabilityFlags: u8 {
        /// Vision is active
        const VISION = 1 << 0;
        /// Movement is active
        const MOVE = 1 << 1;
        /// Sensors are active
        const SENSE = 1 << 2;
        /// Weapons are active
        const FIRE = 1 << 3;
        /// Gadgets are active
        const GADGET = 1 << 4;
        /// Not destroyed
        const ALIVE = 1 << 5;
    }
}

impl CapabilityFlags {
    /// Iterate the capabilities set in these flags.
    pub fn capabilities(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |cap| self.contains(cap.flag()))
    }
}

/// Recovery timer of a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recovery {
    /// Rounds until the capability comes back. Zero means no timer is
    /// pending; a disabled capability with zero rounds recovers on the next
    /// advance.
    Rounds(u32),
    /// Never recovers.
    Never,
}

impl Recovery {
    /// No pending timer.
    pub const NONE: Recovery = Recovery::Rounds(0);
}

/// State of one capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityState {
    /// Whether the capability can be used
    pub active: bool,
    /// Recovery timer
    pub recovery: Recovery,
}

impl CapabilityState {
    const READY: Self = Self {
        active: true,
        recovery: Recovery::NONE,
    };

    fn advance(&mut self) {
        match self.recovery {
            Recovery::Never => {}
            Recovery::Rounds(0) => self.active = true,
            Recovery::Rounds(n) => {
                let remaining = n - 1;
                self.recovery = Recovery::Rounds(remaining);
                if remaining == 0 {
                    self.active = true;
                }
            }
        }
        if self.active && self.recovery != Recovery::Never {
            self.recovery = Recovery::NONE;
        }
    }
}

/// The six capability states of a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusModel {
    states: [CapabilityState; Capability::COUNT],
}

impl StatusModel {
    /// All capabilities active with no pending timers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: [CapabilityState::READY; Capability::COUNT],
        }
    }

    /// State of one capability.
    #[must_use]
    pub fn state(&self, capability: Capability) -> CapabilityState {
        self.states[capability.index()]
    }

    /// Whether a capability is active.
    #[must_use]
    pub fn is_active(&self, capability: Capability) -> bool {
        self.states[capability.index()].active
    }

    /// Whether the robot has been destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        !self.is_active(Capability::Alive)
    }

    /// Overwrite both fields of a capability.
    pub fn set(&mut self, capability: Capability, active: bool, recovery: Recovery) {
        self.states[capability.index()] = CapabilityState { active, recovery };
    }

    /// Disable a capability for `rounds` rounds.
    pub fn disable_for(&mut self, capability: Capability, rounds: u32) {
        self.set(capability, false, Recovery::Rounds(rounds));
    }

    /// Tick every recovery timer by one round.
    pub fn advance(&mut self) {
        for state in &mut self.states {
            state.advance();
        }
    }

    /// Put the robot into the terminal destroyed state: every capability is
    /// disabled and never recovers.
    pub fn set_destroyed(&mut self) {
        for state in &mut self.states {
            *state = CapabilityState {
                active: false,
                recovery: Recovery::Never,
            };
        }
    }

    /// Snapshot of active capabilities.
    #[must_use]
    pub fn flags(&self) -> CapabilityFlags {
        Capability::ALL
            .into_iter()
            .filter(|cap| self.is_active(*cap))
            .fold(CapabilityFlags::empty(), |flags, cap| flags | cap.flag())
    }
}

impl Default for StatusModel {
    fn default() -> Self {
        Self::new()
    }
}

/// A timed capability disruption carried by gadgets and scheduled events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Capabilities to disable
    pub disables: CapabilityFlags,
    /// Rounds until they recover
    pub rounds: u32,
}

impl StatusEffect {
    /// Create a status effect.
    #[must_use]
    pub const fn new(disables: CapabilityFlags, rounds: u32) -> Self {
        Self { disables, rounds }
    }

    /// Apply to a status model. Destroyed robots are left untouched.
    ///
    /// Returns `true` if the effect was applied.
    pub fn apply(&self, status: &mut StatusModel) -> bool {
        if status.is_destroyed() {
            return false;
        }
        for capability in self.disables.capabilities() {
            if capability != Capability::Alive {
                status.disable_for(capability, self.rounds);
            }
        }
        true
    }
}
