//! Emissions: the signal mutation primitive for Rubble.
//!
//! An emission raises one signal around an origin cell. The contribution to a
//! cell falls off by one level per whole unit of Euclidean distance, so an
//! emission of intensity `I` reaches `I - 1` cells away before fading out.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::signal::Signal;

/// A point emission of sound or heat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emission {
    /// Cell the emission originates from
    pub origin: IVec2,
    /// Which signal is raised
    pub signal: Signal,
    /// Level added at the origin itself
    pub intensity: i32,
}

impl Emission {
    /// Create a new emission.
    #[must_use]
    pub const fn new(origin: IVec2, signal: Signal, intensity: i32) -> Self {
        Self {
            origin,
            signal,
            intensity,
        }
    }

    /// Create the sound and heat emissions of a single action.
    #[must_use]
    pub const fn pair(origin: IVec2, sound: i32, heat: i32) -> [Self; 2] {
        [
            Self::new(origin, Signal::Sound, sound),
            Self::new(origin, Signal::Heat, heat),
        ]
    }

    /// Amount this emission adds at `pos`.
    ///
    /// # Formula
    /// `max(intensity - floor(|pos - origin|), 0)`
    #[must_use]
    pub fn falloff_at(&self, pos: IVec2) -> i32 {
        let dist = floor_distance(self.origin, pos);
        (self.intensity - dist).max(0)
    }

    /// True if this emission cannot change any cell.
    #[must_use]
    pub const fn is_silent(&self) -> bool {
        self.intensity <= 0
    }
}

/// Euclidean distance between two cells, rounded down.
#[must_use]
pub fn floor_distance(a: IVec2, b: IVec2) -> i32 {
    #[allow(clippy::cast_possible_truncation)]
    let dist = f64::from((a - b).length_squared()).sqrt().floor() as i32;
    dist
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falloff_along_axis() {
        let emission = Emission::new(IVec2::new(5, 5), Signal::Sound, 4);
        assert_eq!(emission.falloff_at(IVec2::new(5, 5)), 4);
        assert_eq!(emission.falloff_at(IVec2::new(6, 5)), 3);
        assert_eq!(emission.falloff_at(IVec2::new(9, 5)), 0);
        assert_eq!(emission.falloff_at(IVec2::new(12, 5)), 0);
    }

    #[test]
    fn test_falloff_diagonal_uses_floor() {
        let emission = Emission::new(IVec2::ZERO, Signal::Heat, 5);
        // sqrt(2) floors to 1, sqrt(8) floors to 2
        assert_eq!(emission.falloff_at(IVec2::new(1, 1)), 4);
        assert_eq!(emission.falloff_at(IVec2::new(2, 2)), 3);
    }

    #[test]
    fn test_floor_distance() {
        assert_eq!(floor_distance(IVec2::ZERO, IVec2::new(3, 4)), 5);
        assert_eq!(floor_distance(IVec2::ZERO, IVec2::new(1, 2)), 2);
        assert_eq!(floor_distance(IVec2::new(2, 2), IVec2::new(2, 2)), 0);
    }

    #[test]
    fn test_pair_and_silence() {
        let [sound, heat] = Emission::pair(IVec2::ONE, 3, 0);
        assert_eq!(sound.signal, Signal::Sound);
        assert!(!sound.is_silent());
        assert!(heat.is_silent());
    }
}
