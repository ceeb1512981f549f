//! # Rubble
//!
//! Cell grid substrate for round-based tactical simulation.
//!
//! Rubble represents the battlefield as a dense rectangular grid of cells. Each
//! cell has at most one occupant (a robot, a soft obstacle, or an armored hard
//! obstacle) and carries two scalar signal levels, sound and heat. This enables:
//!
//! - **Blocking queries**: Movement and line-of-fire checks with out-of-bounds
//!   treated as blocked
//! - **Emissions**: Actions raise sound/heat around a point with distance falloff
//! - **Signal decay**: Levels fade by a fixed amount every round
//! - **Region snapshots**: Value copies of square regions for sensors and vision
//!
//! ## Quick Start
//!
//! ```
//! use glam::IVec2;
//! use rubble::{Emission, Grid, GridConfig, Region, Signal};
//!
//! let mut grid = Grid::new(GridConfig::with_size(15, 15));
//!
//! // A gunshot at (5, 5)
//! grid.emit(&Emission::new(IVec2::new(5, 5), Signal::Sound, 6));
//! assert_eq!(grid.signal(IVec2::new(5, 5), Signal::Sound), Some(6));
//! assert_eq!(grid.signal(IVec2::new(8, 5), Signal::Sound), Some(3));
//!
//! // Read the sound field around (5, 5)
//! let reading = grid.read_signal(Region::square(IVec2::new(5, 5), 1), Signal::Sound);
//! assert_eq!(reading.get(IVec2::new(5, 5)), Some(&6));
//!
//! // One round later every level has faded by the configured amount
//! grid.decay_signals();
//! assert_eq!(grid.signal(IVec2::new(5, 5), Signal::Sound), Some(5));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cell;
pub mod emission;
pub mod grid;
pub mod hash;
pub mod propagation;
pub mod query;
pub mod signal;

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

// Re-exports for convenience
pub use cell::{Cell, Glyph, HardObstacle, Occupant};
pub use emission::Emission;
pub use grid::{Grid, GridConfig, GridError};
pub use hash::hash_grid;
pub use query::{CellReading, Region, RegionSnapshot, SignalReading};
pub use signal::{Signal, SignalConfig, SignalLevels};

/// Unique identifier for a robot standing on the grid.
///
/// Entity IDs are ordered by their numeric value, which is what every
/// deterministic iteration in the simulation sorts by.
///
/// # Example
///
/// ```
/// use rubble::EntityId;
///
/// let a = EntityId::new(1);
/// let b = EntityId::new(2);
/// assert!(a < b);
/// assert_eq!(b.as_u64(), 2);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Width and height of a grid, with the origin at the top-left cell.
///
/// `y` grows downward, so "up" is `y - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    /// Number of columns
    pub width: i32,
    /// Number of rows
    pub height: i32,
}

impl Extent {
    /// Create an extent of `width` columns by `height` rows.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Check if a position lies on the grid.
    #[must_use]
    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Clamp a position onto the grid.
    #[must_use]
    pub fn clamp(&self, pos: IVec2) -> IVec2 {
        IVec2::new(
            pos.x.clamp(0, (self.width - 1).max(0)),
            pos.y.clamp(0, (self.height - 1).max(0)),
        )
    }

    /// Total number of cells.
    #[must_use]
    pub fn area(&self) -> usize {
        usize::try_from(self.width.max(0) * self.height.max(0)).unwrap_or(0)
    }

    /// Row-major index of a position, or `None` when off the grid.
    #[must_use]
    pub fn index_of(&self, pos: IVec2) -> Option<usize> {
        if self.contains(pos) {
            usize::try_from(pos.y * self.width + pos.x).ok()
        } else {
            None
        }
    }

    /// Position of a row-major index.
    #[must_use]
    pub fn position_of(&self, index: usize) -> IVec2 {
        let index = i32::try_from(index).unwrap_or(i32::MAX);
        IVec2::new(index % self.width, index / self.width)
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::new(15, 15)
    }
}
