//! Cells and their occupants.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::signal::{Signal, SignalConfig, SignalLevels};
use crate::EntityId;

/// Remaining durability of a hard obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HardObstacle {
    /// Hit points; the obstacle is removed at zero or below
    pub hp: i32,
    /// Penetration needed to destroy it in a single hit
    pub armor: i32,
}

impl HardObstacle {
    /// Create a hard obstacle.
    #[must_use]
    pub const fn new(hp: i32, armor: i32) -> Self {
        Self { hp, armor }
    }
}

/// What stands on a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    /// Open ground
    #[default]
    Empty,
    /// A robot, alive or wrecked
    Robot(EntityId),
    /// Soft obstacle: passable, removed by any damage
    Obstacle,
    /// Armored obstacle that blocks movement
    HardObstacle(HardObstacle),
}

impl Occupant {
    /// True for open ground.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Occupant::Empty)
    }

    /// True for occupants that stop movement.
    ///
    /// Soft obstacles do not block; walking onto one clears it.
    #[must_use]
    pub const fn blocks_movement(&self) -> bool {
        matches!(self, Occupant::Robot(_) | Occupant::HardObstacle(_))
    }

    /// The robot standing here, if any.
    #[must_use]
    pub const fn robot(&self) -> Option<EntityId> {
        match self {
            Occupant::Robot(id) => Some(*id),
            _ => None,
        }
    }

    /// Display glyph of this occupant.
    #[must_use]
    pub const fn glyph(&self) -> Glyph {
        match self {
            Occupant::Empty => Glyph::Empty,
            Occupant::Robot(_) => Glyph::Robot,
            Occupant::Obstacle => Glyph::Obstacle,
            Occupant::HardObstacle(_) => Glyph::HardObstacle,
        }
    }
}

/// Display character of a cell as seen by an observer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Glyph {
    /// Never observed
    #[default]
    Unknown,
    /// `_`
    Empty,
    /// `R`
    Robot,
    /// `x`
    Obstacle,
    /// `#`
    HardObstacle,
}

impl Glyph {
    /// The character rendered for this glyph.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Glyph::Unknown => ' ',
            Glyph::Empty => '_',
            Glyph::Robot => 'R',
            Glyph::Obstacle => 'x',
            Glyph::HardObstacle => '#',
        }
    }
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Position on the grid
    pub pos: IVec2,
    /// Current occupant
    pub occupant: Occupant,
    /// Sound and heat levels
    pub signals: SignalLevels,
}

impl Cell {
    /// Create an empty cell with zero signals.
    #[must_use]
    pub fn new(pos: IVec2) -> Self {
        Self {
            pos,
            occupant: Occupant::Empty,
            signals: SignalLevels::default(),
        }
    }

    /// Level of one signal on this cell.
    #[must_use]
    pub fn signal(&self, signal: Signal) -> u8 {
        self.signals.get(signal)
    }

    /// Raise one signal on this cell.
    pub fn raise(&mut self, config: &SignalConfig, amount: i32) {
        self.signals.raise(config, amount);
    }
}
