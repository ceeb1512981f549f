//! Command types submitted by participants.
//!
//! A [`Command`] is an immutable value: who issued it, what they want to do,
//! and the queue priority it resolves at. The [`Action`] payload carries every
//! parameter the participant chose (direction, range, drone path), so nothing
//! is stashed on the equipment between submission and resolution.
//!
//! # Priorities
//!
//! Lower priority values resolve first. The conventional priorities are:
//! - move: the robot's move priority
//! - fire and gadget: `100 - reaction_time`, floored at 0
//! - sense: [`SENSE_PRIORITY`], after everything else
//!
//! # Example
//!
//! ```
//! use gridfire_core::command::{Action, Command, CommandKind, Direction};
//! use gridfire_core::EntityId;
//!
//! let command = Command::new(EntityId::new(1), Action::Move(Direction::Up), 50);
//! assert_eq!(command.kind(), CommandKind::Move);
//! assert_eq!(command.priority(), 50);
//! ```

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Priority of sense commands: they resolve after every other command.
pub const SENSE_PRIORITY: u32 = u32::MAX;

/// Conventional priority for an action with the given reaction time.
#[must_use]
pub const fn reaction_priority(reaction_time: u32) -> u32 {
    100u32.saturating_sub(reaction_time)
}

/// One of the four grid directions. `Up` decreases `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// `y - 1`
    Up,
    /// `y + 1`
    Down,
    /// `x - 1`
    Left,
    /// `x + 1`
    Right,
}

impl Direction {
    /// All four directions.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step in this direction.
    #[must_use]
    pub const fn offset(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }
}

/// Command category, used for resolver routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum CommandKind {
    /// Move one cell
    Move = 0,
    /// Use a sensor
    Sense = 1,
    /// Fire a weapon
    Fire = 2,
    /// Use a gadget
    Gadget = 3,
}

impl CommandKind {
    /// Number of command kinds.
    pub const COUNT: usize = 4;

    /// Index into per-kind tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move => write!(f, "Move"),
            Self::Sense => write!(f, "Sense"),
            Self::Fire => write!(f, "Fire"),
            Self::Gadget => write!(f, "Gadget"),
        }
    }
}

/// Where a weapon or gadget is aimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Aim {
    /// Along a direction, for straight weapons and barricades
    Line(Direction),
    /// Thrown `range` cells in a direction, for projectiles and area gadgets
    Lob {
        /// Throw direction
        direction: Direction,
        /// Throw distance
        range: i32,
    },
}

impl Aim {
    /// Direction component of the aim.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Aim::Line(direction) | Aim::Lob { direction, .. } => direction,
        }
    }
}

/// Sensor-specific parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SenseParams {
    /// No parameters, for signal sensors and lidar
    #[default]
    None,
    /// Flight path of a drone
    Path(Vec<Direction>),
    /// Driving direction of a scout car
    Heading(Direction),
}

/// What a participant asks their robot to do this round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Move one cell
    Move(Direction),
    /// Use the sensor in slot `sensor`
    Sense {
        /// Sensor slot index
        sensor: usize,
        /// Sensor parameters
        params: SenseParams,
    },
    /// Fire the weapon in slot `weapon`
    Fire {
        /// Weapon slot index
        weapon: usize,
        /// Aim
        aim: Aim,
    },
    /// Use the gadget in slot `gadget`
    Gadget {
        /// Gadget slot index
        gadget: usize,
        /// Aim
        aim: Aim,
    },
}

impl Action {
    /// Routing kind of this action.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Action::Move(_) => CommandKind::Move,
            Action::Sense { .. } => CommandKind::Sense,
            Action::Fire { .. } => CommandKind::Fire,
            Action::Gadget { .. } => CommandKind::Gadget,
        }
    }
}

/// An immutable, queued request to act.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    source: EntityId,
    action: Action,
    priority: u32,
}

impl Command {
    /// Create a command.
    #[must_use]
    pub fn new(source: EntityId, action: Action, priority: u32) -> Self {
        Self {
            source,
            action,
            priority,
        }
    }

    /// The robot that issued the command.
    #[must_use]
    pub fn source(&self) -> EntityId {
        self.source
    }

    /// The requested action.
    #[must_use]
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Routing kind.
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        self.action.kind()
    }

    /// Queue priority; lower resolves first.
    #[must_use]
    pub fn priority(&self) -> u32 {
        self.priority
    }
}
