//! Error types.
//!
//! Errors fall into three groups:
//! - [`SubmitError`] / [`CommandError`]: rejected at submission, returned to
//!   the caller, nothing is queued
//! - [`ResolveError`]: raised by a resolver while a round resolves; the
//!   coordinator logs it and moves on to the next command
//! - [`WorldError`]: spawn and placement failures

use glam::IVec2;
use rubble::GridError;
use thiserror::Error;

use crate::command::CommandKind;
use crate::entity::EntityId;

/// An action that does not fit the robot's loadout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Sensor slot index out of range.
    #[error("no sensor in slot {index} ({available} equipped)")]
    NoSuchSensor {
        /// Requested slot
        index: usize,
        /// Number of sensors equipped
        available: usize,
    },
    /// Weapon slot index out of range.
    #[error("no weapon in slot {index} ({available} equipped)")]
    NoSuchWeapon {
        /// Requested slot
        index: usize,
        /// Number of weapons equipped
        available: usize,
    },
    /// Gadget slot index out of range.
    #[error("no gadget in slot {index} ({available} equipped)")]
    NoSuchGadget {
        /// Requested slot
        index: usize,
        /// Number of gadgets equipped
        available: usize,
    },
    /// Throw distance outside the equipment's range.
    #[error("range {range} outside [{min}, {max}]")]
    RangeOutOfBounds {
        /// Requested range
        range: i32,
        /// Shortest allowed
        min: i32,
        /// Longest allowed
        max: i32,
    },
    /// Aim shape does not match the equipment.
    #[error("{equipment} must be aimed with a {expected} aim")]
    WrongAim {
        /// Equipment name
        equipment: String,
        /// `"line"` or `"lobbed"`
        expected: &'static str,
    },
    /// A drone needs a path.
    #[error("{sensor} needs a flight path")]
    MissingPath {
        /// Sensor name
        sensor: String,
    },
    /// A drone path with no steps.
    #[error("flight path is empty")]
    EmptyPath,
    /// A drone path longer than the drone can fly.
    #[error("flight path of {len} steps exceeds the limit of {max}")]
    PathTooLong {
        /// Steps requested
        len: usize,
        /// Steps allowed
        max: usize,
    },
    /// A scout car needs a heading.
    #[error("{sensor} needs a heading")]
    MissingHeading {
        /// Sensor name
        sensor: String,
    },
    /// Parameters given to a sensor that takes none.
    #[error("{sensor} takes no parameters")]
    UnexpectedParameters {
        /// Sensor name
        sensor: String,
    },
}

/// Why a submission was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The entity is not an active participant.
    #[error("entity {0} is not participating")]
    NotParticipating(EntityId),
    /// The entity already submitted this round.
    #[error("entity {entity} already acted in round {round}")]
    AlreadyActed {
        /// Submitting entity
        entity: EntityId,
        /// Current round
        round: u64,
    },
    /// The action is invalid for the entity's loadout.
    #[error("invalid command: {0}")]
    Invalid(#[from] CommandError),
}

/// A failure while resolving one command. Never aborts the round.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The issuing entity no longer exists.
    #[error("entity {0} no longer exists")]
    EntityMissing(EntityId),
    /// The issuing entity has no cell.
    #[error("entity {0} is not on the grid")]
    NotPlaced(EntityId),
    /// No resolver is registered for the command kind.
    #[error("no resolver registered for {0} commands")]
    NoResolver(CommandKind),
    /// The equipment slot named by the command no longer exists.
    #[error("entity {entity} has no {kind} equipment in slot {slot}")]
    MissingEquipment {
        /// Issuing entity
        entity: EntityId,
        /// Command kind
        kind: CommandKind,
        /// Slot index
        slot: usize,
    },
}

/// Spawn and placement failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// An entity with this id already exists.
    #[error("entity {0} already exists")]
    DuplicateEntity(EntityId),
    /// No entity with this id exists.
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),
    /// Every cell holds a robot.
    #[error("no free cell to spawn on")]
    NoFreeCell,
    /// The destination cell cannot be entered.
    #[error("cell ({}, {}) is blocked", .0.x, .0.y)]
    Blocked(IVec2),
    /// A grid error.
    #[error(transparent)]
    Grid(#[from] GridError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_converts_to_submit_error() {
        let err: SubmitError = CommandError::EmptyPath.into();
        assert_eq!(err, SubmitError::Invalid(CommandError::EmptyPath));
        assert_eq!(err.to_string(), "invalid command: flight path is empty");
    }

    #[test]
    fn messages_name_the_entity() {
        let err = SubmitError::AlreadyActed {
            entity: EntityId::new(3),
            round: 7,
        };
        assert_eq!(err.to_string(), "entity 3 already acted in round 7");
        assert_eq!(
            ResolveError::EntityMissing(EntityId::new(9)).to_string(),
            "entity 9 no longer exists"
        );
    }

    #[test]
    fn range_error_message() {
        let err = CommandError::RangeOutOfBounds {
            range: 9,
            min: 3,
            max: 6,
        };
        assert_eq!(err.to_string(), "range 9 outside [3, 6]");
    }

    #[test]
    fn grid_error_is_transparent() {
        let err: WorldError = GridError::OutOfBounds(IVec2::new(20, 1)).into();
        assert_eq!(err.to_string(), "position (20, 1) is outside the grid");
    }
}
