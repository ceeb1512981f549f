//! # Gridfire Core
//!
//! Round-based tactical robot combat engine for Gridfire.
//!
//! Every participant controls one robot on a shared grid and submits exactly
//! one command per round. Once every active participant has acted, the round
//! resolves: commands apply in priority order, then the world advances one
//! step and every participant is released to read its results.
//!
//! ## Architecture
//!
//! - **World**: the [`rubble`] grid plus robots, keyed by [`EntityId`]
//! - **Status**: per-robot capability flags with recovery timers
//! - **Commands**: immutable values queued by `(priority, submission order)`
//! - **Resolvers**: movement, sensing, firing and gadgets, dispatched through
//!   a table keyed by command kind
//! - **Schedule**: effects that repeat over a window of rounds
//! - **Coordinator**: collects submissions, resolves rounds, and releases
//!   waiting participants through the round barrier
//!
//! ## Usage
//!
//! ```
//! use gridfire_core::command::{Action, Aim, Direction};
//! use gridfire_core::config::{FieldConfig, RobotConfig};
//! use gridfire_core::coordinator::Match;
//! use gridfire_core::world::World;
//! use gridfire_core::EntityId;
//! use glam::IVec2;
//!
//! let world = World::from_field(&FieldConfig::open(10, 10));
//! let mut game = Match::from_world(world, 42, 1);
//!
//! let (red, blue) = (EntityId::new(1), EntityId::new(2));
//! game.add_participant_at(red, &RobotConfig::default(), IVec2::new(2, 2)).unwrap();
//! game.add_participant_at(blue, &RobotConfig::default(), IVec2::new(6, 2)).unwrap();
//!
//! game.submit_action(red, Action::Fire { weapon: 0, aim: Aim::Line(Direction::Right) }).unwrap();
//! game.submit_action(blue, Action::Move(Direction::Down)).unwrap();
//! let summary = game.resolve_round();
//!
//! assert_eq!(summary.resolved, 2);
//! assert_eq!(game.world().position_of(blue), Some(IVec2::new(6, 3)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export rubble for grid access
pub use rubble;

pub mod barrier;
pub mod command;
pub mod config;
pub mod coordinator;
pub mod damage;
pub mod entity;
pub mod error;
pub mod feed;
pub mod queue;
pub mod resolver;
pub mod schedule;
pub mod status;
pub mod world;

pub use command::{Action, Aim, Command, CommandKind, Direction, SenseParams};
pub use coordinator::{Match, RoundCoordinator, RoundSummary, SubmitReceipt, Ticket};
pub use entity::{EntityId, Robot};
pub use error::{CommandError, ResolveError, SubmitError, WorldError};
pub use feed::FeedEntry;
pub use status::{Capability, CapabilityFlags};
pub use world::World;

#[cfg(test)]
mod tests;
