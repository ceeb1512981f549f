//! Test helper functions for setting up matches and robots.
//!
//! This module provides factory functions and setup utilities that make
//! writing round-level tests more ergonomic and consistent.

use glam::IVec2;

use crate::command::{Action, Aim, Direction, SenseParams};
use crate::config::{presets, FieldConfig, MatchConfig, RobotConfig};
use crate::coordinator::Match;
use crate::entity::EntityId;
use crate::feed::FeedEntry;
use crate::world::World;

/// Seed used by every fixed-layout scenario.
pub const TEST_SEED: u64 = 7;

// =============================================================================
// Match Setup
// =============================================================================

/// Creates a match over an open field with no generated obstacles.
///
/// # Arguments
///
/// * `width` - Field columns
/// * `height` - Field rows
///
/// # Returns
///
/// A match at round 1 with no participants and vision radius 1.
pub fn open_match(width: i32, height: i32) -> Match {
    Match::from_world(World::from_field(&FieldConfig::open(width, height)), TEST_SEED, 1)
}

/// Creates a match with a generated field from a seed.
///
/// Uses the default 15x15 field with obstacles and adds `players`
/// standard robots at random spawn points.
///
/// # Arguments
///
/// * `seed` - Master seed
/// * `players` - Number of participants, with ids starting at 1
///
/// # Returns
///
/// The match and the participant ids.
pub fn generated_match(seed: u64, players: u64) -> (Match, Vec<EntityId>) {
    let config = MatchConfig {
        seed,
        ..MatchConfig::default()
    };
    let mut game = Match::new(&config).expect("default config is valid");
    let ids: Vec<EntityId> = (1..=players).map(EntityId::new).collect();
    for id in &ids {
        game.add_participant(*id, &config.robot)
            .expect("spawn on a 15x15 field");
    }
    (game, ids)
}

/// Places standard robots at the given cells of an open 15x15 field.
///
/// Ids are assigned 1, 2, 3, ... in the order of `cells`.
///
/// # Returns
///
/// The match and the participant ids.
pub fn standard_squad(cells: &[IVec2]) -> (Match, Vec<EntityId>) {
    let mut game = open_match(15, 15);
    let mut ids = Vec::new();
    for (n, pos) in (1..).zip(cells) {
        let id = EntityId::new(n);
        game.add_participant_at(id, &presets::standard_robot(), *pos)
            .expect("cell is free");
        ids.push(id);
    }
    (game, ids)
}

/// A robot with one shotgun and nothing else.
///
/// The shotgun never misses at distance 1, which keeps firing scenarios
/// independent of the match rng.
pub fn shotgunner() -> RobotConfig {
    RobotConfig {
        weapons: vec![presets::shotgun()],
        ..RobotConfig::bare()
    }
}

/// A standard robot carrying a flashbang in gadget slot 2.
pub fn flashbang_carrier() -> RobotConfig {
    let mut config = presets::standard_robot();
    config.gadgets.push(presets::flashbang());
    config
}

// =============================================================================
// Actions
// =============================================================================

/// The sound sensor of a standard robot. Emits nothing, moves nothing.
pub fn listen() -> Action {
    Action::Sense {
        sensor: 0,
        params: SenseParams::None,
    }
}

/// The lidar of a standard robot.
pub fn lidar_sweep() -> Action {
    Action::Sense {
        sensor: 2,
        params: SenseParams::None,
    }
}

/// Throw the EMP grenade of a standard robot.
pub fn throw_emp(direction: Direction, range: i32) -> Action {
    Action::Gadget {
        gadget: 1,
        aim: Aim::Lob { direction, range },
    }
}

/// Throw the flashbang of a [`flashbang_carrier`].
pub fn throw_flashbang(direction: Direction, range: i32) -> Action {
    Action::Gadget {
        gadget: 2,
        aim: Aim::Lob { direction, range },
    }
}

/// Submit the same action for every participant, then resolve the round.
pub fn play_round(game: &mut Match, ids: &[EntityId], action: &Action) {
    for id in ids {
        game.submit_action(*id, action.clone())
            .expect("participant can submit");
    }
    game.resolve_round();
}

// =============================================================================
// Feed Inspection
// =============================================================================

/// Text lines of a drained report.
pub fn texts(entries: &[FeedEntry]) -> Vec<&str> {
    entries.iter().filter_map(FeedEntry::as_text).collect()
}

/// Whether a drained report contains `line`.
pub fn has_line(entries: &[FeedEntry], line: &str) -> bool {
    texts(entries).contains(&line)
}
