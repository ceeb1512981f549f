//! Scripted participants.
//!
//! Each bot runs on its own thread and plays the part of one connection
//! worker: pick an action, submit it, wait at the round barrier, read the
//! report. A bot whose robot is destroyed leaves the match. A bot that waits
//! longer than the round timeout evicts whoever has not submitted.

use std::sync::Arc;
use std::time::Duration;

use gridfire_core::config::{GadgetKind, SensorKind, WeaponKind};
use gridfire_core::entity::Loadout;
use gridfire_core::{Action, Aim, Direction, EntityId, RoundCoordinator, SenseParams, SubmitError};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

/// How a bot's run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Played every round
    Finished,
    /// Robot destroyed; left the match
    Destroyed,
    /// Removed by another participant after stalling
    Evicted,
    /// Stopped submitting on purpose
    WentSilent,
}

/// Settings shared by every bot.
#[derive(Debug, Clone, Copy)]
pub struct BotSettings {
    /// Last round to play
    pub last_round: u64,
    /// How long to wait for a round before evicting stragglers
    pub round_timeout: Duration,
    /// Round at which this bot stops submitting, if any
    pub silent_from: Option<u64>,
}

/// One scripted participant.
pub struct Bot {
    id: EntityId,
    rng: ChaCha8Rng,
    settings: BotSettings,
}

impl Bot {
    /// A bot for `id`, with its own rng stream derived from `seed`.
    pub fn new(id: EntityId, seed: u64, settings: BotSettings) -> Self {
        Self {
            id,
            rng: ChaCha8Rng::seed_from_u64(seed ^ id.as_u64().rotate_left(32)),
            settings,
        }
    }

    /// Play until the last round, destruction, or eviction.
    pub fn run(mut self, coordinator: &Arc<RoundCoordinator>) -> Outcome {
        loop {
            let round = coordinator.round();
            if round > self.settings.last_round {
                return Outcome::Finished;
            }
            if self.settings.silent_from.is_some_and(|from| round >= from) {
                warn!(entity = %self.id, round, "going silent");
                return Outcome::WentSilent;
            }

            let Some(loadout) = coordinator.with_match(|game| {
                game.world()
                    .robot(self.id)
                    .filter(|robot| !robot.is_destroyed())
                    .map(|robot| robot.loadout.clone())
            }) else {
                return self.leave(coordinator);
            };

            let action = self.choose(&loadout);
            let ticket = match coordinator.submit_action(self.id, action) {
                Ok(ticket) => ticket,
                Err(SubmitError::NotParticipating(_)) => return Outcome::Evicted,
                Err(error) => {
                    warn!(entity = %self.id, %error, "submission rejected");
                    continue;
                }
            };

            while !coordinator.wait_timeout(ticket, self.settings.round_timeout) {
                let stalled = coordinator.with_match(gridfire_core::Match::pending);
                for id in stalled {
                    warn!(entity = %id, round = ticket.round, by = %self.id, "evicting stalled participant");
                    coordinator.remove_participant(id);
                }
            }

            for entry in coordinator.drain_feed(self.id) {
                if let Some(text) = entry.as_text() {
                    debug!(entity = %self.id, round = ticket.round, "{text}");
                }
            }
        }
    }

    fn leave(&self, coordinator: &RoundCoordinator) -> Outcome {
        if coordinator.remove_participant(self.id) {
            info!(entity = %self.id, "robot destroyed, leaving");
            Outcome::Destroyed
        } else {
            Outcome::Evicted
        }
    }

    fn direction(&mut self) -> Direction {
        Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())]
    }

    /// Pick a random action the loadout accepts.
    fn choose(&mut self, loadout: &Loadout) -> Action {
        let mut kinds = vec![0u8];
        if !loadout.sensors.is_empty() {
            kinds.push(1);
        }
        if !loadout.weapons.is_empty() {
            kinds.extend([2, 2]);
        }
        if loadout.gadgets.iter().any(|slot| slot.remaining > 0) {
            kinds.push(3);
        }

        match kinds.choose(&mut self.rng).copied().unwrap_or(0) {
            1 => {
                let sensor = self.rng.gen_range(0..loadout.sensors.len());
                let params = match loadout.sensors[sensor].kind {
                    SensorKind::Signal { .. } | SensorKind::Lidar { .. } => SenseParams::None,
                    SensorKind::Drone { max_path, .. } => {
                        let len = self.rng.gen_range(1..=max_path.max(1));
                        SenseParams::Path((0..len).map(|_| self.direction()).collect())
                    }
                    SensorKind::ScoutCar { .. } => SenseParams::Heading(self.direction()),
                };
                Action::Sense { sensor, params }
            }
            2 => {
                let weapon = self.rng.gen_range(0..loadout.weapons.len());
                let aim = match loadout.weapons[weapon].kind {
                    WeaponKind::Straight { .. } => Aim::Line(self.direction()),
                    WeaponKind::Projectile {
                        min_range,
                        max_range,
                        ..
                    } => self.lob(min_range, max_range),
                };
                Action::Fire { weapon, aim }
            }
            3 => {
                let stocked: Vec<usize> = (0..loadout.gadgets.len())
                    .filter(|i| loadout.gadgets[*i].remaining > 0)
                    .collect();
                let gadget = stocked.choose(&mut self.rng).copied().unwrap_or(0);
                let aim = match loadout.gadgets[gadget].config.kind {
                    GadgetKind::Barricade { .. } => Aim::Line(self.direction()),
                    GadgetKind::AreaStatus {
                        min_range,
                        max_range,
                        ..
                    } => self.lob(min_range, max_range),
                };
                Action::Gadget { gadget, aim }
            }
            _ => Action::Move(self.direction()),
        }
    }

    fn lob(&mut self, min_range: i32, max_range: i32) -> Aim {
        Aim::Lob {
            direction: self.direction(),
            range: self.rng.gen_range(min_range..=max_range),
        }
    }
}
