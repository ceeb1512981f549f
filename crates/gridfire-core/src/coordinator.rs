//! Round coordination.
//!
//! [`Match`] is the single-threaded engine: it owns the world, the command
//! queue and the event schedule, accepts one command per participant per
//! round, and resolves the round once every active participant has acted.
//!
//! [`RoundCoordinator`] shares a `Match` between participant threads. Any
//! thread may submit; the submission that completes the round resolves it
//! inline while holding the lock, bracketed by the [`RoundBarrier`] closing
//! and reopening, so every waiter wakes to a fully applied round.
//!
//! # Round Lifecycle
//!
//! 1. **COLLECT**: participants submit; commands are queued by
//!    `(priority, submission order)`
//! 2. **RESOLVE**: the barrier closes; commands pop in order and dispatch
//!    through the resolver table; failures are logged and skipped
//! 3. **ADVANCE**: due scheduled events fire, signals decay, status timers
//!    advance, gadgets refill on their cadence, vision refreshes
//! 4. **PUBLISH**: each robot's live feed becomes its round report, the round
//!    counter advances, and the barrier reopens
//!
//! # Example
//!
//! ```
//! use gridfire_core::command::{Action, Direction};
//! use gridfire_core::config::{MatchConfig, RobotConfig};
//! use gridfire_core::coordinator::Match;
//! use gridfire_core::EntityId;
//!
//! let mut game = Match::new(&MatchConfig::default()).unwrap();
//! let id = EntityId::new(1);
//! game.add_participant(id, &RobotConfig::default()).unwrap();
//!
//! let receipt = game.submit_action(id, Action::Move(Direction::Up)).unwrap();
//! assert!(receipt.ready);
//!
//! let summary = game.resolve_round();
//! assert_eq!(summary.round, 1);
//! assert_eq!(game.round(), 2);
//! assert!(!game.drain_feed(id).is_empty());
//! ```

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use glam::IVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rubble::CellReading;
use tracing::{debug, info, warn};

use crate::barrier::RoundBarrier;
use crate::command::{Action, Command};
use crate::config::{ConfigError, MatchConfig, RobotConfig};
use crate::entity::EntityId;
use crate::error::{SubmitError, WorldError};
use crate::feed::FeedEntry;
use crate::queue::CommandQueue;
use crate::resolver::{ResolveContext, Resolver, ResolverTable};
use crate::schedule::EventSchedule;
use crate::status::CapabilityFlags;
use crate::world::World;

/// Result of an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// Round the command will resolve in
    pub round: u64,
    /// Active participants still to submit
    pub remaining: usize,
    /// Whether every active participant has now submitted
    pub ready: bool,
}

/// What happened while a round resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    /// The round that resolved
    pub round: u64,
    /// Commands applied
    pub resolved: usize,
    /// Commands skipped after a resolver error
    pub skipped: usize,
    /// Scheduled events fired
    pub events_fired: usize,
}

// =============================================================================
// Match
// =============================================================================

/// A match: world, participants and round state.
#[derive(Debug)]
pub struct Match {
    world: World,
    schedule: EventSchedule,
    queue: CommandQueue,
    resolvers: ResolverTable,
    rng: ChaCha8Rng,
    round: u64,
    participants: BTreeSet<EntityId>,
    submitted: BTreeSet<EntityId>,
    vision_radius: i32,
}

impl Match {
    /// Create a match and generate its field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration fails validation.
    pub fn new(config: &MatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut world = World::from_field(&config.field);
        world.initialize_field(&config.field, &mut rng);
        Ok(Self::with_rng(world, rng, config.vision_radius))
    }

    /// Create a match over a prepared world. Nothing is generated; robots
    /// already in the world are not participants until added.
    #[must_use]
    pub fn from_world(world: World, seed: u64, vision_radius: i32) -> Self {
        Self::with_rng(world, ChaCha8Rng::seed_from_u64(seed), vision_radius)
    }

    fn with_rng(world: World, rng: ChaCha8Rng, vision_radius: i32) -> Self {
        Self {
            world,
            schedule: EventSchedule::new(),
            queue: CommandQueue::new(),
            resolvers: ResolverTable::standard(),
            rng,
            round: 1,
            participants: BTreeSet::new(),
            submitted: BTreeSet::new(),
            vision_radius,
        }
    }

    /// Register an extra resolver, replacing the built-in one for every kind
    /// it handles.
    pub fn register_resolver(&mut self, resolver: Box<dyn Resolver>) {
        self.resolvers.register(resolver);
    }

    // =========================================================================
    // Participants
    // =========================================================================

    /// Spawn a robot on a random cell and make it a participant.
    ///
    /// # Errors
    ///
    /// See [`World::spawn`].
    pub fn add_participant(&mut self, id: EntityId, config: &RobotConfig) -> Result<IVec2, WorldError> {
        let pos = self.world.spawn(id, config, &mut self.rng)?;
        self.participants.insert(id);
        info!(entity = %id, x = pos.x, y = pos.y, round = self.round, "participant joined");
        Ok(pos)
    }

    /// Place a robot on a chosen cell and make it a participant.
    ///
    /// # Errors
    ///
    /// See [`World::place_robot`].
    pub fn add_participant_at(
        &mut self,
        id: EntityId,
        config: &RobotConfig,
        pos: IVec2,
    ) -> Result<(), WorldError> {
        self.world.place_robot(id, config, pos)?;
        self.participants.insert(id);
        info!(entity = %id, x = pos.x, y = pos.y, round = self.round, "participant joined");
        Ok(())
    }

    /// Remove a participant and its robot. A command it already queued for
    /// this round is dropped, so a participant rejoining under the same id
    /// still acts at most once.
    ///
    /// Returns `false` if `id` was not a participant.
    pub fn remove_participant(&mut self, id: EntityId) -> bool {
        if !self.participants.remove(&id) {
            return false;
        }
        self.submitted.remove(&id);
        let dropped = self.queue.purge(id);
        self.world.despawn(id);
        warn!(entity = %id, round = self.round, dropped, "participant removed");
        true
    }

    /// Whether `id` is an active participant.
    #[must_use]
    pub fn is_participant(&self, id: EntityId) -> bool {
        self.participants.contains(&id)
    }

    /// Active participants in id order.
    pub fn participants(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.participants.iter().copied()
    }

    /// Participants that have not submitted this round.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.participants.difference(&self.submitted).count()
    }

    /// Active participants that have not submitted this round, in id order.
    #[must_use]
    pub fn pending(&self) -> Vec<EntityId> {
        self.participants
            .difference(&self.submitted)
            .copied()
            .collect()
    }

    /// True when every active participant has submitted and there is at
    /// least one.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        !self.participants.is_empty() && self.remaining() == 0
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Build a command for `action` at its conventional priority.
    ///
    /// # Errors
    ///
    /// [`SubmitError::NotParticipating`] if `id` has no robot.
    pub fn command_for(&self, id: EntityId, action: Action) -> Result<Command, SubmitError> {
        let robot = self
            .world
            .robot(id)
            .ok_or(SubmitError::NotParticipating(id))?;
        let priority = robot.priority_for(&action);
        Ok(Command::new(id, action, priority))
    }

    /// Queue a command for the current round.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::NotParticipating`] if the source is not active
    /// - [`SubmitError::AlreadyActed`] on a second submission this round
    /// - [`SubmitError::Invalid`] if the action does not fit the loadout
    pub fn submit(&mut self, command: Command) -> Result<SubmitReceipt, SubmitError> {
        let id = command.source();
        if !self.participants.contains(&id) {
            return Err(SubmitError::NotParticipating(id));
        }
        if self.submitted.contains(&id) {
            return Err(SubmitError::AlreadyActed {
                entity: id,
                round: self.round,
            });
        }
        self.world
            .robot(id)
            .ok_or(SubmitError::NotParticipating(id))?
            .validate(command.action())?;

        debug!(
            entity = %id,
            kind = %command.kind(),
            priority = command.priority(),
            round = self.round,
            "command queued"
        );
        self.queue.push(command);
        self.submitted.insert(id);

        Ok(SubmitReceipt {
            round: self.round,
            remaining: self.remaining(),
            ready: self.is_ready(),
        })
    }

    /// [`Match::command_for`] followed by [`Match::submit`].
    ///
    /// # Errors
    ///
    /// See [`Match::submit`].
    pub fn submit_action(&mut self, id: EntityId, action: Action) -> Result<SubmitReceipt, SubmitError> {
        let command = self.command_for(id, action)?;
        self.submit(command)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve the current round with whatever is queued.
    ///
    /// Resolver errors are logged and the command is skipped; nothing
    /// aborts the round.
    pub fn resolve_round(&mut self) -> RoundSummary {
        let round = self.round;
        let mut resolved = 0;
        let mut skipped = 0;

        while let Some(command) = self.queue.pop() {
            debug!(
                entity = %command.source(),
                kind = %command.kind(),
                priority = command.priority(),
                "dispatching command"
            );
            let mut ctx = ResolveContext {
                world: &mut self.world,
                schedule: &mut self.schedule,
                rng: &mut self.rng,
                round,
            };
            match self.resolvers.dispatch(&command, &mut ctx) {
                Ok(()) => resolved += 1,
                Err(error) => {
                    warn!(entity = %command.source(), round, %error, "skipped command");
                    skipped += 1;
                }
            }
        }

        let events_fired = self.schedule.fire_due(round, &mut self.world);
        self.world.grid_mut().decay_signals();
        for robot in self.world.robots_mut() {
            robot.status.advance();
            for slot in &mut robot.loadout.gadgets {
                if slot.refills_after(round) {
                    slot.refill();
                }
            }
        }
        self.world.refresh_vision(self.vision_radius);
        for robot in self.world.robots_mut() {
            robot.feed.publish();
        }

        self.round += 1;
        self.submitted.clear();

        info!(round, resolved, skipped, events_fired, "round resolved");
        RoundSummary {
            round,
            resolved,
            skipped,
            events_fired,
        }
    }

    // =========================================================================
    // Read-back
    // =========================================================================

    /// Take the published report of a robot. Empty for unknown ids.
    pub fn drain_feed(&mut self, id: EntityId) -> Vec<FeedEntry> {
        self.world
            .robot_mut(id)
            .map(|r| r.feed.drain())
            .unwrap_or_default()
    }

    /// Latest end-of-round vision of a robot.
    #[must_use]
    pub fn visible_region(&self, id: EntityId) -> Option<CellReading> {
        self.world.robot(id).and_then(|r| r.vision.clone())
    }

    /// Active capabilities of a robot.
    #[must_use]
    pub fn status(&self, id: EntityId) -> Option<CapabilityFlags> {
        self.world.robot(id).map(|r| r.status.flags())
    }

    /// Health summary line of a robot.
    #[must_use]
    pub fn status_line(&self, id: EntityId) -> Option<String> {
        self.world.robot(id).map(crate::entity::Robot::status_line)
    }

    /// Round currently collecting commands. Starts at 1.
    #[must_use]
    pub fn round(&self) -> u64 {
        self.round
    }

    /// The world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The world, mutably, for scenario setup.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Pending scheduled events.
    #[must_use]
    pub fn schedule(&self) -> &EventSchedule {
        &self.schedule
    }

    /// Deterministic hash of world state and round.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.world.state_hash().hash(&mut hasher);
        self.round.hash(&mut hasher);
        hasher.finish()
    }
}

// =============================================================================
// RoundCoordinator
// =============================================================================

/// Proof of an accepted submission: the round to wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Ticket {
    /// Round the command resolves in
    pub round: u64,
}

/// Thread-safe front of a [`Match`].
#[derive(Debug)]
pub struct RoundCoordinator {
    game: Mutex<Match>,
    barrier: RoundBarrier,
}

impl RoundCoordinator {
    /// Wrap a match.
    #[must_use]
    pub fn new(game: Match) -> Self {
        Self {
            game: Mutex::new(game),
            barrier: RoundBarrier::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Match> {
        self.game.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish_round(&self, game: &mut Match) -> RoundSummary {
        self.barrier.close();
        let summary = game.resolve_round();
        self.barrier.open(summary.round);
        summary
    }

    /// See [`Match::add_participant`].
    ///
    /// # Errors
    ///
    /// See [`World::spawn`].
    pub fn add_participant(&self, id: EntityId, config: &RobotConfig) -> Result<IVec2, WorldError> {
        self.lock().add_participant(id, config)
    }

    /// Submit a command. If it completes the round, the round resolves
    /// before this returns.
    ///
    /// # Errors
    ///
    /// See [`Match::submit`].
    pub fn submit(&self, command: Command) -> Result<Ticket, SubmitError> {
        let mut game = self.lock();
        let receipt = game.submit(command)?;
        if receipt.ready {
            self.finish_round(&mut game);
        }
        Ok(Ticket {
            round: receipt.round,
        })
    }

    /// Submit an action at its conventional priority.
    ///
    /// # Errors
    ///
    /// See [`Match::submit`].
    pub fn submit_action(&self, id: EntityId, action: Action) -> Result<Ticket, SubmitError> {
        let mut game = self.lock();
        let command = game.command_for(id, action)?;
        let receipt = game.submit(command)?;
        if receipt.ready {
            self.finish_round(&mut game);
        }
        Ok(Ticket {
            round: receipt.round,
        })
    }

    /// Remove a participant. If everyone left has already submitted, the
    /// round resolves before this returns.
    pub fn remove_participant(&self, id: EntityId) -> bool {
        let mut game = self.lock();
        let removed = game.remove_participant(id);
        if removed && game.is_ready() {
            self.finish_round(&mut game);
        }
        removed
    }

    /// Block until the ticket's round has resolved. Returns the last
    /// completed round.
    pub fn wait(&self, ticket: Ticket) -> u64 {
        self.barrier.wait_for_round(ticket.round)
    }

    /// Block until the ticket's round has resolved or `timeout` passes.
    /// Returns `true` if the round resolved.
    pub fn wait_timeout(&self, ticket: Ticket, timeout: Duration) -> bool {
        self.barrier.wait_for_round_timeout(ticket.round, timeout)
    }

    /// See [`Match::drain_feed`].
    pub fn drain_feed(&self, id: EntityId) -> Vec<FeedEntry> {
        self.lock().drain_feed(id)
    }

    /// See [`Match::visible_region`].
    #[must_use]
    pub fn visible_region(&self, id: EntityId) -> Option<CellReading> {
        self.lock().visible_region(id)
    }

    /// See [`Match::status`].
    #[must_use]
    pub fn status(&self, id: EntityId) -> Option<CapabilityFlags> {
        self.lock().status(id)
    }

    /// See [`Match::status_line`].
    #[must_use]
    pub fn status_line(&self, id: EntityId) -> Option<String> {
        self.lock().status_line(id)
    }

    /// Round currently collecting commands.
    #[must_use]
    pub fn round(&self) -> u64 {
        self.lock().round()
    }

    /// The barrier participants wait on.
    #[must_use]
    pub fn barrier(&self) -> &RoundBarrier {
        &self.barrier
    }

    /// Run `f` against the match under the lock.
    pub fn with_match<R>(&self, f: impl FnOnce(&Match) -> R) -> R {
        f(&self.lock())
    }

    /// Unwrap the match.
    #[must_use]
    pub fn into_inner(self) -> Match {
        self.game.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
