//! Effect resolvers.
//!
//! A resolver applies one kind of command to the world. The coordinator pops
//! commands in priority order and routes each through a [`ResolverTable`],
//! which maps every [`CommandKind`] to the resolver registered for it.
//!
//! # Contract
//!
//! - Resolvers run one at a time with exclusive access to the world
//! - User-facing failures (blocked cell, missed shot, disabled capability)
//!   are reported as feed text and return `Ok(())`
//! - `Err` is reserved for broken invariants, such as a command whose issuer
//!   has been removed; the coordinator logs it and moves on
//! - All randomness comes from [`ResolveContext::rng`], so a seeded match
//!   replays exactly
//!
//! # Available Resolvers
//!
//! - [`MovementResolver`]: one step in a grid direction
//! - [`SensingResolver`]: signal, lidar, drone and scout-car sensors
//! - [`FiringResolver`]: straight-line and area weapons
//! - [`GadgetResolver`]: barricades and area status gadgets

mod firing;
mod gadget;
mod movement;
mod sensing;

pub use firing::FiringResolver;
pub use gadget::GadgetResolver;
pub use movement::{MovementResolver, MOVE_BLOCKED};
pub use sensing::SensingResolver;

use std::fmt;

use glam::IVec2;
use rand::RngCore;

use crate::command::{Aim, Command, CommandKind};
use crate::entity::{EntityId, Robot};
use crate::error::ResolveError;
use crate::schedule::EventSchedule;
use crate::status::Capability;
use crate::world::World;

/// Mutable state a resolver works against.
pub struct ResolveContext<'a> {
    /// The world
    pub world: &'a mut World,
    /// Scheduled events, for effects that outlast the round
    pub schedule: &'a mut EventSchedule,
    /// The match's random stream
    pub rng: &'a mut dyn RngCore,
    /// Round being resolved
    pub round: u64,
}

/// Applies commands of the kinds it handles.
///
/// # Example
///
/// ```
/// use gridfire_core::command::{Command, CommandKind};
/// use gridfire_core::error::ResolveError;
/// use gridfire_core::resolver::{ResolveContext, Resolver};
///
/// struct Idle;
///
/// impl Resolver for Idle {
///     fn handles(&self) -> &[CommandKind] {
///         &[CommandKind::Move]
///     }
///
///     fn resolve(&self, _command: &Command, _ctx: &mut ResolveContext<'_>) -> Result<(), ResolveError> {
///         Ok(())
///     }
/// }
/// ```
pub trait Resolver: Send + Sync {
    /// Command kinds routed to this resolver.
    fn handles(&self) -> &[CommandKind];

    /// Apply one command.
    ///
    /// # Errors
    ///
    /// A [`ResolveError`] when the command cannot be applied for a reason
    /// other than ordinary gameplay (missing issuer, missing equipment).
    fn resolve(&self, command: &Command, ctx: &mut ResolveContext<'_>) -> Result<(), ResolveError>;
}

/// Lookup table from command kind to resolver.
pub struct ResolverTable {
    resolvers: Vec<Box<dyn Resolver>>,
    routes: [Option<usize>; CommandKind::COUNT],
}

impl fmt::Debug for ResolverTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverTable")
            .field("resolvers", &format!("[{} resolvers]", self.resolvers.len()))
            .field("routes", &self.routes)
            .finish()
    }
}

impl Default for ResolverTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ResolverTable {
    /// A table with no resolvers.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            resolvers: Vec::new(),
            routes: [None; CommandKind::COUNT],
        }
    }

    /// The four built-in resolvers.
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.register(Box::new(MovementResolver::new()));
        table.register(Box::new(SensingResolver::new()));
        table.register(Box::new(FiringResolver::new()));
        table.register(Box::new(GadgetResolver::new()));
        table
    }

    /// Add a resolver. It takes over every kind it handles from any resolver
    /// registered before it.
    pub fn register(&mut self, resolver: Box<dyn Resolver>) {
        let index = self.resolvers.len();
        for kind in resolver.handles() {
            self.routes[kind.index()] = Some(index);
        }
        self.resolvers.push(resolver);
    }

    /// Resolver routed for `kind`.
    #[must_use]
    pub fn resolver_for(&self, kind: CommandKind) -> Option<&dyn Resolver> {
        self.routes[kind.index()].map(|i| self.resolvers[i].as_ref())
    }

    /// Route a command to its resolver.
    ///
    /// # Errors
    ///
    /// [`ResolveError::NoResolver`] if nothing handles the command's kind,
    /// otherwise whatever the resolver returns.
    pub fn dispatch(&self, command: &Command, ctx: &mut ResolveContext<'_>) -> Result<(), ResolveError> {
        self.resolver_for(command.kind())
            .ok_or(ResolveError::NoResolver(command.kind()))?
            .resolve(command, ctx)
    }

    /// Number of registered resolvers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// True if no resolver is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Cell of a robot that may act with `capability`.
///
/// `Ok(None)` means the action is refused: the robot is a wreck or the
/// capability is disabled. The refusal is already written to its feed.
pub(crate) fn acting_cell(
    world: &mut World,
    id: EntityId,
    capability: Capability,
) -> Result<Option<IVec2>, ResolveError> {
    let robot = world.robot_mut(id).ok_or(ResolveError::EntityMissing(id))?;
    if robot.is_destroyed() {
        robot.feed.push_text(Capability::Alive.blocked_message());
        return Ok(None);
    }
    if !robot.status.is_active(capability) {
        robot.feed.push_text(capability.blocked_message());
        return Ok(None);
    }
    world
        .position_of(id)
        .map(Some)
        .ok_or(ResolveError::NotPlaced(id))
}

/// Append a line to a robot's feed, if it still exists.
pub(crate) fn report(world: &mut World, id: EntityId, text: impl Into<String>) {
    if let Some(robot) = world.robot_mut(id) {
        robot.feed.push_text(text);
    }
}

/// Impact cell of a lobbed aim. A line aim lands `fallback` cells away.
pub(crate) fn impact_cell(origin: IVec2, aim: Aim, fallback: i32) -> IVec2 {
    let range = match aim {
        Aim::Lob { range, .. } => range,
        Aim::Line(_) => fallback,
    };
    origin + aim.direction().offset() * range
}

/// Call `on_hit` once for every living robot within Euclidean `radius` of
/// `center`, in row-major cell order. Returns the robots it was called for.
pub fn affect_in_radius(
    world: &mut World,
    center: IVec2,
    radius: i32,
    mut on_hit: impl FnMut(&mut Robot),
) -> Vec<EntityId> {
    let mut affected = Vec::new();
    for id in world.robots_in_radius(center, radius) {
        let Some(robot) = world.robot_mut(id) else {
            continue;
        };
        if robot.is_destroyed() {
            continue;
        }
        on_hit(robot);
        affected.push(id);
    }
    affected
}
