//! Gadget resolver.
//!
//! Barricades drop a hard obstacle on the adjacent cell in the aimed
//! direction. Area status gadgets are thrown like a projectile and apply a
//! [`StatusEffect`](crate::status::StatusEffect) to every living robot in the
//! blast; a lingering effect is re-applied by a scheduled event for the
//! following rounds.
//!
//! A use is spent only when the gadget actually deploys or is thrown. An
//! empty slot refuses the command until its refill round.

use rubble::{HardObstacle, Occupant};

use crate::command::{Action, Command, CommandKind};
use crate::config::GadgetKind;
use crate::error::ResolveError;
use crate::schedule::ScheduledEffect;
use crate::status::Capability;

use super::{acting_cell, affect_in_radius, impact_cell, report, ResolveContext, Resolver};

/// Feed line for a barricade that could not be placed.
pub const DEPLOY_BLOCKED: &str = "Deployment failed: the location has been blocked";

/// Resolver for [`CommandKind::Gadget`].
#[derive(Debug, Clone, Default)]
pub struct GadgetResolver;

impl GadgetResolver {
    /// Creates a new gadget resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Resolver for GadgetResolver {
    fn handles(&self) -> &[CommandKind] {
        &[CommandKind::Gadget]
    }

    fn resolve(&self, command: &Command, ctx: &mut ResolveContext<'_>) -> Result<(), ResolveError> {
        let Action::Gadget { gadget, aim } = command.action() else {
            return Err(ResolveError::NoResolver(command.kind()));
        };
        let id = command.source();
        let Some(origin) = acting_cell(ctx.world, id, Capability::Gadget)? else {
            return Ok(());
        };
        let missing = ResolveError::MissingEquipment {
            entity: id,
            kind: CommandKind::Gadget,
            slot: *gadget,
        };
        let slot = ctx
            .world
            .robot(id)
            .and_then(|r| r.loadout.gadgets.get(*gadget))
            .ok_or(missing.clone())?;
        if slot.remaining == 0 {
            let text = format!("No {} uses remaining", slot.config.name);
            report(ctx.world, id, text);
            return Ok(());
        }
        let config = slot.config.clone();

        match config.kind {
            GadgetKind::Barricade { hp, armor } => {
                let cell = origin + aim.direction().offset();
                let placed = !ctx.world.grid().is_blocked(cell)
                    && ctx
                        .world
                        .grid_mut()
                        .set_occupant(cell, Occupant::HardObstacle(HardObstacle::new(hp, armor)))
                        .is_ok();
                if !placed {
                    report(ctx.world, id, DEPLOY_BLOCKED);
                    return Ok(());
                }
                report(
                    ctx.world,
                    id,
                    format!("Deploy barricade at ({}, {})", cell.x, cell.y),
                );
            }
            GadgetKind::AreaStatus {
                min_range,
                impact_radius,
                effect,
                lingering_rounds,
                ..
            } => {
                let target = impact_cell(origin, *aim, min_range);
                let name = config.name.clone();
                let targets = affect_in_radius(ctx.world, target, impact_radius, |robot| {
                    if effect.apply(&mut robot.status) {
                        robot.feed.push_text(format!("Hit by {name}!"));
                    }
                });
                report(
                    ctx.world,
                    id,
                    format!(
                        "{} landed at ({}, {}), {} robots affected",
                        config.name,
                        target.x,
                        target.y,
                        targets.len()
                    ),
                );
                if lingering_rounds > 0 && !targets.is_empty() {
                    let start = ctx.round + 1;
                    ctx.schedule.schedule(
                        start,
                        start + lingering_rounds,
                        targets,
                        ScheduledEffect::Status(effect),
                    );
                }
            }
        }

        ctx.world
            .emit(origin, config.sound_emission, config.heat_emission);
        let slot = ctx
            .world
            .robot_mut(id)
            .and_then(|r| r.loadout.gadgets.get_mut(*gadget))
            .ok_or(missing)?;
        slot.try_consume();
        Ok(())
    }
}
