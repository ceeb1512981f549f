//! Firing resolver.
//!
//! # Straight weapons
//!
//! The shot travels cell by cell from the shooter along the aimed direction.
//! The first occupied cell within range is the target. Accuracy at distance
//! `d` is `accuracy - (d - 1) * accuracy_decay`; a single draw at or below it
//! hits. Leaving the grid or running out of range is a miss. The shot starts
//! one cell away, so a shooter never hits itself.
//!
//! # Projectile weapons
//!
//! The shell lands `range` cells away along the aimed direction and damages
//! every occupant within Euclidean `impact_radius` of the impact cell. Damage
//! drops by `impact_damage_decay` per whole cell of distance from the impact
//! cell, never below zero.

use glam::IVec2;
use rand::Rng;
use rubble::emission::floor_distance;

use crate::command::{Action, Command, CommandKind, Direction};
use crate::config::{WeaponConfig, WeaponKind};
use crate::damage::{Damage, DamageOutcome};
use crate::entity::EntityId;
use crate::error::ResolveError;
use crate::status::Capability;
use crate::world::Hit;

use super::{acting_cell, impact_cell, report, ResolveContext, Resolver};

/// Feed line for a straight shot that hit nothing.
pub const MISSED: &str = "weapon missed!";

/// Feed line for a projectile that hit nothing.
pub const HIT_NOTHING: &str = "weapon hit nothing";

/// Chance to hit at `distance` cells.
#[must_use]
pub fn accuracy_at(accuracy: f64, decay: f64, distance: i32) -> f64 {
    accuracy - f64::from(distance - 1) * decay
}

/// Resolver for [`CommandKind::Fire`].
#[derive(Debug, Clone, Default)]
pub struct FiringResolver;

impl FiringResolver {
    /// Creates a new firing resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn fire_straight(
        ctx: &mut ResolveContext<'_>,
        shooter: EntityId,
        origin: IVec2,
        direction: Direction,
        weapon: &WeaponConfig,
        (accuracy, decay, range): (f64, f64, i32),
    ) {
        for distance in 1..=range {
            let pos = origin + direction.offset() * distance;
            let Some(occupant) = ctx.world.grid().occupant(pos) else {
                break;
            };
            if occupant.is_empty() {
                continue;
            }

            let roll: f64 = ctx.rng.gen();
            if roll > accuracy_at(accuracy, decay, distance) {
                break;
            }
            let hit = ctx.world.damage_at(pos, weapon.damage, ctx.rng);
            report(ctx.world, shooter, hit_line(hit.as_ref()));
            return;
        }
        report(ctx.world, shooter, MISSED);
    }

    fn fire_projectile(
        ctx: &mut ResolveContext<'_>,
        shooter: EntityId,
        target: IVec2,
        damage: Damage,
        (radius, decay): (i32, i32),
    ) {
        let mut any = false;
        for pos in ctx.world.grid().cells_in_radius(target, radius) {
            let falloff = damage.falloff(decay, floor_distance(pos, target));
            let Some(hit) = ctx.world.damage_at(pos, falloff, ctx.rng) else {
                continue;
            };
            if hit.outcome != DamageOutcome::Ignored {
                any = true;
                report(ctx.world, shooter, format!("weapon hit {}!", hit.name));
            }
        }
        if !any {
            report(ctx.world, shooter, HIT_NOTHING);
        }
    }
}

fn hit_line(hit: Option<&Hit>) -> String {
    match hit {
        Some(hit) if hit.outcome != DamageOutcome::Ignored => format!("weapon hit {}!", hit.name),
        _ => MISSED.to_string(),
    }
}

impl Resolver for FiringResolver {
    fn handles(&self) -> &[CommandKind] {
        &[CommandKind::Fire]
    }

    fn resolve(&self, command: &Command, ctx: &mut ResolveContext<'_>) -> Result<(), ResolveError> {
        let Action::Fire { weapon, aim } = command.action() else {
            return Err(ResolveError::NoResolver(command.kind()));
        };
        let shooter = command.source();
        let Some(origin) = acting_cell(ctx.world, shooter, Capability::Fire)? else {
            return Ok(());
        };
        let config = ctx
            .world
            .robot(shooter)
            .and_then(|r| r.loadout.weapons.get(*weapon))
            .cloned()
            .ok_or(ResolveError::MissingEquipment {
                entity: shooter,
                kind: CommandKind::Fire,
                slot: *weapon,
            })?;

        ctx.world
            .emit(origin, config.sound_emission, config.heat_emission);

        match config.kind {
            WeaponKind::Straight {
                accuracy,
                accuracy_decay,
                range,
            } => Self::fire_straight(
                ctx,
                shooter,
                origin,
                aim.direction(),
                &config,
                (accuracy, accuracy_decay, range),
            ),
            WeaponKind::Projectile {
                min_range,
                impact_radius,
                impact_damage_decay,
                ..
            } => Self::fire_projectile(
                ctx,
                shooter,
                impact_cell(origin, *aim, min_range),
                config.damage,
                (impact_radius, impact_damage_decay),
            ),
        }
        Ok(())
    }
}
