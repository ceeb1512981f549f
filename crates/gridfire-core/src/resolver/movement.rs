//! Movement resolver.
//!
//! A move is one step up, down, left or right. Hard obstacles, other robots
//! (wrecks included) and the grid edge block it; soft obstacles are crushed.
//! A successful move emits the robot's movement sound and heat at the
//! destination.

use crate::command::{Action, Command, CommandKind};
use crate::error::{ResolveError, WorldError};
use crate::status::Capability;

use super::{acting_cell, report, ResolveContext, Resolver};

/// Feed line for a blocked move.
pub const MOVE_BLOCKED: &str = "Movement failed, the location has been blocked";

/// Resolver for [`CommandKind::Move`].
#[derive(Debug, Clone, Default)]
pub struct MovementResolver;

impl MovementResolver {
    /// Creates a new movement resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Resolver for MovementResolver {
    fn handles(&self) -> &[CommandKind] {
        &[CommandKind::Move]
    }

    fn resolve(&self, command: &Command, ctx: &mut ResolveContext<'_>) -> Result<(), ResolveError> {
        let Action::Move(direction) = command.action() else {
            return Err(ResolveError::NoResolver(command.kind()));
        };
        let id = command.source();
        let Some(origin) = acting_cell(ctx.world, id, Capability::Move)? else {
            return Ok(());
        };

        let destination = origin + direction.offset();
        match ctx.world.relocate(id, destination) {
            Ok(()) => {
                let (sound, heat) = ctx
                    .world
                    .robot(id)
                    .map_or((0, 0), |r| (r.move_sound, r.move_heat));
                ctx.world.emit(destination, sound, heat);
                report(
                    ctx.world,
                    id,
                    format!("Move to ({}, {})", destination.x, destination.y),
                );
                Ok(())
            }
            Err(WorldError::Blocked(_)) => {
                report(ctx.world, id, MOVE_BLOCKED);
                Ok(())
            }
            Err(_) => Err(ResolveError::NotPlaced(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Direction;
    use crate::config::{FieldConfig, RobotConfig};
    use crate::entity::EntityId;
    use crate::schedule::EventSchedule;
    use crate::world::World;
    use glam::IVec2;
    use rand::rngs::mock::StepRng;
    use rubble::{HardObstacle, Occupant, Signal};

    const ME: EntityId = EntityId::new(1);

    fn setup(at: IVec2) -> World {
        let mut world = World::from_field(&FieldConfig::open(6, 6));
        world.place_robot(ME, &RobotConfig::bare(), at).unwrap();
        world
    }

    fn step(world: &mut World, direction: Direction) -> Result<(), ResolveError> {
        let mut schedule = EventSchedule::new();
        let mut rng = StepRng::new(0, 0);
        let mut ctx = ResolveContext {
            world,
            schedule: &mut schedule,
            rng: &mut rng,
            round: 1,
        };
        MovementResolver::new().resolve(&Command::new(ME, Action::Move(direction), 50), &mut ctx)
    }

    fn texts(world: &World) -> Vec<String> {
        world
            .robot(ME)
            .unwrap()
            .feed
            .live_texts()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn move_right_emits_at_destination() {
        let mut world = setup(IVec2::new(2, 2));
        step(&mut world, Direction::Right).unwrap();

        assert_eq!(world.position_of(ME), Some(IVec2::new(3, 2)));
        assert_eq!(world.grid().occupant(IVec2::new(2, 2)), Some(Occupant::Empty));
        // bare robots move with sound 5 and heat 3
        assert_eq!(world.grid().signal(IVec2::new(3, 2), Signal::Sound), Some(5));
        assert_eq!(world.grid().signal(IVec2::new(3, 2), Signal::Heat), Some(3));
        assert_eq!(world.grid().signal(IVec2::new(5, 2), Signal::Sound), Some(3));
        assert_eq!(texts(&world), vec!["Move to (3, 2)"]);
    }

    #[test]
    fn hard_obstacle_blocks_and_changes_nothing() {
        let mut world = setup(IVec2::new(2, 2));
        let wall = Occupant::HardObstacle(HardObstacle::new(80, 2));
        world.grid_mut().set_occupant(IVec2::new(2, 1), wall).unwrap();

        step(&mut world, Direction::Up).unwrap();

        assert_eq!(world.position_of(ME), Some(IVec2::new(2, 2)));
        assert_eq!(world.grid().occupant(IVec2::new(2, 1)), Some(wall));
        assert_eq!(world.grid().signal(IVec2::new(2, 2), Signal::Sound), Some(0));
        assert_eq!(texts(&world), vec![MOVE_BLOCKED]);
    }

    #[test]
    fn other_robot_blocks() {
        let mut world = setup(IVec2::new(2, 2));
        let other = EntityId::new(2);
        world.place_robot(other, &RobotConfig::bare(), IVec2::new(1, 2)).unwrap();

        step(&mut world, Direction::Left).unwrap();

        assert_eq!(world.position_of(ME), Some(IVec2::new(2, 2)));
        assert_eq!(world.position_of(other), Some(IVec2::new(1, 2)));
        assert_eq!(texts(&world), vec![MOVE_BLOCKED]);
    }

    #[test]
    fn grid_edge_blocks_like_an_obstacle() {
        let mut world = setup(IVec2::new(0, 5));
        step(&mut world, Direction::Down).unwrap();
        step(&mut world, Direction::Left).unwrap();
        assert_eq!(world.position_of(ME), Some(IVec2::new(0, 5)));
        assert_eq!(texts(&world), vec![MOVE_BLOCKED, MOVE_BLOCKED]);
    }

    #[test]
    fn soft_obstacle_is_crushed() {
        let mut world = setup(IVec2::new(2, 2));
        world
            .grid_mut()
            .set_occupant(IVec2::new(2, 3), Occupant::Obstacle)
            .unwrap();
        step(&mut world, Direction::Down).unwrap();
        assert_eq!(world.grid().occupant(IVec2::new(2, 3)), Some(Occupant::Robot(ME)));
    }

    #[test]
    fn disabled_movement_is_refused() {
        let mut world = setup(IVec2::new(2, 2));
        world.robot_mut(ME).unwrap().status.disable_for(Capability::Move, 1);

        step(&mut world, Direction::Right).unwrap();

        assert_eq!(world.position_of(ME), Some(IVec2::new(2, 2)));
        assert_eq!(texts(&world), vec![Capability::Move.blocked_message()]);
    }

    #[test]
    fn removed_robot_is_an_error() {
        let mut world = setup(IVec2::new(2, 2));
        world.despawn(ME);
        assert_eq!(step(&mut world, Direction::Up), Err(ResolveError::EntityMissing(ME)));
    }
}
