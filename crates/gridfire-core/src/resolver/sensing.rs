//! Sensing resolver.
//!
//! Four sensor families:
//! - signal sensors read sound or heat levels in a square around the robot
//! - lidar reveals occupants in a square around the robot
//! - a drone flies a path, then reveals around where it stopped
//! - a scout car drives in a straight line, pushing through a limited number
//!   of soft obstacles, then reveals around where it stopped
//!
//! Every sensor emits its configured sound and heat at the robot's cell.
//! Revealed cells are merged into the robot's private map.

use glam::IVec2;
use rubble::{Grid, Occupant, Region};

use crate::command::{Action, Command, CommandKind, Direction, SenseParams};
use crate::config::SensorKind;
use crate::entity::EntityId;
use crate::error::ResolveError;
use crate::feed::FeedEntry;
use crate::status::Capability;
use crate::world::World;

use super::{acting_cell, report, ResolveContext, Resolver};

/// Resolver for [`CommandKind::Sense`].
#[derive(Debug, Clone, Default)]
pub struct SensingResolver;

impl SensingResolver {
    /// Creates a new sensing resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Resolver for SensingResolver {
    fn handles(&self) -> &[CommandKind] {
        &[CommandKind::Sense]
    }

    fn resolve(&self, command: &Command, ctx: &mut ResolveContext<'_>) -> Result<(), ResolveError> {
        let Action::Sense { sensor, params } = command.action() else {
            return Err(ResolveError::NoResolver(command.kind()));
        };
        let id = command.source();
        let Some(origin) = acting_cell(ctx.world, id, Capability::Sense)? else {
            return Ok(());
        };
        let config = ctx
            .world
            .robot(id)
            .and_then(|r| r.loadout.sensors.get(*sensor))
            .cloned()
            .ok_or(ResolveError::MissingEquipment {
                entity: id,
                kind: CommandKind::Sense,
                slot: *sensor,
            })?;

        ctx.world
            .emit(origin, config.sound_emission, config.heat_emission);

        match config.kind {
            SensorKind::Signal { signal, radius } => {
                let reading = ctx
                    .world
                    .grid()
                    .read_signal(Region::square(origin, radius), signal);
                push(ctx.world, id, FeedEntry::Signal { signal, reading });
            }
            SensorKind::Lidar { radius } => {
                let reading = ctx.world.reveal(id, origin, radius);
                push(ctx.world, id, FeedEntry::Cells(reading));
            }
            SensorKind::Drone { radius, .. } => {
                let path = match params {
                    SenseParams::Path(path) => path.as_slice(),
                    _ => &[],
                };
                let stop = fly_drone(ctx.world.grid(), id, origin, path);
                report(
                    ctx.world,
                    id,
                    format!("Drone relocated to ({}, {})", stop.x, stop.y),
                );
                let reading = ctx.world.reveal(id, stop, radius);
                push(ctx.world, id, FeedEntry::Cells(reading));
            }
            SensorKind::ScoutCar {
                radius,
                range,
                removal_budget,
            } => {
                let SenseParams::Heading(heading) = params else {
                    report(ctx.world, id, format!("{} needs a heading", config.name));
                    return Ok(());
                };
                let (stop, cleared) =
                    drive_scout_car(ctx.world, id, origin, *heading, range, removal_budget);
                report(
                    ctx.world,
                    id,
                    format!(
                        "Scout car stopped at ({}, {}), cleared {cleared} obstacles",
                        stop.x, stop.y
                    ),
                );
                let reading = ctx.world.reveal(id, stop, radius);
                push(ctx.world, id, FeedEntry::Cells(reading));
            }
        }
        Ok(())
    }
}

fn push(world: &mut World, id: EntityId, entry: FeedEntry) {
    if let Some(robot) = world.robot_mut(id) {
        robot.feed.push(entry);
    }
}

/// Cell where a drone launched from `origin` comes to rest.
///
/// Steps that would leave the grid are skipped. The flight ends early in
/// front of another robot or a hard obstacle.
#[must_use]
pub fn fly_drone(grid: &Grid, owner: EntityId, origin: IVec2, path: &[Direction]) -> IVec2 {
    let mut pos = origin;
    for step in path {
        let next = pos + step.offset();
        match grid.occupant(next) {
            None => continue,
            Some(Occupant::Robot(other)) if other != owner => break,
            Some(Occupant::HardObstacle(_)) => break,
            Some(_) => pos = next,
        }
    }
    pos
}

/// Drive a scout car up to `range` cells along `heading`.
///
/// The car stops at the grid edge, in front of a robot or hard obstacle, or
/// in front of a soft obstacle once `budget` obstacles have been cleared.
/// Returns where it stopped and how many obstacles it cleared.
pub fn drive_scout_car(
    world: &mut World,
    owner: EntityId,
    origin: IVec2,
    heading: Direction,
    range: i32,
    budget: u32,
) -> (IVec2, u32) {
    let mut pos = origin;
    let mut cleared = 0;
    for _ in 0..range {
        let next = pos + heading.offset();
        match world.grid().occupant(next) {
            None | Some(Occupant::HardObstacle(_)) => break,
            Some(Occupant::Robot(other)) if other != owner => break,
            Some(Occupant::Obstacle) => {
                if cleared >= budget {
                    break;
                }
                if world.grid_mut().set_occupant(next, Occupant::Empty).is_err() {
                    break;
                }
                cleared += 1;
                pos = next;
            }
            Some(_) => pos = next,
        }
    }
    (pos, cleared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{presets, FieldConfig, RobotConfig};
    use crate::schedule::EventSchedule;
    use rand::rngs::mock::StepRng;
    use rubble::{Glyph, HardObstacle, Signal};

    const ME: EntityId = EntityId::new(1);

    fn setup(at: IVec2) -> World {
        let mut world = World::from_field(&FieldConfig::open(9, 9));
        world.place_robot(ME, &presets::standard_robot(), at).unwrap();
        world
    }

    fn sense(world: &mut World, sensor: usize, params: SenseParams) -> Result<(), ResolveError> {
        let mut schedule = EventSchedule::new();
        let mut rng = StepRng::new(0, 0);
        let mut ctx = ResolveContext {
            world,
            schedule: &mut schedule,
            rng: &mut rng,
            round: 1,
        };
        let command = Command::new(ME, Action::Sense { sensor, params }, u32::MAX);
        SensingResolver::new().resolve(&command, &mut ctx)
    }

    fn live(world: &World) -> Vec<FeedEntry> {
        world.robot(ME).unwrap().feed.live().to_vec()
    }

    mod signal_tests {
        use super::*;

        #[test]
        fn sound_sensor_reads_square() {
            let mut world = setup(IVec2::new(4, 4));
            world.emit(IVec2::new(6, 4), 4, 0);

            sense(&mut world, 0, SenseParams::None).unwrap();

            let entries = live(&world);
            assert_eq!(entries.len(), 1);
            let FeedEntry::Signal { signal, reading } = &entries[0] else {
                panic!("expected a signal reading, got {entries:?}");
            };
            assert_eq!(*signal, Signal::Sound);
            assert_eq!(reading.len(), 25);
            assert_eq!(reading.get(IVec2::new(6, 4)), Some(&4));
            assert_eq!(reading.get(IVec2::new(4, 4)), Some(&2));
        }

        #[test]
        fn lidar_emits_and_fills_map() {
            let mut world = setup(IVec2::new(4, 4));
            world
                .grid_mut()
                .set_occupant(IVec2::new(5, 5), Occupant::Obstacle)
                .unwrap();

            sense(&mut world, 2, SenseParams::None).unwrap();

            let robot = world.robot(ME).unwrap();
            assert_eq!(robot.map.known_cells(), 25);
            assert_eq!(robot.map.get(IVec2::new(5, 5)), Some(Glyph::Obstacle));
            assert!(matches!(live(&world)[0], FeedEntry::Cells(_)));
            assert_eq!(world.grid().signal(IVec2::new(4, 4), Signal::Heat), Some(1));
        }
    }

    mod drone_tests {
        use super::*;

        #[test]
        fn clamps_at_grid_edge() {
            let grid = Grid::new(FieldConfig::open(4, 4).grid_config());
            let stop = fly_drone(
                &grid,
                ME,
                IVec2::new(0, 1),
                &[Direction::Left, Direction::Left, Direction::Down],
            );
            assert_eq!(stop, IVec2::new(0, 2));
        }

        #[test]
        fn stops_before_blocking_cell() {
            let mut world = setup(IVec2::new(1, 4));
            world
                .place_robot(EntityId::new(2), &RobotConfig::bare(), IVec2::new(4, 4))
                .unwrap();
            let stop = fly_drone(world.grid(), ME, IVec2::new(1, 4), &[Direction::Right; 5]);
            assert_eq!(stop, IVec2::new(3, 4));
        }

        #[test]
        fn reports_relocation_and_reveals() {
            let mut world = setup(IVec2::new(1, 1));
            sense(
                &mut world,
                3,
                SenseParams::Path(vec![Direction::Right, Direction::Right, Direction::Down]),
            )
            .unwrap();

            let entries = live(&world);
            assert_eq!(entries[0].as_text(), Some("Drone relocated to (3, 2)"));
            let FeedEntry::Cells(reading) = &entries[1] else {
                panic!("expected cells");
            };
            assert_eq!(reading.region(), Region::square(IVec2::new(3, 2), 1));
        }
    }

    mod scout_car_tests {
        use super::*;

        #[test]
        fn clears_soft_obstacles_within_budget() {
            let mut world = setup(IVec2::new(0, 0));
            for x in 1..=3 {
                world
                    .grid_mut()
                    .set_occupant(IVec2::new(x, 0), Occupant::Obstacle)
                    .unwrap();
            }
            let (stop, cleared) =
                drive_scout_car(&mut world, ME, IVec2::ZERO, Direction::Right, 6, 2);
            assert_eq!(stop, IVec2::new(2, 0));
            assert_eq!(cleared, 2);
            assert_eq!(world.grid().occupant(IVec2::new(3, 0)), Some(Occupant::Obstacle));
        }

        #[test]
        fn stops_at_hard_obstacle_and_range() {
            let mut world = setup(IVec2::new(0, 0));
            world
                .grid_mut()
                .set_occupant(IVec2::new(0, 3), Occupant::HardObstacle(HardObstacle::new(9, 9)))
                .unwrap();
            let (stop, _) = drive_scout_car(&mut world, ME, IVec2::ZERO, Direction::Down, 6, 2);
            assert_eq!(stop, IVec2::new(0, 2));

            let (stop, _) = drive_scout_car(&mut world, ME, IVec2::ZERO, Direction::Right, 6, 2);
            assert_eq!(stop, IVec2::new(6, 0));
        }

        #[test]
        fn feed_names_stop() {
            let mut world = setup(IVec2::new(2, 8));
            sense(&mut world, 4, SenseParams::Heading(Direction::Up)).unwrap();
            assert_eq!(
                live(&world)[0].as_text(),
                Some("Scout car stopped at (2, 2), cleared 0 obstacles")
            );
        }
    }

    #[test]
    fn disabled_sensing_emits_nothing() {
        let mut world = setup(IVec2::new(4, 4));
        world.robot_mut(ME).unwrap().status.disable_for(Capability::Sense, 2);

        sense(&mut world, 2, SenseParams::None).unwrap();

        assert_eq!(world.grid().signal(IVec2::new(4, 4), Signal::Sound), Some(0));
        assert_eq!(
            live(&world),
            vec![FeedEntry::Text(Capability::Sense.blocked_message().to_string())]
        );
    }

    #[test]
    fn missing_sensor_is_an_error() {
        let mut world = setup(IVec2::new(4, 4));
        assert_eq!(
            sense(&mut world, 9, SenseParams::None),
            Err(ResolveError::MissingEquipment {
                entity: ME,
                kind: CommandKind::Sense,
                slot: 9
            })
        );
    }
}
