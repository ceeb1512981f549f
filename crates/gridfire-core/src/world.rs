//! World module: the grid plus every robot on it.
//!
//! The World is the container for all simulation state a round mutates. It
//! provides:
//! - Robot storage with deterministic iteration order (`BTreeMap`)
//! - The id-to-cell index of robot positions
//! - Field generation and spawn placement
//! - Damage routing to whatever occupies a cell
//! - End-of-round vision refresh
//!
//! # Position Index
//!
//! The grid cell holding `Occupant::Robot(id)` is where a robot is. The
//! `positions` index only mirrors it for O(log n) lookup, and every method
//! that changes one changes the other. There is no other way to move a robot,
//! so the two cannot drift apart.

use std::collections::BTreeMap;

use glam::IVec2;
use rand::{Rng, RngCore};
use rayon::prelude::*;
use rubble::{CellReading, Emission, Grid, HardObstacle, Occupant, Region};
use tracing::debug;

use crate::config::{FieldConfig, RobotConfig};
use crate::damage::{Damage, DamageOutcome, Damageable, SoftObstacle};
use crate::entity::{EntityId, Robot};
use crate::error::WorldError;
use crate::status::Capability;

/// Random draws for an empty spawn cell before obstacles may be overwritten.
pub const SPAWN_TRIALS: usize = 20;

/// Something a weapon hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    /// Feed name of the target, e.g. `"player 2"` or `"hard barricade"`
    pub name: String,
    /// What the hit did
    pub outcome: DamageOutcome,
}

/// The battlefield and its robots.
#[derive(Debug, Clone)]
pub struct World {
    grid: Grid,
    robots: BTreeMap<EntityId, Robot>,
    positions: BTreeMap<EntityId, IVec2>,
}

impl World {
    /// An empty world over `grid`.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            robots: BTreeMap::new(),
            positions: BTreeMap::new(),
        }
    }

    /// An empty, obstacle-free world sized by `field`.
    #[must_use]
    pub fn from_field(field: &FieldConfig) -> Self {
        Self::new(Grid::new(field.grid_config()))
    }

    /// The grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The grid, mutably. Do not place or remove robots through it; use
    /// [`World::place_robot`], [`World::relocate`] and [`World::despawn`].
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    // =========================================================================
    // Robots
    // =========================================================================

    /// A robot by id.
    #[must_use]
    pub fn robot(&self, id: EntityId) -> Option<&Robot> {
        self.robots.get(&id)
    }

    /// A robot by id, mutably.
    pub fn robot_mut(&mut self, id: EntityId) -> Option<&mut Robot> {
        self.robots.get_mut(&id)
    }

    /// All robots in id order.
    pub fn robots(&self) -> impl Iterator<Item = &Robot> {
        self.robots.values()
    }

    /// All robots in id order, mutably.
    pub fn robots_mut(&mut self) -> impl Iterator<Item = &mut Robot> {
        self.robots.values_mut()
    }

    /// Number of robots, wrecks included.
    #[must_use]
    pub fn robot_count(&self) -> usize {
        self.robots.len()
    }

    /// Cell of a robot.
    #[must_use]
    pub fn position_of(&self, id: EntityId) -> Option<IVec2> {
        self.positions.get(&id).copied()
    }

    /// Put a new robot on a specific cell, replacing any obstacle there.
    ///
    /// # Errors
    ///
    /// - [`WorldError::DuplicateEntity`] if the id is taken
    /// - [`WorldError::Blocked`] if another robot stands there
    /// - [`WorldError::Grid`] if `pos` is off the grid
    pub fn place_robot(
        &mut self,
        id: EntityId,
        config: &RobotConfig,
        pos: IVec2,
    ) -> Result<(), WorldError> {
        if self.robots.contains_key(&id) {
            return Err(WorldError::DuplicateEntity(id));
        }
        if matches!(self.grid.occupant(pos), Some(Occupant::Robot(_))) {
            return Err(WorldError::Blocked(pos));
        }
        self.grid.set_occupant(pos, Occupant::Robot(id))?;
        self.positions.insert(id, pos);
        self.robots
            .insert(id, Robot::from_config(id, config, self.grid.extent()));
        Ok(())
    }

    /// Spawn a robot on a random cell.
    ///
    /// Tries [`SPAWN_TRIALS`] random cells looking for open ground, then the
    /// same number again accepting any cell without a robot, then scans the
    /// grid row by row.
    ///
    /// # Errors
    ///
    /// - [`WorldError::DuplicateEntity`] if the id is taken
    /// - [`WorldError::NoFreeCell`] if every cell holds a robot
    pub fn spawn(
        &mut self,
        id: EntityId,
        config: &RobotConfig,
        rng: &mut dyn RngCore,
    ) -> Result<IVec2, WorldError> {
        if self.robots.contains_key(&id) {
            return Err(WorldError::DuplicateEntity(id));
        }

        let pos = self
            .random_cell(rng, Occupant::is_empty)
            .or_else(|| self.random_cell(rng, |o| o.robot().is_none()))
            .or_else(|| {
                self.grid
                    .cells()
                    .iter()
                    .find(|cell| cell.occupant.robot().is_none())
                    .map(|cell| cell.pos)
            })
            .ok_or(WorldError::NoFreeCell)?;

        self.place_robot(id, config, pos)?;
        debug!(entity = %id, x = pos.x, y = pos.y, "spawned robot");
        Ok(pos)
    }

    fn random_cell(
        &self,
        rng: &mut dyn RngCore,
        accept: impl Fn(&Occupant) -> bool,
    ) -> Option<IVec2> {
        let extent = self.grid.extent();
        (0..SPAWN_TRIALS).find_map(|_| {
            let pos = IVec2::new(rng.gen_range(0..extent.width), rng.gen_range(0..extent.height));
            self.grid
                .occupant(pos)
                .filter(|o| accept(o))
                .map(|_| pos)
        })
    }

    /// Remove a robot and clear its cell.
    pub fn despawn(&mut self, id: EntityId) -> Option<Robot> {
        if let Some(pos) = self.positions.remove(&id) {
            if self.grid.occupant(pos) == Some(Occupant::Robot(id)) {
                // In bounds by construction
                let _ = self.grid.set_occupant(pos, Occupant::Empty);
            }
        }
        self.robots.remove(&id)
    }

    /// Move a robot to `to`. A soft obstacle there is crushed.
    ///
    /// # Errors
    ///
    /// - [`WorldError::UnknownEntity`] if the robot has no cell
    /// - [`WorldError::Blocked`] if `to` is blocked
    pub fn relocate(&mut self, id: EntityId, to: IVec2) -> Result<(), WorldError> {
        let from = self
            .position_of(id)
            .ok_or(WorldError::UnknownEntity(id))?;
        if self.grid.is_blocked(to) {
            return Err(WorldError::Blocked(to));
        }
        self.grid.set_occupant(to, Occupant::Robot(id))?;
        self.grid.set_occupant(from, Occupant::Empty)?;
        self.positions.insert(id, to);
        Ok(())
    }

    /// Robots standing within Euclidean `radius` of `center`, in row-major
    /// cell order. Wrecks included.
    #[must_use]
    pub fn robots_in_radius(&self, center: IVec2, radius: i32) -> Vec<EntityId> {
        self.grid
            .cells_in_radius(center, radius)
            .into_iter()
            .filter_map(|pos| self.grid.occupant(pos).and_then(|o| o.robot()))
            .collect()
    }

    // =========================================================================
    // Field
    // =========================================================================

    /// Scatter obstacles over open cells.
    ///
    /// Every cell draws one value `r`; `r < obstacle_coverage` places an
    /// obstacle, hard if also `r < hard_obstacle_coverage`, with hit points
    /// and armor drawn from the configured inclusive ranges.
    pub fn initialize_field(&mut self, field: &FieldConfig, rng: &mut dyn RngCore) {
        let positions: Vec<IVec2> = self.grid.cells().iter().map(|c| c.pos).collect();
        let mut placed = 0usize;

        for pos in positions {
            let roll: f64 = rng.gen();
            if roll >= field.obstacle_coverage || self.grid.is_occupied(pos) {
                continue;
            }
            let occupant = if roll < field.hard_obstacle_coverage {
                let (hp_lo, hp_hi) = field.hard_obstacle_hp;
                let (armor_lo, armor_hi) = field.hard_obstacle_armor;
                Occupant::HardObstacle(HardObstacle::new(
                    rng.gen_range(hp_lo..=hp_hi),
                    rng.gen_range(armor_lo..=armor_hi),
                ))
            } else {
                Occupant::Obstacle
            };
            if self.grid.set_occupant(pos, occupant).is_ok() {
                placed += 1;
            }
        }

        debug!(placed, "initialized field");
    }

    // =========================================================================
    // Effects
    // =========================================================================

    /// Emit an action's sound and heat at `origin`.
    pub fn emit(&mut self, origin: IVec2, sound: i32, heat: i32) {
        self.grid.emit_many(&Emission::pair(origin, sound, heat));
    }

    /// Apply damage to whatever occupies `pos`.
    ///
    /// Returns `None` for open ground or off-grid positions. Destroyed
    /// obstacles are cleared; destroyed robots stay as wrecks.
    pub fn damage_at(&mut self, pos: IVec2, damage: Damage, rng: &mut dyn RngCore) -> Option<Hit> {
        match self.grid.occupant(pos)? {
            Occupant::Empty => None,
            Occupant::Robot(id) => {
                let robot = self.robots.get_mut(&id)?;
                let outcome = robot.take_damage(damage, rng);
                Some(Hit {
                    name: robot.display_name(),
                    outcome,
                })
            }
            Occupant::Obstacle => {
                let mut obstacle = SoftObstacle;
                let outcome = obstacle.take_damage(damage, rng);
                let _ = self.grid.set_occupant(pos, Occupant::Empty);
                Some(Hit {
                    name: obstacle.display_name(),
                    outcome,
                })
            }
            Occupant::HardObstacle(mut obstacle) => {
                let outcome = obstacle.take_damage(damage, rng);
                let after = if outcome == DamageOutcome::Destroyed {
                    Occupant::Empty
                } else {
                    Occupant::HardObstacle(obstacle)
                };
                let _ = self.grid.set_occupant(pos, after);
                Some(Hit {
                    name: obstacle.display_name(),
                    outcome,
                })
            }
        }
    }

    /// Snapshot occupants around `center` into a robot's private map.
    pub fn reveal(&mut self, id: EntityId, center: IVec2, radius: i32) -> CellReading {
        let reading = self.grid.read_cells(Region::square(center, radius));
        let own = self.position_of(id);
        if let Some(robot) = self.robots.get_mut(&id) {
            robot.map.merge(&reading, own);
        }
        reading
    }

    /// Recompute every living robot's vision and merge it into its map.
    ///
    /// Robots with vision disabled get no snapshot and a feed line instead.
    pub fn refresh_vision(&mut self, radius: i32) {
        let grid = &self.grid;
        let robots = &self.robots;
        let snapshots: Vec<(EntityId, IVec2, Option<CellReading>)> = self
            .positions
            .par_iter()
            .filter_map(|(id, pos)| {
                let robot = robots.get(id)?;
                if robot.is_destroyed() {
                    return None;
                }
                let sight = robot
                    .status
                    .is_active(Capability::Vision)
                    .then(|| grid.read_cells(Region::square(*pos, radius)));
                Some((*id, *pos, sight))
            })
            .collect();

        for (id, pos, sight) in snapshots {
            let Some(robot) = self.robots.get_mut(&id) else {
                continue;
            };
            match &sight {
                Some(reading) => robot.map.merge(reading, Some(pos)),
                None => robot
                    .feed
                    .push_text(Capability::Vision.blocked_message()),
            }
            robot.vision = sight;
        }
    }

    /// Compute a deterministic hash of grid and robot state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        rubble::hash::hash_grid_into(&self.grid, &mut hasher);
        for (id, robot) in &self.robots {
            id.hash(&mut hasher);
            robot.hp.hash(&mut hasher);
            robot.armor.hash(&mut hasher);
            robot.status.hash(&mut hasher);
            self.position_of(*id).hash(&mut hasher);
            for slot in &robot.loadout.gadgets {
                slot.remaining.hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rubble::Glyph;

    fn world(width: i32, height: i32) -> World {
        World::from_field(&FieldConfig::open(width, height))
    }

    fn bare() -> RobotConfig {
        RobotConfig::bare()
    }

    mod placement_tests {
        use super::*;

        #[test]
        fn place_and_find() {
            let mut world = world(5, 5);
            let id = EntityId::new(1);
            world.place_robot(id, &bare(), IVec2::new(2, 3)).unwrap();
            assert_eq!(world.position_of(id), Some(IVec2::new(2, 3)));
            assert_eq!(world.grid().occupant(IVec2::new(2, 3)), Some(Occupant::Robot(id)));
        }

        #[test]
        fn duplicate_and_stacked_rejected() {
            let mut world = world(5, 5);
            world.place_robot(EntityId::new(1), &bare(), IVec2::ZERO).unwrap();
            assert_eq!(
                world.place_robot(EntityId::new(1), &bare(), IVec2::ONE),
                Err(WorldError::DuplicateEntity(EntityId::new(1)))
            );
            assert_eq!(
                world.place_robot(EntityId::new(2), &bare(), IVec2::ZERO),
                Err(WorldError::Blocked(IVec2::ZERO))
            );
        }

        #[test]
        fn spawn_prefers_empty_cells() {
            let mut world = world(6, 6);
            world
                .grid_mut()
                .set_occupant(IVec2::new(3, 3), Occupant::Obstacle)
                .unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(9);
            for i in 0..10 {
                let pos = world.spawn(EntityId::new(i), &bare(), &mut rng).unwrap();
                assert_ne!(pos, IVec2::new(3, 3));
            }
            assert_eq!(world.robot_count(), 10);
        }

        #[test]
        fn spawn_overwrites_obstacle_when_nothing_else() {
            let mut world = world(2, 1);
            world.place_robot(EntityId::new(1), &bare(), IVec2::ZERO).unwrap();
            world
                .grid_mut()
                .set_occupant(IVec2::new(1, 0), Occupant::HardObstacle(HardObstacle::new(9, 9)))
                .unwrap();
            let pos = world
                .spawn(EntityId::new(2), &bare(), &mut StepRng::new(0, 0))
                .unwrap();
            assert_eq!(pos, IVec2::new(1, 0));
        }

        #[test]
        fn spawn_on_full_grid_fails() {
            let mut world = world(1, 1);
            world.place_robot(EntityId::new(1), &bare(), IVec2::ZERO).unwrap();
            assert_eq!(
                world.spawn(EntityId::new(2), &bare(), &mut StepRng::new(0, 0)),
                Err(WorldError::NoFreeCell)
            );
        }

        #[test]
        fn despawn_clears_cell() {
            let mut world = world(3, 3);
            let id = EntityId::new(4);
            world.place_robot(id, &bare(), IVec2::ONE).unwrap();
            assert!(world.despawn(id).is_some());
            assert_eq!(world.grid().occupant(IVec2::ONE), Some(Occupant::Empty));
            assert_eq!(world.position_of(id), None);
            assert!(world.despawn(id).is_none());
        }
    }

    mod movement_tests {
        use super::*;

        #[test]
        fn relocate_crushes_soft_obstacle() {
            let mut world = world(4, 4);
            let id = EntityId::new(1);
            world.place_robot(id, &bare(), IVec2::ZERO).unwrap();
            world
                .grid_mut()
                .set_occupant(IVec2::new(1, 0), Occupant::Obstacle)
                .unwrap();

            world.relocate(id, IVec2::new(1, 0)).unwrap();
            assert_eq!(world.grid().occupant(IVec2::ZERO), Some(Occupant::Empty));
            assert_eq!(world.grid().occupant(IVec2::new(1, 0)), Some(Occupant::Robot(id)));
        }

        #[test]
        fn relocate_into_blocked_fails() {
            let mut world = world(4, 4);
            let id = EntityId::new(1);
            world.place_robot(id, &bare(), IVec2::ZERO).unwrap();
            assert_eq!(
                world.relocate(id, IVec2::new(-1, 0)),
                Err(WorldError::Blocked(IVec2::new(-1, 0)))
            );
            assert_eq!(world.position_of(id), Some(IVec2::ZERO));
        }
    }

    mod field_tests {
        use super::*;

        #[test]
        fn zero_coverage_leaves_field_open() {
            let mut world = world(8, 8);
            world.initialize_field(&FieldConfig::open(8, 8), &mut StepRng::new(0, 0));
            assert!(world.grid().cells().iter().all(|c| c.occupant.is_empty()));
        }

        #[test]
        fn full_hard_coverage_fills_field() {
            let field = FieldConfig {
                obstacle_coverage: 1.0,
                hard_obstacle_coverage: 1.0,
                ..FieldConfig::open(4, 4)
            };
            let mut world = world(4, 4);
            world.initialize_field(&field, &mut ChaCha8Rng::seed_from_u64(1));
            for cell in world.grid().cells() {
                let Occupant::HardObstacle(obstacle) = cell.occupant else {
                    panic!("expected hard obstacle at {:?}", cell.pos);
                };
                assert!((50..=200).contains(&obstacle.hp));
                assert!((1..=3).contains(&obstacle.armor));
            }
        }

        #[test]
        fn coverage_roughly_matches() {
            let field = FieldConfig::default();
            let mut world = World::from_field(&field);
            world.initialize_field(&field, &mut ChaCha8Rng::seed_from_u64(5));
            let occupied = world
                .grid()
                .cells()
                .iter()
                .filter(|c| !c.occupant.is_empty())
                .count();
            // 225 cells at 40% coverage
            assert!((60..=120).contains(&occupied), "occupied = {occupied}");
        }
    }

    mod damage_tests {
        use super::*;

        #[test]
        fn soft_obstacle_cleared() {
            let mut world = world(3, 3);
            world.grid_mut().set_occupant(IVec2::ONE, Occupant::Obstacle).unwrap();
            let hit = world
                .damage_at(IVec2::ONE, Damage::new(1, 0), &mut StepRng::new(0, 0))
                .unwrap();
            assert_eq!(hit.name, "barricade");
            assert_eq!(hit.outcome, DamageOutcome::Destroyed);
            assert!(!world.grid().is_occupied(IVec2::ONE));
        }

        #[test]
        fn hard_obstacle_keeps_remaining_hp() {
            let mut world = world(3, 3);
            world
                .grid_mut()
                .set_occupant(IVec2::ONE, Occupant::HardObstacle(HardObstacle::new(100, 4)))
                .unwrap();
            world.damage_at(IVec2::ONE, Damage::new(30, 1), &mut StepRng::new(0, 0));
            assert_eq!(
                world.grid().occupant(IVec2::ONE),
                Some(Occupant::HardObstacle(HardObstacle::new(70, 4)))
            );
        }

        #[test]
        fn empty_cell_is_no_hit() {
            let mut world = world(3, 3);
            assert!(world
                .damage_at(IVec2::ONE, Damage::new(30, 1), &mut StepRng::new(0, 0))
                .is_none());
        }
    }

    mod vision_tests {
        use super::*;

        #[test]
        fn vision_hides_other_robots_in_map() {
            let mut world = world(5, 5);
            let me = EntityId::new(1);
            let other = EntityId::new(2);
            world.place_robot(me, &bare(), IVec2::new(2, 2)).unwrap();
            world.place_robot(other, &bare(), IVec2::new(3, 2)).unwrap();

            world.refresh_vision(1);

            let robot = world.robot(me).unwrap();
            let vision = robot.vision.as_ref().unwrap();
            assert_eq!(vision.get(IVec2::new(3, 2)), Some(&Glyph::Robot));
            assert_eq!(robot.map.get(IVec2::new(3, 2)), Some(Glyph::Empty));
            assert_eq!(robot.map.get(IVec2::new(2, 2)), Some(Glyph::Robot));
            assert_eq!(robot.map.known_cells(), 9);
        }

        #[test]
        fn disabled_vision_reports_interruption() {
            let mut world = world(5, 5);
            let me = EntityId::new(1);
            world.place_robot(me, &bare(), IVec2::new(2, 2)).unwrap();
            world
                .robot_mut(me)
                .unwrap()
                .status
                .disable_for(Capability::Vision, 2);

            world.refresh_vision(1);

            let robot = world.robot(me).unwrap();
            assert!(robot.vision.is_none());
            assert_eq!(
                robot.feed.live_texts().collect::<Vec<_>>(),
                vec!["Robot vision is interrupted!"]
            );
        }
    }

    #[test]
    fn robots_in_radius_row_major() {
        let mut world = world(7, 7);
        world.place_robot(EntityId::new(9), &bare(), IVec2::new(3, 2)).unwrap();
        world.place_robot(EntityId::new(1), &bare(), IVec2::new(3, 4)).unwrap();
        world.place_robot(EntityId::new(5), &bare(), IVec2::new(0, 0)).unwrap();
        assert_eq!(
            world.robots_in_radius(IVec2::new(3, 3), 1),
            vec![EntityId::new(9), EntityId::new(1)]
        );
    }

    #[test]
    fn presets_spawn_with_full_loadout() {
        let mut world = world(5, 5);
        world
            .place_robot(EntityId::new(1), &presets::standard_robot(), IVec2::ZERO)
            .unwrap();
        assert_eq!(world.robot(EntityId::new(1)).unwrap().loadout.sensors.len(), 5);
    }
}
