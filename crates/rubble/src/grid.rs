//! Grid: top-level API for Rubble.
//!
//! The Grid owns the cell buffer and signal configurations and provides the
//! blocking queries, emissions, decay and region snapshots the simulation
//! layers build on.

use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cell::{Cell, Glyph, Occupant};
use crate::emission::Emission;
use crate::query::{CellReading, Region, RegionSnapshot, SignalReading};
use crate::signal::{Signal, SignalConfig};
use crate::{propagation, Extent};

/// Errors raised by grid mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    /// The position is not on the grid.
    #[error("position ({}, {}) is outside the grid", .0.x, .0.y)]
    OutOfBounds(IVec2),
}

/// Configuration for a Grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Grid dimensions
    pub extent: Extent,
    /// Signal configurations (optional overrides)
    pub signal_configs: Vec<SignalConfig>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            extent: Extent::default(),
            signal_configs: Vec::new(),
        }
    }
}

impl GridConfig {
    /// Create a new config with the given dimensions.
    #[must_use]
    pub fn with_size(width: i32, height: i32) -> Self {
        Self {
            extent: Extent::new(width, height),
            ..Default::default()
        }
    }

    /// Override the per-round decay of one signal.
    #[must_use]
    pub fn with_decay(mut self, signal: Signal, decay_per_round: u8) -> Self {
        self.signal_configs
            .retain(|config| config.signal != signal);
        self.signal_configs
            .push(SignalConfig::new(signal).with_decay(decay_per_round));
        self
    }
}

/// The Grid: dense rectangular storage of cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    extent: Extent,
    cells: Vec<Cell>,
    signal_configs: [SignalConfig; Signal::COUNT],
}

impl Grid {
    /// Create a new grid of empty, silent cells.
    #[must_use]
    pub fn new(config: GridConfig) -> Self {
        let extent = config.extent;
        let cells = (0..extent.area())
            .map(|i| Cell::new(extent.position_of(i)))
            .collect();

        // Defaults first, then overrides
        let mut signal_configs: [SignalConfig; Signal::COUNT] =
            std::array::from_fn(|i| SignalConfig::default_for(Signal::all()[i]));
        for override_config in &config.signal_configs {
            signal_configs[override_config.signal.index()] = *override_config;
        }

        Self {
            extent,
            cells,
            signal_configs,
        }
    }

    /// Grid dimensions.
    #[must_use]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Check if a position lies on the grid.
    #[must_use]
    pub fn in_bounds(&self, pos: IVec2) -> bool {
        self.extent.contains(pos)
    }

    /// Configuration of one signal.
    #[must_use]
    pub fn signal_config(&self, signal: Signal) -> &SignalConfig {
        &self.signal_configs[signal.index()]
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Get a cell.
    #[must_use]
    pub fn cell(&self, pos: IVec2) -> Option<&Cell> {
        self.extent.index_of(pos).map(|i| &self.cells[i])
    }

    /// Get a cell mutably.
    pub fn cell_mut(&mut self, pos: IVec2) -> Option<&mut Cell> {
        self.extent.index_of(pos).map(|i| &mut self.cells[i])
    }

    /// Occupant of a cell, or `None` off the grid.
    #[must_use]
    pub fn occupant(&self, pos: IVec2) -> Option<Occupant> {
        self.cell(pos).map(|cell| cell.occupant)
    }

    /// Replace the occupant of a cell.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `pos` is not on the grid.
    pub fn set_occupant(&mut self, pos: IVec2, occupant: Occupant) -> Result<Occupant, GridError> {
        let cell = self.cell_mut(pos).ok_or(GridError::OutOfBounds(pos))?;
        Ok(std::mem::replace(&mut cell.occupant, occupant))
    }

    /// Level of a signal on a cell.
    #[must_use]
    pub fn signal(&self, pos: IVec2, signal: Signal) -> Option<u8> {
        self.cell(pos).map(|cell| cell.signal(signal))
    }

    // ========================================================================
    // Blocking
    // ========================================================================

    /// True if movement into `pos` is impossible.
    ///
    /// Out-of-bounds positions, robots and hard obstacles block; soft
    /// obstacles and open ground do not.
    #[must_use]
    pub fn is_blocked(&self, pos: IVec2) -> bool {
        self.occupant(pos).map_or(true, |o| o.blocks_movement())
    }

    /// True if anything at all stands on `pos`. Out-of-bounds counts as
    /// occupied.
    #[must_use]
    pub fn is_occupied(&self, pos: IVec2) -> bool {
        self.occupant(pos).map_or(true, |o| !o.is_empty())
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Apply an emission to every cell.
    pub fn emit(&mut self, emission: &Emission) {
        let config = self.signal_configs[emission.signal.index()];
        propagation::spread(&mut self.cells, &config, emission);
    }

    /// Apply several emissions.
    pub fn emit_many(&mut self, emissions: &[Emission]) {
        for emission in emissions {
            self.emit(emission);
        }
    }

    /// Fade every signal by its configured per-round decay.
    pub fn decay_signals(&mut self) {
        propagation::decay_all(&mut self.cells, &self.signal_configs);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// In-bounds positions whose Euclidean distance from `center` is at most
    /// `radius`, in row-major order.
    ///
    /// `center` itself may lie off the grid.
    #[must_use]
    pub fn cells_in_radius(&self, center: IVec2, radius: i32) -> Vec<IVec2> {
        let Some(bounding) = Region::square(center, radius).clipped(self.extent) else {
            return Vec::new();
        };
        bounding
            .positions()
            .filter(|pos| (*pos - center).length_squared() <= radius * radius)
            .collect()
    }

    /// Snapshot one signal over a region, clipped to the grid.
    #[must_use]
    pub fn read_signal(&self, region: Region, signal: Signal) -> SignalReading {
        let region = self.clip_or_center(region);
        RegionSnapshot::sample(region, |pos| self.signal(pos, signal).unwrap_or(0))
    }

    /// Snapshot occupant glyphs over a region, clipped to the grid.
    #[must_use]
    pub fn read_cells(&self, region: Region) -> CellReading {
        let region = self.clip_or_center(region);
        RegionSnapshot::sample(region, |pos| {
            self.occupant(pos).map_or(Glyph::Unknown, |o| o.glyph())
        })
    }

    fn clip_or_center(&self, region: Region) -> Region {
        region.clipped(self.extent).unwrap_or(Region {
            min: self.extent.clamp(region.min),
            max: self.extent.clamp(region.min),
        })
    }

    /// Compute a deterministic hash of the current state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        crate::hash::hash_grid(self)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::HardObstacle;
    use crate::EntityId;

    fn grid() -> Grid {
        Grid::new(GridConfig::with_size(10, 10))
    }

    mod blocking_tests {
        use super::*;

        #[test]
        fn out_of_bounds_is_blocked_and_occupied() {
            let grid = grid();
            assert!(grid.is_blocked(IVec2::new(-1, 0)));
            assert!(grid.is_blocked(IVec2::new(10, 3)));
            assert!(grid.is_occupied(IVec2::new(0, 10)));
        }

        #[test]
        fn soft_obstacle_occupies_but_does_not_block() {
            let mut grid = grid();
            let pos = IVec2::new(3, 3);
            grid.set_occupant(pos, Occupant::Obstacle).unwrap();
            assert!(grid.is_occupied(pos));
            assert!(!grid.is_blocked(pos));
        }

        #[test]
        fn robot_and_hard_obstacle_block() {
            let mut grid = grid();
            grid.set_occupant(IVec2::new(1, 1), Occupant::Robot(EntityId::new(4)))
                .unwrap();
            grid.set_occupant(
                IVec2::new(2, 2),
                Occupant::HardObstacle(HardObstacle::new(100, 2)),
            )
            .unwrap();
            assert!(grid.is_blocked(IVec2::new(1, 1)));
            assert!(grid.is_blocked(IVec2::new(2, 2)));
            assert!(!grid.is_blocked(IVec2::new(3, 3)));
        }

        #[test]
        fn set_occupant_out_of_bounds_errors() {
            let mut grid = grid();
            let err = grid
                .set_occupant(IVec2::new(11, 0), Occupant::Obstacle)
                .unwrap_err();
            assert_eq!(err, GridError::OutOfBounds(IVec2::new(11, 0)));
        }

        #[test]
        fn set_occupant_returns_previous() {
            let mut grid = grid();
            let pos = IVec2::new(4, 4);
            grid.set_occupant(pos, Occupant::Obstacle).unwrap();
            let previous = grid.set_occupant(pos, Occupant::Empty).unwrap();
            assert_eq!(previous, Occupant::Obstacle);
        }
    }

    mod signal_tests {
        use super::*;

        #[test]
        fn emission_reaches_whole_grid() {
            let mut grid = grid();
            grid.emit(&Emission::new(IVec2::new(5, 5), Signal::Sound, 6));
            assert_eq!(grid.signal(IVec2::new(5, 5), Signal::Sound), Some(6));
            assert_eq!(grid.signal(IVec2::new(5, 9), Signal::Sound), Some(2));
            assert_eq!(grid.signal(IVec2::new(0, 0), Signal::Sound), Some(0));
            assert_eq!(grid.signal(IVec2::new(5, 5), Signal::Heat), Some(0));
        }

        #[test]
        fn decay_uses_configured_rates() {
            let mut grid = Grid::new(GridConfig::with_size(4, 4).with_decay(Signal::Heat, 3));
            grid.emit_many(&Emission::pair(IVec2::ZERO, 5, 5));
            grid.decay_signals();
            assert_eq!(grid.signal(IVec2::ZERO, Signal::Sound), Some(4));
            assert_eq!(grid.signal(IVec2::ZERO, Signal::Heat), Some(2));
        }

        #[test]
        fn read_signal_clips_to_grid() {
            let mut grid = grid();
            grid.emit(&Emission::new(IVec2::ZERO, Signal::Heat, 3));
            let reading = grid.read_signal(Region::square(IVec2::ZERO, 2), Signal::Heat);
            assert_eq!(reading.len(), 9);
            assert_eq!(reading.get(IVec2::ZERO), Some(&3));
            assert_eq!(reading.get(IVec2::new(2, 2)), Some(&1));
        }
    }

    mod radius_tests {
        use super::*;

        #[test]
        fn radius_includes_boundary() {
            let grid = grid();
            let cells = grid.cells_in_radius(IVec2::new(5, 5), 2);
            assert!(cells.contains(&IVec2::new(7, 5)));
            assert!(cells.contains(&IVec2::new(6, 6)));
            assert!(!cells.contains(&IVec2::new(6, 7)));
            assert!(!cells.contains(&IVec2::new(7, 7)));
            assert_eq!(cells.len(), 13);
        }

        #[test]
        fn radius_off_grid_center() {
            let grid = grid();
            let cells = grid.cells_in_radius(IVec2::new(-2, 0), 2);
            assert_eq!(cells, vec![IVec2::new(0, 0)]);
        }
    }

    #[test]
    fn read_cells_reports_glyphs() {
        let mut grid = grid();
        grid.set_occupant(IVec2::new(1, 0), Occupant::Obstacle).unwrap();
        let reading = grid.read_cells(Region::square(IVec2::ZERO, 1));
        assert_eq!(reading.to_string(), "_ x\n_ _");
    }
}
