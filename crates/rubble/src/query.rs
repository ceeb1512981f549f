//! Region queries and value snapshots.
//!
//! Sensors and vision never hold references into the grid. They receive a
//! [`RegionSnapshot`]: a row-major copy of the values inside a rectangular
//! region, taken at the moment of the query.

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::cell::Glyph;
use crate::Extent;

/// Inclusive rectangular region of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Top-left corner (inclusive)
    pub min: IVec2,
    /// Bottom-right corner (inclusive)
    pub max: IVec2,
}

impl Region {
    /// Square of side `2 * radius + 1` centered on `center`.
    #[must_use]
    pub fn square(center: IVec2, radius: i32) -> Self {
        let r = IVec2::splat(radius.max(0));
        Self {
            min: center - r,
            max: center + r,
        }
    }

    /// Clip this region to the grid. Returns `None` if nothing remains.
    #[must_use]
    pub fn clipped(&self, extent: Extent) -> Option<Self> {
        let min = self.min.max(IVec2::ZERO);
        let max = self.max.min(IVec2::new(extent.width - 1, extent.height - 1));
        (min.x <= max.x && min.y <= max.y).then_some(Self { min, max })
    }

    /// Check if a position lies inside the region.
    #[must_use]
    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= self.min.x && pos.y >= self.min.y && pos.x <= self.max.x && pos.y <= self.max.y
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.max.x - self.min.x + 1
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.max.y - self.min.y + 1
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = IVec2> {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| IVec2::new(x, y)))
    }
}

/// Row-major copy of per-cell values inside a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSnapshot<T> {
    region: Region,
    values: Vec<T>,
}

/// Snapshot of one signal's levels.
pub type SignalReading = RegionSnapshot<u8>;

/// Snapshot of what stands on each cell.
pub type CellReading = RegionSnapshot<Glyph>;

impl<T> RegionSnapshot<T> {
    /// Build a snapshot by sampling `sample` over every position of `region`.
    pub fn sample(region: Region, mut sample: impl FnMut(IVec2) -> T) -> Self {
        let values = region.positions().map(&mut sample).collect();
        Self { region, values }
    }

    /// Region covered by this snapshot.
    #[must_use]
    pub fn region(&self) -> Region {
        self.region
    }

    /// Value at a grid position, if it is inside the region.
    #[must_use]
    pub fn get(&self, pos: IVec2) -> Option<&T> {
        if !self.region.contains(pos) {
            return None;
        }
        let local = pos - self.region.min;
        usize::try_from(local.y * self.region.width() + local.x)
            .ok()
            .and_then(|i| self.values.get(i))
    }

    /// Iterate `(position, value)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &T)> {
        self.region.positions().zip(self.values.iter())
    }

    /// Number of cells in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the snapshot has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: fmt::Display> fmt::Display for RegionSnapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = usize::try_from(self.region.width()).unwrap_or(1).max(1);
        for (row_index, row) in self.values.chunks(width).enumerate() {
            if row_index > 0 {
                writeln!(f)?;
            }
            let line: Vec<String> = row.iter().map(ToString::to_string).collect();
            write!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
