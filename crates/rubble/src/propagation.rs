//! Signal propagation: emission spread and per-round decay.
//!
//! Both passes touch every cell independently of its neighbours, so they run
//! over the cell buffer with rayon. The result does not depend on iteration
//! order, which keeps the grid deterministic under parallel execution.

use rayon::prelude::*;
use tracing::trace;

use crate::cell::Cell;
use crate::emission::Emission;
use crate::signal::{Signal, SignalConfig};

/// Spread one emission over every cell.
///
/// Each cell gains `emission.falloff_at(cell.pos)`, clamped by `config`.
/// Silent emissions are skipped entirely.
pub fn spread(cells: &mut [Cell], config: &SignalConfig, emission: &Emission) {
    if emission.is_silent() {
        return;
    }

    cells.par_iter_mut().for_each(|cell| {
        let amount = emission.falloff_at(cell.pos);
        if amount > 0 {
            cell.raise(config, amount);
        }
    });
}

/// Decay all signals on every cell for one round.
///
/// # Arguments
/// * `cells` - The grid's cell buffer
/// * `configs` - One configuration per [`Signal`], indexed by [`Signal::index`]
pub fn decay_all(cells: &mut [Cell], configs: &[SignalConfig; Signal::COUNT]) {
    trace!(cells = cells.len(), "decaying signals");

    cells.par_iter_mut().for_each(|cell| {
        for config in configs {
            cell.signals.decay(config);
        }
    });
}
