//! Round barrier.
//!
//! The gate between command collection and result consumption. It is closed
//! while a round resolves and reopens once the round is fully applied,
//! recording which round that was. Participant threads block on it with a
//! condition variable until the round they submitted for has completed.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//! use gridfire_core::barrier::RoundBarrier;
//!
//! let barrier = Arc::new(RoundBarrier::new());
//! let waiter = {
//!     let barrier = Arc::clone(&barrier);
//!     thread::spawn(move || barrier.wait_for_round(1))
//! };
//!
//! barrier.close();
//! barrier.open(1);
//! assert_eq!(waiter.join().unwrap(), 1);
//! ```

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug)]
struct Gate {
    open: bool,
    completed_round: u64,
}

impl Gate {
    fn passes(&self, round: u64) -> bool {
        self.open && self.completed_round >= round
    }
}

/// Open/closed gate with the number of the last completed round.
#[derive(Debug)]
pub struct RoundBarrier {
    gate: Mutex<Gate>,
    released: Condvar,
}

impl Default for RoundBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundBarrier {
    /// An open barrier with no completed rounds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gate: Mutex::new(Gate {
                open: true,
                completed_round: 0,
            }),
            released: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Gate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Close the gate. Called before the first command of a round resolves.
    pub fn close(&self) {
        self.lock().open = false;
    }

    /// Reopen the gate after `round` has fully resolved and wake every
    /// waiter.
    pub fn open(&self, round: u64) {
        {
            let mut gate = self.lock();
            gate.open = true;
            gate.completed_round = gate.completed_round.max(round);
        }
        self.released.notify_all();
    }

    /// Whether the gate is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    /// Last round that fully resolved, 0 before the first.
    #[must_use]
    pub fn completed_round(&self) -> u64 {
        self.lock().completed_round
    }

    /// Block until `round` has completed and the gate is open. Returns the
    /// last completed round, which may be later than `round`.
    pub fn wait_for_round(&self, round: u64) -> u64 {
        let gate = self
            .released
            .wait_while(self.lock(), |gate| !gate.passes(round))
            .unwrap_or_else(PoisonError::into_inner);
        gate.completed_round
    }

    /// Like [`RoundBarrier::wait_for_round`], giving up after `timeout`.
    ///
    /// Returns `true` if the round completed in time.
    pub fn wait_for_round_timeout(&self, round: u64, timeout: Duration) -> bool {
        let (gate, _) = self
            .released
            .wait_timeout_while(self.lock(), timeout, |gate| !gate.passes(round))
            .unwrap_or_else(PoisonError::into_inner);
        gate.passes(round)
    }
}
