//! Priority queue of submitted commands.
//!
//! Commands dequeue in ascending priority. Ties keep submission order: every
//! command is stamped with a sequence number when it is pushed, and the queue
//! orders by `(priority, sequence)`.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::command::Command;
use crate::entity::EntityId;

#[derive(Debug, Clone)]
struct Queued {
    priority: u32,
    sequence: u64,
    command: Command,
}

impl Queued {
    fn key(&self) -> (u32, u64) {
        (self.priority, self.sequence)
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Min-priority queue with FIFO tie-breaking.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    heap: BinaryHeap<Reverse<Queued>>,
    next_sequence: u64,
}

impl CommandQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a command.
    pub fn push(&mut self, command: Command) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Reverse(Queued {
            priority: command.priority(),
            sequence,
            command,
        }));
    }

    /// Remove the command with the lowest `(priority, sequence)`.
    pub fn pop(&mut self) -> Option<Command> {
        self.heap.pop().map(|Reverse(queued)| queued.command)
    }

    /// Number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop every command submitted by `source`. Returns how many were dropped.
    pub fn purge(&mut self, source: EntityId) -> usize {
        let before = self.heap.len();
        self.heap
            .retain(|Reverse(queued)| queued.command.source() != source);
        before - self.heap.len()
    }

    /// Remove every command, in resolution order.
    pub fn drain_ordered(&mut self) -> Vec<Command> {
        let mut out = Vec::with_capacity(self.heap.len());
        while let Some(command) = self.pop() {
            out.push(command);
        }
        out
    }
}
