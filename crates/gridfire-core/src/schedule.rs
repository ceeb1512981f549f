//! Scheduled effects that span several rounds.
//!
//! An event is active over the half-open window `[start, end)`. At the end of
//! each round the coordinator calls [`EventSchedule::fire_due`]; every event
//! due by then fires once and, while its window is still open for the next
//! round, is put back for the next round. An event over `[3, 6)` fires at the
//! end of rounds 3, 4 and 5.
//!
//! Events due in the same round fire in the order they were scheduled.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::entity::EntityId;
use crate::status::StatusEffect;
use crate::world::World;

/// Callback invoked with the world, the event's targets and the round.
pub type EventCallback = Arc<dyn Fn(&mut World, &[EntityId], u64) + Send + Sync>;

/// What a scheduled event does when it fires.
#[derive(Clone)]
pub enum ScheduledEffect {
    /// Apply a status effect to every target that still exists.
    Status(StatusEffect),
    /// Run arbitrary code against the world.
    Callback(EventCallback),
}

impl ScheduledEffect {
    fn fire(&self, world: &mut World, targets: &[EntityId], round: u64) {
        match self {
            ScheduledEffect::Status(effect) => {
                for id in targets {
                    if let Some(robot) = world.robot_mut(*id) {
                        effect.apply(&mut robot.status);
                    }
                }
            }
            ScheduledEffect::Callback(callback) => callback(world, targets, round),
        }
    }
}

impl fmt::Debug for ScheduledEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduledEffect::Status(effect) => f.debug_tuple("Status").field(effect).finish(),
            ScheduledEffect::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// An effect registered for a window of rounds.
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    /// First round the event fires in
    pub start: u64,
    /// First round the event no longer fires in
    pub end: u64,
    /// Entities the effect is applied to
    pub targets: Vec<EntityId>,
    /// The effect
    pub effect: ScheduledEffect,
}

impl ScheduledEvent {
    /// Whether the event fires in `round`.
    #[must_use]
    pub fn is_active(&self, round: u64) -> bool {
        self.start <= round && round < self.end
    }
}

#[derive(Debug)]
struct Pending {
    due: u64,
    sequence: u64,
    event: ScheduledEvent,
}

impl Pending {
    fn key(&self) -> (u64, u64) {
        (self.due, self.sequence)
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Registry of scheduled events ordered by the round they are next due.
#[derive(Debug, Default)]
pub struct EventSchedule {
    heap: BinaryHeap<Reverse<Pending>>,
    next_sequence: u64,
}

impl EventSchedule {
    /// An empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `effect` for rounds `[start, end)`.
    ///
    /// An empty window (`end <= start`) is discarded.
    pub fn schedule(
        &mut self,
        start: u64,
        end: u64,
        targets: Vec<EntityId>,
        effect: ScheduledEffect,
    ) {
        if end <= start {
            trace!(start, end, "discarded empty event window");
            return;
        }
        self.enqueue(
            start,
            ScheduledEvent {
                start,
                end,
                targets,
                effect,
            },
        );
    }

    fn enqueue(&mut self, due: u64, event: ScheduledEvent) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Reverse(Pending {
            due,
            sequence,
            event,
        }));
    }

    /// Fire every event due by `round`. Returns how many fired.
    pub fn fire_due(&mut self, round: u64, world: &mut World) -> usize {
        let mut fired = 0;
        let mut carried = Vec::new();

        while self
            .heap
            .peek()
            .is_some_and(|Reverse(pending)| pending.due <= round)
        {
            let Some(Reverse(pending)) = self.heap.pop() else {
                break;
            };
            let event = pending.event;
            if round >= event.end {
                trace!(round, end = event.end, "dropped expired event");
                continue;
            }

            event.effect.fire(world, &event.targets, round);
            fired += 1;

            if round + 1 < event.end {
                carried.push(event);
            }
        }

        for event in carried {
            trace!(round = round + 1, end = event.end, "re-enqueued event");
            self.enqueue(round + 1, event);
        }
        fired
    }

    /// Round the earliest pending event is due, if any.
    #[must_use]
    pub fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse(pending)| pending.due)
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
