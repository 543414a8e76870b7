/// Single-threaded timer queue.
///
/// Stands in for "run this callback after N ms". Time is a `Duration` since
/// the round started and is always supplied by the caller, so the queue never
/// reads a clock itself and tests can drive it on virtual time.
///
/// Ordering: earliest due first; equal due times fire in scheduling order.

use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TimerId {
    due: Duration,
    seq: u64,
}

impl TimerId {
    pub fn due(&self) -> Duration {
        self.due
    }
}

pub struct Scheduler<T> {
    pending: BTreeMap<TimerId, T>,
    next_seq: u64,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Scheduler { pending: BTreeMap::new(), next_seq: 0 }
    }

    pub fn schedule_after(&mut self, now: Duration, delay: Duration, task: T) -> TimerId {
        let id = TimerId { due: now + delay, seq: self.next_seq };
        self.next_seq += 1;
        self.pending.insert(id, task);
        id
    }

    /// Drop a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Remove and return the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, T)> {
        let first = *self.pending.keys().next()?;
        if first.due > now {
            return None;
        }
        self.pending.remove(&first).map(|task| (first, task))
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.pending.keys().next().map(|id| id.due)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Scheduler::new()
    }
}
