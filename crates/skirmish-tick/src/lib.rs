//! Logical-tick task scheduler for Skirmish.
//!
//! The host environment drives the whole engine from a single cooperative
//! tick loop; delayed work ("announce the end in 100 ticks", "hand the
//! saved inventory back in 60 ticks") is expressed as a payload scheduled
//! against a future tick, never as a blocking wait. One scheduler serves
//! the whole host; payloads say which arena they belong to.
//!
//! # Ordering guarantees
//!
//! - Tasks due on the same tick come back in scheduling order.
//! - A task scheduled while another task is being processed can never run
//!   before the current callback returns: [`TickScheduler::advance`]
//!   collects the due set up front, so new work lands on a later tick at
//!   the earliest. This is what makes the end-sequence sentinel pattern in
//!   the workflow sufficient — reentrant triggers within one tick can race
//!   logically, but never observe a half-applied mutation.
//!
//! # Integration
//!
//! ```
//! use skirmish_tick::TickScheduler;
//!
//! let mut scheduler: TickScheduler<&str> = TickScheduler::new();
//! let handle = scheduler.schedule_in(2, "end-sequence");
//! assert!(scheduler.advance().is_empty());          // tick 1
//! assert_eq!(scheduler.advance(), vec!["end-sequence"]); // tick 2
//! assert!(!scheduler.is_scheduled(handle));
//! ```

use std::collections::BTreeMap;

use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// TaskHandle
// ---------------------------------------------------------------------------

/// Identifies a scheduled task so it can be cancelled later.
///
/// Handles are never reused by a scheduler instance; a handle for a task
/// that has fired or been cancelled is simply dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

impl std::fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TickScheduler
// ---------------------------------------------------------------------------

/// A deadline-ordered queue of payloads keyed by logical tick.
///
/// Generic over the payload so the engine layer can define its own task
/// vocabulary without this crate knowing about arenas.
pub struct TickScheduler<T> {
    /// The current logical tick. Starts at 0; the first `advance` moves to 1.
    now: u64,
    /// Monotonic sequence for handle identity and same-tick FIFO order.
    next_seq: u64,
    /// Pending tasks keyed by (due tick, sequence) so iteration order is
    /// deadline order with scheduling order as the tie-break.
    tasks: BTreeMap<(u64, u64), (TaskHandle, T)>,
}

impl<T> TickScheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_seq: 1,
            tasks: BTreeMap::new(),
        }
    }

    /// The current logical tick.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of pending tasks.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Schedules `payload` to come due `delay` ticks from now.
    ///
    /// A delay of 0 is promoted to 1: work scheduled from within a callback
    /// must not run until the next tick (see the module docs).
    pub fn schedule_in(&mut self, delay: u64, payload: T) -> TaskHandle {
        let due = self.now + delay.max(1);
        let seq = self.next_seq;
        self.next_seq += 1;
        let handle = TaskHandle(seq);
        self.tasks.insert((due, seq), (handle, payload));
        trace!(%handle, due, "task scheduled");
        handle
    }

    /// Cancels a pending task. Returns `true` if it was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let key = self
            .tasks
            .iter()
            .find(|(_, (h, _))| *h == handle)
            .map(|(key, _)| *key);
        match key {
            Some(key) => {
                self.tasks.remove(&key);
                debug!(%handle, "task cancelled");
                true
            }
            None => false,
        }
    }

    /// Whether a handle still refers to a pending task.
    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.values().any(|(h, _)| *h == handle)
    }

    /// Advances one tick and returns every payload that came due, in
    /// scheduling order.
    pub fn advance(&mut self) -> Vec<T> {
        self.now += 1;
        let mut due = Vec::new();
        // BTreeMap iteration is (due, seq) ordered, so splitting at the
        // current tick yields the due set already in the right order.
        let still_pending = self.tasks.split_off(&(self.now + 1, 0));
        let fired = std::mem::replace(&mut self.tasks, still_pending);
        for (_, (handle, payload)) in fired {
            trace!(%handle, tick = self.now, "task due");
            due.push(payload);
        }
        due
    }

    /// Advances `ticks` ticks, collecting everything that comes due.
    pub fn advance_by(&mut self, ticks: u64) -> Vec<T> {
        let mut all = Vec::new();
        for _ in 0..ticks {
            all.extend(self.advance());
        }
        all
    }

    /// Drops every pending task. The tick counter is unaffected.
    pub fn clear(&mut self) {
        if !self.tasks.is_empty() {
            debug!(dropped = self.tasks.len(), "scheduler cleared");
        }
        self.tasks.clear();
    }
}

impl<T> Default for TickScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_delay_is_promoted_to_next_tick() {
        let mut s: TickScheduler<u32> = TickScheduler::new();
        s.schedule_in(0, 7);
        assert_eq!(s.advance(), vec![7]);
    }

    #[test]
    fn test_handles_are_unique() {
        let mut s: TickScheduler<u32> = TickScheduler::new();
        let a = s.schedule_in(1, 1);
        let b = s.schedule_in(1, 2);
        assert_ne!(a, b);
    }
}
