//! Scheduled-task payloads.
//!
//! Delayed work is an explicit payload naming the arena it belongs to and
//! what to do when it comes due; the host dispatches due payloads back
//! into the workflow. Cancelling a task goes through the scheduler handle
//! the arena kept when it scheduled the work.

use skirmish_core::PlayerId;

/// What a due task should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// The start countdown elapsed — commit the match start.
    StartMatch,
    /// The post-announcement delay elapsed — reset the arena.
    EndSequence,
    /// The match time limit elapsed — run the tie-break resolution.
    TimedEnd,
    /// Put a dead player back into the fight.
    Respawn(PlayerId),
    /// Hand a saved inventory back to its owner.
    RestoreInventory(PlayerId),
}

/// A scheduled unit of work, tagged with its owning arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaTask {
    pub arena: String,
    pub kind: TaskKind,
}

impl ArenaTask {
    pub fn new(arena: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            arena: arena.into(),
            kind,
        }
    }
}
