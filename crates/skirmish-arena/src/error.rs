//! Error types for the arena layer.

use skirmish_core::PlayerId;

use crate::goal::GoalError;
use crate::phase::ArenaPhase;

/// Errors raised by arena operations.
///
/// These are the "invalid configuration state" class of problems: they
/// carry a user-facing message for the triggering sender and leave the
/// arena unchanged. Re-entrancy conflicts are *not* errors — those paths
/// return `false` and stay silent by design.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// The arena failed to load and cannot host a match.
    #[error("arena '{0}' is locked")]
    Locked(String),

    /// The arena's current phase does not accept this operation.
    #[error("arena '{arena}' does not accept joins while {phase}")]
    NotJoinable { arena: String, phase: ArenaPhase },

    /// No player slots left.
    #[error("arena '{0}' is full")]
    Full(String),

    /// The player is already in an arena (possibly this one).
    #[error("player {player} is already in arena '{arena}'")]
    AlreadyInArena { player: PlayerId, arena: String },

    /// The player is not in this arena.
    #[error("player {player} is not in arena '{arena}'")]
    NotInArena { player: PlayerId, arena: String },

    /// The requested team is not declared (or is goal-internal).
    #[error("unknown team '{0}'")]
    UnknownTeam(String),

    /// The requested class is not declared.
    #[error("unknown class '{0}'")]
    UnknownClass(String),

    /// The requested phase edge is not part of the lifecycle FSM.
    #[error("illegal phase transition {from} -> {to}")]
    IllegalTransition { from: ArenaPhase, to: ArenaPhase },

    /// The active goal refused the operation.
    #[error(transparent)]
    Goal(#[from] GoalError),
}
