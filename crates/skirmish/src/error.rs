//! Unified error type for the Skirmish engine.

use skirmish_arena::{ArenaError, ConfigError};
use skirmish_spawn::SpawnError;

use crate::host::HostError;

/// Top-level error that wraps all crate-specific errors.
///
/// Callers of the `skirmish` meta-crate deal with this single type; the
/// `#[from]` attributes let `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum SkirmishError {
    /// An arena-level error (locked, full, unknown team, illegal phase).
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// A spawn-level error (duplicate descriptor, no candidates).
    #[error(transparent)]
    Spawn(#[from] SpawnError),

    /// A configuration loading/validation error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A host-level error (unknown or duplicate arena).
    #[error(transparent)]
    Host(#[from] HostError),
}
