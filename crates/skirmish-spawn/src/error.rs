//! Error types for the spawn layer.

/// Errors raised by spawn registration and distribution.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    /// A descriptor with the same (name, team, class) triple is already
    /// registered.
    #[error("spawn '{0}' is already registered")]
    Duplicate(String),

    /// A team had no usable spawn candidates during distribution.
    #[error("no spawns registered for team '{0}'")]
    NoSpawns(String),
}
