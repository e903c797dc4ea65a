//! Identity types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A stable identifier for a player.
///
/// Newtype over `u64` so a player id can never be confused with any other
/// numeric value in a signature. The id is assigned by the host environment
/// (it corresponds to whatever stable identity the platform provides) and
/// stays valid across matches — the player registry is keyed by it for the
/// lifetime of the process.
///
/// `#[serde(transparent)]` keeps the serialized form a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}
