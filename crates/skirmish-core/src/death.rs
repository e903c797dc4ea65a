//! Death information passed through the death-handling flow.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;

/// Why a player died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageCause {
    Attack,
    Projectile,
    Explosion,
    Fall,
    Fire,
    Drowning,
    Void,
    Unknown,
}

impl fmt::Display for DamageCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Attack => "attack",
            Self::Projectile => "projectile",
            Self::Explosion => "explosion",
            Self::Fall => "fall",
            Self::Fire => "fire",
            Self::Drowning => "drowning",
            Self::Void => "void",
            Self::Unknown => "unknown",
        };
        f.write_str(text)
    }
}

/// Context for a single death: the cause and, when one exists, the player
/// credited with the kill. The world-event layer resolves indirect kills
/// (projectiles, pets) to the responsible player before handing this over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathInfo {
    pub cause: DamageCause,
    pub killer: Option<PlayerId>,
}

impl DeathInfo {
    /// A death at another player's hands.
    pub fn by_player(killer: PlayerId, cause: DamageCause) -> Self {
        Self {
            cause,
            killer: Some(killer),
        }
    }

    /// A death with no player responsible.
    pub fn environmental(cause: DamageCause) -> Self {
        Self {
            cause,
            killer: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_player_records_killer() {
        let death = DeathInfo::by_player(PlayerId(3), DamageCause::Projectile);
        assert_eq!(death.killer, Some(PlayerId(3)));
    }

    #[test]
    fn test_environmental_has_no_killer() {
        let death = DeathInfo::environmental(DamageCause::Fall);
        assert_eq!(death.killer, None);
    }

    #[test]
    fn test_cause_display() {
        assert_eq!(DamageCause::Explosion.to_string(), "explosion");
    }
}
