//! Arena events: the narrow surface between the core and its collaborators.
//!
//! The core never teleports, renders, persists or localizes anything
//! itself — it pushes an event into the owning arena's outbox and the host
//! environment drains the outbox each tick and acts on it. Events are
//! strictly fire-and-forget: nothing in the core consumes a response.

use serde::{Deserialize, Serialize};
use skirmish_core::{InventorySnapshot, Location, PlayerId, StatKind};

use crate::phase::ArenaPhase;

/// Something the host environment should act on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArenaEvent {
    /// Show a message to every arena member.
    Broadcast { message: String },

    /// Show a message to one team.
    TeamMessage { team: String, message: String },

    /// Show a message to one player (user-facing errors land here).
    PlayerMessage { player: PlayerId, message: String },

    /// Move a player to a resolved spawn location.
    Teleport {
        player: PlayerId,
        destination: Location,
    },

    /// Give a player their class equipment.
    EquipClass { player: PlayerId, class: String },

    /// Play the fake-death visual/audio effect at a player.
    DeathEffect { player: PlayerId },

    /// Hand a saved inventory back to its owner.
    RestoreInventory {
        player: PlayerId,
        snapshot: InventorySnapshot,
    },

    /// A statistic counter was incremented (for the persistence layer).
    StatRecorded { player: PlayerId, stat: StatKind },

    /// The arena crossed a lifecycle boundary (the module-hook surface).
    PhaseChanged { from: ArenaPhase, to: ArenaPhase },

    /// A match concluded. Empty winners with `draw` set means a draw.
    MatchEnded { winners: Vec<String>, draw: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_is_internally_tagged() {
        let event = ArenaEvent::Broadcast {
            message: "go!".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "broadcast");
        assert_eq!(json["message"], "go!");
    }

    #[test]
    fn test_phase_changed_round_trip() {
        let event = ArenaEvent::PhaseChanged {
            from: ArenaPhase::Fight,
            to: ArenaPhase::Ending,
        };
        let json = serde_json::to_string(&event).unwrap();
        let decoded: ArenaEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, event);
    }
}
