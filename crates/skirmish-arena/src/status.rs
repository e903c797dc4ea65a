//! The per-player status state machine.

use serde::{Deserialize, Serialize};

/// Where a player currently stands in a match.
///
/// ```text
/// Null → Warm → Lounge → Ready → Fight → Dead → (Fight | Lost)
///                                   └───→ Lost / Watch
/// ```
///
/// - **Null**: not in any arena. Holds exactly when the player's arena
///   reference is empty.
/// - **Warm**: joined, not yet placed in the waiting area.
/// - **Lounge**: in the waiting area.
/// - **Ready**: flagged ready in the waiting area.
/// - **Fight**: actively playing. Only entered after a successful class
///   assignment and a teleport to a resolved spawn.
/// - **Dead**: eliminated but may still respawn, depending on the goal.
/// - **Watch**: spectating.
/// - **Lost**: out of this match for good. Entering it records the loss
///   (and kill/death bookkeeping) before the roster removal.
///
/// Transitions are applied by the workflow orchestrator and goal
/// callbacks, never by the player object itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Null,
    Warm,
    Lounge,
    Ready,
    Fight,
    Dead,
    Watch,
    Lost,
}

impl PlayerStatus {
    /// Returns `true` if moving to `target` is a legal edge.
    ///
    /// Every state may fall back to `Null` (leaving is always possible).
    pub fn may_transition_to(self, target: Self) -> bool {
        if target == Self::Null {
            return self != Self::Null;
        }
        matches!(
            (self, target),
            (Self::Null, Self::Warm)
                | (Self::Null, Self::Watch)
                | (Self::Warm, Self::Lounge)
                | (Self::Lounge, Self::Ready)
                | (Self::Lounge, Self::Fight)
                | (Self::Ready, Self::Lounge)
                | (Self::Ready, Self::Fight)
                | (Self::Fight, Self::Dead)
                | (Self::Fight, Self::Lost)
                | (Self::Fight, Self::Watch)
                | (Self::Dead, Self::Fight)
                | (Self::Dead, Self::Lost)
                | (Self::Lost, Self::Watch)
        )
    }

    /// Waiting-area states (joined but not fighting yet).
    pub fn is_in_lobby(self) -> bool {
        matches!(self, Self::Warm | Self::Lounge | Self::Ready)
    }

    /// Actively playing.
    pub fn is_fighting(self) -> bool {
        self == Self::Fight
    }
}

impl std::fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Null => "null",
            Self::Warm => "warm",
            Self::Lounge => "lounge",
            Self::Ready => "ready",
            Self::Fight => "fight",
            Self::Dead => "dead",
            Self::Watch => "watch",
            Self::Lost => "lost",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path_is_legal() {
        assert!(PlayerStatus::Null.may_transition_to(PlayerStatus::Warm));
        assert!(PlayerStatus::Warm.may_transition_to(PlayerStatus::Lounge));
        assert!(PlayerStatus::Lounge.may_transition_to(PlayerStatus::Ready));
        assert!(PlayerStatus::Ready.may_transition_to(PlayerStatus::Fight));
    }

    #[test]
    fn test_death_paths() {
        assert!(PlayerStatus::Fight.may_transition_to(PlayerStatus::Dead));
        assert!(PlayerStatus::Dead.may_transition_to(PlayerStatus::Fight));
        assert!(PlayerStatus::Dead.may_transition_to(PlayerStatus::Lost));
        assert!(PlayerStatus::Fight.may_transition_to(PlayerStatus::Lost));
    }

    #[test]
    fn test_everyone_can_leave_except_null() {
        for status in [
            PlayerStatus::Warm,
            PlayerStatus::Lounge,
            PlayerStatus::Ready,
            PlayerStatus::Fight,
            PlayerStatus::Dead,
            PlayerStatus::Watch,
            PlayerStatus::Lost,
        ] {
            assert!(status.may_transition_to(PlayerStatus::Null));
        }
        assert!(!PlayerStatus::Null.may_transition_to(PlayerStatus::Null));
    }

    #[test]
    fn test_shortcuts_are_illegal() {
        assert!(!PlayerStatus::Null.may_transition_to(PlayerStatus::Fight));
        assert!(!PlayerStatus::Warm.may_transition_to(PlayerStatus::Fight));
        assert!(!PlayerStatus::Lost.may_transition_to(PlayerStatus::Fight));
        assert!(!PlayerStatus::Watch.may_transition_to(PlayerStatus::Fight));
    }

    #[test]
    fn test_lobby_predicate() {
        assert!(PlayerStatus::Lounge.is_in_lobby());
        assert!(PlayerStatus::Ready.is_in_lobby());
        assert!(!PlayerStatus::Fight.is_in_lobby());
        assert!(!PlayerStatus::Null.is_in_lobby());
    }
}
