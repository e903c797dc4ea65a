//! The arena lifecycle state machine.

use serde::{Deserialize, Serialize};

/// The lifecycle phase of an arena.
///
/// The phase is explicit state, not something inferred from timer handles,
/// and only the workflow orchestrator moves it:
///
/// ```text
/// Idle → Starting → Fight → Ending → Reset → Idle
///           └──────────┴───→ Reset   (countdown aborted / force reset)
/// ```
///
/// - **Idle**: no fight, no timers. Players may join and ready up.
/// - **Starting**: the start countdown is running. The roster is frozen
///   unless late joins are configured.
/// - **Fight**: the match is live — "fight in progress" is exactly this
///   phase.
/// - **Ending**: the outcome is decided and announced; the end-sequence
///   timer is counting down the post-announcement delay.
/// - **Reset**: rosters and goal state are being cleared. Transient — the
///   arena returns to Idle within the same callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArenaPhase {
    Idle,
    Starting,
    Fight,
    Ending,
    Reset,
}

impl ArenaPhase {
    /// Returns `true` if transitioning to `target` is a legal edge.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Idle, Self::Starting)
                | (Self::Starting, Self::Fight)
                | (Self::Starting, Self::Reset)
                | (Self::Fight, Self::Ending)
                | (Self::Fight, Self::Reset)
                | (Self::Ending, Self::Reset)
                | (Self::Reset, Self::Idle)
        )
    }

    /// Returns `true` if the arena accepts ordinary joins in this phase.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns `true` while a match is starting or running.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Starting | Self::Fight)
    }
}

impl std::fmt::Display for ArenaPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Fight => "fight",
            Self::Ending => "ending",
            Self::Reset => "reset",
        };
        f.write_str(text)
    }
}
