//! Teams.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use skirmish_core::PlayerId;
use tracing::debug;

/// A team's display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamColor {
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
    Aqua,
    Pink,
    White,
    Gray,
    Black,
}

impl std::fmt::Display for TeamColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Purple => "purple",
            Self::Aqua => "aqua",
            Self::Pink => "pink",
            Self::White => "white",
            Self::Gray => "gray",
            Self::Black => "black",
        };
        f.write_str(text)
    }
}

/// A grouping of players inside one arena. Identity is name + color.
///
/// Teams marked *virtual* are synthetic groupings a goal registers for its
/// own bookkeeping (an "infected" role group, a "tank"). They need no
/// spawns, may be empty, and stay out of standard win/score accounting.
#[derive(Debug, Clone)]
pub struct ArenaTeam {
    name: String,
    color: TeamColor,
    virtual_team: bool,
    members: HashSet<PlayerId>,
}

impl ArenaTeam {
    pub fn new(name: impl Into<String>, color: TeamColor) -> Self {
        Self {
            name: name.into(),
            color,
            virtual_team: false,
            members: HashSet::new(),
        }
    }

    /// Creates a goal-internal synthetic team.
    pub fn new_virtual(name: impl Into<String>, color: TeamColor) -> Self {
        Self {
            virtual_team: true,
            ..Self::new(name, color)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> TeamColor {
        self.color
    }

    pub fn is_virtual(&self) -> bool {
        self.virtual_team
    }

    /// The team name prefixed with its color, for broadcast texts.
    pub fn colored_name(&self) -> String {
        format!("[{}]{}", self.color, self.name)
    }

    pub fn members(&self) -> &HashSet<PlayerId> {
        &self.members
    }

    pub fn add(&mut self, player: PlayerId) {
        if self.members.insert(player) {
            debug!(team = %self.name, %player, "player added to team");
        }
    }

    pub fn remove(&mut self, player: PlayerId) -> bool {
        self.members.remove(&player)
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.members.contains(&player)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }
}
