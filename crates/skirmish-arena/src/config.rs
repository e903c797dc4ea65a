//! Arena configuration.
//!
//! Loaded once per arena at registration time; the engine treats it as
//! read-only afterwards (goals may seed defaults into the `goal` section
//! when they are attached). All delays are logical ticks.

use serde::{Deserialize, Serialize};
use skirmish_core::ClassSpec;

use crate::goal::GoalSettings;
use crate::team::TeamColor;

/// One team declared by the arena configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSpec {
    pub name: String,
    pub color: TeamColor,
}

/// Static configuration for one arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Minimum ready players required to start a match.
    pub min_players: usize,

    /// Maximum participants in the arena.
    pub max_players: usize,

    /// Length of the start countdown.
    pub countdown_ticks: u64,

    /// Delay between the outcome announcement and the actual reset.
    pub end_delay_ticks: u64,

    /// Delay before a respawning player is placed back in the fight.
    pub respawn_delay_ticks: u64,

    /// Delay before a leaving player's saved inventory is handed back.
    /// Applied as a scheduled task, never synchronously, so the give-back
    /// cannot interfere with event processing on the same tick.
    pub inventory_restore_delay_ticks: u64,

    /// Match time limit. `None` disables the timed end.
    pub time_limit_ticks: Option<u64>,

    /// When set, the timed end declares this team the winner outright.
    pub forced_winner: Option<String>,

    /// Whether players may join while a match is starting or running.
    pub join_during_fight: bool,

    /// Shuffle spawn candidates before distributing a team.
    pub randomize_spawns: bool,

    pub teams: Vec<TeamSpec>,

    pub classes: Vec<ClassSpec>,

    /// Goal-specific settings; attached goals seed their defaults here.
    pub goal: GoalSettings,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 16,
            countdown_ticks: 200,
            end_delay_ticks: 100,
            respawn_delay_ticks: 20,
            inventory_restore_delay_ticks: 60,
            time_limit_ticks: None,
            forced_winner: None,
            join_during_fight: false,
            randomize_spawns: false,
            teams: vec![
                TeamSpec {
                    name: "red".into(),
                    color: TeamColor::Red,
                },
                TeamSpec {
                    name: "blue".into(),
                    color: TeamColor::Blue,
                },
            ],
            classes: Vec::new(),
            goal: GoalSettings::default(),
        }
    }
}

impl ArenaConfig {
    /// Parses a JSON configuration document.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        Ok(config)
    }

    /// Structural validation, run once at load time. A failure here marks
    /// the arena locked rather than rejecting the registration outright.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_players == 0 {
            return Err(ConfigError::Invalid("min_players must be at least 1".into()));
        }
        if self.max_players < self.min_players {
            return Err(ConfigError::Invalid(format!(
                "max_players ({}) is below min_players ({})",
                self.max_players, self.min_players
            )));
        }
        if self.teams.is_empty() {
            return Err(ConfigError::Invalid("at least one team is required".into()));
        }
        for (index, team) in self.teams.iter().enumerate() {
            if team.name.is_empty() {
                return Err(ConfigError::Invalid("team names must not be empty".into()));
            }
            let duplicate = self.teams[..index]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(&team.name));
            if duplicate {
                return Err(ConfigError::Invalid(format!(
                    "duplicate team name '{}'",
                    team.name
                )));
            }
        }
        if self.countdown_ticks == 0 || self.end_delay_ticks == 0 {
            return Err(ConfigError::Invalid(
                "countdown_ticks and end_delay_ticks must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn class(&self, name: &str) -> Option<&ClassSpec> {
        self.classes
            .iter()
            .find(|class| class.name.eq_ignore_ascii_case(name))
    }
}

/// Errors raised while loading or validating arena configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document did not parse.
    #[error(transparent)]
    Parse(#[from] serde_json::Error),

    /// The document parsed but describes an unusable arena.
    #[error("invalid arena config: {0}")]
    Invalid(String),
}
