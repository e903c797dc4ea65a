//! Spawn descriptors.
//!
//! A spawn descriptor names a teleport target. Its identity is the
//! `(name, team, class)` triple — the location is payload, not identity —
//! and the resolution rules in `skirmish-spawn` walk that triple from most
//! specific to least specific.

use serde::{Deserialize, Serialize};

use crate::location::{Location, Offset};

/// The standard fight spawn name.
pub const SPAWN: &str = "spawn";
/// The waiting-area spawn players are sent to after joining.
pub const LOUNGE: &str = "lounge";
/// Where spectators (and eliminated players) are sent.
pub const SPECTATOR: &str = "spectator";
/// Where players are sent when they leave the arena.
pub const EXIT: &str = "exit";

/// A named teleport target, optionally qualified by team and class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnDescriptor {
    pub name: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    pub location: Location,
    #[serde(default)]
    pub offset: Option<Offset>,
}

impl SpawnDescriptor {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            team: None,
            class: None,
            location,
            offset: None,
        }
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_offset(mut self, offset: Offset) -> Self {
        self.offset = Some(offset);
        self
    }

    /// The identity triple.
    pub fn key(&self) -> (&str, Option<&str>, Option<&str>) {
        (self.name.as_str(), self.team.as_deref(), self.class.as_deref())
    }

    /// The teleport target, with any offset applied.
    pub fn resolved_location(&self) -> Location {
        match &self.offset {
            Some(off) => self.location.offset_by(off),
            None => self.location.clone(),
        }
    }

    /// Renders the flat config node form: `(team_)name(_class)`.
    pub fn node(&self) -> String {
        let mut node = String::new();
        if let Some(team) = &self.team {
            node.push_str(team);
            node.push('_');
        }
        node.push_str(&self.name);
        if let Some(class) = &self.class {
            node.push('_');
            node.push_str(class);
        }
        node
    }

    /// Parses the flat config node form `(team_)name(_class)`.
    ///
    /// One segment is a bare name, two are `team_name`, three are
    /// `team_name_class`. Whether the team/class segments reference
    /// anything real is the registering arena's concern, not ours.
    pub fn parse_node(node: &str, location: Location) -> Result<Self, SpawnNodeError> {
        let parts: Vec<&str> = node.split('_').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(SpawnNodeError::Empty(node.to_string()));
        }
        match parts.as_slice() {
            [name] => Ok(SpawnDescriptor::new(*name, location)),
            [team, name] => Ok(SpawnDescriptor::new(*name, location).with_team(*team)),
            [team, name, class] => Ok(SpawnDescriptor::new(*name, location)
                .with_team(*team)
                .with_class(*class)),
            _ => Err(SpawnNodeError::TooManySegments(node.to_string())),
        }
    }
}

/// Error parsing a flat spawn node.
#[derive(Debug, thiserror::Error)]
pub enum SpawnNodeError {
    /// A segment between underscores was empty.
    #[error("spawn node '{0}' contains an empty segment")]
    Empty(String),

    /// More than three underscore-separated segments.
    #[error("spawn node '{0}' has too many segments (max is team_name_class)")]
    TooManySegments(String),
}
