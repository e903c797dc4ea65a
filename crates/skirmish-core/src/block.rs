//! Block descriptors.

use serde::{Deserialize, Serialize};

use crate::location::BlockPos;

/// A named block position registered with an arena, optionally owned by a
/// team (flag stands, sabotage targets, and so on).
///
/// Like spawn descriptors, these are static configuration consumed at load
/// time; goals that care about physical blocks keep them in a
/// `BlockTracker` and disambiguate interactions by nearest-block lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    pub name: String,
    #[serde(default)]
    pub team: Option<String>,
    pub pos: BlockPos,
}

impl BlockDescriptor {
    pub fn new(name: impl Into<String>, pos: BlockPos) -> Self {
        Self {
            name: name.into(),
            team: None,
            pos,
        }
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }
}

/// A block as reported by a world event: where it is and what it is made of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub pos: BlockPos,
    pub material: String,
}

impl BlockInfo {
    pub fn new(pos: BlockPos, material: impl Into<String>) -> Self {
        Self {
            pos,
            material: material.into(),
        }
    }
}
