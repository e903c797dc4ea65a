//! Items, inventory snapshots and class loadouts.
//!
//! The core never manipulates inventories itself — it saves an opaque
//! snapshot on join and hands it back (via an event, after a tick delay)
//! on leave. Item contents only matter to the host environment.

use serde::{Deserialize, Serialize};

/// A single item stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub name: String,
    pub count: u32,
}

impl ItemInfo {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// A saved copy of a player's pre-match inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot(pub Vec<ItemInfo>);

impl InventorySnapshot {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A named equipment kit players fight with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSpec {
    pub name: String,
    #[serde(default)]
    pub loadout: Vec<ItemInfo>,
}

impl ClassSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            loadout: Vec::new(),
        }
    }
}
