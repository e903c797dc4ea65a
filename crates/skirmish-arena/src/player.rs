//! Per-participant state and the process-wide player registry.

use std::collections::HashMap;

use skirmish_core::{BlockPos, InventorySnapshot, PlayerId, StatKind, StatSheet};
use tracing::{debug, warn};

use crate::status::PlayerStatus;

/// Everything the engine tracks about one participant.
///
/// Instances are created lazily on first reference through
/// [`PlayerRegistry::get_or_create`] and never destroyed — leaving an arena
/// only [`reset`](ArenaPlayer::reset)s the instance. Statistics survive the
/// reset; the arena binding, class bindings and status do not.
///
/// Invariant: `arena().is_none()` holds exactly when `status() == Null`.
/// `reset` maintains it; the workflow maintains it on the way in.
#[derive(Debug)]
pub struct ArenaPlayer {
    id: PlayerId,
    name: String,
    status: PlayerStatus,
    arena: Option<String>,
    class: Option<String>,
    next_class: Option<String>,
    saved_inventory: Option<InventorySnapshot>,
    statistics: HashMap<String, StatSheet>,
    /// Region-selection markers used by setup tooling.
    selection: [Option<BlockPos>; 2],
}

impl ArenaPlayer {
    fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: PlayerStatus::Null,
            arena: None,
            class: None,
            next_class: None,
            saved_inventory: None,
            statistics: HashMap::new(),
            selection: [None, None],
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    /// Applies a status transition.
    ///
    /// Illegal edges are logged and applied anyway — the callers are the
    /// workflow and goal callbacks, and a goal doing something unusual
    /// (role switching) must not wedge the match over bookkeeping.
    pub fn set_status(&mut self, status: PlayerStatus) {
        if !self.status.may_transition_to(status) {
            warn!(
                player = %self.id,
                from = %self.status,
                to = %status,
                "unusual status transition"
            );
        }
        debug!(player = %self.id, from = %self.status, to = %status, "status");
        self.status = status;
    }

    /// The arena this player currently belongs to, if any.
    pub fn arena(&self) -> Option<&str> {
        self.arena.as_deref()
    }

    pub(crate) fn set_arena(&mut self, arena: Option<String>) {
        self.arena = arena;
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn set_class(&mut self, class: Option<String>) {
        self.class = class;
    }

    /// The class to switch to on the next (re)spawn.
    pub fn next_class(&self) -> Option<&str> {
        self.next_class.as_deref()
    }

    pub fn set_next_class(&mut self, class: Option<String>) {
        self.next_class = class;
    }

    /// Consumes the pending class binding, if one is set.
    pub fn take_next_class(&mut self) -> Option<String> {
        self.next_class.take()
    }

    pub fn save_inventory(&mut self, snapshot: InventorySnapshot) {
        self.saved_inventory = Some(snapshot);
    }

    pub fn saved_inventory(&self) -> Option<&InventorySnapshot> {
        self.saved_inventory.as_ref()
    }

    /// Takes the saved snapshot for the delayed give-back.
    pub fn take_saved_inventory(&mut self) -> Option<InventorySnapshot> {
        self.saved_inventory.take()
    }

    /// Statistics sheet for one arena, created on first touch.
    pub fn stats_mut(&mut self, arena: &str) -> &mut StatSheet {
        self.statistics.entry(arena.to_string()).or_default()
    }

    pub fn stats_for(&self, arena: &str) -> Option<&StatSheet> {
        self.statistics.get(arena)
    }

    /// Increments a counter in the current arena's sheet.
    /// Returns `false` when the player is in no arena.
    pub fn record(&mut self, kind: StatKind) -> bool {
        let Some(arena) = self.arena.clone() else {
            return false;
        };
        self.stats_mut(&arena).increment(kind);
        true
    }

    /// This player's counter summed over every arena.
    pub fn total_stat(&self, kind: StatKind) -> u64 {
        self.statistics.values().map(|sheet| sheet.get(kind)).sum()
    }

    pub fn set_selection(&mut self, pos: BlockPos, second: bool) {
        self.selection[usize::from(second)] = Some(pos);
    }

    pub fn selection(&self) -> (Option<&BlockPos>, Option<&BlockPos>) {
        (self.selection[0].as_ref(), self.selection[1].as_ref())
    }

    pub fn clear_selection(&mut self) {
        self.selection = [None, None];
    }

    pub fn has_valid_selection(&self) -> bool {
        self.selection[0].is_some() && self.selection[1].is_some()
    }

    /// Clears the arena binding and everything match-scoped.
    ///
    /// Statistics and the saved inventory survive: stats persist across
    /// matches, and the inventory give-back runs on a delayed task that
    /// fires after this reset.
    pub fn reset(&mut self) {
        debug!(player = %self.id, "resetting arena player");
        if self.status != PlayerStatus::Null {
            self.set_status(PlayerStatus::Null);
        }
        self.arena = None;
        self.class = None;
        self.next_class = None;
    }
}

/// Process-wide lookup table mapping stable player identities to the
/// single live [`ArenaPlayer`] instance.
///
/// Entries are created on first reference and kept forever; leaving only
/// resets them. The single-threaded scheduling model is the lock.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<PlayerId, ArenaPlayer>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the player, creating the entry on first reference.
    pub fn get_or_create(&mut self, id: PlayerId, name: &str) -> &mut ArenaPlayer {
        self.players
            .entry(id)
            .or_insert_with(|| ArenaPlayer::new(id, name))
    }

    pub fn get(&self, id: PlayerId) -> Option<&ArenaPlayer> {
        self.players.get(&id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut ArenaPlayer> {
        self.players.get_mut(&id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn name_of(&self, id: PlayerId) -> Option<&str> {
        self.players.get(&id).map(ArenaPlayer::name)
    }

    pub fn by_name(&self, name: &str) -> Option<&ArenaPlayer> {
        self.players.values().find(|p| p.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArenaPlayer> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
