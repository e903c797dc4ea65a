//! The `Goal` trait — the extension point for win-condition engines.
//!
//! A goal decides who wins and when a match is over. The framework calls
//! the hooks at the right time; the goal only supplies the rules. One live
//! goal instance exists per arena, swapped wholesale when the arena's
//! win-condition type changes.
//!
//! Shared behavior is composed, not inherited: goals that track lives use
//! [`LifeMap`], goals built around physical blocks use [`BlockTracker`],
//! and the provided defaults on [`Goal::commit_start`]/[`Goal::commit_end`]
//! delegate to [`GoalContext::standard_spawning`]/
//! [`GoalContext::standard_end`] so a simple goal only implements the
//! handful of methods that make it different.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use skirmish_core::{
    BlockDescriptor, BlockInfo, BlockPos, DeathInfo, ItemInfo, PlayerId, SpawnDescriptor,
    StatKind, EXIT, LOUNGE, SPAWN, SPECTATOR,
};
use skirmish_spawn::{DistributionMode, SpawnRegistry, TeamSpawnRequest};
use skirmish_tick::{TaskHandle, TickScheduler};
use tracing::debug;

use crate::arena::Arena;
use crate::event::ArenaEvent;
use crate::phase::ArenaPhase;
use crate::player::PlayerRegistry;
use crate::queries;
use crate::status::PlayerStatus;
use crate::task::{ArenaTask, TaskKind};

// ---------------------------------------------------------------------------
// Verdicts and errors
// ---------------------------------------------------------------------------

/// A goal's answer to a world-event hook.
///
/// Vetoes are gameplay decisions, not errors — they travel as values and
/// the caller cancels the underlying world action. `Pass` means the goal
/// had no opinion, which callers must treat differently from an explicit
/// veto (another module may still have an opinion).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookVerdict {
    /// No opinion; the action proceeds unless someone else vetoes it.
    Pass,
    /// Cancel the action and tell the player why.
    Veto { reason: String },
}

impl HookVerdict {
    pub fn veto(reason: impl Into<String>) -> Self {
        Self::Veto {
            reason: reason.into(),
        }
    }

    pub fn is_veto(&self) -> bool {
        matches!(self, Self::Veto { .. })
    }
}

/// A goal refused an operation (start, in most cases) with a user-facing
/// message. The arena is left unchanged.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct GoalError(String);

impl GoalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Scores contributed by [`Goal::timed_end`]: entity name (team name, or
/// player name in free-for-all) to score points.
pub type Scores = HashMap<String, f64>;

// ---------------------------------------------------------------------------
// GoalSettings
// ---------------------------------------------------------------------------

/// Goal-specific configuration, stored as a string-keyed value map inside
/// the arena config. Goals seed their defaults when attached; operators
/// override individual keys in the config document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalSettings(BTreeMap<String, serde_json::Value>);

impl GoalSettings {
    /// Inserts `value` only if `key` is not already set.
    pub fn set_default(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.0.entry(key.to_string()).or_insert_with(|| value.into());
    }

    pub fn set(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn u64_or(&self, key: &str, default: u64) -> u64 {
        self.0
            .get(key)
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(default)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.0
            .get(key)
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(default)
    }

    pub fn str_of(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(serde_json::Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// LifeMap
// ---------------------------------------------------------------------------

/// Remaining-lives bookkeeping, keyed by team name or player id.
///
/// An entry being present means that team/player is still eligible to win;
/// removing the last life *is* the elimination signal. Goals check their
/// map in `check_end` after every relevant change.
#[derive(Debug, Clone)]
pub struct LifeMap<K> {
    lives: HashMap<K, u32>,
}

impl<K: Eq + Hash + Clone> LifeMap<K> {
    pub fn new() -> Self {
        Self {
            lives: HashMap::new(),
        }
    }

    pub fn set(&mut self, key: K, lives: u32) {
        self.lives.insert(key, lives);
    }

    pub fn get(&self, key: &K) -> Option<u32> {
        self.lives.get(key).copied()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.lives.contains_key(key)
    }

    /// Takes one life. `Some(0)` means the entry was eliminated (and
    /// removed); `None` means the key was not tracked at all.
    pub fn decrease(&mut self, key: &K) -> Option<u32> {
        let remaining = self.lives.get_mut(key)?;
        if *remaining > 1 {
            *remaining -= 1;
            Some(*remaining)
        } else {
            self.lives.remove(key);
            Some(0)
        }
    }

    /// Removes an entry without treating it as an elimination (leave).
    pub fn remove(&mut self, key: &K) -> Option<u32> {
        self.lives.remove(key)
    }

    pub fn clear(&mut self) {
        self.lives.clear();
    }

    pub fn len(&self) -> usize {
        self.lives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lives.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.lives.keys()
    }
}

impl<K: Eq + Hash + Clone> Default for LifeMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// BlockTracker
// ---------------------------------------------------------------------------

/// Shared helper for goals built around physical blocks (flags, sabotage
/// targets). Keeps the registered descriptors and answers "which of my
/// blocks did the player actually touch" by nearest-block lookup.
#[derive(Debug, Clone, Default)]
pub struct BlockTracker {
    blocks: Vec<BlockDescriptor>,
}

impl BlockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, block: BlockDescriptor) {
        self.blocks.push(block);
    }

    pub fn all(&self) -> &[BlockDescriptor] {
        &self.blocks
    }

    pub fn for_team(&self, team: &str) -> Vec<&BlockDescriptor> {
        self.blocks
            .iter()
            .filter(|block| block.team.as_deref() == Some(team))
            .collect()
    }

    /// The registered block nearest to `from` (squared distance,
    /// declaration order breaks ties).
    pub fn nearest(&self, from: &BlockPos) -> Option<&BlockDescriptor> {
        skirmish_spawn::nearest_block(&self.blocks, from)
    }

    pub fn contains(&self, pos: &BlockPos) -> bool {
        self.blocks.iter().any(|block| &block.pos == pos)
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

// ---------------------------------------------------------------------------
// GoalContext
// ---------------------------------------------------------------------------

/// Everything a mutating goal hook may touch, bundled so provided defaults
/// can run the standard flows.
pub struct GoalContext<'a> {
    pub arena: &'a mut Arena,
    pub players: &'a mut PlayerRegistry,
    pub spawns: &'a SpawnRegistry,
    pub scheduler: &'a mut TickScheduler<ArenaTask>,
}

impl GoalContext<'_> {
    /// Schedules follow-up work against this context's arena.
    pub fn schedule(&mut self, delay: u64, kind: TaskKind) -> TaskHandle {
        self.scheduler
            .schedule_in(delay, ArenaTask::new(self.arena.name(), kind))
    }

    /// The standard match start: distribute every occupied real team over
    /// its spawn candidates and put the members into the fight.
    pub fn standard_spawning(&mut self) -> Result<(), GoalError> {
        let mode = if self.arena.config().randomize_spawns {
            DistributionMode::Shuffled
        } else {
            DistributionMode::RoundRobin
        };
        let requests: Vec<TeamSpawnRequest> = self
            .arena
            .teams()
            .iter()
            .filter(|team| !team.is_virtual() && !team.is_empty())
            .map(|team| {
                TeamSpawnRequest::new(team.name(), team.members().iter().copied().collect())
            })
            .collect();
        if requests.is_empty() {
            return Err(GoalError::new("no occupied teams to spawn"));
        }
        let assignments = self
            .spawns
            .distribute_teams(&requests, mode)
            .map_err(|err| GoalError::new(err.to_string()))?;
        for assignment in &assignments {
            self.place_fighter(assignment.player, &assignment.spawn);
        }
        Ok(())
    }

    /// Equips, teleports and activates one fighter. Class assignment and
    /// the teleport happen before the status flips to `Fight`.
    pub fn place_fighter(&mut self, player: PlayerId, spawn: &SpawnDescriptor) {
        let class = match self.players.get_mut(player) {
            Some(entry) => {
                if let Some(next) = entry.take_next_class() {
                    entry.set_class(Some(next));
                }
                entry.class().map(str::to_string)
            }
            None => return,
        };
        if let Some(class) = class {
            self.arena.push_event(ArenaEvent::EquipClass { player, class });
        }
        self.arena.push_event(ArenaEvent::Teleport {
            player,
            destination: spawn.resolved_location(),
        });
        if let Some(entry) = self.players.get_mut(player) {
            entry.set_status(PlayerStatus::Fight);
        }
        self.arena.mark_played(player);
    }

    /// The standard end commit: announce the surviving real teams as
    /// winners, credit their fighters a win, and schedule the end
    /// sequence.
    ///
    /// Self-guarding: a second call while an end sequence is already in
    /// flight is a silent no-op. Together with the check in the workflow's
    /// `handle_end` this forms the deliberate double-guard against two
    /// independent triggers racing within one tick.
    pub fn standard_end(&mut self, force: bool) {
        if self.arena.end_scheduled() {
            debug!(arena = %self.arena.name(), "end already in flight, ignoring");
            return;
        }

        let winners: Vec<String> = queries::teams_with_fighters(self.arena, self.players)
            .into_iter()
            .filter(|team| !team.is_virtual())
            .map(|team| team.name().to_string())
            .collect();

        let mut winning_members: Vec<PlayerId> = Vec::new();
        for name in &winners {
            if let Some(team) = self.arena.team(name) {
                winning_members.extend(team.members().iter().copied());
            }
        }
        for player in winning_members {
            let fighting = self
                .players
                .get(player)
                .is_some_and(|p| p.status() == PlayerStatus::Fight);
            if !fighting {
                continue;
            }
            if let Some(entry) = self.players.get_mut(player) {
                entry.record(StatKind::Wins);
            }
            self.arena.push_event(ArenaEvent::StatRecorded {
                player,
                stat: StatKind::Wins,
            });
        }

        for name in &winners {
            let text = match self.arena.team(name) {
                Some(team) => format!("Team {} has won the match!", team.colored_name()),
                None => format!("Team {name} has won the match!"),
            };
            self.arena.broadcast(text);
        }
        if winners.is_empty() && force {
            self.arena.broadcast("The match ended in a draw.");
        }

        let delay = self.arena.config().end_delay_ticks;
        let handle = self.schedule(delay, TaskKind::EndSequence);
        self.arena.set_real_end_task(Some(handle));
        if self.arena.phase() == ArenaPhase::Fight {
            // Starting-phase force ends go straight to Reset elsewhere.
            let _ = self.arena.transition(ArenaPhase::Ending);
        }
        self.arena.push_event(ArenaEvent::MatchEnded {
            draw: winners.is_empty(),
            winners,
        });
    }
}

// ---------------------------------------------------------------------------
// The Goal trait
// ---------------------------------------------------------------------------

/// The win-condition contract.
///
/// Pure predicates (`check_end`, `should_respawn_player`, `timed_end`,
/// the spawn/block self-description) take shared references and must not
/// mutate anything; everything that mutates match state receives a
/// [`GoalContext`]. The framework guarantees single-threaded calls — a
/// hook never runs while another hook is on the stack.
pub trait Goal {
    /// The goal's registered name ("TeamLives", "Infect", ...).
    fn name(&self) -> &str;

    /// Free-for-all goals score players instead of teams in the timed-end
    /// resolution and relax the two-team start requirement.
    fn is_free_for_all(&self) -> bool {
        false
    }

    /// Declare `true` to take full control of both start steps — needed
    /// when role assignment must happen before any teleport. The workflow
    /// then skips its own `parse_start` call and the goal's `commit_start`
    /// does everything.
    fn overrides_start(&self) -> bool {
        false
    }

    /// Seed goal-specific defaults into the arena's settings. Called once
    /// when the goal is attached, before validation.
    fn set_defaults(&self, _settings: &mut GoalSettings) {}

    /// One-time hook after the arena's static configuration is loaded.
    /// This is where synthetic/virtual teams get registered.
    fn on_arena_loaded(&mut self, _arena: &mut Arena) {}

    /// A player was admitted mid-setup or joined late: lazily establish
    /// their life-map entry.
    fn initiate(&mut self, _arena: &mut Arena, _player: PlayerId) {}

    /// Compute goal-internal state (life maps, role assignment) before
    /// any player is moved.
    fn parse_start(&mut self, _ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        Ok(())
    }

    /// Perform the actual move into the fight. The default runs the
    /// standard spawning flow.
    fn commit_start(&mut self, ctx: &mut GoalContext<'_>) -> Result<(), GoalError> {
        ctx.standard_spawning()
    }

    /// Pure end predicate over the current life maps / team activity.
    /// Called after every relevant state change; `true` exactly when the
    /// match has a decided or drawn outcome.
    fn check_end(&self, arena: &Arena, players: &PlayerRegistry) -> bool;

    /// Announce the outcome and schedule the end sequence. Must be
    /// idempotent under repeated calls — self-guard against an end
    /// sequence already running. The default runs the standard flow.
    fn commit_end(&mut self, ctx: &mut GoalContext<'_>, force: bool) {
        ctx.standard_end(force);
    }

    /// Take a life from the victim and apply goal-specific death side
    /// effects (role switching, team reassignment). The workflow handles
    /// the canonical `Lost` bookkeeping itself when `does_respawn` is
    /// false.
    fn commit_player_death(
        &mut self,
        ctx: &mut GoalContext<'_>,
        victim: PlayerId,
        does_respawn: bool,
        death: &DeathInfo,
    );

    /// Whether the victim gets to respawn, or goes straight to `Lost`.
    fn should_respawn_player(
        &self,
        _arena: &Arena,
        _players: &PlayerRegistry,
        _victim: PlayerId,
        _death: &DeathInfo,
    ) -> bool {
        true
    }

    /// Remove a leaving player's life-map entry — a leave, not a death.
    fn parse_leave(&mut self, player: PlayerId);

    /// Clear all goal-internal state. Must be safe to call even if the
    /// match never fully started, and idempotent.
    fn reset(&mut self, force: bool);

    /// Contribute this goal's notion of "current score" per entity into
    /// the shared accumulator. Pure — no side effects.
    fn timed_end(&self, arena: &Arena, players: &PlayerRegistry, scores: &mut Scores);

    /// Whether this goal knows the given spawn name. Setup tooling uses
    /// this to accept goal-specific names during configuration.
    fn has_spawn(&self, _arena: &Arena, name: &str) -> bool {
        matches!(name, SPAWN | LOUNGE | SPECTATOR | EXIT)
    }

    /// Names of spawns the configuration still needs before this goal can
    /// run. The default requires a fight spawn per real team plus the
    /// lounge and spectator spawns.
    fn check_for_missing_spawns(&self, arena: &Arena, spawns: &SpawnRegistry) -> Vec<String> {
        let team_names: Vec<&str> = arena
            .teams()
            .iter()
            .filter(|team| !team.is_virtual())
            .map(|team| team.name())
            .collect();
        let mut missing = spawns.missing_team_spawns(&team_names);
        for required in [LOUNGE, SPECTATOR] {
            if spawns.resolve(required, None, None).is_none() {
                missing.push(required.to_string());
            }
        }
        missing
    }

    /// Names of blocks the configuration still needs. Only block-based
    /// goals have any.
    fn check_for_missing_blocks(
        &self,
        _arena: &Arena,
        _blocks: &[BlockDescriptor],
    ) -> Vec<String> {
        Vec::new()
    }

    // -- World-event hook family -------------------------------------------
    //
    // Each hook may veto the underlying world action and/or mutate goal
    // state. The defaults have no opinion.

    fn check_break(
        &mut self,
        _arena: &mut Arena,
        _players: &PlayerRegistry,
        _actor: PlayerId,
        _block: &BlockInfo,
    ) -> HookVerdict {
        HookVerdict::Pass
    }

    fn check_place(
        &mut self,
        _arena: &mut Arena,
        _players: &PlayerRegistry,
        _actor: PlayerId,
        _block: &BlockInfo,
    ) -> HookVerdict {
        HookVerdict::Pass
    }

    fn check_interact(
        &mut self,
        _arena: &mut Arena,
        _players: &PlayerRegistry,
        _actor: PlayerId,
        _block: &BlockInfo,
    ) -> HookVerdict {
        HookVerdict::Pass
    }

    fn check_explode(&mut self, _arena: &mut Arena, _pos: &BlockPos) -> HookVerdict {
        HookVerdict::Pass
    }

    fn check_craft(
        &mut self,
        _arena: &mut Arena,
        _players: &PlayerRegistry,
        _actor: PlayerId,
        _item: &ItemInfo,
    ) -> HookVerdict {
        HookVerdict::Pass
    }

    fn check_drop(
        &mut self,
        _arena: &mut Arena,
        _players: &PlayerRegistry,
        _actor: PlayerId,
        _item: &ItemInfo,
    ) -> HookVerdict {
        HookVerdict::Pass
    }

    fn check_pickup(
        &mut self,
        _arena: &mut Arena,
        _players: &PlayerRegistry,
        _actor: PlayerId,
        _item: &ItemInfo,
    ) -> HookVerdict {
        HookVerdict::Pass
    }

    fn check_inventory(
        &mut self,
        _arena: &mut Arena,
        _players: &PlayerRegistry,
        _actor: PlayerId,
    ) -> HookVerdict {
        HookVerdict::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_life_map_decrease_to_elimination() {
        let mut lives: LifeMap<String> = LifeMap::new();
        lives.set("red".into(), 2);

        assert_eq!(lives.decrease(&"red".into()), Some(1));
        assert_eq!(lives.decrease(&"red".into()), Some(0));
        assert!(!lives.contains(&"red".into()));
        assert_eq!(lives.decrease(&"red".into()), None);
    }

    #[test]
    fn test_life_map_remove_is_not_a_death() {
        let mut lives: LifeMap<PlayerId> = LifeMap::new();
        lives.set(PlayerId(1), 3);
        assert_eq!(lives.remove(&PlayerId(1)), Some(3));
        assert!(lives.is_empty());
    }

    #[test]
    fn test_life_map_clear_is_idempotent() {
        let mut lives: LifeMap<String> = LifeMap::new();
        lives.set("red".into(), 1);
        lives.clear();
        assert!(lives.is_empty());
        lives.clear();
        assert!(lives.is_empty());
    }

    #[test]
    fn test_goal_settings_defaults_do_not_clobber() {
        let mut settings = GoalSettings::default();
        settings.set("lives", 5u64);
        settings.set_default("lives", 3u64);
        settings.set_default("announce", true);

        assert_eq!(settings.u64_or("lives", 0), 5);
        assert!(settings.bool_or("announce", false));
        assert_eq!(settings.u64_or("missing", 7), 7);
    }

    #[test]
    fn test_hook_verdict() {
        assert!(!HookVerdict::Pass.is_veto());
        let veto = HookVerdict::veto("BREAK not allowed");
        assert!(veto.is_veto());
    }

    #[test]
    fn test_block_tracker_nearest_and_team_filter() {
        let mut tracker = BlockTracker::new();
        tracker.register(
            BlockDescriptor::new("flag", BlockPos::new("event", 10, 0, 0)).with_team("red"),
        );
        tracker.register(
            BlockDescriptor::new("flag", BlockPos::new("event", 2, 0, 0)).with_team("blue"),
        );

        let nearest = tracker.nearest(&BlockPos::new("event", 0, 0, 0)).unwrap();
        assert_eq!(nearest.team.as_deref(), Some("blue"));
        assert_eq!(tracker.for_team("red").len(), 1);
        assert!(tracker.contains(&BlockPos::new("event", 10, 0, 0)));
    }
}
