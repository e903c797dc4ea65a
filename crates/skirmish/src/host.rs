//! The arena host: process-wide registry and tick pump.
//!
//! One [`ArenaHost`] owns every arena (singleton-per-name), the shared
//! player registry and the scheduler. External collaborators talk to the
//! engine exclusively through it: commands call the join/leave/ready
//! surface, world-event listeners call the `check_*` hooks and
//! [`ArenaHost::player_death`], and the embedding environment calls
//! [`ArenaHost::tick`] once per logical tick and drains each arena's
//! events afterwards.

use std::collections::HashMap;

use skirmish_arena::{
    Arena, ArenaConfig, ArenaEvent, ArenaTask, Goal, HookVerdict, PlayerRegistry, TaskKind,
};
use skirmish_core::{
    BlockDescriptor, BlockInfo, BlockPos, DeathInfo, InventorySnapshot, ItemInfo, PlayerId,
    SpawnDescriptor,
};
use skirmish_spawn::SpawnRegistry;
use skirmish_tick::TickScheduler;
use tracing::{error, info, warn};

use crate::SkirmishError;
use crate::workflow::Workflow;

/// Host-level errors: problems with the registry itself.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// An arena with this name is already registered.
    #[error("arena '{0}' is already registered")]
    DuplicateArena(String),

    /// No arena with this name is registered.
    #[error("arena '{0}' is not registered")]
    UnknownArena(String),
}

/// One registered arena and its static descriptor stores.
struct ArenaSlot {
    arena: Arena,
    spawns: SpawnRegistry,
    blocks: Vec<BlockDescriptor>,
}

/// The process-wide engine front door.
#[derive(Default)]
pub struct ArenaHost {
    arenas: HashMap<String, ArenaSlot>,
    players: PlayerRegistry,
    scheduler: TickScheduler<ArenaTask>,
}

impl ArenaHost {
    pub fn new() -> Self {
        Self {
            arenas: HashMap::new(),
            players: PlayerRegistry::new(),
            scheduler: TickScheduler::new(),
        }
    }

    // -- Loading ---------------------------------------------------------------

    /// Registers an arena with its goal and spawn descriptors.
    ///
    /// Structural validation runs here once. A validation failure does not
    /// reject the registration — the arena is registered *locked*, visible
    /// for inspection and repair but unable to host a match.
    pub fn load_arena(
        &mut self,
        name: &str,
        config: ArenaConfig,
        goal: Box<dyn Goal>,
        spawns: Vec<SpawnDescriptor>,
    ) -> Result<(), SkirmishError> {
        if self.arenas.contains_key(name) {
            return Err(HostError::DuplicateArena(name.to_string()).into());
        }

        let mut registry = SpawnRegistry::new();
        for spawn in spawns {
            registry.register(spawn)?;
        }

        let mut arena = Arena::new(name, config);
        arena.set_goal(goal);
        if let Some(mut goal) = arena.take_goal() {
            goal.on_arena_loaded(&mut arena);
            arena.restore_goal(goal);
        }

        let mut problems: Vec<String> = Vec::new();
        if let Err(err) = arena.config().validate() {
            problems.push(err.to_string());
        }
        if let Some(goal) = arena.goal_ref() {
            for missing in goal.check_for_missing_spawns(&arena, &registry) {
                problems.push(format!("missing spawn '{missing}'"));
            }
        }
        if !problems.is_empty() {
            error!(arena = %name, ?problems, "arena failed to load, registering locked");
            arena.set_locked(true);
        } else {
            info!(arena = %name, goal = ?arena.goal_name(), "arena loaded");
        }

        self.arenas.insert(
            name.to_string(),
            ArenaSlot {
                arena,
                spawns: registry,
                blocks: Vec::new(),
            },
        );
        Ok(())
    }

    /// Registers an arena from a JSON configuration document.
    pub fn load_arena_from_json(
        &mut self,
        name: &str,
        json: &str,
        goal: Box<dyn Goal>,
        spawns: Vec<SpawnDescriptor>,
    ) -> Result<(), SkirmishError> {
        let config = ArenaConfig::from_json(json)?;
        self.load_arena(name, config, goal, spawns)
    }

    /// Removes an arena, cancelling any work it still had scheduled.
    pub fn unregister_arena(&mut self, name: &str) -> bool {
        match self.arenas.remove(name) {
            Some(mut slot) => {
                for handle in slot.arena.take_task_handles() {
                    self.scheduler.cancel(handle);
                }
                info!(arena = %name, "arena unregistered");
                true
            }
            None => false,
        }
    }

    // -- Accessors ---------------------------------------------------------------

    pub fn arena(&self, name: &str) -> Option<&Arena> {
        self.arenas.get(name).map(|slot| &slot.arena)
    }

    pub fn arena_mut(&mut self, name: &str) -> Option<&mut Arena> {
        self.arenas.get_mut(name).map(|slot| &mut slot.arena)
    }

    pub fn arena_names(&self) -> Vec<&str> {
        self.arenas.keys().map(String::as_str).collect()
    }

    pub fn arena_count(&self) -> usize {
        self.arenas.len()
    }

    pub fn spawns(&self, arena: &str) -> Option<&SpawnRegistry> {
        self.arenas.get(arena).map(|slot| &slot.spawns)
    }

    pub fn spawns_mut(&mut self, arena: &str) -> Option<&mut SpawnRegistry> {
        self.arenas.get_mut(arena).map(|slot| &mut slot.spawns)
    }

    pub fn blocks(&self, arena: &str) -> Option<&[BlockDescriptor]> {
        self.arenas.get(arena).map(|slot| slot.blocks.as_slice())
    }

    /// Registers a block descriptor with an arena (setup tooling).
    pub fn register_block(
        &mut self,
        arena: &str,
        block: BlockDescriptor,
    ) -> Result<(), SkirmishError> {
        let slot = self
            .arenas
            .get_mut(arena)
            .ok_or_else(|| HostError::UnknownArena(arena.to_string()))?;
        slot.blocks.push(block);
        Ok(())
    }

    /// Setup-tooling validation: everything this arena's goal still needs.
    pub fn check_setup(&self, arena: &str) -> Option<Vec<String>> {
        let slot = self.arenas.get(arena)?;
        let goal = slot.arena.goal_ref()?;
        let mut missing = goal.check_for_missing_spawns(&slot.arena, &slot.spawns);
        missing.extend(goal.check_for_missing_blocks(&slot.arena, &slot.blocks));
        Some(missing)
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut PlayerRegistry {
        &mut self.players
    }

    /// The arena a player currently belongs to, if any.
    pub fn arena_of_player(&self, id: PlayerId) -> Option<&str> {
        self.players.get(id)?.arena()
    }

    /// The current logical tick.
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    // -- Workflow surface ---------------------------------------------------------

    /// Runs an orchestration closure against one arena.
    pub fn with_workflow<R>(
        &mut self,
        arena: &str,
        f: impl FnOnce(&mut Workflow<'_>) -> R,
    ) -> Option<R> {
        let slot = self.arenas.get_mut(arena)?;
        let mut workflow = Workflow {
            arena: &mut slot.arena,
            players: &mut self.players,
            spawns: &slot.spawns,
            scheduler: &mut self.scheduler,
        };
        Some(f(&mut workflow))
    }

    /// Admits a player to an arena. Returns the team joined.
    pub fn join(
        &mut self,
        arena: &str,
        id: PlayerId,
        name: &str,
        team: Option<&str>,
        inventory: InventorySnapshot,
    ) -> Result<String, SkirmishError> {
        self.with_workflow(arena, |wf| wf.handle_join(id, name, team, inventory))
            .ok_or_else(|| HostError::UnknownArena(arena.to_string()))?
            .map_err(Into::into)
    }

    /// Admits a spectator.
    pub fn spectate(
        &mut self,
        arena: &str,
        id: PlayerId,
        name: &str,
    ) -> Result<(), SkirmishError> {
        self.with_workflow(arena, |wf| wf.handle_spectate(id, name))
            .ok_or_else(|| HostError::UnknownArena(arena.to_string()))?
            .map_err(Into::into)
    }

    /// Removes a player from the arena they are in.
    pub fn leave(&mut self, arena: &str, id: PlayerId) -> Result<(), SkirmishError> {
        self.with_workflow(arena, |wf| wf.handle_leave(id))
            .ok_or_else(|| HostError::UnknownArena(arena.to_string()))?
            .map_err(Into::into)
    }

    /// Flags a player ready. Returns `true` when this triggered the start
    /// countdown.
    pub fn ready(&mut self, arena: &str, id: PlayerId) -> Result<bool, SkirmishError> {
        self.with_workflow(arena, |wf| wf.handle_ready(id))
            .ok_or_else(|| HostError::UnknownArena(arena.to_string()))?
            .map_err(Into::into)
    }

    /// Reports a player death from the world-event layer.
    pub fn player_death(&mut self, arena: &str, victim: PlayerId, death: DeathInfo) {
        if self
            .with_workflow(arena, |wf| wf.handle_player_death(victim, death))
            .is_none()
        {
            warn!(arena = %arena, "death reported for unknown arena");
        }
    }

    /// Requests a match end. Returns `false` when the request was absorbed
    /// (already ending, nothing running, or the goal says the match goes on).
    pub fn request_end(&mut self, arena: &str, force: bool) -> bool {
        self.with_workflow(arena, |wf| wf.check_and_commit(force))
            .unwrap_or(false)
    }

    /// Cancels everything and returns the arena to Idle.
    pub fn force_reset(&mut self, arena: &str) -> bool {
        self.with_workflow(arena, |wf| wf.force_reset()).is_some()
    }

    /// Advances one logical tick: due tasks run, in scheduling order.
    pub fn tick(&mut self) {
        let due = self.scheduler.advance();
        for task in due {
            self.dispatch(task);
        }
    }

    /// Advances `ticks` logical ticks.
    pub fn tick_by(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    fn dispatch(&mut self, task: ArenaTask) {
        let dispatched = self.with_workflow(&task.arena, |wf| match task.kind {
            TaskKind::StartMatch => wf.start_match(),
            TaskKind::EndSequence => wf.finish_match(false),
            TaskKind::TimedEnd => wf.handle_timed_end(),
            TaskKind::Respawn(player) => wf.respawn(player),
            TaskKind::RestoreInventory(player) => wf.restore_inventory(player),
        });
        if dispatched.is_none() {
            warn!(arena = %task.arena, "task for unregistered arena dropped");
        }
    }

    /// Hands the queued events of one arena to the caller.
    pub fn drain_events(&mut self, arena: &str) -> Vec<ArenaEvent> {
        self.arena_mut(arena)
            .map(Arena::drain_events)
            .unwrap_or_default()
    }

    // -- World-event hooks ----------------------------------------------------
    //
    // Each returns the goal's verdict; `Pass` means the goal had no
    // opinion, which is different from an explicit veto.

    fn with_goal_hook(
        &mut self,
        arena: &str,
        f: impl FnOnce(&mut dyn Goal, &mut Arena, &PlayerRegistry) -> HookVerdict,
    ) -> HookVerdict {
        let Some(slot) = self.arenas.get_mut(arena) else {
            return HookVerdict::Pass;
        };
        let Some(mut goal) = slot.arena.take_goal() else {
            return HookVerdict::Pass;
        };
        let verdict = f(goal.as_mut(), &mut slot.arena, &self.players);
        slot.arena.restore_goal(goal);
        verdict
    }

    pub fn check_block_break(
        &mut self,
        arena: &str,
        actor: PlayerId,
        block: &BlockInfo,
    ) -> HookVerdict {
        self.with_goal_hook(arena, |goal, arena, players| {
            goal.check_break(arena, players, actor, block)
        })
    }

    pub fn check_block_place(
        &mut self,
        arena: &str,
        actor: PlayerId,
        block: &BlockInfo,
    ) -> HookVerdict {
        self.with_goal_hook(arena, |goal, arena, players| {
            goal.check_place(arena, players, actor, block)
        })
    }

    pub fn check_interact(
        &mut self,
        arena: &str,
        actor: PlayerId,
        block: &BlockInfo,
    ) -> HookVerdict {
        self.with_goal_hook(arena, |goal, arena, players| {
            goal.check_interact(arena, players, actor, block)
        })
    }

    pub fn check_explode(&mut self, arena: &str, pos: &BlockPos) -> HookVerdict {
        self.with_goal_hook(arena, |goal, arena, _| goal.check_explode(arena, pos))
    }

    pub fn check_craft(
        &mut self,
        arena: &str,
        actor: PlayerId,
        item: &ItemInfo,
    ) -> HookVerdict {
        self.with_goal_hook(arena, |goal, arena, players| {
            goal.check_craft(arena, players, actor, item)
        })
    }

    pub fn check_drop(
        &mut self,
        arena: &str,
        actor: PlayerId,
        item: &ItemInfo,
    ) -> HookVerdict {
        self.with_goal_hook(arena, |goal, arena, players| {
            goal.check_drop(arena, players, actor, item)
        })
    }

    pub fn check_pickup(
        &mut self,
        arena: &str,
        actor: PlayerId,
        item: &ItemInfo,
    ) -> HookVerdict {
        self.with_goal_hook(arena, |goal, arena, players| {
            goal.check_pickup(arena, players, actor, item)
        })
    }

    pub fn check_inventory(&mut self, arena: &str, actor: PlayerId) -> HookVerdict {
        self.with_goal_hook(arena, |goal, arena, players| {
            goal.check_inventory(arena, players, actor)
        })
    }
}
