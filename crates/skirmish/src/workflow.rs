//! The cross-cutting workflow orchestrator.
//!
//! Every external trigger — a command, a world event, an expired timer —
//! lands here, and this is the only place that sequences the join,
//! spectate, death, end and reset flows. The orchestrator is stateless: a
//! [`Workflow`] is built per call over borrowed engine state and owns no
//! fields of its own beyond those borrows.
//!
//! The single-flight end guard lives in [`Workflow::handle_end`]: the
//! arena's end sentinel is checked there *and* again inside the goal's
//! `commit_end` — two independent triggers (a kill and a simultaneous
//! disconnect) can both reach `handle_end` in one tick, and only the
//! first may schedule the end sequence.

use skirmish_arena::{
    Arena, ArenaError, ArenaEvent, ArenaPhase, ArenaTask, Goal, GoalContext, GoalError,
    PlayerRegistry, PlayerStatus, TaskKind,
};
use skirmish_core::{
    DeathInfo, EXIT, InventorySnapshot, LOUNGE, PlayerId, SPAWN, SPECTATOR, StatKind,
};
use skirmish_spawn::SpawnRegistry;
use skirmish_tick::{TaskHandle, TickScheduler};
use tracing::{debug, info, trace, warn};

/// One orchestration call's view of the engine: the arena being acted on,
/// the process-wide player registry, the arena's spawns and the shared
/// scheduler.
pub struct Workflow<'a> {
    pub arena: &'a mut Arena,
    pub players: &'a mut PlayerRegistry,
    pub spawns: &'a SpawnRegistry,
    pub scheduler: &'a mut TickScheduler<ArenaTask>,
}

impl Workflow<'_> {
    // -- Plumbing -----------------------------------------------------------

    fn schedule(&mut self, delay: u64, kind: TaskKind) -> TaskHandle {
        self.scheduler
            .schedule_in(delay, ArenaTask::new(self.arena.name(), kind))
    }

    /// Runs a mutating goal hook with the goal detached from the arena so
    /// both can be borrowed. Returns `None` when no goal is attached.
    fn with_goal<R>(
        &mut self,
        f: impl FnOnce(&mut dyn Goal, &mut GoalContext<'_>) -> R,
    ) -> Option<R> {
        let mut goal = self.arena.take_goal()?;
        let result = {
            let mut ctx = GoalContext {
                arena: &mut *self.arena,
                players: &mut *self.players,
                spawns: &*self.spawns,
                scheduler: &mut *self.scheduler,
            };
            f(goal.as_mut(), &mut ctx)
        };
        self.arena.restore_goal(goal);
        Some(result)
    }

    fn teleport_to(&mut self, player: PlayerId, name: &str, team: Option<&str>, fallbacks: &[&str]) {
        let class = self
            .players
            .get(player)
            .and_then(|p| p.class().map(str::to_string));
        match self
            .spawns
            .resolve_with_fallback(name, team, class.as_deref(), fallbacks)
        {
            Some(spawn) => {
                let destination = spawn.resolved_location();
                self.arena.push_event(ArenaEvent::Teleport {
                    player,
                    destination,
                });
            }
            None => warn!(
                arena = %self.arena.name(),
                %player,
                spawn = name,
                "no spawn resolved, teleport skipped"
            ),
        }
    }

    // -- Join / spectate / leave ---------------------------------------------

    /// Admits a player: team selection, inventory snapshot, lounge
    /// placement. Late joins (when configured) are handed to the goal via
    /// `initiate` and placed straight into the fight.
    pub fn handle_join(
        &mut self,
        id: PlayerId,
        name: &str,
        preferred_team: Option<&str>,
        inventory: InventorySnapshot,
    ) -> Result<String, ArenaError> {
        if self.arena.is_locked() {
            return Err(ArenaError::Locked(self.arena.name().to_string()));
        }
        let phase = self.arena.phase();
        let late_join = self.arena.config().join_during_fight;
        if !phase.is_joinable() && !(phase.is_active() && late_join) {
            return Err(ArenaError::NotJoinable {
                arena: self.arena.name().to_string(),
                phase,
            });
        }

        let player = self.players.get_or_create(id, name);
        let team_name = self.arena.add_player(player, preferred_team)?;
        player.save_inventory(inventory);
        player.set_status(PlayerStatus::Warm);
        player.set_status(PlayerStatus::Lounge);

        self.teleport_to(id, LOUNGE, Some(&team_name), &[SPECTATOR, EXIT]);
        let display = self
            .players
            .name_of(id)
            .unwrap_or_default()
            .to_string();
        self.arena
            .broadcast(format!("{display} joined team {team_name}"));

        if self.arena.is_fight_in_progress() {
            // Late join into a running match: the goal lazily creates the
            // life-map entry, then the player goes straight in.
            let team = team_name.clone();
            self.with_goal(|goal, ctx| {
                goal.initiate(ctx.arena, id);
                let spawns = ctx.spawns;
                if let Some(spawn) = spawns.resolve(SPAWN, Some(&team), None) {
                    ctx.place_fighter(id, spawn);
                }
            });
        }

        Ok(team_name)
    }

    /// Admits a spectator: no team, `Watch` status, spectator spawn.
    pub fn handle_spectate(&mut self, id: PlayerId, name: &str) -> Result<(), ArenaError> {
        let player = self.players.get_or_create(id, name);
        self.arena.add_spectator(player)?;
        player.set_status(PlayerStatus::Watch);
        self.teleport_to(id, SPECTATOR, None, &[EXIT]);
        Ok(())
    }

    /// Removes a player from the arena without treating it as a death.
    /// The saved inventory comes back on a delayed task.
    pub fn handle_leave(&mut self, id: PlayerId) -> Result<(), ArenaError> {
        if !self.arena.contains_player(id) {
            return Err(ArenaError::NotInArena {
                player: id,
                arena: self.arena.name().to_string(),
            });
        }

        if let Some(mut goal) = self.arena.take_goal() {
            goal.parse_leave(id);
            self.arena.restore_goal(goal);
        }

        self.arena.remove_player(id);
        self.teleport_to(id, EXIT, None, &[SPECTATOR]);
        let delay = self.arena.config().inventory_restore_delay_ticks;
        self.schedule(delay, TaskKind::RestoreInventory(id));

        let display = self.players.name_of(id).unwrap_or_default().to_string();
        if let Some(player) = self.players.get_mut(id) {
            player.reset();
        }
        self.arena.broadcast(format!("{display} left the arena"));

        // A leave mid-fight can decide the match.
        if self.arena.is_fight_in_progress() {
            self.handle_end(false);
        }
        Ok(())
    }

    // -- Readiness and start ---------------------------------------------------

    /// Flags a lounging player ready, and begins the start countdown when
    /// the readiness threshold is met. Returns `true` when the countdown
    /// was started by this call.
    pub fn handle_ready(&mut self, id: PlayerId) -> Result<bool, ArenaError> {
        if !self.arena.contains_player(id) {
            return Err(ArenaError::NotInArena {
                player: id,
                arena: self.arena.name().to_string(),
            });
        }
        match self.players.get(id).map(|p| p.status()) {
            Some(PlayerStatus::Lounge) => {
                if let Some(player) = self.players.get_mut(id) {
                    player.set_status(PlayerStatus::Ready);
                }
            }
            Some(PlayerStatus::Ready) => {}
            _ => return Ok(false),
        }

        if self.arena.phase() == ArenaPhase::Idle
            && skirmish_arena::queries::ready_to_start(self.arena, self.players)
        {
            self.begin_countdown()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn begin_countdown(&mut self) -> Result<(), ArenaError> {
        self.arena.transition(ArenaPhase::Starting)?;
        let delay = self.arena.config().countdown_ticks;
        let handle = self.schedule(delay, TaskKind::StartMatch);
        self.arena.set_start_task(Some(handle));
        self.arena
            .broadcast(format!("The match starts in {delay} ticks!"));
        Ok(())
    }

    /// Commits the match start once the countdown elapses.
    ///
    /// Standard goals get `parse_start` (life maps, role state) followed
    /// by `commit_start` (the default standard spawning). Goals that
    /// override the start skip the framework's `parse_start` call and run
    /// both steps themselves from `commit_start`.
    pub fn start_match(&mut self) {
        self.arena.set_start_task(None);
        if self.arena.phase() != ArenaPhase::Starting {
            debug!(arena = %self.arena.name(), phase = %self.arena.phase(), "stale start task ignored");
            return;
        }

        let started: Option<Result<(), GoalError>> = self.with_goal(|goal, ctx| {
            if !goal.overrides_start() {
                goal.parse_start(ctx)?;
            }
            goal.commit_start(ctx)
        });

        match started {
            None => {
                warn!(arena = %self.arena.name(), "no goal attached, aborting start");
                self.force_reset();
            }
            Some(Err(err)) => {
                self.arena.broadcast(format!("Match start aborted: {err}"));
                self.force_reset();
            }
            Some(Ok(())) => {
                let _ = self.arena.transition(ArenaPhase::Fight);
                self.arena.broadcast("Fight!");
                if let Some(limit) = self.arena.config().time_limit_ticks {
                    let handle = self.schedule(limit, TaskKind::TimedEnd);
                    self.arena.set_end_task(Some(handle));
                }
            }
        }
    }

    // -- Ending ---------------------------------------------------------------

    /// The single-flight choke point for ending a match.
    ///
    /// Returns `false` without side effects when an end sequence is
    /// already in flight or no fight is running; otherwise asks the goal
    /// (or obeys `force`) and lets `commit_end` schedule the sequence.
    pub fn handle_end(&mut self, force: bool) -> bool {
        if self.arena.end_scheduled() {
            trace!(arena = %self.arena.name(), "end already in flight");
            return false;
        }
        if !self.arena.is_fight_in_progress() {
            return false;
        }
        let decided = force
            || self
                .arena
                .goal_ref()
                .is_some_and(|goal| goal.check_end(self.arena, self.players));
        if !decided {
            return false;
        }
        info!(arena = %self.arena.name(), force, "committing match end");
        self.with_goal(|goal, ctx| goal.commit_end(ctx, force));
        true
    }

    /// Convenience gate used by collaborators after any relevant state
    /// change: no-op unless a fight is in progress.
    pub fn check_and_commit(&mut self, force: bool) -> bool {
        if !self.arena.is_fight_in_progress() {
            debug!(arena = %self.arena.name(), "no fight, no end");
            return false;
        }
        self.handle_end(force)
    }

    /// The ENDING → RESET step: players out, goal reset, rosters cleared,
    /// back to Idle. Also the force-reset entry point (`force = true`),
    /// which cancels every outstanding timer — including a chained
    /// real-end timer — before resetting.
    pub fn finish_match(&mut self, force: bool) {
        for handle in self.arena.take_task_handles() {
            self.scheduler.cancel(handle);
        }

        let exit_spawn = self
            .spawns
            .resolve_with_fallback(EXIT, None, None, &[SPECTATOR])
            .map(|spawn| spawn.resolved_location());
        let everyone: Vec<PlayerId> = self.arena.everyone().iter().copied().collect();
        let restore_delay = self.arena.config().inventory_restore_delay_ticks;
        for id in everyone {
            if let Some(destination) = exit_spawn.clone() {
                self.arena.push_event(ArenaEvent::Teleport {
                    player: id,
                    destination,
                });
            }
            self.schedule(restore_delay, TaskKind::RestoreInventory(id));
            if let Some(player) = self.players.get_mut(id) {
                player.reset();
            }
        }

        if let Some(mut goal) = self.arena.take_goal() {
            goal.reset(force);
            self.arena.restore_goal(goal);
        }
        self.arena.reset_rosters();

        match self.arena.phase() {
            ArenaPhase::Idle => {}
            ArenaPhase::Reset => {
                let _ = self.arena.transition(ArenaPhase::Idle);
            }
            _ => {
                if self.arena.transition(ArenaPhase::Reset).is_ok() {
                    let _ = self.arena.transition(ArenaPhase::Idle);
                }
            }
        }
        info!(arena = %self.arena.name(), force, "arena reset");
    }

    /// Cancels everything and returns the arena to Idle, regardless of
    /// where in the lifecycle it was.
    pub fn force_reset(&mut self) {
        self.finish_match(true);
    }

    // -- Death ---------------------------------------------------------------

    /// Sequences a fighting player's death: fake-death effect, kill/death
    /// bookkeeping, the goal's respawn decision, then the end check.
    pub fn handle_player_death(&mut self, victim: PlayerId, death: DeathInfo) {
        let victim_fighting = self
            .players
            .get(victim)
            .is_some_and(|p| p.status() == PlayerStatus::Fight);
        if !self.arena.is_fight_in_progress() || !victim_fighting {
            debug!(arena = %self.arena.name(), %victim, "death outside a fight, ignoring");
            return;
        }

        self.arena.push_event(ArenaEvent::DeathEffect { player: victim });

        let victim_name = self.players.name_of(victim).unwrap_or_default().to_string();
        let killed_by = match death.killer.and_then(|k| self.players.name_of(k)) {
            Some(killer) => killer.to_string(),
            None => death.cause.to_string(),
        };
        self.arena
            .broadcast(format!("{victim_name} was killed by {killed_by}"));

        if let Some(player) = self.players.get_mut(victim) {
            player.record(StatKind::Deaths);
        }
        self.arena.push_event(ArenaEvent::StatRecorded {
            player: victim,
            stat: StatKind::Deaths,
        });
        if let Some(killer) = death.killer {
            self.credit_kill(killer, victim);
        }

        let does_respawn = self
            .arena
            .goal_ref()
            .is_some_and(|goal| goal.should_respawn_player(self.arena, self.players, victim, &death));

        self.with_goal(|goal, ctx| goal.commit_player_death(ctx, victim, does_respawn, &death));

        if does_respawn {
            if let Some(player) = self.players.get_mut(victim) {
                player.set_status(PlayerStatus::Dead);
            }
            let delay = self.arena.config().respawn_delay_ticks;
            let handle = self.schedule(delay, TaskKind::Respawn(victim));
            trace!(arena = %self.arena.name(), %victim, %handle, "respawn scheduled");
        } else {
            self.mark_lost(victim);
        }

        self.handle_end(false);
    }

    /// A kill only counts for an opposing-team player in the same arena.
    fn credit_kill(&mut self, killer: PlayerId, victim: PlayerId) {
        if killer == victim || !self.arena.contains_player(killer) {
            return;
        }
        let same_team = match (self.arena.team_of(killer), self.arena.team_of(victim)) {
            (Some(a), Some(b)) => a.name() == b.name(),
            _ => false,
        };
        if same_team {
            return;
        }
        if let Some(player) = self.players.get_mut(killer) {
            player.record(StatKind::Kills);
        }
        self.arena.push_event(ArenaEvent::StatRecorded {
            player: killer,
            stat: StatKind::Kills,
        });
    }

    /// The canonical `Lost` bookkeeping. Statistics are credited before
    /// the player leaves the match roster.
    pub fn mark_lost(&mut self, victim: PlayerId) {
        if let Some(player) = self.players.get_mut(victim) {
            player.record(StatKind::Losses);
            player.set_status(PlayerStatus::Lost);
        }
        self.arena.push_event(ArenaEvent::StatRecorded {
            player: victim,
            stat: StatKind::Losses,
        });

        let display = self.players.name_of(victim).unwrap_or_default().to_string();
        self.arena.broadcast(format!("{display} is out of the fight!"));

        self.arena.remove_from_team(victim);
        self.teleport_to(victim, SPECTATOR, None, &[EXIT]);
    }

    // -- Scheduled task continuations --------------------------------------------

    /// Puts a dead player back into the fight (the Respawn task).
    pub fn respawn(&mut self, victim: PlayerId) {
        let still_dead = self.players.get(victim).is_some_and(|p| {
            p.status() == PlayerStatus::Dead && p.arena() == Some(self.arena.name())
        });
        if !still_dead || !self.arena.is_fight_in_progress() {
            debug!(arena = %self.arena.name(), %victim, "stale respawn task ignored");
            return;
        }

        let team = self
            .arena
            .team_of(victim)
            .map(|team| team.name().to_string());
        let class = self
            .players
            .get(victim)
            .and_then(|p| p.class().map(str::to_string));
        let descriptor = self
            .spawns
            .resolve(SPAWN, team.as_deref(), class.as_deref())
            .cloned()
            .or_else(|| {
                team.as_deref().and_then(|t| {
                    self.spawns
                        .team_fight_spawns(t)
                        .first()
                        .map(|spawn| (*spawn).clone())
                })
            });

        match descriptor {
            Some(spawn) => {
                let mut ctx = GoalContext {
                    arena: &mut *self.arena,
                    players: &mut *self.players,
                    spawns: &*self.spawns,
                    scheduler: &mut *self.scheduler,
                };
                ctx.place_fighter(victim, &spawn);
            }
            None => {
                warn!(arena = %self.arena.name(), %victim, "no respawn point, player stays dead");
            }
        }
    }

    /// Hands a saved inventory back (the RestoreInventory task).
    pub fn restore_inventory(&mut self, id: PlayerId) {
        let snapshot = self
            .players
            .get_mut(id)
            .and_then(|player| player.take_saved_inventory());
        if let Some(snapshot) = snapshot {
            self.arena.push_event(ArenaEvent::RestoreInventory {
                player: id,
                snapshot,
            });
        }
    }
}
