//! The arena: one match container.

use std::collections::HashSet;

use skirmish_core::PlayerId;
use skirmish_tick::TaskHandle;
use tracing::{debug, info};

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::event::ArenaEvent;
use crate::goal::Goal;
use crate::phase::ArenaPhase;
use crate::player::ArenaPlayer;
use crate::team::ArenaTeam;

/// One match definition: the roster, the active goal, the lifecycle phase
/// and its timers, and the event outbox.
///
/// Arenas are singleton-per-name; the host keeps the process-wide registry.
/// All mutation happens on the single tick thread, driven by the workflow
/// orchestrator and the active goal — every mutator leaves the arena
/// self-consistent before returning, because the next callback may observe
/// it immediately.
pub struct Arena {
    name: String,
    locked: bool,
    phase: ArenaPhase,
    teams: Vec<ArenaTeam>,
    /// Every participant, spectators included.
    everyone: HashSet<PlayerId>,
    /// Everyone who entered the fight this match (timed-end draw rule).
    played: HashSet<PlayerId>,
    goal: Option<Box<dyn Goal>>,
    /// Start countdown timer.
    start_task: Option<TaskHandle>,
    /// Match time-limit timer, scheduled at match start when configured.
    end_task: Option<TaskHandle>,
    /// Post-announcement end-sequence timer, scheduled by `commit_end`.
    /// Doubles as the single-flight sentinel: while it is set (or the
    /// phase has passed Fight) no second end sequence may be scheduled.
    real_end_task: Option<TaskHandle>,
    events: Vec<ArenaEvent>,
    config: ArenaConfig,
}

impl Arena {
    /// Creates an idle arena with the teams its configuration declares.
    pub fn new(name: impl Into<String>, config: ArenaConfig) -> Self {
        let teams = config
            .teams
            .iter()
            .map(|spec| ArenaTeam::new(spec.name.clone(), spec.color))
            .collect();
        Self {
            name: name.into(),
            locked: false,
            phase: ArenaPhase::Idle,
            teams,
            everyone: HashSet::new(),
            played: HashSet::new(),
            goal: None,
            start_task: None,
            end_task: None,
            real_end_task: None,
            events: Vec::new(),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Locks or unlocks the arena. Locked arenas stay registered and
    /// inspectable but refuse joins and starts.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ArenaConfig {
        &mut self.config
    }

    // -- Lifecycle -----------------------------------------------------------

    pub fn phase(&self) -> ArenaPhase {
        self.phase
    }

    /// `true` exactly between "start committed" and "end committed".
    pub fn is_fight_in_progress(&self) -> bool {
        self.phase == ArenaPhase::Fight
    }

    /// Moves the lifecycle FSM along one edge. Only the workflow
    /// orchestrator calls this; illegal edges are refused.
    pub fn transition(&mut self, to: ArenaPhase) -> Result<(), ArenaError> {
        if !self.phase.can_transition_to(to) {
            return Err(ArenaError::IllegalTransition {
                from: self.phase,
                to,
            });
        }
        let from = self.phase;
        self.phase = to;
        info!(arena = %self.name, %from, %to, "phase transition");
        self.events.push(ArenaEvent::PhaseChanged { from, to });
        Ok(())
    }

    /// `true` while an end sequence is in flight — the single-flight
    /// guard consulted by `handle_end` and `commit_end`.
    pub fn end_scheduled(&self) -> bool {
        self.real_end_task.is_some()
            || matches!(self.phase, ArenaPhase::Ending | ArenaPhase::Reset)
    }

    // -- Goal ----------------------------------------------------------------

    /// Attaches the goal, letting it seed its configuration defaults.
    pub fn set_goal(&mut self, goal: Box<dyn Goal>) {
        goal.set_defaults(&mut self.config.goal);
        debug!(arena = %self.name, goal = goal.name(), "goal attached");
        self.goal = Some(goal);
    }

    pub fn has_goal(&self) -> bool {
        self.goal.is_some()
    }

    pub fn goal_ref(&self) -> Option<&dyn Goal> {
        self.goal.as_deref()
    }

    pub fn goal_name(&self) -> Option<&str> {
        self.goal.as_deref().map(Goal::name)
    }

    /// Whether the attached goal plays free-for-all.
    pub fn free_for_all(&self) -> bool {
        self.goal.as_deref().is_some_and(Goal::is_free_for_all)
    }

    /// Detaches the goal so a mutating hook can borrow the arena at the
    /// same time. Orchestrator plumbing — always pair with
    /// [`restore_goal`](Self::restore_goal) before returning.
    pub fn take_goal(&mut self) -> Option<Box<dyn Goal>> {
        self.goal.take()
    }

    pub fn restore_goal(&mut self, goal: Box<dyn Goal>) {
        self.goal = Some(goal);
    }

    // -- Roster ----------------------------------------------------------------

    pub fn teams(&self) -> &[ArenaTeam] {
        &self.teams
    }

    pub fn team(&self, name: &str) -> Option<&ArenaTeam> {
        self.teams
            .iter()
            .find(|team| team.name().eq_ignore_ascii_case(name))
    }

    pub fn team_mut(&mut self, name: &str) -> Option<&mut ArenaTeam> {
        self.teams
            .iter_mut()
            .find(|team| team.name().eq_ignore_ascii_case(name))
    }

    /// Registers an additional team. Goals use this at load time for
    /// their virtual role teams.
    pub fn add_team(&mut self, team: ArenaTeam) {
        debug!(arena = %self.name, team = team.name(), is_virtual = team.is_virtual(), "team registered");
        self.teams.push(team);
    }

    pub fn team_of(&self, player: PlayerId) -> Option<&ArenaTeam> {
        self.teams.iter().find(|team| team.contains(player))
    }

    pub fn everyone(&self) -> &HashSet<PlayerId> {
        &self.everyone
    }

    pub fn contains_player(&self, player: PlayerId) -> bool {
        self.everyone.contains(&player)
    }

    pub fn player_count(&self) -> usize {
        self.everyone.len()
    }

    /// Everyone who entered the fight this match.
    pub fn played(&self) -> &HashSet<PlayerId> {
        &self.played
    }

    pub fn mark_played(&mut self, player: PlayerId) {
        self.played.insert(player);
    }

    /// Adds a player to the roster, picking a team when none is requested.
    ///
    /// Enforces the one-arena-at-a-time invariant and the player cap;
    /// auto-balancing puts the player on the real team with the fewest
    /// members. Returns the name of the team joined.
    pub fn add_player(
        &mut self,
        player: &mut ArenaPlayer,
        preferred_team: Option<&str>,
    ) -> Result<String, ArenaError> {
        if self.locked {
            return Err(ArenaError::Locked(self.name.clone()));
        }
        if let Some(current) = player.arena() {
            return Err(ArenaError::AlreadyInArena {
                player: player.id(),
                arena: current.to_string(),
            });
        }
        if self.everyone.len() >= self.config.max_players {
            return Err(ArenaError::Full(self.name.clone()));
        }

        let team_name = match preferred_team {
            Some(requested) => {
                let team = self
                    .team(requested)
                    .filter(|team| !team.is_virtual())
                    .ok_or_else(|| ArenaError::UnknownTeam(requested.to_string()))?;
                team.name().to_string()
            }
            None => self
                .teams
                .iter()
                .filter(|team| !team.is_virtual())
                .min_by_key(|team| team.len())
                .map(|team| team.name().to_string())
                .ok_or_else(|| ArenaError::UnknownTeam("<none declared>".to_string()))?,
        };

        let id = player.id();
        self.everyone.insert(id);
        if let Some(team) = self.team_mut(&team_name) {
            team.add(id);
        }
        player.set_arena(Some(self.name.clone()));
        info!(arena = %self.name, player = %id, team = %team_name, "player joined roster");
        Ok(team_name)
    }

    /// Adds a player to the roster without any team (spectators).
    pub fn add_spectator(&mut self, player: &mut ArenaPlayer) -> Result<(), ArenaError> {
        if self.locked {
            return Err(ArenaError::Locked(self.name.clone()));
        }
        if let Some(current) = player.arena() {
            return Err(ArenaError::AlreadyInArena {
                player: player.id(),
                arena: current.to_string(),
            });
        }
        self.everyone.insert(player.id());
        player.set_arena(Some(self.name.clone()));
        Ok(())
    }

    /// Drops a player from every team and the participant set.
    /// Returns `false` if they were not on the roster.
    pub fn remove_player(&mut self, player: PlayerId) -> bool {
        let was_present = self.everyone.remove(&player);
        for team in &mut self.teams {
            team.remove(player);
        }
        if was_present {
            debug!(arena = %self.name, %player, "player removed from roster");
        }
        was_present
    }

    /// Drops a player from their team but keeps them as a participant
    /// (the Lost-but-still-watching state).
    pub fn remove_from_team(&mut self, player: PlayerId) {
        for team in &mut self.teams {
            team.remove(player);
        }
    }

    /// Clears team membership, participants and the played set. Virtual
    /// teams registered by the goal survive (empty) for the next match.
    pub fn reset_rosters(&mut self) {
        for team in &mut self.teams {
            team.clear();
        }
        self.everyone.clear();
        self.played.clear();
    }

    // -- Timers ----------------------------------------------------------------

    pub fn start_task(&self) -> Option<TaskHandle> {
        self.start_task
    }

    pub fn set_start_task(&mut self, handle: Option<TaskHandle>) {
        self.start_task = handle;
    }

    pub fn end_task(&self) -> Option<TaskHandle> {
        self.end_task
    }

    pub fn set_end_task(&mut self, handle: Option<TaskHandle>) {
        self.end_task = handle;
    }

    pub fn real_end_task(&self) -> Option<TaskHandle> {
        self.real_end_task
    }

    pub fn set_real_end_task(&mut self, handle: Option<TaskHandle>) {
        self.real_end_task = handle;
    }

    /// Takes every live timer handle so the caller can cancel them.
    /// Cancelling an end timer always clears the chained one too.
    pub fn take_task_handles(&mut self) -> Vec<TaskHandle> {
        [
            self.start_task.take(),
            self.end_task.take(),
            self.real_end_task.take(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    // -- Messaging ----------------------------------------------------------------

    /// Queues a message to every arena member.
    pub fn broadcast(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(arena = %self.name, %message, "broadcast");
        self.events.push(ArenaEvent::Broadcast { message });
    }

    /// Queues a message to one team.
    pub fn broadcast_team(&mut self, team: impl Into<String>, message: impl Into<String>) {
        self.events.push(ArenaEvent::TeamMessage {
            team: team.into(),
            message: message.into(),
        });
    }

    /// Queues a message to one player.
    pub fn msg_player(&mut self, player: PlayerId, message: impl Into<String>) {
        self.events.push(ArenaEvent::PlayerMessage {
            player,
            message: message.into(),
        });
    }

    pub fn push_event(&mut self, event: ArenaEvent) {
        self.events.push(event);
    }

    /// Hands the queued events to the host environment.
    pub fn drain_events(&mut self) -> Vec<ArenaEvent> {
        std::mem::take(&mut self.events)
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("locked", &self.locked)
            .field("players", &self.everyone.len())
            .field("goal", &self.goal_name())
            .finish_non_exhaustive()
    }
}
