//! Team spawn distribution.

use rand::seq::SliceRandom;
use skirmish_core::{PlayerId, SpawnDescriptor};
use tracing::debug;

use crate::{SpawnError, SpawnRegistry};

/// One team's placement request: the team name plus its members in the
/// order they should be placed.
#[derive(Debug, Clone)]
pub struct TeamSpawnRequest {
    pub team: String,
    pub members: Vec<PlayerId>,
}

impl TeamSpawnRequest {
    pub fn new(team: impl Into<String>, members: Vec<PlayerId>) -> Self {
        Self {
            team: team.into(),
            members,
        }
    }
}

/// A resolved placement: this player teleports to this spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnAssignment {
    pub player: PlayerId,
    pub spawn: SpawnDescriptor,
}

/// How candidates are ordered before the round-robin walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistributionMode {
    /// Declaration order. Fully deterministic.
    #[default]
    RoundRobin,
    /// Candidates are shuffled once per team, then walked round-robin.
    Shuffled,
}

impl SpawnRegistry {
    /// Places every team's members across that team's spawn candidates.
    ///
    /// Members are assigned round-robin over the candidate list, so no
    /// spawn point is used twice while unused candidates remain; once the
    /// candidates are exhausted the walk wraps around and reuses them in
    /// the same order. Fails if any team has no candidates at all.
    pub fn distribute_teams(
        &self,
        requests: &[TeamSpawnRequest],
        mode: DistributionMode,
    ) -> Result<Vec<SpawnAssignment>, SpawnError> {
        let mut assignments = Vec::new();
        for request in requests {
            let mut candidates = self.team_fight_spawns(&request.team);
            if candidates.is_empty() {
                return Err(SpawnError::NoSpawns(request.team.clone()));
            }
            if mode == DistributionMode::Shuffled {
                candidates.shuffle(&mut rand::rng());
            }
            for (index, player) in request.members.iter().enumerate() {
                let spawn = candidates[index % candidates.len()];
                assignments.push(SpawnAssignment {
                    player: *player,
                    spawn: spawn.clone(),
                });
            }
            debug!(
                team = %request.team,
                members = request.members.len(),
                candidates = candidates.len(),
                "team distributed"
            );
        }
        Ok(assignments)
    }
}
