//! The timed-match tie-break.
//!
//! When a configured time limit expires mid-fight, the match is forced to
//! a conclusion: the goal contributes its notion of "current score" per
//! entity (team name, or player name in free-for-all), and the selection
//! below picks the winners — or declares a draw, because a tie among
//! *everyone* remaining is not a win.
//!
//! Selection is layered: team-level max score first; a multi-way tie is
//! refined by summing each tied team's members' individual scores; and at
//! every level, winners covering all remaining candidates collapse to a
//! draw.

use std::collections::{BTreeSet, HashMap};

use skirmish_arena::{ArenaEvent, PlayerStatus, Scores};
use skirmish_core::{PlayerId, StatKind};
use tracing::{debug, info};

use crate::workflow::Workflow;

// ---------------------------------------------------------------------------
// Pure selection
// ---------------------------------------------------------------------------

/// Team-level selection: every team achieving the maximum score among the
/// teams present in the score map. Teams without a score entry count as
/// inactive. When the winners cover all active teams (counting at least
/// two), nobody wins — the set comes back empty.
pub fn select_team_winners(scores: &Scores, team_names: &[String]) -> BTreeSet<String> {
    let mut winners = BTreeSet::new();
    let mut max_score = 0.0_f64;
    let mut active = 0_usize;
    for team in team_names {
        let Some(&score) = scores.get(team) else {
            continue;
        };
        active += 1;
        if score > max_score {
            max_score = score;
            winners.clear();
            winners.insert(team.clone());
        } else if score == max_score {
            winners.insert(team.clone());
        }
    }
    if winners.len() >= active.max(2) {
        debug!(tied = winners.len(), "all active teams tied, declaring draw");
        winners.clear();
    }
    winners
}

/// Finer-grained tie-break for a multi-way team tie: re-select by the sum
/// of each tied team's members' individual scores. The draw rule repeats
/// at this grain — if the member sums tie across every remaining team,
/// the set comes back empty.
pub fn refine_by_member_sums(
    scores: &Scores,
    tied: &BTreeSet<String>,
    members: &HashMap<String, Vec<String>>,
) -> BTreeSet<String> {
    let mut winners = BTreeSet::new();
    let mut max_sum = 0.0_f64;
    for team in tied {
        let sum: f64 = members
            .get(team)
            .map(|names| names.iter().filter_map(|name| scores.get(name)).sum())
            .unwrap_or(0.0);
        if sum > max_sum {
            max_sum = sum;
            winners.clear();
            winners.insert(team.clone());
        } else if sum == max_sum {
            winners.insert(team.clone());
        }
    }
    if winners.len() == tied.len() {
        debug!(tied = winners.len(), "member sums equal, declaring draw");
        winners.clear();
    }
    winners
}

/// Free-for-all selection: every player achieving the maximum score.
/// When that is everyone who played, nobody wins.
pub fn select_ffa_winners(
    scores: &Scores,
    player_names: &[String],
    played: usize,
) -> BTreeSet<String> {
    let mut winners = BTreeSet::new();
    let mut max_score = 0.0_f64;
    for name in player_names {
        let score = scores.get(name).copied().unwrap_or(0.0);
        if score > max_score {
            max_score = score;
            winners.clear();
            winners.insert(name.clone());
        } else if score == max_score {
            winners.insert(name.clone());
        }
    }
    if winners.len() == played {
        winners.clear();
    }
    winners
}

// ---------------------------------------------------------------------------
// Workflow integration
// ---------------------------------------------------------------------------

impl Workflow<'_> {
    /// Resolves a match whose time limit just elapsed.
    ///
    /// An empty winner set is announced as a draw and forces an
    /// unconditional full reset; a non-empty result performs a standard
    /// reset. Winners are broadcast; every non-winning still-fighting
    /// participant is marked Lost and credited a loss.
    pub fn handle_timed_end(&mut self) {
        self.arena.set_end_task(None);
        if !self.arena.is_fight_in_progress() {
            debug!(arena = %self.arena.name(), "stale timed-end task ignored");
            return;
        }
        info!(arena = %self.arena.name(), "time limit elapsed, resolving by score");

        let mut scores = Scores::new();
        if let Some(goal) = self.arena.goal_ref() {
            goal.timed_end(self.arena, self.players, &mut scores);
        }

        let real_teams: Vec<String> = self
            .arena
            .teams()
            .iter()
            .filter(|team| !team.is_virtual())
            .map(|team| team.name().to_string())
            .collect();

        if self.arena.free_for_all() && real_teams.len() <= 1 {
            self.resolve_free_for_all(&scores);
        } else {
            self.resolve_team_match(&scores, &real_teams);
        }
    }

    fn resolve_free_for_all(&mut self, scores: &Scores) {
        let members: Vec<PlayerId> = self
            .arena
            .teams()
            .iter()
            .filter(|team| !team.is_virtual())
            .flat_map(|team| team.members().iter().copied())
            .collect();
        let names: Vec<String> = members
            .iter()
            .filter_map(|id| self.players.name_of(*id))
            .map(str::to_string)
            .collect();

        let winners = select_ffa_winners(scores, &names, self.arena.played().len());
        if winners.is_empty() {
            self.announce_draw();
            return;
        }

        for id in members {
            let Some(name) = self.players.name_of(id).map(str::to_string) else {
                continue;
            };
            if winners.contains(&name) {
                self.arena.broadcast(format!("{name} has won the match!"));
            } else if self
                .players
                .get(id)
                .is_some_and(|p| p.status() == PlayerStatus::Fight)
            {
                self.credit_loss(id);
            }
        }

        self.arena.push_event(ArenaEvent::MatchEnded {
            winners: winners.into_iter().collect(),
            draw: false,
        });
        self.finish_match(false);
    }

    fn resolve_team_match(&mut self, scores: &Scores, real_teams: &[String]) {
        let winners: BTreeSet<String> = match self.arena.config().forced_winner.clone() {
            Some(team) => BTreeSet::from([team]),
            None => {
                let mut tied = select_team_winners(scores, real_teams);
                if tied.len() > 1 {
                    let mut members: HashMap<String, Vec<String>> = HashMap::new();
                    for team in self.arena.teams() {
                        if team.is_virtual() {
                            continue;
                        }
                        let names = team
                            .members()
                            .iter()
                            .filter_map(|id| self.players.name_of(*id))
                            .map(str::to_string)
                            .collect();
                        members.insert(team.name().to_string(), names);
                    }
                    tied = refine_by_member_sums(scores, &tied, &members);
                }
                tied
            }
        };

        if winners.is_empty() {
            self.announce_draw();
            return;
        }

        for name in &winners {
            let text = match self.arena.team(name) {
                Some(team) => format!("Team {} has won the match!", team.colored_name()),
                None => format!("Team {name} has won the match!"),
            };
            self.arena.broadcast(text);
        }

        let losers: Vec<PlayerId> = self
            .arena
            .teams()
            .iter()
            .filter(|team| !team.is_virtual() && !winners.contains(team.name()))
            .flat_map(|team| team.members().iter().copied())
            .collect();
        for id in losers {
            if self
                .players
                .get(id)
                .is_some_and(|p| p.status() == PlayerStatus::Fight)
            {
                self.credit_loss(id);
            }
        }

        self.arena.push_event(ArenaEvent::MatchEnded {
            winners: winners.into_iter().collect(),
            draw: false,
        });
        self.finish_match(false);
    }

    fn announce_draw(&mut self) {
        self.arena.broadcast("The match ended in a draw.");
        self.arena.push_event(ArenaEvent::MatchEnded {
            winners: Vec::new(),
            draw: true,
        });
        self.finish_match(true);
    }

    fn credit_loss(&mut self, id: PlayerId) {
        if let Some(player) = self.players.get_mut(id) {
            player.record(StatKind::Losses);
            player.set_status(PlayerStatus::Lost);
        }
        self.arena.push_event(ArenaEvent::StatRecorded {
            player: id,
            stat: StatKind::Losses,
        });
    }
}
