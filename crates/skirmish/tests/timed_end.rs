//! End-to-end tests for the timed-match tie-break: a goal with a fixed
//! score table, a short time limit, and the full workflow around it.

use pretty_assertions::assert_eq;
use skirmish::prelude::*;
use skirmish::{ArenaEvent, TeamSpec};

// =========================================================================
// Mock goal: never ends on its own, contributes a fixed score table.
// =========================================================================

struct FixedScoreGoal {
    table: Scores,
    ffa: bool,
}

impl FixedScoreGoal {
    fn teams(table: &[(&str, f64)]) -> Self {
        Self {
            table: table
                .iter()
                .map(|(name, score)| (name.to_string(), *score))
                .collect(),
            ffa: false,
        }
    }

    fn free_for_all(table: &[(&str, f64)]) -> Self {
        Self {
            ffa: true,
            ..Self::teams(table)
        }
    }
}

impl Goal for FixedScoreGoal {
    fn name(&self) -> &str {
        "FixedScore"
    }

    fn is_free_for_all(&self) -> bool {
        self.ffa
    }

    fn check_end(&self, _arena: &Arena, _players: &PlayerRegistry) -> bool {
        false
    }

    fn commit_player_death(
        &mut self,
        _ctx: &mut GoalContext<'_>,
        _victim: PlayerId,
        _does_respawn: bool,
        _death: &DeathInfo,
    ) {
    }

    fn parse_leave(&mut self, _player: PlayerId) {}

    fn reset(&mut self, _force: bool) {}

    fn timed_end(&self, _arena: &Arena, _players: &PlayerRegistry, scores: &mut Scores) {
        for (name, score) in &self.table {
            *scores.entry(name.clone()).or_insert(0.0) += score;
        }
    }
}

// =========================================================================
// Helpers
// =========================================================================

const ARENA: &str = "pit";
const TIME_LIMIT: u64 = 5;

fn three_team_config() -> ArenaConfig {
    ArenaConfig {
        countdown_ticks: 1,
        end_delay_ticks: 1,
        time_limit_ticks: Some(TIME_LIMIT),
        min_players: 3,
        teams: vec![
            TeamSpec {
                name: "red".into(),
                color: TeamColor::Red,
            },
            TeamSpec {
                name: "blue".into(),
                color: TeamColor::Blue,
            },
            TeamSpec {
                name: "green".into(),
                color: TeamColor::Green,
            },
        ],
        ..ArenaConfig::default()
    }
}

fn two_team_config() -> ArenaConfig {
    ArenaConfig {
        countdown_ticks: 1,
        end_delay_ticks: 1,
        time_limit_ticks: Some(TIME_LIMIT),
        ..ArenaConfig::default()
    }
}

fn ffa_config() -> ArenaConfig {
    ArenaConfig {
        countdown_ticks: 1,
        end_delay_ticks: 1,
        time_limit_ticks: Some(TIME_LIMIT),
        min_players: 3,
        teams: vec![TeamSpec {
            name: "free".into(),
            color: TeamColor::White,
        }],
        ..ArenaConfig::default()
    }
}

fn team_spawns(teams: &[&str]) -> Vec<SpawnDescriptor> {
    let mut spawns = vec![
        SpawnDescriptor::new("lounge", Location::new("event", 0.0, 64.0, 0.0)),
        SpawnDescriptor::new("spectator", Location::new("event", 4.0, 64.0, 0.0)),
        SpawnDescriptor::new("exit", Location::new("event", -4.0, 64.0, 0.0)),
    ];
    for (index, team) in teams.iter().enumerate() {
        spawns.push(
            SpawnDescriptor::new("spawn", Location::new("event", 10.0 * (index + 1) as f64, 64.0, 0.0))
                .with_team(*team),
        );
    }
    spawns
}

fn ffa_spawns(count: usize) -> Vec<SpawnDescriptor> {
    let mut spawns = vec![
        SpawnDescriptor::new("lounge", Location::new("event", 0.0, 64.0, 0.0)),
        SpawnDescriptor::new("spectator", Location::new("event", 4.0, 64.0, 0.0)),
    ];
    for index in 0..count {
        spawns.push(SpawnDescriptor::new(
            format!("spawn{index}"),
            Location::new("event", 10.0 * (index + 1) as f64, 64.0, 0.0),
        ));
    }
    spawns
}

/// Joins one named player per (player, team) pair, readies everyone and
/// runs the match into the fight phase.
fn run_match(host: &mut ArenaHost, roster: &[(u64, &str, Option<&str>)]) {
    for (id, name, team) in roster {
        host.join(ARENA, PlayerId(*id), name, *team, InventorySnapshot::empty())
            .unwrap();
    }
    for (id, _, _) in roster {
        host.ready(ARENA, PlayerId(*id)).unwrap();
    }
    host.tick_by(1); // countdown
    assert_eq!(host.arena(ARENA).unwrap().phase(), ArenaPhase::Fight);
    host.drain_events(ARENA);
}

fn match_ended(events: &[ArenaEvent]) -> Option<(Vec<String>, bool)> {
    events.iter().find_map(|event| match event {
        ArenaEvent::MatchEnded { winners, draw } => Some((winners.clone(), *draw)),
        _ => None,
    })
}

fn losses(host: &ArenaHost, id: u64) -> u64 {
    host.players()
        .get(PlayerId(id))
        .unwrap()
        .stats_for(ARENA)
        .map(|sheet| sheet.get(StatKind::Losses))
        .unwrap_or(0)
}

// =========================================================================
// Team matches
// =========================================================================

#[test]
fn test_two_equal_teams_draw_and_fully_reset() {
    let mut host = ArenaHost::new();
    host.load_arena(
        ARENA,
        two_team_config(),
        Box::new(FixedScoreGoal::teams(&[("red", 10.0), ("blue", 10.0)])),
        team_spawns(&["red", "blue"]),
    )
    .unwrap();
    run_match(&mut host, &[(1, "p1", Some("red")), (2, "p2", Some("blue"))]);

    host.tick_by(TIME_LIMIT);

    let events = host.drain_events(ARENA);
    let (winners, draw) = match_ended(&events).expect("match should have ended");
    assert!(winners.is_empty());
    assert!(draw);
    // A draw forces an unconditional full reset.
    assert_eq!(host.arena(ARENA).unwrap().phase(), ArenaPhase::Idle);
    assert_eq!(losses(&host, 1), 0);
    assert_eq!(losses(&host, 2), 0);
}

#[test]
fn test_clear_winner_marks_losers_lost() {
    let mut host = ArenaHost::new();
    host.load_arena(
        ARENA,
        two_team_config(),
        Box::new(FixedScoreGoal::teams(&[("red", 10.0), ("blue", 3.0)])),
        team_spawns(&["red", "blue"]),
    )
    .unwrap();
    run_match(&mut host, &[(1, "p1", Some("red")), (2, "p2", Some("blue"))]);

    host.tick_by(TIME_LIMIT);

    let events = host.drain_events(ARENA);
    let (winners, draw) = match_ended(&events).unwrap();
    assert_eq!(winners, vec!["red".to_string()]);
    assert!(!draw);
    assert_eq!(losses(&host, 1), 0);
    assert_eq!(losses(&host, 2), 1);
    assert_eq!(host.arena(ARENA).unwrap().phase(), ArenaPhase::Idle);
}

#[test]
fn test_three_team_tie_breaks_on_member_sums() {
    // Red and blue tie at 10 with green behind; red's member outscores
    // blue's, so the recursion picks red.
    let mut host = ArenaHost::new();
    host.load_arena(
        ARENA,
        three_team_config(),
        Box::new(FixedScoreGoal::teams(&[
            ("red", 10.0),
            ("blue", 10.0),
            ("green", 5.0),
            ("p1", 4.0),
            ("p2", 2.0),
        ])),
        team_spawns(&["red", "blue", "green"]),
    )
    .unwrap();
    run_match(
        &mut host,
        &[
            (1, "p1", Some("red")),
            (2, "p2", Some("blue")),
            (3, "p3", Some("green")),
        ],
    );

    host.tick_by(TIME_LIMIT);

    let events = host.drain_events(ARENA);
    let (winners, draw) = match_ended(&events).unwrap();
    assert_eq!(winners, vec!["red".to_string()]);
    assert!(!draw);
    assert_eq!(losses(&host, 2), 1);
    assert_eq!(losses(&host, 3), 1);
}

#[test]
fn test_three_team_tie_with_equal_member_sums_is_a_draw() {
    // The tied teams' member sums are also equal: declare a draw rather
    // than picking arbitrarily.
    let mut host = ArenaHost::new();
    host.load_arena(
        ARENA,
        three_team_config(),
        Box::new(FixedScoreGoal::teams(&[
            ("red", 10.0),
            ("blue", 10.0),
            ("green", 5.0),
            ("p1", 4.0),
            ("p2", 4.0),
        ])),
        team_spawns(&["red", "blue", "green"]),
    )
    .unwrap();
    run_match(
        &mut host,
        &[
            (1, "p1", Some("red")),
            (2, "p2", Some("blue")),
            (3, "p3", Some("green")),
        ],
    );

    host.tick_by(TIME_LIMIT);

    let events = host.drain_events(ARENA);
    let (winners, draw) = match_ended(&events).unwrap();
    assert!(winners.is_empty());
    assert!(draw);
}

#[test]
fn test_forced_winner_overrides_scores() {
    let mut config = two_team_config();
    config.forced_winner = Some("blue".into());
    let mut host = ArenaHost::new();
    host.load_arena(
        ARENA,
        config,
        Box::new(FixedScoreGoal::teams(&[("red", 10.0), ("blue", 0.0)])),
        team_spawns(&["red", "blue"]),
    )
    .unwrap();
    run_match(&mut host, &[(1, "p1", Some("red")), (2, "p2", Some("blue"))]);

    host.tick_by(TIME_LIMIT);

    let events = host.drain_events(ARENA);
    let (winners, _) = match_ended(&events).unwrap();
    assert_eq!(winners, vec!["blue".to_string()]);
    assert_eq!(losses(&host, 1), 1);
}

// =========================================================================
// Free-for-all
// =========================================================================

#[test]
fn test_ffa_player_with_top_score_wins() {
    let mut host = ArenaHost::new();
    host.load_arena(
        ARENA,
        ffa_config(),
        Box::new(FixedScoreGoal::free_for_all(&[
            ("p1", 5.0),
            ("p2", 2.0),
            ("p3", 1.0),
        ])),
        ffa_spawns(3),
    )
    .unwrap();
    run_match(
        &mut host,
        &[(1, "p1", None), (2, "p2", None), (3, "p3", None)],
    );

    host.tick_by(TIME_LIMIT);

    let events = host.drain_events(ARENA);
    let (winners, draw) = match_ended(&events).unwrap();
    assert_eq!(winners, vec!["p1".to_string()]);
    assert!(!draw);
    assert_eq!(losses(&host, 1), 0);
    assert_eq!(losses(&host, 2), 1);
    assert_eq!(losses(&host, 3), 1);
}

#[test]
fn test_ffa_everyone_tied_is_a_draw() {
    let mut host = ArenaHost::new();
    host.load_arena(
        ARENA,
        ffa_config(),
        Box::new(FixedScoreGoal::free_for_all(&[
            ("p1", 3.0),
            ("p2", 3.0),
            ("p3", 3.0),
        ])),
        ffa_spawns(3),
    )
    .unwrap();
    run_match(
        &mut host,
        &[(1, "p1", None), (2, "p2", None), (3, "p3", None)],
    );

    host.tick_by(TIME_LIMIT);

    let events = host.drain_events(ARENA);
    let (winners, draw) = match_ended(&events).unwrap();
    assert!(winners.is_empty());
    assert!(draw);
}

#[test]
fn test_timed_end_only_fires_while_fighting() {
    // The match ends normally before the time limit; the stale timed-end
    // task must not disturb the next lobby.
    let mut host = ArenaHost::new();
    host.load_arena(
        ARENA,
        two_team_config(),
        Box::new(FixedScoreGoal::teams(&[("red", 1.0), ("blue", 2.0)])),
        team_spawns(&["red", "blue"]),
    )
    .unwrap();
    run_match(&mut host, &[(1, "p1", Some("red")), (2, "p2", Some("blue"))]);

    host.with_workflow(ARENA, |wf| wf.handle_end(true)).unwrap();
    host.tick_by(1); // end sequence fires, arena resets
    assert_eq!(host.arena(ARENA).unwrap().phase(), ArenaPhase::Idle);
    host.drain_events(ARENA);

    host.tick_by(TIME_LIMIT);
    let events = host.drain_events(ARENA);
    assert!(match_ended(&events).is_none());
    assert_eq!(host.arena(ARENA).unwrap().phase(), ArenaPhase::Idle);
}
