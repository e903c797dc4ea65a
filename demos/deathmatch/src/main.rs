//! A scripted two-team deathmatch.
//!
//! Implements a minimal team-lives goal against the `Goal` contract and
//! drives one full match through the host: join, ready-up, countdown,
//! a few kills, elimination, end sequence and reset. Run with
//! `RUST_LOG=debug` to watch the engine's own tracing alongside the
//! drained arena events.

use skirmish::prelude::*;

/// Every team shares a pool of lives; each death takes one. A team out of
/// lives is eliminated, and the last team holding lives wins.
struct TeamLives {
    lives: LifeMap<String>,
}

impl TeamLives {
    fn new() -> Self {
        Self {
            lives: LifeMap::new(),
        }
    }
}

impl Goal for TeamLives {
    fn name(&self) -> &str {
        "TeamLives"
    }

    fn set_defaults(&self, settings: &mut GoalSettings) {
        settings.set_default("lives", 3u64);
    }

    fn parse_start(&mut self, ctx: &mut GoalContext<'_>) -> Result<(), skirmish::GoalError> {
        let lives = ctx.arena.config().goal.u64_or("lives", 3) as u32;
        for team in ctx.arena.teams() {
            if !team.is_virtual() && !team.is_empty() {
                self.lives.set(team.name().to_string(), lives);
            }
        }
        Ok(())
    }

    fn check_end(&self, _arena: &Arena, _players: &PlayerRegistry) -> bool {
        self.lives.len() <= 1
    }

    fn commit_player_death(
        &mut self,
        ctx: &mut GoalContext<'_>,
        victim: PlayerId,
        _does_respawn: bool,
        _death: &DeathInfo,
    ) {
        let Some(team) = ctx.arena.team_of(victim).map(|t| t.name().to_string()) else {
            return;
        };
        if self.lives.decrease(&team) == Some(0) {
            ctx.arena
                .broadcast(format!("Team {team} has run out of lives!"));
            // The whole team is out, not just the victim (whom the
            // workflow handles itself).
            let members: Vec<PlayerId> = ctx
                .arena
                .team(&team)
                .map(|t| t.members().iter().copied().collect())
                .unwrap_or_default();
            for member in members {
                if member == victim {
                    continue;
                }
                if let Some(player) = ctx.players.get_mut(member) {
                    if player.status() == PlayerStatus::Fight {
                        player.set_status(PlayerStatus::Lost);
                    }
                }
            }
        }
    }

    fn should_respawn_player(
        &self,
        arena: &Arena,
        _players: &PlayerRegistry,
        victim: PlayerId,
        _death: &DeathInfo,
    ) -> bool {
        arena
            .team_of(victim)
            .and_then(|team| self.lives.get(&team.name().to_string()))
            .is_some_and(|lives| lives > 1)
    }

    fn parse_leave(&mut self, _player: PlayerId) {
        // Lives belong to the team, not the leaver.
    }

    fn reset(&mut self, _force: bool) {
        self.lives.clear();
    }

    fn timed_end(&self, _arena: &Arena, _players: &PlayerRegistry, scores: &mut Scores) {
        for team in self.lives.keys() {
            let lives = f64::from(self.lives.get(team).unwrap_or(0));
            *scores.entry(team.clone()).or_insert(0.0) += lives;
        }
    }
}

const ARENA: &str = "pit";

fn pump(host: &mut ArenaHost, label: &str) {
    for event in host.drain_events(ARENA) {
        println!("[{label}] {event:?}");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut config = ArenaConfig::default();
    config.countdown_ticks = 3;
    config.end_delay_ticks = 2;
    config.respawn_delay_ticks = 1;
    config.goal.set("lives", 2u64);

    let spawns = vec![
        SpawnDescriptor::new("lounge", Location::new("pit", 0.0, 64.0, 0.0)),
        SpawnDescriptor::new("spectator", Location::new("pit", 0.0, 80.0, 0.0)),
        SpawnDescriptor::new("exit", Location::new("pit", -32.0, 64.0, 0.0)),
        SpawnDescriptor::new("spawn", Location::new("pit", 32.0, 64.0, 0.0)).with_team("red"),
        SpawnDescriptor::new("spawn", Location::new("pit", -32.0, 64.0, 32.0)).with_team("blue"),
    ];

    let mut host = ArenaHost::new();
    host.load_arena(ARENA, config, Box::new(TeamLives::new()), spawns)
        .expect("arena should load");

    let roster = [
        (PlayerId(1), "alice", "red"),
        (PlayerId(2), "bob", "red"),
        (PlayerId(3), "carol", "blue"),
        (PlayerId(4), "dave", "blue"),
    ];
    for (id, name, team) in roster {
        host.join(ARENA, id, name, Some(team), InventorySnapshot::empty())
            .expect("join should succeed");
    }
    pump(&mut host, "join");

    for (id, _, _) in roster {
        host.ready(ARENA, id).expect("ready should succeed");
    }
    pump(&mut host, "ready");

    // Countdown.
    host.tick_by(3);
    pump(&mut host, "start");
    println!("phase after countdown: {}", host.arena(ARENA).unwrap().phase());

    // Red loses a life, alice respawns.
    host.player_death(
        ARENA,
        PlayerId(1),
        DeathInfo::by_player(PlayerId(3), DamageCause::Attack),
    );
    host.tick_by(1);
    pump(&mut host, "first blood");

    // Red's second life goes: team eliminated, match decided.
    host.player_death(
        ARENA,
        PlayerId(2),
        DeathInfo::by_player(PlayerId(4), DamageCause::Projectile),
    );
    pump(&mut host, "elimination");
    println!("phase after elimination: {}", host.arena(ARENA).unwrap().phase());

    // End sequence and reset.
    host.tick_by(2);
    pump(&mut host, "reset");
    println!("phase after reset: {}", host.arena(ARENA).unwrap().phase());

    // Delayed inventory give-back.
    host.tick_by(60);
    pump(&mut host, "inventory");
}
