//! Pure roster queries (the team manager).
//!
//! These run constantly from inside goal evaluation, so they are strictly
//! side-effect-free: no transitions, no events, no logging beyond trace.

use crate::arena::Arena;
use crate::player::PlayerRegistry;
use crate::status::PlayerStatus;
use crate::team::ArenaTeam;

/// Number of distinct teams that still have at least one fighting member.
pub fn count_active_teams(arena: &Arena, players: &PlayerRegistry) -> usize {
    teams_with_fighters(arena, players).len()
}

/// The teams that still have a fighting member, in declaration order.
pub fn teams_with_fighters<'a>(
    arena: &'a Arena,
    players: &PlayerRegistry,
) -> Vec<&'a ArenaTeam> {
    arena
        .teams()
        .iter()
        .filter(|team| {
            team.members().iter().any(|id| {
                players
                    .get(*id)
                    .is_some_and(|p| p.status() == PlayerStatus::Fight)
            })
        })
        .collect()
}

/// `true` iff every member of the team has flagged ready.
/// An empty team is vacuously ready.
pub fn is_everyone_ready(team: &ArenaTeam, players: &PlayerRegistry) -> bool {
    team.members().iter().all(|id| {
        players
            .get(*id)
            .is_some_and(|p| p.status() == PlayerStatus::Ready)
    })
}

/// How many roster members are waiting in the lobby (warm, lounging or
/// ready).
pub fn lobby_count(arena: &Arena, players: &PlayerRegistry) -> usize {
    arena
        .everyone()
        .iter()
        .filter(|id| {
            players
                .get(**id)
                .is_some_and(|p| p.status().is_in_lobby())
        })
        .count()
}

/// The readiness aggregation gating Idle → Starting: enough players are
/// present, every occupied real team is fully ready, and — unless the
/// goal plays free-for-all — at least two real teams are occupied.
pub fn ready_to_start(arena: &Arena, players: &PlayerRegistry) -> bool {
    if lobby_count(arena, players) < arena.config().min_players {
        return false;
    }
    let occupied: Vec<&ArenaTeam> = arena
        .teams()
        .iter()
        .filter(|team| !team.is_virtual() && !team.is_empty())
        .collect();
    if occupied.is_empty() {
        return false;
    }
    if !arena.free_for_all() && occupied.len() < 2 {
        return false;
    }
    occupied
        .iter()
        .all(|team| is_everyone_ready(team, players))
}

#[cfg(test)]
mod tests {
    use skirmish_core::PlayerId;

    use crate::config::ArenaConfig;

    use super::*;

    fn setup(count: u64) -> (Arena, PlayerRegistry) {
        let mut arena = Arena::new("castle", ArenaConfig::default());
        let mut players = PlayerRegistry::new();
        for id in 1..=count {
            let player = players.get_or_create(PlayerId(id), "p");
            arena.add_player(player, None).unwrap();
        }
        (arena, players)
    }

    fn set_status(players: &mut PlayerRegistry, id: u64, status: PlayerStatus) {
        players.get_mut(PlayerId(id)).unwrap().set_status(status);
    }

    #[test]
    fn test_teams_with_fighters_counts_only_fighting_members() {
        let (arena, mut players) = setup(4);
        assert_eq!(count_active_teams(&arena, &players), 0);

        for id in 1..=4 {
            set_status(&mut players, id, PlayerStatus::Warm);
            set_status(&mut players, id, PlayerStatus::Lounge);
            set_status(&mut players, id, PlayerStatus::Fight);
        }
        assert_eq!(count_active_teams(&arena, &players), 2);

        // Eliminate one whole team.
        let red: Vec<PlayerId> = arena.team("red").unwrap().members().iter().copied().collect();
        for id in red {
            players.get_mut(id).unwrap().set_status(PlayerStatus::Lost);
        }
        let remaining = teams_with_fighters(&arena, &players);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name(), "blue");
    }

    #[test]
    fn test_is_everyone_ready() {
        let (arena, mut players) = setup(2);
        for id in 1..=2 {
            set_status(&mut players, id, PlayerStatus::Warm);
            set_status(&mut players, id, PlayerStatus::Lounge);
        }
        let red = arena.team("red").unwrap();
        assert!(!is_everyone_ready(red, &players));

        let member = *red.members().iter().next().unwrap();
        players.get_mut(member).unwrap().set_status(PlayerStatus::Ready);
        assert!(is_everyone_ready(red, &players));
    }

    #[test]
    fn test_ready_to_start_needs_min_players_and_two_teams() {
        let (arena, mut players) = setup(2);
        for id in 1..=2 {
            set_status(&mut players, id, PlayerStatus::Warm);
            set_status(&mut players, id, PlayerStatus::Lounge);
            set_status(&mut players, id, PlayerStatus::Ready);
        }
        // Auto-balance put one player on each team; both ready.
        assert!(ready_to_start(&arena, &players));
    }

    #[test]
    fn test_ready_to_start_false_below_min_players() {
        let (arena, mut players) = setup(1);
        set_status(&mut players, 1, PlayerStatus::Warm);
        set_status(&mut players, 1, PlayerStatus::Lounge);
        set_status(&mut players, 1, PlayerStatus::Ready);
        assert!(!ready_to_start(&arena, &players));
    }

    #[test]
    fn test_ready_to_start_false_with_unready_member() {
        let (arena, mut players) = setup(3);
        for id in 1..=3 {
            set_status(&mut players, id, PlayerStatus::Warm);
            set_status(&mut players, id, PlayerStatus::Lounge);
        }
        set_status(&mut players, 1, PlayerStatus::Ready);
        set_status(&mut players, 2, PlayerStatus::Ready);
        assert!(!ready_to_start(&arena, &players));
    }
}
