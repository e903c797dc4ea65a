//! The per-arena spawn descriptor store.

use skirmish_core::{SPAWN, SpawnDescriptor};
use tracing::debug;

use crate::SpawnError;

/// Holds every spawn descriptor an arena's configuration declared.
///
/// Declaration order is preserved — it is the tie-break order for
/// distribution and nearest-candidate queries.
#[derive(Debug, Default)]
pub struct SpawnRegistry {
    spawns: Vec<SpawnDescriptor>,
}

impl SpawnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor. The (name, team, class) triple must be
    /// unique within the registry.
    pub fn register(&mut self, spawn: SpawnDescriptor) -> Result<(), SpawnError> {
        if self.spawns.iter().any(|s| s.key() == spawn.key()) {
            return Err(SpawnError::Duplicate(spawn.node()));
        }
        debug!(spawn = %spawn.node(), "spawn registered");
        self.spawns.push(spawn);
        Ok(())
    }

    /// Removes the descriptor with exactly this identity triple.
    /// Returns `true` if one was registered.
    pub fn unregister(
        &mut self,
        name: &str,
        team: Option<&str>,
        class: Option<&str>,
    ) -> bool {
        let before = self.spawns.len();
        self.spawns.retain(|s| s.key() != (name, team, class));
        before != self.spawns.len()
    }

    pub fn all(&self) -> &[SpawnDescriptor] {
        &self.spawns
    }

    pub fn len(&self) -> usize {
        self.spawns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty()
    }

    /// Resolves a requested (name, team, class) triple, most specific
    /// first: the exact triple, then (name, team), then the bare name.
    ///
    /// Each step only matches descriptors registered at exactly that
    /// specificity — a descriptor qualified with a *different* team or
    /// class never leaks into a less specific request.
    pub fn resolve(
        &self,
        name: &str,
        team: Option<&str>,
        class: Option<&str>,
    ) -> Option<&SpawnDescriptor> {
        if team.is_some() && class.is_some() {
            if let Some(found) = self.lookup(name, team, class) {
                return Some(found);
            }
        }
        if team.is_some() {
            if let Some(found) = self.lookup(name, team, None) {
                return Some(found);
            }
        }
        self.lookup(name, None, None)
    }

    /// Resolves like [`resolve`](Self::resolve), then walks `fallbacks`
    /// (goal-declared names such as "spectator" or "exit") with the same
    /// rules until something matches.
    pub fn resolve_with_fallback(
        &self,
        name: &str,
        team: Option<&str>,
        class: Option<&str>,
        fallbacks: &[&str],
    ) -> Option<&SpawnDescriptor> {
        if let Some(found) = self.resolve(name, team, class) {
            return Some(found);
        }
        fallbacks
            .iter()
            .find_map(|fb| self.resolve(fb, team, class))
    }

    /// Fight spawn candidates for a team, in declaration order.
    ///
    /// Candidates are descriptors whose name starts with `spawn` (so
    /// `spawn`, `spawn1`, `spawn2`, ... all count) and that are qualified
    /// with this team. When a team has no qualified spawns of its own the
    /// unqualified fight spawns serve every team.
    pub fn team_fight_spawns(&self, team: &str) -> Vec<&SpawnDescriptor> {
        let owned: Vec<&SpawnDescriptor> = self
            .spawns
            .iter()
            .filter(|s| s.name.starts_with(SPAWN) && s.team.as_deref() == Some(team))
            .collect();
        if !owned.is_empty() {
            return owned;
        }
        self.free_fight_spawns()
    }

    /// Unqualified fight spawn candidates (free-for-all placement).
    pub fn free_fight_spawns(&self) -> Vec<&SpawnDescriptor> {
        self.spawns
            .iter()
            .filter(|s| s.name.starts_with(SPAWN) && s.team.is_none())
            .collect()
    }

    /// Names of the given teams that have no fight spawn at all —
    /// neither team-qualified nor covered by an unqualified one. Used by
    /// setup validation.
    pub fn missing_team_spawns(&self, teams: &[&str]) -> Vec<String> {
        teams
            .iter()
            .filter(|team| self.team_fight_spawns(team).is_empty())
            .map(|team| (*team).to_string())
            .collect()
    }

    fn lookup(
        &self,
        name: &str,
        team: Option<&str>,
        class: Option<&str>,
    ) -> Option<&SpawnDescriptor> {
        self.spawns.iter().find(|s| s.key() == (name, team, class))
    }
}

#[cfg(test)]
mod tests {
    use skirmish_core::Location;

    use super::*;

    fn loc() -> Location {
        Location::new("event", 0.0, 64.0, 0.0)
    }

    fn registry_with(spawns: Vec<SpawnDescriptor>) -> SpawnRegistry {
        let mut reg = SpawnRegistry::new();
        for s in spawns {
            reg.register(s).unwrap();
        }
        reg
    }

    #[test]
    fn test_register_rejects_duplicate_identity() {
        let mut reg = SpawnRegistry::new();
        reg.register(SpawnDescriptor::new("spawn", loc()).with_team("red"))
            .unwrap();
        let dup = reg.register(SpawnDescriptor::new("spawn", loc()).with_team("red"));
        assert!(matches!(dup, Err(SpawnError::Duplicate(_))));
    }

    #[test]
    fn test_same_name_different_team_is_not_a_duplicate() {
        let mut reg = SpawnRegistry::new();
        reg.register(SpawnDescriptor::new("spawn", loc()).with_team("red"))
            .unwrap();
        assert!(
            reg.register(SpawnDescriptor::new("spawn", loc()).with_team("blue"))
                .is_ok()
        );
    }

    #[test]
    fn test_unregister() {
        let mut reg = registry_with(vec![SpawnDescriptor::new("exit", loc())]);
        assert!(reg.unregister("exit", None, None));
        assert!(!reg.unregister("exit", None, None));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_resolve_prefers_most_specific() {
        let reg = registry_with(vec![
            SpawnDescriptor::new("spawn", Location::new("event", 1.0, 0.0, 0.0)),
            SpawnDescriptor::new("spawn", Location::new("event", 2.0, 0.0, 0.0))
                .with_team("red"),
            SpawnDescriptor::new("spawn", Location::new("event", 3.0, 0.0, 0.0))
                .with_team("red")
                .with_class("pyro"),
        ]);

        let exact = reg.resolve("spawn", Some("red"), Some("pyro")).unwrap();
        assert_eq!(exact.location.x, 3.0);

        let team_level = reg.resolve("spawn", Some("red"), Some("scout")).unwrap();
        assert_eq!(team_level.location.x, 2.0);

        let name_level = reg.resolve("spawn", Some("blue"), None).unwrap();
        assert_eq!(name_level.location.x, 1.0);
    }

    #[test]
    fn test_resolve_does_not_leak_foreign_qualifiers() {
        let reg = registry_with(vec![
            SpawnDescriptor::new("spawn", loc()).with_team("red"),
        ]);
        // A bare request must not match the red-qualified descriptor.
        assert!(reg.resolve("spawn", None, None).is_none());
        assert!(reg.resolve("spawn", Some("blue"), None).is_none());
    }

    #[test]
    fn test_resolve_with_fallback_chain() {
        let reg = registry_with(vec![
            SpawnDescriptor::new("spectator", loc()),
            SpawnDescriptor::new("exit", loc()),
        ]);
        let found = reg
            .resolve_with_fallback("lounge", Some("red"), None, &["spectator", "exit"])
            .unwrap();
        assert_eq!(found.name, "spectator");
    }

    #[test]
    fn test_team_fight_spawns_fall_back_to_unqualified() {
        let reg = registry_with(vec![
            SpawnDescriptor::new("spawn1", loc()),
            SpawnDescriptor::new("spawn2", loc()),
            SpawnDescriptor::new("spawn", loc()).with_team("red"),
        ]);
        let red = reg.team_fight_spawns("red");
        assert_eq!(red.len(), 1);
        let blue = reg.team_fight_spawns("blue");
        assert_eq!(blue.len(), 2);
    }

    #[test]
    fn test_missing_team_spawns() {
        let reg = registry_with(vec![
            SpawnDescriptor::new("spawn", loc()).with_team("red"),
            SpawnDescriptor::new("lounge", loc()),
        ]);
        assert_eq!(reg.missing_team_spawns(&["red", "blue"]), vec!["blue"]);
    }
}
