//! Per-player match statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The statistic counters tracked per player and arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Kills,
    Deaths,
    Wins,
    Losses,
    Damage,
    MaxDamage,
    DamageTaken,
    MaxDamageTaken,
}

/// A sheet of statistic counters.
///
/// Counters are created on first touch; reading an untouched counter
/// yields zero. The persistence layer is notified of increments through
/// arena events — the sheet itself never leaves the process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSheet(BTreeMap<StatKind, u64>);

impl StatSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a counter (zero if never touched).
    pub fn get(&self, kind: StatKind) -> u64 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    /// Adds one to a counter.
    pub fn increment(&mut self, kind: StatKind) {
        self.add(kind, 1);
    }

    /// Adds `value` to a counter.
    pub fn add(&mut self, kind: StatKind, value: u64) {
        *self.0.entry(kind).or_insert(0) += value;
    }

    /// Overwrites a counter.
    pub fn set(&mut self, kind: StatKind, value: u64) {
        self.0.insert(kind, value);
    }

    /// Raises a counter to `value` if it is currently lower. Used for the
    /// max-damage style counters.
    pub fn record_max(&mut self, kind: StatKind, value: u64) {
        let entry = self.0.entry(kind).or_insert(0);
        if value > *entry {
            *entry = value;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untouched_counter_reads_zero() {
        let sheet = StatSheet::new();
        assert_eq!(sheet.get(StatKind::Kills), 0);
    }

    #[test]
    fn test_increment_and_add() {
        let mut sheet = StatSheet::new();
        sheet.increment(StatKind::Kills);
        sheet.add(StatKind::Kills, 2);
        assert_eq!(sheet.get(StatKind::Kills), 3);
    }

    #[test]
    fn test_record_max_keeps_the_larger_value() {
        let mut sheet = StatSheet::new();
        sheet.record_max(StatKind::MaxDamage, 10);
        sheet.record_max(StatKind::MaxDamage, 4);
        assert_eq!(sheet.get(StatKind::MaxDamage), 10);
        sheet.record_max(StatKind::MaxDamage, 12);
        assert_eq!(sheet.get(StatKind::MaxDamage), 12);
    }

    #[test]
    fn test_stat_kind_serializes_snake_case() {
        let json = serde_json::to_string(&StatKind::MaxDamageTaken).unwrap();
        assert_eq!(json, "\"max_damage_taken\"");
    }
}
