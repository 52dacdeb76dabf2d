// Last-known damage state per building, evicted once repaired and dormant.

use crate::domain::catalog::BuildingKind;
use crate::domain::event::{BuildingDamage, Coords, GameEvent};
use std::collections::HashMap;
use std::time::Duration;

/// Buildings at or above this percent count as repaired and may be evicted.
pub const HEALTHY_PERCENT: u8 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct BuildingRecord {
    pub kind: BuildingKind,
    pub percent: u8,
    pub coords: Coords,
    // Epoch milliseconds of the latest report; never decreases.
    pub last_seen: u64,
}

impl BuildingRecord {
    pub fn from_damage(damage: &BuildingDamage, now: u64) -> Self {
        Self {
            kind: damage.kind.clone(),
            percent: damage.percent,
            coords: damage.coords,
            last_seen: now,
        }
    }

    /// Overwrites the record with a newer report for the same coordinates.
    pub fn refresh(&mut self, damage: &BuildingDamage, now: u64) {
        self.kind = damage.kind.clone();
        self.percent = damage.percent;
        self.last_seen = self.last_seen.max(now);
    }

    /// Healthy buildings silent for longer than `window` are dormant. Damaged ones never are.
    pub fn is_dormant(&self, now: u64, window: Duration) -> bool {
        self.percent >= HEALTHY_PERCENT
            && u128::from(now.saturating_sub(self.last_seen)) > window.as_millis()
    }

    pub fn label(&self) -> String {
        format!("{} ({}%)", self.kind.display_name(), self.percent)
    }
}

/// Keyed by coordinates; owned by a single tailer so no locking is needed.
#[derive(Debug)]
pub struct BuildingStateStore {
    records: HashMap<Coords, BuildingRecord>,
    dormancy: Duration,
}

impl BuildingStateStore {
    pub fn new(dormancy: Duration) -> Self {
        Self {
            records: HashMap::new(),
            dormancy,
        }
    }

    pub fn upsert(&mut self, damage: &BuildingDamage, now: u64) {
        self.records
            .entry(damage.coords)
            .and_modify(|record| record.refresh(damage, now))
            .or_insert_with(|| BuildingRecord::from_damage(damage, now));
    }

    /// Removes dormant records and returns one `BuildingRemove` per eviction.
    pub fn sweep(&mut self, now: u64) -> Vec<GameEvent> {
        let dormancy = self.dormancy;
        let mut removed = Vec::new();
        self.records.retain(|coords, record| {
            if record.is_dormant(now, dormancy) {
                removed.push(GameEvent::BuildingRemove { coords: *coords });
                false
            } else {
                true
            }
        });
        removed
    }

    /// Drops everything silently; the caller broadcasts a single `BuildingClear`.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn get(&self, coords: &Coords) -> Option<&BuildingRecord> {
        self.records.get(coords)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DORMANCY: Duration = Duration::from_secs(180);

    fn damage(percent: u8, x: i64, y: i64, z: i64) -> BuildingDamage {
        BuildingDamage {
            kind: BuildingKind::ArcherTower,
            percent,
            coords: Coords::new(x, y, z),
        }
    }

    #[test]
    fn repeated_reports_overwrite_the_same_key() {
        let mut store = BuildingStateStore::new(DORMANCY);
        store.upsert(&damage(45, 10, 5, 20), 1_000);
        store.upsert(&damage(30, 10, 5, 20), 2_000);
        store.upsert(&damage(70, 10, 5, 20), 3_000);

        assert_eq!(store.len(), 1);
        let record = store.get(&Coords::new(10, 5, 20)).expect("record exists");
        assert_eq!(record.percent, 70);
        assert_eq!(record.last_seen, 3_000);
    }

    #[test]
    fn last_seen_never_moves_backwards() {
        let mut store = BuildingStateStore::new(DORMANCY);
        store.upsert(&damage(45, 1, 2, 3), 5_000);
        store.upsert(&damage(50, 1, 2, 3), 4_000);

        let record = store.get(&Coords::new(1, 2, 3)).expect("record exists");
        assert_eq!(record.percent, 50);
        assert_eq!(record.last_seen, 5_000);
    }

    #[test]
    fn healthy_dormant_building_is_evicted_exactly_once() {
        let mut store = BuildingStateStore::new(DORMANCY);
        store.upsert(&damage(45, 10, 5, 20), 0);
        store.upsert(&damage(65, 10, 5, 20), 1_000);

        // Exactly at the window boundary nothing happens yet.
        assert!(store.sweep(1_000 + 180_000).is_empty());

        let removed = store.sweep(1_000 + 180_001);
        assert_eq!(
            removed,
            vec![GameEvent::BuildingRemove {
                coords: Coords::new(10, 5, 20)
            }]
        );
        assert!(store.is_empty());
        assert!(store.sweep(10_000_000).is_empty());
    }

    #[test]
    fn damaged_building_is_never_auto_evicted() {
        let mut store = BuildingStateStore::new(DORMANCY);
        store.upsert(&damage(59, -4, 70, 12), 0);

        assert!(store.sweep(u64::MAX).is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn sweep_only_touches_dormant_records() {
        let mut store = BuildingStateStore::new(DORMANCY);
        store.upsert(&damage(100, 1, 1, 1), 0);
        store.upsert(&damage(100, 2, 2, 2), 150_000);

        let removed = store.sweep(200_000);
        assert_eq!(removed.len(), 1);
        assert!(store.get(&Coords::new(2, 2, 2)).is_some());
    }

    #[test]
    fn clear_drops_everything_without_events() {
        let mut store = BuildingStateStore::new(DORMANCY);
        store.upsert(&damage(100, 1, 1, 1), 0);
        store.upsert(&damage(10, 2, 2, 2), 0);

        store.clear();

        assert!(store.is_empty());
        assert!(store.sweep(u64::MAX).is_empty());
    }

    #[test]
    fn label_shows_type_and_percent() {
        let record = BuildingRecord::from_damage(&damage(45, 0, 0, 0), 0);
        assert_eq!(record.label(), "Башня лучников (45%)");
    }
}
