// Viewer-side reconciliation of the pushed event stream into what is currently on the map.

use crate::domain::{
    BuildingRecord, Cluster, Coords, DamageTier, GameEvent, PlayerRecord, PlayerSighting,
    group_nearby_players,
};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Timeouts and grouping radius for a viewer.
#[derive(Debug, Clone)]
pub struct ReconcilerSettings {
    /// Silence after which a player disappears from the map.
    pub player_timeout: Duration,
    /// Silence after which a repaired building disappears from the map.
    pub building_dormancy: Duration,
    /// Planar distance within which players share a marker.
    pub cluster_radius: f64,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            player_timeout: Duration::from_secs(10),
            building_dormancy: Duration::from_secs(180),
            cluster_radius: 15.0,
        }
    }
}

/// One thing to draw on the map.
#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    Player {
        name: String,
        x: f64,
        z: f64,
    },
    // Count badge anchored at the seed player.
    Group {
        count: usize,
        names: Vec<String>,
        x: f64,
        z: f64,
    },
    Building {
        label: String,
        icon: &'static str,
        tier: DamageTier,
        x: i64,
        z: i64,
    },
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Player { name, x, z } => write!(f, "{name} at ({x}, {z})"),
            Marker::Group { count, names, x, z } => {
                write!(f, "+{count} [{}] at ({x}, {z})", names.join(", "))
            }
            Marker::Building {
                label,
                icon,
                tier,
                x,
                z,
            } => write!(f, "{label} {icon} {} at ({x}, {z})", tier.border_color()),
        }
    }
}

/// Local view of players and buildings for one event stream.
///
/// The caller owns the reconciler and drives `apply` and both sweeps from a single task, which
/// keeps them mutually exclusive without locking.
#[derive(Debug, Default)]
pub struct ClientReconciler {
    settings: ReconcilerSettings,
    // Insertion order is the clustering order; a refresh keeps a player's slot.
    players: Vec<PlayerRecord>,
    buildings: HashMap<Coords, BuildingRecord>,
    clusters: Vec<Cluster>,
}

impl ClientReconciler {
    pub fn new(settings: ReconcilerSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Applies one event received at `now`. Returns whether the view changed.
    pub fn apply(&mut self, event: GameEvent, now: u64) -> bool {
        match event {
            GameEvent::PlayerPosition(sighting) => {
                self.upsert_player(sighting, now);
                self.recluster();
                true
            }
            GameEvent::BuildingDamage(damage) => {
                self.buildings
                    .entry(damage.coords)
                    .and_modify(|record| record.refresh(&damage, now))
                    .or_insert_with(|| BuildingRecord::from_damage(&damage, now));
                true
            }
            GameEvent::BuildingRemove { coords } => self.buildings.remove(&coords).is_some(),
            GameEvent::BuildingClear => {
                let changed = !self.buildings.is_empty();
                self.buildings.clear();
                changed
            }
        }
    }

    /// Drops players silent for longer than the player timeout. Returns how many were dropped.
    pub fn sweep_players(&mut self, now: u64) -> usize {
        let timeout = self.settings.player_timeout.as_millis();
        let before = self.players.len();
        self.players
            .retain(|player| u128::from(now.saturating_sub(player.last_seen)) <= timeout);

        let removed = before - self.players.len();
        if removed > 0 {
            self.recluster();
        }
        removed
    }

    /// Mirrors the server rule in case a `BuildingRemove` was missed while disconnected.
    pub fn sweep_buildings(&mut self, now: u64) -> usize {
        let dormancy = self.settings.building_dormancy;
        let before = self.buildings.len();
        self.buildings
            .retain(|_, record| !record.is_dormant(now, dormancy));
        before - self.buildings.len()
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn player(&self, name: &str) -> Option<&PlayerRecord> {
        self.players.iter().find(|player| player.name == name)
    }

    pub fn building(&self, coords: &Coords) -> Option<&BuildingRecord> {
        self.buildings.get(coords)
    }

    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Player markers in cluster order, then building markers ordered by coordinates.
    pub fn markers(&self) -> Vec<Marker> {
        let mut markers: Vec<Marker> = self
            .clusters
            .iter()
            .map(|cluster| {
                let seed = cluster.seed();
                if cluster.len() == 1 {
                    Marker::Player {
                        name: seed.name.clone(),
                        x: seed.x,
                        z: seed.z,
                    }
                } else {
                    Marker::Group {
                        count: cluster.len(),
                        names: cluster.names().into_iter().map(str::to_string).collect(),
                        x: seed.x,
                        z: seed.z,
                    }
                }
            })
            .collect();

        let mut buildings: Vec<&BuildingRecord> = self.buildings.values().collect();
        buildings.sort_by_key(|record| (record.coords.x, record.coords.y, record.coords.z));
        markers.extend(buildings.into_iter().map(|record| Marker::Building {
            label: record.label(),
            icon: record.kind.icon(),
            tier: DamageTier::from_percent(record.percent),
            x: record.coords.x,
            z: record.coords.z,
        }));

        markers
    }

    fn upsert_player(&mut self, sighting: PlayerSighting, now: u64) {
        let PlayerSighting { name, x, y, z } = sighting;
        match self.players.iter_mut().find(|player| player.name == name) {
            Some(player) => {
                player.x = x;
                player.y = y;
                player.z = z;
                player.last_seen = player.last_seen.max(now);
            }
            None => self.players.push(PlayerRecord {
                name,
                x,
                y,
                z,
                last_seen: now,
            }),
        }
    }

    fn recluster(&mut self) {
        self.clusters = group_nearby_players(&self.players, self.settings.cluster_radius);
    }
}
