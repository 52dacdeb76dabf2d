// Events extracted from the game log and pushed to every viewer.

use crate::domain::catalog::BuildingKind;
use std::fmt;

/// Integer block coordinates of a building. Coordinates are the building's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coords {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Coords {
    pub fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.x, self.y, self.z)
    }
}

/// A single scout report of a player's position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSighting {
    pub name: String,
    pub x: f64,
    // Vertical axis; absent when the source did not report it.
    pub y: Option<f64>,
    pub z: f64,
}

/// A damage report for one building.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingDamage {
    pub kind: BuildingKind,
    // Always within 0..=100.
    pub percent: u8,
    pub coords: Coords,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PlayerPosition(PlayerSighting),
    BuildingDamage(BuildingDamage),
    BuildingRemove { coords: Coords },
    // Bulk reset, emitted when the watch target changes or stops.
    BuildingClear,
}

impl GameEvent {
    /// Short name used in logs; matches the wire discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::PlayerPosition(_) => "player_position",
            GameEvent::BuildingDamage(_) => "building_damage",
            GameEvent::BuildingRemove { .. } => "building_remove",
            GameEvent::BuildingClear => "building_clear",
        }
    }
}
