// Wire protocol DTOs and conversions for messages pushed to map viewers.

use crate::domain::{BuildingDamage, BuildingKind, Coords, GameEvent, PlayerSighting};
use serde::{Deserialize, Serialize};

/// Messages the server pushes to every connected viewer, one text frame each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    PlayerPosition {
        name: String,
        x: f64,
        // Only present when the report carried a height.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<f64>,
        z: f64,
    },
    BuildingDamage {
        #[serde(rename = "buildingType")]
        building_type: String,
        percent: u8,
        coords: CoordsDto,
    },
    BuildingRemove {
        coords: CoordsDto,
    },
    // Bulk reset after the watch target changed or stopped.
    BuildingClear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordsDto {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl From<Coords> for CoordsDto {
    fn from(coords: Coords) -> Self {
        Self {
            x: coords.x,
            y: coords.y,
            z: coords.z,
        }
    }
}

impl From<CoordsDto> for Coords {
    fn from(dto: CoordsDto) -> Self {
        Coords::new(dto.x, dto.y, dto.z)
    }
}

impl From<&GameEvent> for ServerMessage {
    fn from(event: &GameEvent) -> Self {
        match event {
            GameEvent::PlayerPosition(sighting) => ServerMessage::PlayerPosition {
                name: sighting.name.clone(),
                x: sighting.x,
                y: sighting.y,
                z: sighting.z,
            },
            GameEvent::BuildingDamage(damage) => ServerMessage::BuildingDamage {
                building_type: damage.kind.display_name().to_string(),
                percent: damage.percent,
                coords: damage.coords.into(),
            },
            GameEvent::BuildingRemove { coords } => ServerMessage::BuildingRemove {
                coords: (*coords).into(),
            },
            GameEvent::BuildingClear => ServerMessage::BuildingClear,
        }
    }
}

impl From<ServerMessage> for GameEvent {
    fn from(message: ServerMessage) -> Self {
        match message {
            ServerMessage::PlayerPosition { name, x, y, z } => {
                GameEvent::PlayerPosition(PlayerSighting { name, x, y, z })
            }
            ServerMessage::BuildingDamage {
                building_type,
                percent,
                coords,
            } => GameEvent::BuildingDamage(BuildingDamage {
                kind: BuildingKind::from_display_name(&building_type),
                // Keeps the [0, 100] invariant even against a misbehaving server.
                percent: percent.min(100),
                coords: coords.into(),
            }),
            ServerMessage::BuildingRemove { coords } => GameEvent::BuildingRemove {
                coords: coords.into(),
            },
            ServerMessage::BuildingClear => GameEvent::BuildingClear,
        }
    }
}

/// Serializes an event into its wire text.
pub fn encode_event(event: &GameEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ServerMessage::from(event))
}

/// Parses one wire frame back into an event.
pub fn decode_event(text: &str) -> Result<GameEvent, serde_json::Error> {
    serde_json::from_str::<ServerMessage>(text).map(GameEvent::from)
}
