// Domain layer: events, building state and player grouping rules.

pub mod building;
pub mod catalog;
pub mod cluster;
pub mod errors;
pub mod event;
pub mod ports;

pub use building::{BuildingRecord, BuildingStateStore, HEALTHY_PERCENT};
pub use catalog::{BuildingKind, DamageTier};
pub use cluster::{Cluster, PlayerRecord, group_nearby_players};
pub use errors::WatchError;
pub use event::{BuildingDamage, Coords, GameEvent, PlayerSighting};
pub use ports::{Clock, EventExtractor, EventSink};
