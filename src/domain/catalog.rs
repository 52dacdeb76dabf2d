// Closed catalog of building types reported by the game.

/// Building types the log scanner recognizes, plus a fallback for names a newer
/// game build may introduce.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuildingKind {
    ArcherTower,
    CannonTower,
    TeslaTower,
    ArcherShip,
    CannonShip,
    TeslaShip,
    // Unrecognized display name received over the wire; rendered with the fallback icon.
    Unrecognized(String),
}

const FALLBACK_ICON: &str = "/icons/archerIcon.png";

impl BuildingKind {
    /// Every recognized kind, in the order the scanner tries them.
    pub const KNOWN: [BuildingKind; 6] = [
        BuildingKind::ArcherTower,
        BuildingKind::CannonTower,
        BuildingKind::TeslaTower,
        BuildingKind::ArcherShip,
        BuildingKind::CannonShip,
        BuildingKind::TeslaShip,
    ];

    pub fn display_name(&self) -> &str {
        match self {
            BuildingKind::ArcherTower => "Башня лучников",
            BuildingKind::CannonTower => "Башня пушкарей",
            BuildingKind::TeslaTower => "Башня тесла",
            BuildingKind::ArcherShip => "Корабль лучников",
            BuildingKind::CannonShip => "Корабль пушкарей",
            BuildingKind::TeslaShip => "Корабль тесла",
            BuildingKind::Unrecognized(name) => name,
        }
    }

    /// Maps a display name to its kind; unknown names are kept verbatim.
    pub fn from_display_name(name: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|kind| kind.display_name() == name)
            .unwrap_or_else(|| BuildingKind::Unrecognized(name.to_string()))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, BuildingKind::Unrecognized(_))
    }

    /// Marker icon for the map. Kinds without their own artwork use the archer tower icon.
    pub fn icon(&self) -> &'static str {
        match self {
            BuildingKind::ArcherTower => "/icons/archerIcon.png",
            BuildingKind::CannonTower => "/icons/cannonIcon.png",
            BuildingKind::TeslaTower => "/icons/teslaIcon.png",
            BuildingKind::ArcherShip => "/icons/archerShipIcon.png",
            BuildingKind::CannonShip => "/icons/cannonShipIcon.png",
            BuildingKind::TeslaShip | BuildingKind::Unrecognized(_) => FALLBACK_ICON,
        }
    }
}

/// Health bracket used to color building markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageTier {
    Healthy,
    Damaged,
    Critical,
}

impl DamageTier {
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            60.. => DamageTier::Healthy,
            20..=59 => DamageTier::Damaged,
            _ => DamageTier::Critical,
        }
    }

    pub fn border_color(self) -> &'static str {
        match self {
            DamageTier::Healthy => "green",
            DamageTier::Damaged => "red",
            DamageTier::Critical => "black",
        }
    }
}
