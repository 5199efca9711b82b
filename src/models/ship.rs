use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const ROLE_COMMAND: &str = "COMMAND";
pub const ROLE_EXCAVATOR: &str = "EXCAVATOR";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Ship {
    pub symbol: String,
    pub registration: ShipRegistration,
    pub nav: ShipNav,
    pub fuel: ShipFuel,
    pub cargo: ShipCargo,
    #[serde(default)]
    pub mounts: Vec<ShipMount>,
}

impl Ship {
    pub fn name(&self) -> &str {
        &self.registration.name
    }

    pub fn role(&self) -> &str {
        &self.registration.role
    }

    pub fn is_docked(&self) -> bool {
        self.nav.status == NavStatus::Docked
    }

    pub fn is_in_orbit(&self) -> bool {
        self.nav.status == NavStatus::InOrbit
    }

    pub fn is_in_transit(&self) -> bool {
        self.nav.status == NavStatus::InTransit
    }

    /// True when any mount symbol starts with `prefix` (e.g. `MOUNT_SURVEYOR` matches `MOUNT_SURVEYOR_II`)
    pub fn has_mount(&self, prefix: &str) -> bool {
        self.mounts.iter().any(|mount| mount.symbol.starts_with(prefix))
    }

    pub fn held_units(&self, trade_symbol: &str) -> i32 {
        self.cargo
            .inventory
            .iter()
            .filter(|item| item.symbol == trade_symbol)
            .map(|item| item.units)
            .sum()
    }

    /// Cargo occupancy as a fraction of capacity. A hold with no capacity counts as full.
    pub fn cargo_fill(&self) -> f64 {
        if self.cargo.capacity <= 0 {
            return 1.0;
        }
        self.cargo.units as f64 / self.cargo.capacity as f64
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipRegistration {
    pub name: String,
    #[serde(rename = "factionSymbol")]
    pub faction_symbol: String,
    pub role: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavStatus {
    Docked,
    InOrbit,
    InTransit,
}

impl std::fmt::Display for NavStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            NavStatus::Docked => "DOCKED",
            NavStatus::InOrbit => "IN_ORBIT",
            NavStatus::InTransit => "IN_TRANSIT",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipNav {
    #[serde(rename = "systemSymbol")]
    pub system_symbol: String,
    #[serde(rename = "waypointSymbol")]
    pub waypoint_symbol: String,
    pub route: ShipRoute,
    pub status: NavStatus,
    #[serde(rename = "flightMode")]
    pub flight_mode: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipRoute {
    pub destination: ShipRouteWaypoint,
    pub origin: ShipRouteWaypoint,
    #[serde(rename = "departureTime")]
    pub departure_time: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipRouteWaypoint {
    pub symbol: String,
    #[serde(rename = "type")]
    pub waypoint_type: String,
    #[serde(rename = "systemSymbol")]
    pub system_symbol: String,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipMount {
    pub symbol: String,
    pub name: String,
    pub description: Option<String>,
    pub strength: Option<i32>,
    pub deposits: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipCooldown {
    #[serde(rename = "shipSymbol")]
    pub ship_symbol: String,
    #[serde(rename = "totalSeconds")]
    pub total_seconds: i32,
    #[serde(rename = "remainingSeconds")]
    pub remaining_seconds: i32,
    pub expiration: Option<DateTime<Utc>>,
}

impl ShipCooldown {
    /// When the ship may act again; falls back to `now + remaining` if the service omitted the expiration.
    pub fn ready_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.expiration
            .unwrap_or_else(|| now + Duration::seconds(i64::from(self.remaining_seconds.max(0))))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipCargo {
    pub capacity: i32,
    pub units: i32,
    pub inventory: Vec<CargoItem>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CargoItem {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub units: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipFuel {
    pub current: i32,
    pub capacity: i32,
    pub consumed: Option<ShipFuelConsumed>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ShipFuelConsumed {
    pub amount: i32,
    pub timestamp: DateTime<Utc>,
}

// Navigation-related structures
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NavigationData {
    pub fuel: ShipFuel,
    pub nav: ShipNav,
}

// Agent structure (ship-related context)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Agent {
    #[serde(rename = "accountId", default)]
    pub account_id: String,
    pub symbol: String,
    pub headquarters: String,
    pub credits: i64,
    #[serde(rename = "startingFaction")]
    pub starting_faction: String,
    #[serde(rename = "shipCount", default)]
    pub ship_count: i32,
}
