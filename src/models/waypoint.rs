use serde::{Deserialize, Serialize};

pub const TRAIT_MARKETPLACE: &str = "MARKETPLACE";
pub const TRAIT_MINERAL_DEPOSITS: &str = "MINERAL_DEPOSITS";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Waypoint {
    pub symbol: String,
    #[serde(rename = "type")]
    pub waypoint_type: String,
    #[serde(rename = "systemSymbol")]
    pub system_symbol: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub orbitals: Vec<Orbital>,
    #[serde(default)]
    pub traits: Vec<Trait>,
    pub faction: Option<WaypointFaction>,
}

impl Waypoint {
    pub fn has_trait(&self, trait_symbol: &str) -> bool {
        self.traits.iter().any(|t| t.symbol == trait_symbol)
    }

    pub fn has_marketplace(&self) -> bool {
        self.has_trait(TRAIT_MARKETPLACE)
    }

    pub fn has_mineral_deposits(&self) -> bool {
        self.has_trait(TRAIT_MINERAL_DEPOSITS)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Orbital {
    pub symbol: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Trait {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WaypointFaction {
    pub symbol: String,
}
