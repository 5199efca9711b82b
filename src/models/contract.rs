use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CONTRACT_TYPE_PROCUREMENT: &str = "PROCUREMENT";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Contract {
    pub id: String,
    #[serde(rename = "factionSymbol")]
    pub faction_symbol: String,
    #[serde(rename = "type")]
    pub contract_type: String,
    pub terms: ContractTerms,
    pub accepted: bool,
    pub fulfilled: bool,
    pub expiration: DateTime<Utc>,
    #[serde(rename = "deadlineToAccept")]
    pub deadline_to_accept: Option<DateTime<Utc>>,
}

impl Contract {
    /// Delivery terms that still need units
    pub fn unmet_deliveries(&self) -> impl Iterator<Item = &DeliveryItem> {
        self.terms.deliver.iter().filter(|d| !d.is_satisfied())
    }

    pub fn materials(&self) -> Vec<&str> {
        self.terms.deliver.iter().map(|d| d.trade_symbol.as_str()).collect()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ContractTerms {
    pub deadline: DateTime<Utc>,
    pub payment: Payment,
    #[serde(default)]
    pub deliver: Vec<DeliveryItem>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Payment {
    #[serde(rename = "onAccepted")]
    pub on_accepted: i64,
    #[serde(rename = "onFulfilled")]
    pub on_fulfilled: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeliveryItem {
    #[serde(rename = "tradeSymbol")]
    pub trade_symbol: String,
    #[serde(rename = "destinationSymbol")]
    pub destination_symbol: String,
    #[serde(rename = "unitsRequired")]
    pub units_required: i32,
    #[serde(rename = "unitsFulfilled")]
    pub units_fulfilled: i32,
}

impl DeliveryItem {
    pub fn units_remaining(&self) -> i32 {
        (self.units_required - self.units_fulfilled).max(0)
    }

    pub fn is_satisfied(&self) -> bool {
        self.units_fulfilled >= self.units_required
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeliverCargoData {
    pub contract: Contract,
    pub cargo: crate::models::ShipCargo,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FulfillContractData {
    pub agent: crate::models::Agent,
    pub contract: Contract,
}
