use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Mining and Survey structures
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Survey {
    pub signature: String,
    pub symbol: String,
    pub deposits: Vec<SurveyDeposit>,
    pub expiration: DateTime<Utc>,
    pub size: String,
}

impl Survey {
    /// Deposit count per material, plus the total deposit count
    pub fn mineral_counts(&self) -> (BTreeMap<String, u32>, u32) {
        let mut counts = BTreeMap::new();
        for deposit in &self.deposits {
            *counts.entry(deposit.symbol.clone()).or_insert(0) += 1;
        }
        (counts, self.deposits.len() as u32)
    }

    /// Share of this survey's deposits held by each material
    pub fn mineral_fractions(&self) -> BTreeMap<String, f64> {
        let (counts, total) = self.mineral_counts();
        counts
            .into_iter()
            .map(|(symbol, count)| (symbol, f64::from(count) / f64::from(total)))
            .collect()
    }

    pub fn mineral_fraction(&self, material: &str) -> f64 {
        let total = self.deposits.len();
        if total == 0 {
            return 0.0;
        }
        let count = self.deposits.iter().filter(|d| d.symbol == material).count();
        count as f64 / total as f64
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration <= now
    }
}

/// Compact "IRON_ORExN, ..." rendering of a survey's deposits
pub fn format_survey(survey: &Survey) -> String {
    let (counts, _) = survey.mineral_counts();
    counts
        .iter()
        .map(|(symbol, count)| format!("{}x{}", symbol, count))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SurveyDeposit {
    pub symbol: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SurveyData {
    pub cooldown: crate::models::ShipCooldown,
    pub surveys: Vec<Survey>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExtractionData {
    pub cooldown: crate::models::ShipCooldown,
    pub extraction: ExtractionResult,
    pub cargo: crate::models::ShipCargo,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExtractionResult {
    #[serde(rename = "shipSymbol")]
    pub ship_symbol: String,
    #[serde(rename = "yield")]
    pub extraction_yield: ExtractionYield,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExtractionYield {
    pub symbol: String,
    pub units: i32,
}

// Trading structures
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SellCargoData {
    pub agent: crate::models::Agent,
    pub cargo: crate::models::ShipCargo,
    pub transaction: SellTransaction,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SellTransaction {
    #[serde(rename = "waypointSymbol")]
    pub waypoint_symbol: String,
    #[serde(rename = "shipSymbol")]
    pub ship_symbol: String,
    #[serde(rename = "tradeSymbol")]
    pub trade_symbol: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub units: i32,
    #[serde(rename = "pricePerUnit")]
    pub price_per_unit: i32,
    #[serde(rename = "totalPrice")]
    pub total_price: i32,
    pub timestamp: DateTime<Utc>,
}

// Refueling structures
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RefuelData {
    pub agent: crate::models::Agent,
    pub fuel: crate::models::ShipFuel,
    pub transaction: Option<RefuelTransaction>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RefuelTransaction {
    #[serde(rename = "waypointSymbol")]
    pub waypoint_symbol: String,
    #[serde(rename = "shipSymbol")]
    pub ship_symbol: String,
    #[serde(rename = "totalPrice")]
    pub total_price: i32,
    pub units: i32,
    pub timestamp: DateTime<Utc>,
}
