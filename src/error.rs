use crate::client::ApiFailure;
use crate::storage::StoreError;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unsupported contract type {contract_type} for contract {contract_id}")]
    UnsupportedContractType { contract_id: String, contract_type: String },

    #[error("unsupported ship role {role} for ship {ship}")]
    UnsupportedShipRole { ship: String, role: String },

    #[error("ship {ship} still in transit to {destination} after arrival time {arrival}")]
    StillInTransit {
        ship: String,
        destination: String,
        arrival: DateTime<Utc>,
    },

    #[error("no suitable action found for ship {ship} on contract {contract_id}")]
    NoSuitableAction { ship: String, contract_id: String },

    #[error("ship {0} is not in the snapshot")]
    ShipNotFound(String),

    #[error("waypoint {waypoint} not found in system {system}")]
    WaypointNotFound { system: String, waypoint: String },

    #[error("{action} failed for {subject}: {source}")]
    Remote {
        action: &'static str,
        subject: String,
        #[source]
        source: ApiFailure,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn remote(action: &'static str, subject: impl Into<String>, source: ApiFailure) -> Self {
        EngineError::Remote { action, subject: subject.into(), source }
    }

    /// Errors that only sink the current ship's decision; the tick moves on to other ships
    pub fn is_ship_local(&self) -> bool {
        matches!(
            self,
            EngineError::UnsupportedContractType { .. } | EngineError::UnsupportedShipRole { .. }
        )
    }
}
