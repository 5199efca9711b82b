// SpaceTraders procurement engine library
// Per-ship decision engine, readiness/survey caches and the fleet loop

pub mod models;
pub mod client;
pub mod operations;
pub mod admiral;
pub mod storage;
pub mod config;
pub mod error;
pub mod verbosity;

// Re-export commonly used types
pub use models::{
    ship::{Ship, ShipNav, ShipCargo, CargoItem, NavStatus},
    contract::{Contract, DeliveryItem},
    waypoint::Waypoint,
    transaction::Survey,
};

pub use client::{ActionResponse, ApiFailure, GameService, SpaceTradersClient};
pub use admiral::{Admiral, TickReport};
pub use config::SpaceTradersConfig;
pub use error::EngineError;
pub use operations::{CargoPlan, NextStep, ShipAction, ShipOutcome};
pub use storage::{AssignmentStore, ReadinessCache, SurveyCache};

// Constants
pub const API_BASE_URL: &str = "https://api.spacetraders.io/v2";
pub const AGENT_TOKEN_FILE: &str = "AGENT_TOKEN";
