// Client module - remote game service boundary
pub mod action;
pub mod api;

pub use action::{decode_error_response, ActionResponse, ApiFailure, FailureKind};
pub use api::SpaceTradersClient;

use crate::models::*;
use async_trait::async_trait;

/// Remote game service as seen by the engine. Reads fail with `ApiFailure`;
/// mutating ship actions return the tagged `ActionResponse`.
#[async_trait]
pub trait GameService: Send + Sync {
    async fn get_agent(&self) -> Result<Agent, ApiFailure>;
    async fn list_ships(&self) -> Result<Vec<Ship>, ApiFailure>;
    async fn get_ship(&self, ship_symbol: &str) -> Result<Ship, ApiFailure>;
    async fn get_contract(&self, contract_id: &str) -> Result<Contract, ApiFailure>;
    async fn list_waypoints(&self, system_symbol: &str) -> Result<Vec<Waypoint>, ApiFailure>;

    async fn dock(&self, ship_symbol: &str) -> ActionResponse<ShipNav>;
    async fn orbit(&self, ship_symbol: &str) -> ActionResponse<ShipNav>;
    async fn refuel(&self, ship_symbol: &str) -> ActionResponse<RefuelData>;
    async fn navigate(&self, ship_symbol: &str, waypoint_symbol: &str) -> ActionResponse<NavigationData>;
    async fn create_survey(&self, ship_symbol: &str) -> ActionResponse<SurveyData>;
    async fn extract(&self, ship_symbol: &str, survey: Option<&Survey>) -> ActionResponse<ExtractionData>;
    async fn sell_cargo(&self, ship_symbol: &str, trade_symbol: &str, units: i32) -> ActionResponse<SellCargoData>;
    async fn deliver_cargo(
        &self,
        contract_id: &str,
        ship_symbol: &str,
        trade_symbol: &str,
        units: i32,
    ) -> ActionResponse<DeliverCargoData>;
    async fn fulfill_contract(&self, contract_id: &str) -> ActionResponse<FulfillContractData>;
}
