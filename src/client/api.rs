use super::action::{decode_error_response, ActionResponse, ApiFailure};
use super::GameService;
use crate::config::ApiConfig;
use crate::models::*;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct SpaceTradersClient {
    client: reqwest::Client,
    base_url: String,
    page_limit: u32,
    request_log_path: Option<PathBuf>,
}

impl SpaceTradersClient {
    pub fn new(token: &str, config: &ApiConfig) -> Result<Self, ApiFailure> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|e| ApiFailure::transport(format!("invalid agent token: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(SpaceTradersClient {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_limit: config.page_limit.max(1),
            request_log_path: config.request_log_path.as_ref().map(PathBuf::from),
        })
    }

    fn log_api_call(&self, method: &str, url: &str, body: Option<&str>, response_status: u16, response_body: &str) {
        debug!("🌐 {} {} -> {}", method, url, response_status);

        let Some(path) = &self.request_log_path else {
            return;
        };

        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let log_entry = format!(
            "\n=== API CALL [{timestamp}] ===\n\
             Method: {method}\n\
             URL: {url}\n\
             Request Body: {request_body}\n\
             Response Status: {response_status}\n\
             Response Body: {response_body}\n\
             ========================================\n",
            request_body = body.unwrap_or("None"),
        );

        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(mut file) => {
                if let Err(e) = file.write_all(log_entry.as_bytes()) {
                    warn!("⚠️ Failed to write request log {}: {}", path.display(), e);
                }
            }
            Err(e) => warn!("⚠️ Failed to open request log {}: {}", path.display(), e),
        }
    }

    async fn get_text(&self, url: &str) -> Result<String, ApiFailure> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        self.log_api_call("GET", url, None, status, &text);

        if !response_ok(status) {
            return Err(read_failure(status, &text));
        }
        Ok(text)
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiFailure> {
        let url = format!("{}{}", self.base_url, path);
        let text = self.get_text(&url).await?;
        let parsed: ApiResponse<T> = serde_json::from_str(&text)?;
        Ok(parsed.data)
    }

    /// Walk `page`/`limit` pagination until `meta.total` items have been seen
    async fn get_all_pages<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiFailure> {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let url = format!("{}{}?page={}&limit={}", self.base_url, path, page, self.page_limit);
            let text = self.get_text(&url).await?;
            let parsed: PagedResponse<T> = serde_json::from_str(&text)?;
            items.extend(parsed.data);

            if page.saturating_mul(self.page_limit) >= parsed.meta.total {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    async fn post_action<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> ActionResponse<T> {
        let url = format!("{}{}", self.base_url, path);
        let payload = body.to_string();

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(response) => response,
            Err(e) => return ActionResponse::Failure(e.into()),
        };
        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return ActionResponse::Failure(e.into()),
        };
        self.log_api_call("POST", &url, Some(&payload), status, &text);

        if !response_ok(status) {
            return decode_error_response(status, &text);
        }

        match serde_json::from_str::<ApiResponse<T>>(&text) {
            Ok(parsed) => ActionResponse::Success(parsed.data),
            Err(e) => ActionResponse::Failure(e.into()),
        }
    }
}

fn response_ok(status: u16) -> bool {
    (200..300).contains(&status)
}

fn read_failure(status: u16, body: &str) -> ApiFailure {
    match decode_error_response::<()>(status, body).into_result() {
        Ok(()) => ApiFailure::api(status, None, body.to_string()),
        Err(failure) => failure,
    }
}

#[async_trait]
impl GameService for SpaceTradersClient {
    async fn get_agent(&self) -> Result<Agent, ApiFailure> {
        self.get_data("/my/agent").await
    }

    async fn list_ships(&self) -> Result<Vec<Ship>, ApiFailure> {
        self.get_all_pages("/my/ships").await
    }

    async fn get_ship(&self, ship_symbol: &str) -> Result<Ship, ApiFailure> {
        self.get_data(&format!("/my/ships/{}", ship_symbol)).await
    }

    async fn get_contract(&self, contract_id: &str) -> Result<Contract, ApiFailure> {
        self.get_data(&format!("/my/contracts/{}", contract_id)).await
    }

    async fn list_waypoints(&self, system_symbol: &str) -> Result<Vec<Waypoint>, ApiFailure> {
        self.get_all_pages(&format!("/systems/{}/waypoints", system_symbol)).await
    }

    async fn dock(&self, ship_symbol: &str) -> ActionResponse<ShipNav> {
        self.post_action::<NavData>(&format!("/my/ships/{}/dock", ship_symbol), serde_json::json!({}))
            .await
            .map(|data| data.nav)
    }

    async fn orbit(&self, ship_symbol: &str) -> ActionResponse<ShipNav> {
        self.post_action::<NavData>(&format!("/my/ships/{}/orbit", ship_symbol), serde_json::json!({}))
            .await
            .map(|data| data.nav)
    }

    async fn refuel(&self, ship_symbol: &str) -> ActionResponse<RefuelData> {
        self.post_action(&format!("/my/ships/{}/refuel", ship_symbol), serde_json::json!({}))
            .await
    }

    async fn navigate(&self, ship_symbol: &str, waypoint_symbol: &str) -> ActionResponse<NavigationData> {
        let payload = serde_json::json!({
            "waypointSymbol": waypoint_symbol
        });
        self.post_action(&format!("/my/ships/{}/navigate", ship_symbol), payload)
            .await
    }

    async fn create_survey(&self, ship_symbol: &str) -> ActionResponse<SurveyData> {
        self.post_action(&format!("/my/ships/{}/survey", ship_symbol), serde_json::json!({}))
            .await
    }

    async fn extract(&self, ship_symbol: &str, survey: Option<&Survey>) -> ActionResponse<ExtractionData> {
        let payload = match survey {
            Some(survey) => serde_json::json!({ "survey": survey }),
            None => serde_json::json!({}),
        };
        self.post_action(&format!("/my/ships/{}/extract", ship_symbol), payload)
            .await
    }

    async fn sell_cargo(&self, ship_symbol: &str, trade_symbol: &str, units: i32) -> ActionResponse<SellCargoData> {
        let payload = serde_json::json!({
            "symbol": trade_symbol,
            "units": units
        });
        self.post_action(&format!("/my/ships/{}/sell", ship_symbol), payload)
            .await
    }

    async fn deliver_cargo(
        &self,
        contract_id: &str,
        ship_symbol: &str,
        trade_symbol: &str,
        units: i32,
    ) -> ActionResponse<DeliverCargoData> {
        let payload = serde_json::json!({
            "shipSymbol": ship_symbol,
            "tradeSymbol": trade_symbol,
            "units": units
        });
        self.post_action(&format!("/my/contracts/{}/deliver", contract_id), payload)
            .await
    }

    async fn fulfill_contract(&self, contract_id: &str) -> ActionResponse<FulfillContractData> {
        self.post_action(&format!("/my/contracts/{}/fulfill", contract_id), serde_json::json!({}))
            .await
    }
}
