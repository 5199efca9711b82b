use serde::Deserialize;

// API Response wrappers
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct PagedResponse<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Deserialize)]
pub struct PageMeta {
    pub total: u32,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct NavData {
    pub nav: crate::models::ShipNav,
}

// Error envelope: {"error": {"code": 4000, "message": "...", "data": {"cooldown": {...}}}}
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
}
