// Tagged results for remote ship actions, decoded once at the client boundary
use crate::models::{ApiErrorResponse, ShipCooldown};
use thiserror::Error;

/// Error code the service attaches to a 409 when a ship's cooldown has not elapsed
pub const COOLDOWN_CONFLICT_CODE: i32 = 4000;
pub const HTTP_CONFLICT: u16 = 409;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Request never produced a response (connection, timeout, TLS)
    Transport,
    /// Service answered with a non-success status
    Api,
    /// Response body did not match the expected shape
    Decode,
}

#[derive(Debug, Clone, Error)]
#[error("{kind:?} failure (status {status:?}, code {code:?}): {message}")]
pub struct ApiFailure {
    pub kind: FailureKind,
    pub status: Option<u16>,
    pub code: Option<i32>,
    pub message: String,
}

impl ApiFailure {
    pub fn transport(message: impl Into<String>) -> Self {
        Self { kind: FailureKind::Transport, status: None, code: None, message: message.into() }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self { kind: FailureKind::Decode, status: None, code: None, message: message.into() }
    }

    pub fn api(status: u16, code: Option<i32>, message: impl Into<String>) -> Self {
        Self { kind: FailureKind::Api, status: Some(status), code, message: message.into() }
    }
}

impl From<reqwest::Error> for ApiFailure {
    fn from(err: reqwest::Error) -> Self {
        ApiFailure::transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiFailure {
    fn from(err: serde_json::Error) -> Self {
        ApiFailure::decode(err.to_string())
    }
}

/// Outcome of a mutating remote call
#[derive(Debug, Clone)]
pub enum ActionResponse<T> {
    Success(T),
    CooldownActive(ShipCooldown),
    Failure(ApiFailure),
}

impl<T> ActionResponse<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ActionResponse<U> {
        match self {
            ActionResponse::Success(value) => ActionResponse::Success(f(value)),
            ActionResponse::CooldownActive(cooldown) => ActionResponse::CooldownActive(cooldown),
            ActionResponse::Failure(failure) => ActionResponse::Failure(failure),
        }
    }

    /// Collapse into a plain result for actions where a cooldown is not expected
    pub fn into_result(self) -> Result<T, ApiFailure> {
        match self {
            ActionResponse::Success(value) => Ok(value),
            ActionResponse::CooldownActive(cooldown) => Err(ApiFailure::api(
                HTTP_CONFLICT,
                Some(COOLDOWN_CONFLICT_CODE),
                format!(
                    "cooldown still active: {} of {} seconds remaining",
                    cooldown.remaining_seconds, cooldown.total_seconds
                ),
            )),
            ActionResponse::Failure(failure) => Err(failure),
        }
    }
}

impl<T> From<Result<T, ApiFailure>> for ActionResponse<T> {
    fn from(result: Result<T, ApiFailure>) -> Self {
        match result {
            Ok(value) => ActionResponse::Success(value),
            Err(failure) => ActionResponse::Failure(failure),
        }
    }
}

/// Decode a non-success response body. A 409 carrying code 4000 and a `cooldown`
/// payload becomes `CooldownActive`; everything else is a `Failure`.
pub fn decode_error_response<T>(status: u16, body: &str) -> ActionResponse<T> {
    let envelope: ApiErrorResponse = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) => {
            return ActionResponse::Failure(ApiFailure::api(status, None, body.trim().to_string()));
        }
    };
    let error = envelope.error;

    if status == HTTP_CONFLICT && error.code == COOLDOWN_CONFLICT_CODE {
        let cooldown = error
            .data
            .as_ref()
            .and_then(|data| data.get("cooldown"))
            .map(|value| serde_json::from_value::<ShipCooldown>(value.clone()));
        return match cooldown {
            Some(Ok(cooldown)) => ActionResponse::CooldownActive(cooldown),
            Some(Err(e)) => ActionResponse::Failure(ApiFailure::decode(format!(
                "malformed cooldown payload: {}",
                e
            ))),
            None => ActionResponse::Failure(ApiFailure::api(status, Some(error.code), error.message)),
        };
    }

    ActionResponse::Failure(ApiFailure::api(status, Some(error.code), error.message))
}
