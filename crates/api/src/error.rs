use reqwest::StatusCode;
use serde_json::Value;

/// Failure modes of a backend call.
///
/// `Clone` so results can travel through the UI action channel.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Non-success status other than 401. `message` is the server-provided
    /// `message` field when present, otherwise `Error <code>: <reason>`.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// 401 on an authenticated call. The credential has already been cleared.
    #[error("session expired, please log in again")]
    Unauthorized,
    #[error("network error: {0}")]
    Transport(String),
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        ApiError::Status {
            status: status.as_u16(),
            message: status_message(status, body),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Extract a human readable message from an error response body.
pub(crate) fn status_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            format!(
                "Error {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )
        })
}
