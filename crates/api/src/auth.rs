use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::client::{ApiClient, Auth};
use crate::credentials::Session;
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// New account. The backend answers like a login, with a token and the user.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
}

pub fn login_endpoint() -> &'static str {
    "/auth/login"
}

pub fn register_endpoint() -> &'static str {
    "/auth/register"
}

impl ApiClient {
    /// Exchange credentials for a session token and store it.
    ///
    /// A 401 here means "wrong credentials", not "session expired", so the call
    /// goes out without the bearer header and keeps the server's message.
    pub async fn login(&self, request: &LoginRequest) -> Result<Session, ApiError> {
        let session = self
            .open_session(login_endpoint(), serde_json::to_value(request)?)
            .await?;
        info!(user = ?session.display_name(), "logged in");
        Ok(session)
    }

    /// Create an account and keep the session it opens.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Session, ApiError> {
        let session = self
            .open_session(register_endpoint(), serde_json::to_value(request)?)
            .await?;
        info!(user = ?session.display_name(), role = %request.role, "account registered");
        Ok(session)
    }

    async fn open_session(&self, endpoint: &str, body: Value) -> Result<Session, ApiError> {
        let response = self
            .send(Method::POST, endpoint, Some(&body), Auth::Anonymous)
            .await?
            .ok_or_else(|| ApiError::Decode("empty authentication response".into()))?;

        let session = session_from_body(response)?;
        self.credentials()
            .store(session.clone())
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.credentials()
            .clear()
            .map_err(|e| ApiError::Transport(e.to_string()))
    }
}

fn session_from_body(mut body: Value) -> Result<Session, ApiError> {
    let token = body
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Decode("login response carries no token".into()))?;
    let user = body.get_mut("user").map(Value::take);
    Ok(Session { token, user })
}
