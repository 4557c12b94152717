use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::credentials::CredentialStore;
use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Emitted when the backend rejects the stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Expired,
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Whether a request carries the bearer credential and treats 401 as expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    Session,
    Anonymous,
}

/// JSON-over-HTTP client bound to one backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    credentials: CredentialStore,
    session_events: Option<UnboundedSender<SessionEvent>>,
}

impl ApiClient {
    pub fn new(options: ClientOptions, credentials: CredentialStore) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            credentials,
            session_events: None,
        })
    }

    /// Forward [`SessionEvent`]s to the UI so it can show the login boundary.
    pub fn with_session_events(mut self, tx: UnboundedSender<SessionEvent>) -> Self {
        self.session_events = Some(tx);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// URL of one item of a collection. The id is percent-encoded as a single
    /// path segment, so `/`, `?` or `#` inside it stay part of the id.
    pub fn item_url(&self, path: &str, id: &str) -> Result<Url, ApiError> {
        let base = self.url(path);
        let mut url = Url::parse(&base).map_err(|e| ApiError::Transport(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Transport(format!("{base} cannot address items")))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    pub async fn get(&self, path: &str) -> Result<Option<Value>, ApiError> {
        self.send(Method::GET, path, None, Auth::Session).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Option<Value>, ApiError> {
        self.send(Method::POST, path, Some(body), Auth::Session).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Option<Value>, ApiError> {
        self.send(Method::PUT, path, Some(body), Auth::Session).await
    }

    pub async fn delete(&self, path: &str) -> Result<Option<Value>, ApiError> {
        self.send(Method::DELETE, path, None, Auth::Session).await
    }

    pub async fn put_item(
        &self,
        path: &str,
        id: &str,
        body: &Value,
    ) -> Result<Option<Value>, ApiError> {
        let url = self.item_url(path, id)?;
        self.send_to(Method::PUT, url.into(), Some(body), Auth::Session)
            .await
    }

    pub async fn delete_item(&self, path: &str, id: &str) -> Result<Option<Value>, ApiError> {
        let url = self.item_url(path, id)?;
        self.send_to(Method::DELETE, url.into(), None, Auth::Session)
            .await
    }

    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        auth: Auth,
    ) -> Result<Option<Value>, ApiError> {
        self.send_to(method, self.url(path), body, auth).await
    }

    async fn send_to(
        &self,
        method: Method,
        url: String,
        body: Option<&Value>,
        auth: Auth,
    ) -> Result<Option<Value>, ApiError> {
        debug!(%method, %url, "api request");

        let mut request: RequestBuilder = self.http.request(method.clone(), &url);
        if auth == Auth::Session {
            if let Some(token) = self.credentials.token() {
                request = request.header(AUTHORIZATION, format!("Bearer {token}"));
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && auth == Auth::Session {
            warn!(%method, %url, "credential rejected, clearing session");
            self.expire_session();
            return Err(ApiError::Unauthorized);
        }

        let bytes = response.bytes().await?;
        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes);
            let err = ApiError::from_status(status, &text);
            warn!(%method, %url, status = status.as_u16(), error = %err, "api request failed");
            return Err(err);
        }

        if status == StatusCode::NO_CONTENT || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn expire_session(&self) {
        if let Err(err) = self.credentials.clear() {
            warn!("unable to clear stored credential: {err}");
        }
        if let Some(tx) = &self.session_events {
            tx.send(SessionEvent::Expired).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Session;
    use pretty_assertions::assert_eq;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(
            ClientOptions {
                base_url: base.into(),
                ..Default::default()
            },
            CredentialStore::in_memory(),
        )
        .unwrap()
    }

    #[test]
    fn urls_are_joined_with_a_single_slash() {
        let c = client("http://localhost:5000/api/");
        assert_eq!(c.base_url(), "http://localhost:5000/api");
        assert_eq!(c.url("/projets"), "http://localhost:5000/api/projets");
        assert_eq!(c.url("projets/42"), "http://localhost:5000/api/projets/42");
    }

    #[test]
    fn item_ids_are_a_single_encoded_segment() {
        let c = client("http://localhost:5000/api");
        assert_eq!(
            c.item_url("/projets", "65f0a1").unwrap().as_str(),
            "http://localhost:5000/api/projets/65f0a1"
        );
        assert_eq!(
            c.item_url("/projets/", "a/b?c#d").unwrap().as_str(),
            "http://localhost:5000/api/projets/a%2Fb%3Fc%23d"
        );
    }

    #[test]
    fn expiry_clears_credential_and_notifies() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let c = client(DEFAULT_BASE_URL).with_session_events(tx);
        c.credentials()
            .store(Session {
                token: "t".into(),
                user: None,
            })
            .unwrap();

        c.expire_session();

        assert!(!c.credentials().is_authenticated());
        assert_eq!(rx.try_recv().ok(), Some(SessionEvent::Expired));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let c = ApiClient::new(
            ClientOptions {
                base_url: "http://127.0.0.1:9".into(),
                timeout: Duration::from_millis(500),
            },
            CredentialStore::in_memory(),
        )
        .unwrap();
        let err = c.get("/projets").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
    }
}
