use std::future::Future;

use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiError;

/// CRUD seam over one REST collection. `path` is the collection path
/// (e.g. `/projets`); `id` is the value of the resource identity key.
///
/// The UI is generic over this trait so lifecycles can be driven against an
/// in-memory backend in tests.
pub trait ResourceApi: Send + Sync + 'static {
    fn list(&self, path: &str) -> impl Future<Output = Result<Vec<Value>, ApiError>> + Send;

    fn create(
        &self,
        path: &str,
        body: Value,
    ) -> impl Future<Output = Result<Option<Value>, ApiError>> + Send;

    fn update(
        &self,
        path: &str,
        id: &str,
        body: Value,
    ) -> impl Future<Output = Result<Option<Value>, ApiError>> + Send;

    fn delete(&self, path: &str, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Accept either a bare array or an envelope `{ "data": [...] }`.
pub fn rows_from_body(body: Option<Value>) -> Result<Vec<Value>, ApiError> {
    match body {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(rows)) => Ok(rows),
        Some(Value::Object(mut obj)) => match obj.remove("data") {
            Some(Value::Array(rows)) => Ok(rows),
            _ => Err(ApiError::Decode("expected a JSON array of resources".into())),
        },
        Some(_) => Err(ApiError::Decode("expected a JSON array of resources".into())),
    }
}

impl ResourceApi for ApiClient {
    async fn list(&self, path: &str) -> Result<Vec<Value>, ApiError> {
        rows_from_body(self.get(path).await?)
    }

    async fn create(&self, path: &str, body: Value) -> Result<Option<Value>, ApiError> {
        self.post(path, &body).await
    }

    async fn update(&self, path: &str, id: &str, body: Value) -> Result<Option<Value>, ApiError> {
        self.put_item(path, id, &body).await
    }

    async fn delete(&self, path: &str, id: &str) -> Result<(), ApiError> {
        self.delete_item(path, id).await.map(|_| ())
    }
}
