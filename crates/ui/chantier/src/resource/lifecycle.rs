//! Request lifecycle around one resource collection.
//!
//! [`CollectionState`] holds the pure transitions (what the page shows while
//! a call is in flight and after it completes). [`fetch`], [`write`] and
//! [`remove`] are the raw backend calls. [`ResourceLifecycle`] composes both
//! for callers that can simply `.await` (the CLI and tests); the TUI spawns the
//! raw calls and feeds their results back into the state through its action
//! channel.

use std::sync::Arc;

use api::{ApiError, ResourceApi};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::form::Submission;

use super::{ResourceMessages, Row};

/// Where a collection lives and how its rows are identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Collection path, e.g. `/projets`.
    pub path: String,
    /// Identity key of a row, `_id` for every backend collection.
    pub id_key: String,
    /// Keys joined with a space to name a row in prompts and titles.
    pub name_keys: Vec<String>,
    /// Fields entered as comma separated text but stored as arrays.
    pub list_fields: Vec<String>,
    pub messages: ResourceMessages,
}

impl Endpoint {
    pub fn new(path: impl Into<String>, messages: ResourceMessages) -> Self {
        Self {
            path: path.into(),
            id_key: "_id".to_string(),
            name_keys: Vec::new(),
            list_fields: Vec::new(),
            messages,
        }
    }

    pub fn name_keys(mut self, keys: &[&str]) -> Self {
        self.name_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn list_fields(mut self, keys: &[&str]) -> Self {
        self.list_fields = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn row_id(&self, row: &Row) -> Option<String> {
        match row.get(&self.id_key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Human name of a row, falling back to its identifier.
    pub fn row_name(&self, row: &Row) -> String {
        let name = self
            .name_keys
            .iter()
            .filter_map(|k| row.get(k).and_then(Value::as_str))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.row_id(row).unwrap_or_default()
        } else {
            name
        }
    }

    /// JSON body for a write: nested per dot-path, list fields split on commas.
    pub fn body(&self, submission: &Submission) -> Value {
        let mut body = submission.to_json();
        if let Value::Object(map) = &mut body {
            for key in &self.list_fields {
                if let Some(Value::String(text)) = map.get(key) {
                    let items = text
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| Value::String(s.to_string()))
                        .collect();
                    map.insert(key.clone(), Value::Array(items));
                }
            }
        }
        body
    }
}

/// Create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteTarget {
    Create,
    Update(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written and re-fetched; the form should close.
    Saved,
    /// Not written; the banner is set and the form stays open.
    Failed,
    /// A write is already in flight; nothing was sent.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
}

/// A delete awaiting the user's yes/no.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub id: String,
    pub name: String,
}

impl DeleteRequest {
    pub fn question(&self) -> String {
        format!("Delete {}?", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted,
    Failed,
}

/// What a page knows about its collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionState {
    pub loading: bool,
    pub error: Option<String>,
    pub data: Vec<Row>,
    pub submitting: bool,
}

impl CollectionState {
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Apply a list response. Returns `true` when `data` was replaced.
    pub fn finish_load(
        &mut self,
        result: Result<Vec<Row>, ApiError>,
        messages: &ResourceMessages,
    ) -> bool {
        self.loading = false;
        match result {
            Ok(rows) => {
                self.data = rows;
                self.error = None;
                true
            }
            Err(err) => {
                self.record(err, &messages.load_failed);
                false
            }
        }
    }

    /// Returns `false` when a submission is already in flight.
    pub fn begin_submit(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        self.submitting = true;
        self.error = None;
        true
    }

    pub fn finish_submit(
        &mut self,
        result: Result<(), ApiError>,
        messages: &ResourceMessages,
    ) -> SaveOutcome {
        self.submitting = false;
        match result {
            Ok(()) => SaveOutcome::Saved,
            Err(err) => {
                self.record(err, &messages.save_failed);
                SaveOutcome::Failed
            }
        }
    }

    /// The displayed list is never touched here; a successful delete is
    /// followed by a re-fetch.
    pub fn finish_delete(
        &mut self,
        result: Result<(), ApiError>,
        messages: &ResourceMessages,
    ) -> DeleteOutcome {
        match result {
            Ok(()) => {
                self.error = None;
                DeleteOutcome::Deleted
            }
            Err(err) => {
                self.record(err, &messages.delete_failed);
                DeleteOutcome::Failed
            }
        }
    }

    fn record(&mut self, err: ApiError, message: &str) {
        if err.is_unauthorized() {
            // The client already cleared the credential and announced it.
            debug!("request rejected as unauthorized");
            return;
        }
        warn!(error = %err, "{message}");
        self.error = Some(message.to_string());
    }
}

/// Read the collection. Non-object entries are skipped.
pub async fn fetch<A: ResourceApi>(api: &A, endpoint: &Endpoint) -> Result<Vec<Row>, ApiError> {
    let rows = api.list(&endpoint.path).await?;
    let total = rows.len();
    let rows: Vec<Row> = rows
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
    if rows.len() != total {
        warn!(path = %endpoint.path, skipped = total - rows.len(), "non-object rows in response");
    }
    debug!(path = %endpoint.path, rows = rows.len(), "collection loaded");
    Ok(rows)
}

pub async fn write<A: ResourceApi>(
    api: &A,
    endpoint: &Endpoint,
    target: &WriteTarget,
    body: Value,
) -> Result<(), ApiError> {
    match target {
        WriteTarget::Create => api.create(&endpoint.path, body).await?,
        WriteTarget::Update(id) => api.update(&endpoint.path, id, body).await?,
    };
    info!(path = %endpoint.path, ?target, "resource saved");
    Ok(())
}

pub async fn remove<A: ResourceApi>(api: &A, endpoint: &Endpoint, id: &str) -> Result<(), ApiError> {
    api.delete(&endpoint.path, id).await?;
    info!(path = %endpoint.path, id, "resource deleted");
    Ok(())
}

/// Awaitable lifecycle of one collection: load, save with re-fetch, and
/// confirmed delete with re-fetch.
pub struct ResourceLifecycle<A: ResourceApi> {
    api: Arc<A>,
    endpoint: Endpoint,
    state: CollectionState,
}

impl<A: ResourceApi> ResourceLifecycle<A> {
    pub fn new(api: Arc<A>, endpoint: Endpoint) -> Self {
        Self {
            api,
            endpoint,
            state: CollectionState::default(),
        }
    }

    pub fn state(&self) -> &CollectionState {
        &self.state
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn data(&self) -> &[Row] {
        &self.state.data
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub async fn load(&mut self) -> bool {
        self.state.begin_load();
        let result = fetch(self.api.as_ref(), &self.endpoint).await;
        self.state.finish_load(result, &self.endpoint.messages)
    }

    pub async fn save(&mut self, target: WriteTarget, submission: &Submission) -> SaveOutcome {
        if !self.state.begin_submit() {
            return SaveOutcome::Busy;
        }
        let body = self.endpoint.body(submission);
        let result = write(self.api.as_ref(), &self.endpoint, &target, body).await;
        let outcome = self.state.finish_submit(result, &self.endpoint.messages);
        if outcome == SaveOutcome::Saved {
            self.load().await;
        }
        outcome
    }

    /// `None` when the row carries no identifier.
    pub fn request_delete(&self, row: &Row) -> Option<DeleteRequest> {
        let id = self.endpoint.row_id(row)?;
        Some(DeleteRequest {
            name: self.endpoint.row_name(row),
            id,
        })
    }

    pub async fn resolve_delete(
        &mut self,
        request: DeleteRequest,
        confirmation: Confirmation,
    ) -> DeleteOutcome {
        if confirmation == Confirmation::No {
            debug!(id = %request.id, "delete cancelled");
            return DeleteOutcome::Cancelled;
        }
        let result = remove(self.api.as_ref(), &self.endpoint, &request.id).await;
        let outcome = self.state.finish_delete(result, &self.endpoint.messages);
        if outcome == DeleteOutcome::Deleted {
            self.load().await;
        }
        outcome
    }
}
