#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use api::{ApiError, ResourceApi};
use chantier::resource::Row;
use serde_json::{Value, json};

/// Request seen by the in-memory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Create(String),
    Update(String, String),
    Delete(String, String),
}

/// In-memory stand-in for the REST backend.
#[derive(Default)]
pub struct MemoryBackend {
    collections: Mutex<HashMap<String, Vec<Value>>>,
    calls: Mutex<Vec<Call>>,
    write_failure: Mutex<Option<ApiError>>,
    read_failure: Mutex<Option<ApiError>>,
    next_id: AtomicUsize,
}

impl MemoryBackend {
    pub fn with(path: &str, rows: Vec<Value>) -> Self {
        let backend = Self::default();
        backend
            .collections
            .lock()
            .unwrap()
            .insert(path.to_string(), rows);
        backend
    }

    pub fn fail_writes(&self, err: ApiError) {
        *self.write_failure.lock().unwrap() = Some(err);
    }

    pub fn fail_reads(&self, err: ApiError) {
        *self.read_failure.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::List(_)))
            .collect()
    }

    pub fn rows(&self, path: &str) -> Vec<Value> {
        self.collections
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn write_error(&self) -> Result<(), ApiError> {
        match self.write_failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl ResourceApi for MemoryBackend {
    async fn list(&self, path: &str) -> Result<Vec<Value>, ApiError> {
        self.record(Call::List(path.to_string()));
        if let Some(err) = self.read_failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.rows(path))
    }

    async fn create(&self, path: &str, mut body: Value) -> Result<Option<Value>, ApiError> {
        self.record(Call::Create(path.to_string()));
        self.write_error()?;
        let id = format!("new{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        if let Some(obj) = body.as_object_mut() {
            obj.insert("_id".into(), json!(id));
        }
        self.collections
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push(body.clone());
        Ok(Some(body))
    }

    async fn update(&self, path: &str, id: &str, body: Value) -> Result<Option<Value>, ApiError> {
        self.record(Call::Update(path.to_string(), id.to_string()));
        self.write_error()?;
        let mut collections = self.collections.lock().unwrap();
        let rows = collections.entry(path.to_string()).or_default();
        if let Some(row) = rows
            .iter_mut()
            .find(|r| r.get("_id").and_then(Value::as_str) == Some(id))
        {
            if let (Some(target), Some(patch)) = (row.as_object_mut(), body.as_object()) {
                for (k, v) in patch {
                    target.insert(k.clone(), v.clone());
                }
            }
        }
        Ok(None)
    }

    async fn delete(&self, path: &str, id: &str) -> Result<(), ApiError> {
        self.record(Call::Delete(path.to_string(), id.to_string()));
        self.write_error()?;
        self.collections
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .retain(|r| r.get("_id").and_then(Value::as_str) != Some(id));
        Ok(())
    }
}

pub fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap()
}

/// `count` materials named `m01`, `m02`, ...
pub fn materials(count: usize) -> Vec<Value> {
    (1..=count)
        .map(|i| {
            json!({
                "_id": format!("id{i:02}"),
                "nom": format!("m{i:02}"),
                "categorie": "ciment",
                "unite": "sac",
                "quantiteStock": i,
                "quantiteMinimum": 5,
                "prix": 4500,
            })
        })
        .collect()
}
