use serde_json::{Map, Value};
use tracing::debug;

use super::path;
use super::schema::FormSchema;
use super::state::FormState;
use super::value::{FieldValue, FormValues, RawInput};

/// Validated values handed to the submit callback.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub values: FormValues,
}

impl Submission {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Nested JSON body: dot-path names become nested objects.
    pub fn to_json(&self) -> Value {
        Value::Object(path::unflatten(
            self.values.iter().map(|(k, v)| (k.as_str(), v.to_json())),
        ))
    }
}

/// Headless form: open/reset, field edits, validate-and-submit.
///
/// The form never talks to the network. The owner supplies the submitting
/// flag while a write is in flight and decides when to close.
#[derive(Debug)]
pub struct Form {
    title: String,
    schema: FormSchema,
    open: bool,
    submitting: bool,
    initial: Option<Map<String, Value>>,
    state: FormState,
}

impl Form {
    pub fn new(title: impl Into<String>, schema: FormSchema) -> Self {
        let state = FormState::from_initial(&schema, None);
        Self {
            title: title.into(),
            schema,
            open: false,
            submitting: false,
            initial: None,
            state,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn values(&self) -> &FormValues {
        &self.state.values
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.state.value(name)
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.state.error(name)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    /// Open with `initial` (or empty) values. Always resets state and errors,
    /// so opening twice with the same values yields the same state.
    pub fn open(&mut self, initial: Option<Map<String, Value>>) {
        self.state = FormState::from_initial(&self.schema, initial.as_ref());
        self.initial = initial;
        self.submitting = false;
        self.open = true;
    }

    /// Replace the initial values; an open form re-initializes when they
    /// actually changed.
    pub fn set_initial(&mut self, initial: Option<Map<String, Value>>) {
        if self.initial == initial {
            return;
        }
        if self.open {
            self.state = FormState::from_initial(&self.schema, initial.as_ref());
        }
        self.initial = initial;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.submitting = false;
        self.state = FormState::from_initial(&self.schema, None);
    }

    /// Apply one edit. Returns `false` when the edit was ignored (unknown or
    /// disabled field, or a submission is in flight).
    pub fn change(&mut self, name: &str, raw: RawInput) -> bool {
        if self.submitting {
            return false;
        }
        let Some(field) = self.schema.field(name) else {
            return false;
        };
        if field.disabled {
            return false;
        }
        let value = field.kind.coerce(raw);
        self.state.set_value(name, value);
        true
    }

    /// Run every field rule and collect all errors at once.
    pub fn validate(&mut self) -> bool {
        let errors = self
            .schema
            .fields
            .iter()
            .filter_map(|f| {
                let value = self.state.value(&f.name).cloned().unwrap_or_default();
                f.validate(&value, &self.state.values)
                    .map(|msg| (f.name.clone(), msg))
            })
            .collect();
        self.state.errors = errors;
        !self.state.has_errors()
    }

    /// Validate and, when clean, return the values for the submit callback.
    /// `None` means the callback must not run: validation failed or a
    /// submission is already in flight.
    pub fn submit(&mut self) -> Option<Submission> {
        if self.submitting {
            return None;
        }
        if !self.validate() {
            debug!(title = %self.title, errors = self.state.errors.len(), "form rejected");
            return None;
        }
        let values = self
            .schema
            .fields
            .iter()
            .map(|f| {
                let value = self.state.value(&f.name).cloned().unwrap_or_default();
                (f.name.clone(), f.kind.submission_value(&value))
            })
            .collect();
        Some(Submission { values })
    }
}
