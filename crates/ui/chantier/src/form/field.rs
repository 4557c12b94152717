//! Field kinds and field descriptors.
//!
//! `FieldKind` is a closed sum type: every kind carries only the attributes
//! that make sense for it (options for selects, bounds for ranges, ...), and
//! [`FieldKind::archetype`] maps it exhaustively onto the input widget family
//! the popup renders.
//!
//! ```ignore
//! use chantier::form::{FormField, SelectOption};
//!
//! let statut = FormField::select(
//!     "statut",
//!     "Status",
//!     vec![SelectOption::new("planifie", "Planned"), SelectOption::new("en_cours", "In progress")],
//! )
//! .required();
//! ```

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::value::{FieldValue, FormValues, RawInput, parse_number};

pub const REQUIRED_MESSAGE: &str = "This field is required";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A single form field kind supported by the form system.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Number,
    Date,
    DateTime,
    Select { options: Vec<SelectOption> },
    TextArea { rows: u16 },
    Checkbox,
    Range { min: f64, max: f64, step: f64 },
}

/// Input widget family a field kind renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archetype {
    SingleLine,
    Masked,
    MultiLine,
    Toggle,
    Choice,
    Slider,
}

impl FieldKind {
    pub fn archetype(&self) -> Archetype {
        match self {
            FieldKind::Text
            | FieldKind::Email
            | FieldKind::Number
            | FieldKind::Date
            | FieldKind::DateTime => Archetype::SingleLine,
            FieldKind::Password => Archetype::Masked,
            FieldKind::TextArea { .. } => Archetype::MultiLine,
            FieldKind::Checkbox => Archetype::Toggle,
            FieldKind::Select { .. } => Archetype::Choice,
            FieldKind::Range { .. } => Archetype::Slider,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Password => "password",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
            FieldKind::Select { .. } => "select",
            FieldKind::TextArea { .. } => "textarea",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Range { .. } => "range",
        }
    }

    /// Editable through a text input.
    pub fn is_textual(&self) -> bool {
        matches!(
            self.archetype(),
            Archetype::SingleLine | Archetype::Masked | Archetype::MultiLine
        )
    }

    /// Value used when the initial data carries nothing for the field.
    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldKind::Checkbox => FieldValue::Bool(false),
            FieldKind::Range { min, .. } => serde_json::Number::from_f64(*min)
                .map(FieldValue::Number)
                .unwrap_or_default(),
            _ => FieldValue::text(""),
        }
    }

    /// Value shown when editing an existing row.
    ///
    /// Dates coming back as full ISO timestamps are cut to what the input
    /// accepts, and populated references (`{"_id": .., "nom": ..}`) are
    /// reduced to their identifier.
    pub fn initial_value(&self, raw: Option<&Value>) -> FieldValue {
        let Some(raw) = raw.filter(|v| !v.is_null()) else {
            return self.default_value();
        };
        if let Some(id) = raw.get("_id").and_then(Value::as_str) {
            return FieldValue::text(id);
        }
        match (self, raw) {
            (FieldKind::Checkbox, v) => FieldValue::Bool(FieldValue::from_json(v).as_bool()),
            (FieldKind::Date, Value::String(s)) => {
                FieldValue::text(s.split('T').next().unwrap_or(s))
            }
            (FieldKind::DateTime, Value::String(s)) => {
                FieldValue::text(s.chars().take(16).collect::<String>())
            }
            (FieldKind::Select { .. }, Value::Number(n)) => FieldValue::text(n.to_string()),
            (FieldKind::Select { .. }, Value::Bool(b)) => FieldValue::text(b.to_string()),
            (_, v) => FieldValue::from_json(v),
        }
    }

    /// Coerce raw input by kind: checkboxes become booleans, everything else
    /// stays textual (numbers are kept as numeric strings while editing).
    pub fn coerce(&self, raw: RawInput) -> FieldValue {
        match (self, raw) {
            (FieldKind::Checkbox, RawInput::Checked(b)) => FieldValue::Bool(b),
            (FieldKind::Checkbox, RawInput::Text(s)) => FieldValue::Bool(s == "true"),
            (_, RawInput::Text(s)) => FieldValue::Text(s),
            (_, RawInput::Checked(b)) => FieldValue::Text(b.to_string()),
        }
    }

    /// Built-in format check for a non-empty value.
    pub fn check(&self, value: &FieldValue) -> Option<String> {
        match self {
            FieldKind::Number => value
                .as_f64()
                .is_none()
                .then(|| "Must be a number".to_string()),
            FieldKind::Email => (!looks_like_email(&value.as_text()))
                .then(|| "Must be a valid email address".to_string()),
            FieldKind::Date => NaiveDate::parse_from_str(&value.as_text(), "%Y-%m-%d")
                .is_err()
                .then(|| "Must be a date (YYYY-MM-DD)".to_string()),
            FieldKind::DateTime => {
                let text = value.as_text();
                let ok = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
                    .iter()
                    .any(|fmt| NaiveDateTime::parse_from_str(&text, fmt).is_ok());
                (!ok).then(|| "Must be a date and time (YYYY-MM-DDTHH:MM)".to_string())
            }
            FieldKind::Select { options } => {
                let text = value.as_text();
                (!options.iter().any(|o| o.value == text))
                    .then(|| "Select one of the listed options".to_string())
            }
            FieldKind::Range { min, max, .. } => match value.as_f64() {
                Some(v) if v >= *min && v <= *max => None,
                _ => Some(format!("Must be between {min} and {max}")),
            },
            FieldKind::Text | FieldKind::Password | FieldKind::TextArea { .. } => None,
            FieldKind::Checkbox => None,
        }
    }

    /// Value handed to the submit callback. Numeric kinds become JSON numbers,
    /// an empty optional number becomes `Null`.
    pub fn submission_value(&self, value: &FieldValue) -> FieldValue {
        match self {
            FieldKind::Number | FieldKind::Range { .. } => match value {
                FieldValue::Number(_) => value.clone(),
                v if v.is_empty() => FieldValue::Null,
                v => parse_number(&v.as_text())
                    .map(FieldValue::Number)
                    .unwrap_or_else(|| v.clone()),
            },
            FieldKind::Checkbox => FieldValue::Bool(value.as_bool()),
            _ => value.clone(),
        }
    }
}

fn looks_like_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    match text.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Cross-field validator: receives the field value and every current value.
pub type Validator = Box<dyn Fn(&FieldValue, &FormValues) -> Option<String> + Send + Sync>;

/// Declarative description of a form field.
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub placeholder: Option<String>,
    pub disabled: bool,
    pub help: Option<String>,
    validator: Option<Validator>,
}

impl fmt::Debug for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormField")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("disabled", &self.disabled)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl FormField {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            placeholder: None,
            disabled: false,
            help: None,
            validator: None,
        }
    }

    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn email(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Email)
    }

    pub fn password(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Password)
    }

    pub fn number(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Number)
    }

    pub fn date(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Date)
    }

    pub fn datetime(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::DateTime)
    }

    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::new(name, label, FieldKind::Select { options })
    }

    pub fn textarea(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::TextArea { rows: 3 })
    }

    pub fn checkbox(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Checkbox)
    }

    pub fn range(
        name: impl Into<String>,
        label: impl Into<String>,
        min: f64,
        max: f64,
        step: f64,
    ) -> Self {
        Self::new(name, label, FieldKind::Range { min, max, step })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Attach optional help / hint text shown beneath the field.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Runs only on non-empty values, after the required and format checks.
    pub fn validator(
        mut self,
        f: impl Fn(&FieldValue, &FormValues) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Box::new(f));
        self
    }

    /// First failing rule for `value`, in order: required, format, custom.
    pub fn validate(&self, value: &FieldValue, all: &FormValues) -> Option<String> {
        if value.is_empty() {
            return self.required.then(|| REQUIRED_MESSAGE.to_string());
        }
        if let Some(msg) = self.kind.check(value) {
            return Some(msg);
        }
        self.validator.as_ref().and_then(|v| v(value, all))
    }
}
