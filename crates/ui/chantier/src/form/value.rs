use std::borrow::Cow;

use indexmap::IndexMap;
use serde_json::{Number, Value};

/// Current value of one form field.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Text(String),
    Number(Number),
    Bool(bool),
}

/// Flat field name -> value map, kept in schema order.
pub type FormValues = IndexMap<String, FieldValue>;

/// User input before it is coerced by the field kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Text(String),
    Checked(bool),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    /// `Null` and the empty string count as empty. `false` and `0` do not.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Number(_) | FieldValue::Bool(_) => false,
        }
    }

    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Null => Cow::Borrowed(""),
            FieldValue::Text(s) => Cow::Borrowed(s),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
            FieldValue::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Text(s) => s == "true",
            FieldValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            FieldValue::Null => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => n.as_f64(),
            FieldValue::Text(s) => parse_number(s).and_then(|n| n.as_f64()),
            _ => None,
        }
    }

    /// Lift a JSON scalar into a field value. Arrays of scalars are joined with
    /// `", "`; other compound values are kept as their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => FieldValue::Number(n.clone()),
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(items) => FieldValue::Text(
                items
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Value::Object(_) => FieldValue::Text(value.to_string()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => Value::Number(n.clone()),
            FieldValue::Bool(b) => Value::Bool(*b),
        }
    }
}

/// Parse numeric text into a JSON number, integers first. `NaN`, infinities
/// and literals that overflow `f64` are rejected.
pub fn parse_number(text: &str) -> Option<Number> {
    let t = text.trim();
    if let Ok(i) = t.parse::<i64>() {
        return Some(Number::from(i));
    }
    t.parse::<f64>().ok().and_then(Number::from_f64)
}
