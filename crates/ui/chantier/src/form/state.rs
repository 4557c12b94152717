use std::collections::HashMap;

use serde_json::{Map, Value};

use super::path;
use super::schema::FormSchema;
use super::value::{FieldValue, FormValues};

/// Mutable runtime state of one open form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub values: FormValues,
    /// Absence of a key means "no error".
    pub errors: HashMap<String, String>,
}

impl FormState {
    /// Fresh state for `schema`: every field takes its value from `initial`
    /// (dot paths read nested members) or its kind default.
    pub fn from_initial(schema: &FormSchema, initial: Option<&Map<String, Value>>) -> Self {
        let values = schema
            .fields
            .iter()
            .map(|f| {
                let raw = initial.and_then(|row| path::get(row, &f.name));
                (f.name.clone(), f.kind.initial_value(raw))
            })
            .collect();
        Self {
            values,
            errors: HashMap::new(),
        }
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Store a value and drop any error shown for that field.
    pub fn set_value(&mut self, name: &str, value: FieldValue) {
        self.errors.remove(name);
        self.values.insert(name.to_string(), value);
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormField;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn missing_keys_take_kind_defaults() {
        let schema = FormSchema::new(vec![
            FormField::text("nom", "Name"),
            FormField::checkbox("disponible", "Available"),
            FormField::number("budget.montantTotal", "Budget"),
        ]);
        let row = json!({"nom": "Villa", "budget": {"montantTotal": 5000}});
        let state = FormState::from_initial(&schema, row.as_object());

        assert_eq!(state.value("nom"), Some(&FieldValue::text("Villa")));
        assert_eq!(state.value("disponible"), Some(&FieldValue::Bool(false)));
        assert_eq!(
            state.value("budget.montantTotal"),
            Some(&FieldValue::Number(5000.into()))
        );
        assert!(!state.has_errors());
    }

    #[test]
    fn setting_a_value_clears_its_error() {
        let mut state = FormState::default();
        state.errors.insert("nom".into(), "This field is required".into());
        state.errors.insert("lieu".into(), "This field is required".into());
        state.set_value("nom", FieldValue::text("V"));
        assert_eq!(state.error("nom"), None);
        assert_eq!(state.error("lieu"), Some("This field is required"));
    }
}
