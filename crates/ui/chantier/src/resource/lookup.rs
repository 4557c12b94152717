use std::collections::HashMap;

use api::{ApiError, ResourceApi};
use serde_json::Value;
use tracing::debug;

use crate::form::{FormField, SelectOption};

use super::Row;

/// Options of a reference select, fetched from another collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// Form field the options feed.
    pub field: String,
    /// Collection the options come from.
    pub path: String,
    /// Row keys joined with a space to build the option label.
    pub label_keys: Vec<String>,
}

impl Lookup {
    pub fn new(field: &str, path: &str, label_keys: &[&str]) -> Self {
        Self {
            field: field.to_string(),
            path: path.to_string(),
            label_keys: label_keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn options(&self, rows: &[Row]) -> Vec<SelectOption> {
        rows.iter()
            .filter_map(|row| {
                let id = row.get("_id").and_then(Value::as_str)?;
                let label = self
                    .label_keys
                    .iter()
                    .filter_map(|k| row.get(k).and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join(" ");
                let label = if label.is_empty() { id.to_string() } else { label };
                Some(SelectOption::new(id, label))
            })
            .collect()
    }
}

/// Field name → loaded options.
pub type LookupOptions = HashMap<String, Vec<SelectOption>>;

pub async fn load_lookup<A: ResourceApi>(
    api: &A,
    lookup: &Lookup,
) -> Result<Vec<SelectOption>, ApiError> {
    let rows: Vec<Row> = api
        .list(&lookup.path)
        .await?
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
    let options = lookup.options(&rows);
    debug!(field = %lookup.field, path = %lookup.path, options = options.len(), "lookup loaded");
    Ok(options)
}

/// Select over the loaded options, or a plain identifier input when none are
/// available.
pub fn reference_field(name: &str, label: &str, lookups: &LookupOptions) -> FormField {
    match lookups.get(name).filter(|o| !o.is_empty()) {
        Some(options) => FormField::select(name, label, options.clone()),
        None => FormField::text(name, label).help("Options unavailable, enter the identifier"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FieldKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn options_from_rows() {
        let lookup = Lookup::new("ouvrier", "/ouvriers", &["prenom", "nom"]);
        let rows: Vec<Row> = [
            json!({"_id": "w1", "prenom": "Awa", "nom": "Diop"}),
            json!({"_id": "w2"}),
            json!({"nom": "no id"}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();
        assert_eq!(
            lookup.options(&rows),
            vec![SelectOption::new("w1", "Awa Diop"), SelectOption::new("w2", "w2")]
        );
    }

    #[test]
    fn reference_field_falls_back_to_text() {
        let mut lookups = LookupOptions::new();
        assert_eq!(reference_field("projet", "Project", &lookups).kind, FieldKind::Text);
        lookups.insert("projet".into(), vec![SelectOption::new("p1", "Villa")]);
        assert!(matches!(
            reference_field("projet", "Project", &lookups).kind,
            FieldKind::Select { .. }
        ));
    }
}
