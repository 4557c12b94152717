use std::collections::HashSet;

use super::field::{FieldKind, FormField};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),
    #[error("select field `{0}` has no options")]
    EmptySelect(String),
    #[error("range field `{0}` needs min < max and a positive step")]
    InvalidRange(String),
}

/// Ordered list of fields plus popup sizing hints.
#[derive(Debug)]
pub struct FormSchema {
    pub fields: Vec<FormField>,
    pub description: Option<String>,
    pub min_width: u16,
    pub min_height: u16,
}

impl FormSchema {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self {
            fields,
            description: None,
            min_width: 72,
            min_height: 24,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn size(mut self, min_width: u16, min_height: u16) -> Self {
        self.min_width = min_width;
        self.min_height = min_height;
        self
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Structural contract of a schema: unique names, selects with options,
    /// sane range bounds.
    pub fn check(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
            match &field.kind {
                FieldKind::Select { options } if options.is_empty() => {
                    return Err(SchemaError::EmptySelect(field.name.clone()));
                }
                FieldKind::Range { min, max, step } if !(min < max && *step > 0.0) => {
                    return Err(SchemaError::InvalidRange(field.name.clone()));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::SelectOption;
    use pretty_assertions::assert_eq;

    #[test]
    fn valid_schema_passes() {
        let schema = FormSchema::new(vec![
            FormField::text("nom", "Name").required(),
            FormField::select("statut", "Status", vec![SelectOption::new("a", "A")]),
            FormField::range("progression", "Progress", 0.0, 100.0, 5.0),
        ]);
        assert_eq!(schema.check(), Ok(()));
        assert!(schema.field("statut").is_some());
        assert!(schema.field("nope").is_none());
    }

    #[test]
    fn contract_violations_are_reported() {
        let dup = FormSchema::new(vec![FormField::text("nom", "A"), FormField::text("nom", "B")]);
        assert_eq!(dup.check(), Err(SchemaError::DuplicateField("nom".into())));

        let empty = FormSchema::new(vec![FormField::select("statut", "Status", vec![])]);
        assert_eq!(empty.check(), Err(SchemaError::EmptySelect("statut".into())));

        let range = FormSchema::new(vec![FormField::range("r", "R", 10.0, 0.0, 1.0)]);
        assert_eq!(range.check(), Err(SchemaError::InvalidRange("r".into())));
    }
}
