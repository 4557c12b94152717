//! The back-office resources and their schemas.

use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::form::{FormSchema, SelectOption};
use crate::table::Column;

use super::{Endpoint, Lookup, LookupOptions, Row};

mod materials;
mod notifications;
mod payments;
mod projects;
mod tasks;
mod transactions;
mod workers;

/// One managed collection. Parses from the English or the backend name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ResourceKind {
    #[strum(to_string = "Projects", serialize = "projets")]
    Projects,
    #[strum(to_string = "Workers", serialize = "ouvriers")]
    Workers,
    #[strum(to_string = "Materials", serialize = "materiaux")]
    Materials,
    #[strum(to_string = "Tasks", serialize = "taches")]
    Tasks,
    #[strum(to_string = "Payments", serialize = "paiements")]
    Payments,
    #[strum(to_string = "Transactions")]
    Transactions,
    #[strum(to_string = "Notifications")]
    Notifications,
}

impl ResourceKind {
    pub fn all() -> Vec<ResourceKind> {
        ResourceKind::iter().collect()
    }

    pub fn def(self) -> ResourceDef {
        match self {
            ResourceKind::Projects => projects::def(),
            ResourceKind::Workers => workers::def(),
            ResourceKind::Materials => materials::def(),
            ResourceKind::Tasks => tasks::def(),
            ResourceKind::Payments => payments::def(),
            ResourceKind::Transactions => transactions::def(),
            ResourceKind::Notifications => notifications::def(),
        }
    }
}

/// Everything the generic page needs to manage one resource.
pub struct ResourceDef {
    pub kind: ResourceKind,
    pub singular: &'static str,
    pub plural: &'static str,
    pub endpoint: Endpoint,
    pub deletable: bool,
    pub no_data_message: &'static str,
    pub lookups: Vec<Lookup>,
    columns: fn() -> Vec<Column>,
    form: fn(&LookupOptions) -> FormSchema,
    defaults: fn() -> Map<String, Value>,
}

impl std::fmt::Debug for ResourceDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceDef")
            .field("kind", &self.kind)
            .field("path", &self.endpoint.path)
            .field("deletable", &self.deletable)
            .finish()
    }
}

impl ResourceDef {
    pub fn columns(&self) -> Vec<Column> {
        (self.columns)()
    }

    /// Form schema with reference selects filled from `lookups`.
    pub fn form_schema(&self, lookups: &LookupOptions) -> FormSchema {
        (self.form)(lookups)
    }

    /// Initial values of a fresh create form.
    pub fn defaults(&self) -> Map<String, Value> {
        (self.defaults)()
    }

    pub fn add_title(&self) -> String {
        format!("Add {}", self.singular)
    }

    pub fn edit_title(&self, row: &Row) -> String {
        format!("Edit {}", self.endpoint.row_name(row))
    }
}

fn no_defaults() -> Map<String, Value> {
    Map::new()
}

pub(crate) fn payment_modes() -> Vec<SelectOption> {
    vec![
        SelectOption::new("espece", "Cash"),
        SelectOption::new("cheque", "Cheque"),
        SelectOption::new("virement", "Bank transfer"),
        SelectOption::new("mobile_money", "Mobile money"),
    ]
}

pub(crate) fn priorities() -> Vec<SelectOption> {
    vec![
        SelectOption::new("basse", "Low"),
        SelectOption::new("moyenne", "Medium"),
        SelectOption::new("haute", "High"),
    ]
}

/// Validator factory: the field must not be before `start_field`.
pub(crate) fn not_before(
    start_field: &'static str,
    message: &'static str,
) -> impl Fn(&crate::form::FieldValue, &crate::form::FormValues) -> Option<String> + Send + Sync + 'static
{
    move |value, all| {
        let start = all.get(start_field)?;
        if start.is_empty() {
            return None;
        }
        // ISO dates order lexicographically.
        (*value.as_text() < *start.as_text()).then(|| message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn kinds_parse_from_both_names() {
        assert_eq!(ResourceKind::from_str("projects"), Ok(ResourceKind::Projects));
        assert_eq!(ResourceKind::from_str("Projets"), Ok(ResourceKind::Projects));
        assert_eq!(ResourceKind::from_str("ouvriers"), Ok(ResourceKind::Workers));
        assert!(ResourceKind::from_str("chantiers").is_err());
        assert_eq!(ResourceKind::Materials.to_string(), "Materials");
    }

    #[test]
    fn every_schema_is_well_formed() {
        let mut lookups = LookupOptions::new();
        for kind in ResourceKind::all() {
            let def = kind.def();
            assert_eq!(def.kind, kind);
            assert!(def.endpoint.path.starts_with('/'));
            assert!(!def.columns().is_empty());
            def.form_schema(&lookups)
                .check()
                .unwrap_or_else(|e| panic!("{kind}: {e}"));
            for lookup in &def.lookups {
                lookups.insert(
                    lookup.field.clone(),
                    vec![SelectOption::new("x1", "Example")],
                );
            }
            def.form_schema(&lookups)
                .check()
                .unwrap_or_else(|e| panic!("{kind} with lookups: {e}"));
            for name in def.defaults().keys() {
                assert!(def.form_schema(&lookups).field(name).is_some(), "{kind}: {name}");
            }
        }
    }

    #[test]
    fn only_notifications_are_not_deletable() {
        let kinds: Vec<ResourceKind> = ResourceKind::all()
            .into_iter()
            .filter(|k| !k.def().deletable)
            .collect();
        assert_eq!(kinds, vec![ResourceKind::Notifications]);
    }

    #[test]
    fn paths_match_backend() {
        let paths: Vec<String> = ResourceKind::all()
            .into_iter()
            .map(|k| k.def().endpoint.path)
            .collect();
        assert_eq!(
            paths,
            vec![
                "/projets",
                "/ouvriers",
                "/materiaux",
                "/taches",
                "/paiements",
                "/transactions",
                "/notifications"
            ]
        );
    }
}
