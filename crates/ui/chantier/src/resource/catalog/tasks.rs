use serde_json::{Map, Value, json};

use crate::form::{FormField, FormSchema, SelectOption};
use crate::resource::format::{date, option_label, reference};
use crate::resource::{Endpoint, Lookup, LookupOptions, ResourceMessages, reference_field};
use crate::table::{Column, raw_cell};

use super::{ResourceDef, ResourceKind, not_before, priorities};

fn statuses() -> Vec<SelectOption> {
    vec![
        SelectOption::new("a_faire", "To do"),
        SelectOption::new("en_cours", "In progress"),
        SelectOption::new("termine", "Done"),
        SelectOption::new("en_retard", "Late"),
    ]
}

pub(super) fn def() -> ResourceDef {
    ResourceDef {
        kind: ResourceKind::Tasks,
        singular: "task",
        plural: "tasks",
        endpoint: Endpoint::new("/taches", ResourceMessages::for_labels("task", "tasks"))
            .name_keys(&["titre"]),
        deletable: true,
        no_data_message: "No tasks recorded",
        lookups: vec![
            Lookup::new("projet", "/projets", &["nom"]),
            Lookup::new("assigneA", "/users", &["prenom", "nom"]),
        ],
        columns,
        form,
        defaults,
    }
}

fn columns() -> Vec<Column> {
    vec![
        Column::new("titre", "Title"),
        Column::new("projet", "Project").render(|r| reference(r.get("projet"), &["nom"])),
        Column::new("statut", "Status").render(|r| option_label(&statuses(), r.get("statut"))),
        Column::new("priorite", "Priority").render(|r| option_label(&priorities(), r.get("priorite"))),
        Column::new("dateDebut", "Start").width(12).render(|r| date(r.get("dateDebut"))),
        Column::new("dateFin", "End").width(12).render(|r| date(r.get("dateFin"))),
        Column::new("progression", "Progress").width(9).render(|r| {
            match r.get("progression") {
                Some(Value::Null) | None => String::new(),
                v => format!("{}%", raw_cell(v)),
            }
        }),
    ]
}

fn form(lookups: &LookupOptions) -> FormSchema {
    FormSchema::new(vec![
        FormField::text("titre", "Title").required(),
        FormField::textarea("description", "Description").required(),
        reference_field("projet", "Project", lookups).required(),
        FormField::date("dateDebut", "Start date").required(),
        FormField::date("dateFin", "End date")
            .required()
            .validator(not_before("dateDebut", "Must not be before the start date")),
        FormField::select("statut", "Status", statuses()).required(),
        FormField::select("priorite", "Priority", priorities()).required(),
        reference_field("assigneA", "Assigned to", lookups).required(),
        FormField::range("progression", "Progress (%)", 0.0, 100.0, 5.0),
    ])
}

fn defaults() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("statut".into(), json!("a_faire"));
    map.insert("priorite".into(), json!("moyenne"));
    map
}
