use serde_json::{Map, Value, json};

use crate::form::{FormField, FormSchema, SelectOption};
use crate::resource::format::{date, option_label, reference};
use crate::resource::{Endpoint, Lookup, LookupOptions, ResourceMessages, reference_field};
use crate::table::Column;

use super::{ResourceDef, ResourceKind, priorities};

const MESSAGE_PREVIEW: usize = 60;

fn types() -> Vec<SelectOption> {
    vec![
        SelectOption::new("info", "Information"),
        SelectOption::new("alerte", "Alert"),
        SelectOption::new("erreur", "Error"),
        SelectOption::new("succes", "Success"),
    ]
}

pub(super) fn def() -> ResourceDef {
    ResourceDef {
        kind: ResourceKind::Notifications,
        singular: "notification",
        plural: "notifications",
        endpoint: Endpoint::new(
            "/notifications",
            ResourceMessages::for_labels("notification", "notifications"),
        )
        .name_keys(&["titre"])
        .list_fields(&["destinataires"]),
        deletable: false,
        no_data_message: "No notifications",
        lookups: vec![
            Lookup::new("destinataires", "/users", &["prenom", "nom"]),
            Lookup::new("projet", "/projets", &["nom"]),
        ],
        columns,
        form,
        defaults,
    }
}

fn columns() -> Vec<Column> {
    vec![
        Column::new("vue", "State").width(6).render(|r| {
            if r.get("vue").and_then(Value::as_bool).unwrap_or(false) {
                "Read".to_string()
            } else {
                "New".to_string()
            }
        }),
        Column::new("titre", "Title"),
        Column::new("type", "Type").render(|r| option_label(&types(), r.get("type"))),
        Column::new("priorite", "Priority").render(|r| option_label(&priorities(), r.get("priorite"))),
        Column::new("message", "Message").unsortable().render(|r| {
            let text = r.get("message").and_then(Value::as_str).unwrap_or("");
            if text.chars().count() > MESSAGE_PREVIEW {
                let cut: String = text.chars().take(MESSAGE_PREVIEW).collect();
                format!("{cut}…")
            } else {
                text.to_string()
            }
        }),
        Column::new("dateCreation", "Date").width(12).render(|r| date(r.get("dateCreation"))),
        Column::new("projet", "Project")
            .unsortable()
            .render(|r| reference(r.get("projet"), &["nom"])),
    ]
}

fn form(lookups: &LookupOptions) -> FormSchema {
    FormSchema::new(vec![
        FormField::text("titre", "Title").required(),
        FormField::textarea("message", "Message").required(),
        FormField::select("type", "Type", types()).required(),
        FormField::select("priorite", "Priority", priorities()).required(),
        reference_field("destinataires", "Recipient", lookups).required(),
        reference_field("projet", "Related project", lookups),
        FormField::text("lien", "Link (URL)"),
        FormField::checkbox("vue", "Read"),
    ])
}

fn defaults() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("type".into(), json!("info"));
    map.insert("priorite".into(), json!("moyenne"));
    map
}
