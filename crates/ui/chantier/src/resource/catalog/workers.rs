use serde_json::{Map, Value, json};

use crate::form::{FormField, FormSchema, SelectOption};
use crate::resource::format::{date, money, option_label};
use crate::resource::{Endpoint, LookupOptions, ResourceMessages};
use crate::table::Column;

use super::{ResourceDef, ResourceKind};

fn trades() -> Vec<SelectOption> {
    vec![
        SelectOption::new("macon", "Mason"),
        SelectOption::new("manoeuvre", "Labourer"),
        SelectOption::new("coffreur", "Formwork carpenter"),
        SelectOption::new("ferrailleur", "Steel fixer"),
        SelectOption::new("electricien", "Electrician"),
        SelectOption::new("plombier", "Plumber"),
        SelectOption::new("peintre", "Painter"),
        SelectOption::new("carreleur", "Tiler"),
        SelectOption::new("platrier", "Plasterer"),
        SelectOption::new("menuisier_alu", "Aluminium joiner"),
        SelectOption::new("menuisier_bois", "Wood joiner"),
        SelectOption::new("menuisier_metallique", "Metal joiner"),
    ]
}

pub(super) fn def() -> ResourceDef {
    ResourceDef {
        kind: ResourceKind::Workers,
        singular: "worker",
        plural: "workers",
        endpoint: Endpoint::new("/ouvriers", ResourceMessages::for_labels("worker", "workers"))
            .name_keys(&["prenom", "nom"])
            .list_fields(&["competences"]),
        deletable: true,
        no_data_message: "No workers recorded",
        lookups: Vec::new(),
        columns,
        form,
        defaults,
    }
}

fn columns() -> Vec<Column> {
    vec![
        Column::new("nom", "Name").render(|r| {
            let part = |k: &str| r.get(k).and_then(Value::as_str).unwrap_or("").to_string();
            format!("{} {}", part("prenom"), part("nom")).trim().to_string()
        }),
        Column::new("metier", "Trade").render(|r| option_label(&trades(), r.get("metier"))),
        Column::new("telephone", "Phone"),
        Column::new("tauxJournalier", "Daily rate").render(|r| money(r.get("tauxJournalier"))),
        Column::new("disponible", "Availability").render(|r| {
            match r.get("disponible").and_then(Value::as_bool) {
                Some(true) => "Available".to_string(),
                _ => "Busy".to_string(),
            }
        }),
        Column::new("projetsActuels", "Projects").unsortable().render(|r| {
            match r.get("projetsActuels").and_then(Value::as_array) {
                Some(list) if !list.is_empty() => format!("{} project(s)", list.len()),
                _ => "None".to_string(),
            }
        }),
        Column::new("dateEmbauche", "Hired").width(12).render(|r| date(r.get("dateEmbauche"))),
    ]
}

fn form(_lookups: &LookupOptions) -> FormSchema {
    FormSchema::new(vec![
        FormField::text("nom", "Last name").required(),
        FormField::text("prenom", "First name").required(),
        FormField::select("metier", "Trade", trades()).required(),
        FormField::text("telephone", "Phone").required(),
        FormField::number("tauxJournalier", "Daily rate (XOF)")
            .required()
            .validator(|value, _| {
                value
                    .as_f64()
                    .filter(|rate| *rate < 0.0)
                    .map(|_| "Must not be negative".to_string())
            }),
        FormField::checkbox("disponible", "Available"),
        FormField::text("competences", "Skills").help("Comma separated"),
        FormField::date("dateEmbauche", "Hiring date").required(),
    ])
}

fn defaults() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("disponible".into(), json!(true));
    map
}
