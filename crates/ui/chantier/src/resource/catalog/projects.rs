use serde_json::{Map, Value, json};

use crate::form::{FormField, FormSchema, SelectOption};
use crate::resource::format::{date, money, option_label, reference};
use crate::resource::{Endpoint, Lookup, LookupOptions, ResourceMessages, reference_field};
use crate::table::Column;

use super::{ResourceDef, ResourceKind, not_before};

fn statuses() -> Vec<SelectOption> {
    vec![
        SelectOption::new("planifie", "Planned"),
        SelectOption::new("en_cours", "In progress"),
        SelectOption::new("en_pause", "On hold"),
        SelectOption::new("termine", "Finished"),
        SelectOption::new("annule", "Cancelled"),
    ]
}

pub(super) fn def() -> ResourceDef {
    ResourceDef {
        kind: ResourceKind::Projects,
        singular: "project",
        plural: "projects",
        endpoint: Endpoint::new("/projets", ResourceMessages::for_labels("project", "projects"))
            .name_keys(&["nom"]),
        deletable: true,
        no_data_message: "No projects recorded",
        lookups: vec![Lookup::new("chefChantier", "/ouvriers", &["prenom", "nom"])],
        columns,
        form,
        defaults,
    }
}

fn columns() -> Vec<Column> {
    vec![
        Column::new("nom", "Project"),
        Column::new("lieu", "Location"),
        Column::new("statut", "Status").render(|r| option_label(&statuses(), r.get("statut"))),
        Column::new("client", "Client").render(|r| reference(r.get("client"), &["nom", "prenom"])),
        Column::new("dateDebut", "Start").width(12).render(|r| date(r.get("dateDebut"))),
        Column::new("dateFin", "Planned end").width(12).render(|r| date(r.get("dateFin"))),
        Column::new("budget", "Budget").render(|r| {
            money(r.get("budget").and_then(|b| b.get("montantTotal")))
        }),
    ]
}

fn form(lookups: &LookupOptions) -> FormSchema {
    FormSchema::new(vec![
        FormField::text("nom", "Project name").required(),
        FormField::textarea("description", "Description").required(),
        FormField::text("lieu", "Location").required(),
        FormField::text("client.nom", "Client last name").required(),
        FormField::text("client.prenom", "Client first name").required(),
        FormField::email("client.email", "Client email"),
        FormField::text("client.telephone", "Client phone").required(),
        FormField::text("client.adresse", "Client address"),
        FormField::date("dateDebut", "Start date").required(),
        FormField::date("dateFin", "Planned end date")
            .required()
            .validator(not_before("dateDebut", "Must not be before the start date")),
        FormField::select("statut", "Status", statuses()).required(),
        FormField::number("budget.montantTotal", "Total budget (XOF)").required(),
        FormField::number("budget.montantRecu", "Amount received (XOF)").required(),
        FormField::number("budget.beneficePrevu", "Expected profit (XOF)"),
        FormField::text("budget.numeroCompte", "Account number"),
        reference_field("chefChantier", "Site manager", lookups).required(),
        FormField::number("planning.dureeExecution", "Duration (days)"),
        FormField::date("planning.dateLivraison", "Delivery date"),
        FormField::number("planning.nombreOuvriers", "Number of workers"),
    ])
    .description("Fields marked * are required.")
}

fn defaults() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("statut".into(), json!("planifie"));
    map
}
