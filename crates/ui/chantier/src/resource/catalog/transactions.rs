use serde_json::{Map, Value, json};

use crate::form::{FormField, FormSchema, SelectOption};
use crate::resource::format::{date, money, option_label, reference};
use crate::resource::{Endpoint, Lookup, LookupOptions, ResourceMessages, reference_field};
use crate::table::Column;

use super::{ResourceDef, ResourceKind, payment_modes};

fn directions() -> Vec<SelectOption> {
    vec![
        SelectOption::new("entree", "Income"),
        SelectOption::new("sortie", "Expense"),
    ]
}

fn categories() -> Vec<SelectOption> {
    vec![
        SelectOption::new("paiement_client", "Client payment"),
        SelectOption::new("achat_materiaux", "Material purchase"),
        SelectOption::new("salaire_ouvriers", "Worker wages"),
        SelectOption::new("salaire_personnel", "Staff salaries"),
        SelectOption::new("logement_ouvriers", "Worker housing"),
        SelectOption::new("gardiennage", "Security"),
        SelectOption::new("transport", "Transport"),
        SelectOption::new("location_materiel", "Equipment rental"),
        SelectOption::new("divers", "Miscellaneous"),
    ]
}

pub(super) fn def() -> ResourceDef {
    ResourceDef {
        kind: ResourceKind::Transactions,
        singular: "transaction",
        plural: "transactions",
        endpoint: Endpoint::new(
            "/transactions",
            ResourceMessages::for_labels("transaction", "transactions"),
        )
        .name_keys(&["referencePiece"]),
        deletable: true,
        no_data_message: "No transactions recorded",
        lookups: vec![
            Lookup::new("projet", "/projets", &["nom"]),
            Lookup::new("effectuePar", "/users", &["prenom", "nom"]),
        ],
        columns,
        form,
        defaults,
    }
}

fn columns() -> Vec<Column> {
    vec![
        Column::new("type", "Type").width(8).render(|r| option_label(&directions(), r.get("type"))),
        Column::new("montant", "Amount").render(|r| money(r.get("montant"))),
        Column::new("date", "Date").width(12).render(|r| date(r.get("date"))),
        Column::new("categorie", "Category").render(|r| option_label(&categories(), r.get("categorie"))),
        Column::new("projet", "Project").render(|r| reference(r.get("projet"), &["nom"])),
        Column::new("description", "Description").unsortable(),
        Column::new("referencePiece", "Reference"),
        Column::new("modePaiement", "Mode").render(|r| option_label(&payment_modes(), r.get("modePaiement"))),
        Column::new("effectuePar", "By")
            .unsortable()
            .render(|r| reference(r.get("effectuePar"), &["prenom", "nom"])),
    ]
}

fn form(lookups: &LookupOptions) -> FormSchema {
    FormSchema::new(vec![
        FormField::select("type", "Type", directions()).required(),
        FormField::number("montant", "Amount (XOF)")
            .required()
            .validator(|value, _| {
                value
                    .as_f64()
                    .filter(|amount| *amount <= 0.0)
                    .map(|_| "Must be greater than zero".to_string())
            }),
        FormField::date("date", "Date").required(),
        FormField::select("categorie", "Category", categories()).required(),
        reference_field("projet", "Project", lookups).required(),
        FormField::textarea("description", "Description").required(),
        FormField::text("referencePiece", "Document reference"),
        FormField::select("modePaiement", "Payment mode", payment_modes()).required(),
        FormField::text("beneficiaire", "Beneficiary"),
        reference_field("effectuePar", "Recorded by", lookups).required(),
    ])
}

fn defaults() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("type".into(), json!("sortie"));
    map.insert("modePaiement".into(), json!("espece"));
    map
}
