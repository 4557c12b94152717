use serde_json::{Map, Value, json};

use crate::form::{FormField, FormSchema, SelectOption};
use crate::resource::format::{date, money, option_label, reference};
use crate::resource::{Endpoint, Lookup, LookupOptions, ResourceMessages, reference_field};
use crate::table::Column;

use super::{ResourceDef, ResourceKind, not_before, payment_modes};

fn statuses() -> Vec<SelectOption> {
    vec![
        SelectOption::new("en_attente", "Pending"),
        SelectOption::new("complete", "Completed"),
        SelectOption::new("annule", "Cancelled"),
    ]
}

pub(super) fn def() -> ResourceDef {
    ResourceDef {
        kind: ResourceKind::Payments,
        singular: "payment",
        plural: "payments",
        endpoint: Endpoint::new("/paiements", ResourceMessages::for_labels("payment", "payments"))
            .name_keys(&["reference"]),
        deletable: true,
        no_data_message: "No payments recorded",
        lookups: vec![
            Lookup::new("ouvrier", "/ouvriers", &["prenom", "nom"]),
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
        Column::new("ouvrier", "Worker").render(|r| reference(r.get("ouvrier"), &["prenom", "nom"])),
        Column::new("projet", "Project").render(|r| reference(r.get("projet"), &["nom"])),
        Column::new("montant", "Amount").render(|r| money(r.get("montant"))),
        Column::new("datePaiement", "Paid on").width(12).render(|r| date(r.get("datePaiement"))),
        Column::new("periode", "Period").unsortable().render(|r| {
            let periode = r.get("periode");
            format!(
                "{} to {}",
                date(periode.and_then(|p| p.get("debut"))),
                date(periode.and_then(|p| p.get("fin")))
            )
        }),
        Column::new("nombreJours", "Days").width(5),
        Column::new("modePaiement", "Mode").render(|r| option_label(&payment_modes(), r.get("modePaiement"))),
        Column::new("statut", "Status").render(|r| option_label(&statuses(), r.get("statut"))),
        Column::new("effectuePar", "Paid by")
            .unsortable()
            .render(|r| reference(r.get("effectuePar"), &["prenom", "nom"])),
    ]
}

fn form(lookups: &LookupOptions) -> FormSchema {
    FormSchema::new(vec![
        reference_field("ouvrier", "Worker", lookups).required(),
        reference_field("projet", "Project", lookups).required(),
        FormField::number("montant", "Amount (XOF)").required(),
        FormField::date("datePaiement", "Payment date").required(),
        FormField::date("periode.debut", "Period start").required(),
        FormField::date("periode.fin", "Period end")
            .required()
            .validator(not_before("periode.debut", "Must not be before the period start")),
        FormField::number("nombreJours", "Number of days").required(),
        FormField::number("tauxJournalier", "Daily rate (XOF)").required(),
        FormField::select("modePaiement", "Payment mode", payment_modes()).required(),
        FormField::text("reference", "Payment reference"),
        FormField::select("statut", "Status", statuses()).required(),
        reference_field("effectuePar", "Paid by", lookups).required(),
        FormField::textarea("commentaire", "Comment"),
    ])
}

fn defaults() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("modePaiement".into(), json!("espece"));
    map.insert("statut".into(), json!("complete"));
    map
}
