use serde_json::Value;

use crate::form::{FormField, FormSchema, SelectOption};
use crate::resource::format::{money, option_label};
use crate::resource::{Endpoint, LookupOptions, ResourceMessages};
use crate::table::{Column, raw_cell};

use super::{ResourceDef, ResourceKind, no_defaults};

fn categories() -> Vec<SelectOption> {
    vec![
        SelectOption::new("ciment", "Cement"),
        SelectOption::new("fer", "Rebar"),
        SelectOption::new("sable", "Sand"),
        SelectOption::new("gravier", "Gravel"),
        SelectOption::new("grain_de_riz", "Pea gravel"),
        SelectOption::new("bois_coffrage", "Formwork timber"),
        SelectOption::new("serre_joint", "Clamps"),
        SelectOption::new("echafaudage", "Scaffolding"),
        SelectOption::new("etes_en_fer", "Steel props"),
        SelectOption::new("materiel_electrique", "Electrical supplies"),
        SelectOption::new("plomberie", "Plumbing"),
        SelectOption::new("appareil_sanitaire", "Sanitary fittings"),
    ]
}

fn units() -> Vec<SelectOption> {
    vec![
        SelectOption::new("tonne", "Tonne"),
        SelectOption::new("kg", "Kilogram"),
        SelectOption::new("m3", "Cubic metre"),
        SelectOption::new("piece", "Piece"),
        SelectOption::new("metre", "Metre"),
        SelectOption::new("lot", "Lot"),
        SelectOption::new("sac", "Bag"),
    ]
}

pub(super) fn def() -> ResourceDef {
    ResourceDef {
        kind: ResourceKind::Materials,
        singular: "material",
        plural: "materials",
        endpoint: Endpoint::new("/materiaux", ResourceMessages::for_labels("material", "materials"))
            .name_keys(&["nom"]),
        deletable: true,
        no_data_message: "No materials recorded",
        lookups: Vec::new(),
        columns,
        form,
        defaults: no_defaults,
    }
}

fn columns() -> Vec<Column> {
    vec![
        Column::new("nom", "Name"),
        Column::new("categorie", "Category").render(|r| option_label(&categories(), r.get("categorie"))),
        Column::new("unite", "Unit").width(8),
        Column::new("quantiteStock", "Stock").render(|r| {
            let stock = r.get("quantiteStock").and_then(Value::as_f64);
            let minimum = r.get("quantiteMinimum").and_then(Value::as_f64);
            let text = format!("{} {}", raw_cell(r.get("quantiteStock")), raw_cell(r.get("unite")));
            match (stock, minimum) {
                (Some(s), Some(m)) if s < m => format!("{text} (low)"),
                _ => text,
            }
        }),
        Column::new("prix", "Unit price").render(|r| money(r.get("prix"))),
    ]
}

fn form(_lookups: &LookupOptions) -> FormSchema {
    FormSchema::new(vec![
        FormField::text("nom", "Name").required(),
        FormField::select("categorie", "Category", categories()).required(),
        FormField::text("sousCategorie", "Subcategory"),
        FormField::select("unite", "Unit", units()).required(),
        FormField::number("quantiteStock", "Quantity in stock").required(),
        FormField::number("quantiteMinimum", "Minimum quantity").required(),
        FormField::number("prix", "Unit price (XOF)").required(),
        FormField::textarea("description", "Description"),
        FormField::text("emplacement", "Storage location"),
    ])
}
