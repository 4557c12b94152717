//! Cell formatting shared by the resource column schemas.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::form::SelectOption;
use crate::table::raw_cell;

/// Whole amount in XOF with space-grouped thousands, `0 XOF` when missing.
pub fn money(value: Option<&Value>) -> String {
    let amount = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    let sign = if rounded < 0 { "-" } else { "" };
    format!("{sign}{grouped} XOF")
}

/// `2024-03-05T00:00:00.000Z` → `05 Mar 2024`. Unparseable text is shown as is.
pub fn date(value: Option<&Value>) -> String {
    let Some(Value::String(s)) = value else {
        return String::new();
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.format("%d %b %Y").to_string();
    }
    let day = s.split('T').next().unwrap_or(s);
    match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
        Ok(d) => d.format("%d %b %Y").to_string(),
        Err(_) => s.clone(),
    }
}

/// Label of a select value, or the raw value when it is not a listed option.
pub fn option_label(options: &[SelectOption], value: Option<&Value>) -> String {
    let raw = raw_cell(value);
    options
        .iter()
        .find(|o| o.value == raw)
        .map(|o| o.label.clone())
        .unwrap_or(raw)
}

/// Populated reference (`{"_id": .., "nom": ..}`) as the joined `keys`; a bare
/// identifier is shown as is.
pub fn reference(value: Option<&Value>, keys: &[&str]) -> String {
    match value {
        Some(Value::Object(obj)) => keys
            .iter()
            .filter_map(|k| obj.get(*k).and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" "),
        other => raw_cell(other),
    }
}
