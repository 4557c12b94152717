//! Figures shown on the dashboard, aggregated from four collections.

use api::{ApiError, ResourceApi};
use serde_json::Value;
use tracing::debug;

use super::{ResourceKind, Row, fetch, format};

pub const DASHBOARD_LOAD_FAILED: &str = "Unable to load dashboard data.";

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashboardStats {
    pub projects: usize,
    pub projects_in_progress: usize,
    pub workers: usize,
    pub workers_available: usize,
    pub materials: usize,
    pub materials_low_stock: usize,
    pub revenue: f64,
    pub expenses: f64,
}

impl DashboardStats {
    pub fn from_collections(
        projects: &[Row],
        workers: &[Row],
        materials: &[Row],
        transactions: &[Row],
    ) -> Self {
        let total_of = |kind: &str| -> f64 {
            transactions
                .iter()
                .filter(|t| t.get("type").and_then(Value::as_str) == Some(kind))
                .filter_map(|t| number(t.get("montant")))
                .sum()
        };
        Self {
            projects: projects.len(),
            projects_in_progress: projects
                .iter()
                .filter(|p| p.get("statut").and_then(Value::as_str) == Some("en_cours"))
                .count(),
            workers: workers.len(),
            workers_available: workers
                .iter()
                .filter(|w| w.get("disponible").and_then(Value::as_bool) == Some(true))
                .count(),
            materials: materials.len(),
            materials_low_stock: materials.iter().filter(|m| is_low_stock(m)).count(),
            revenue: total_of("entree"),
            expenses: total_of("sortie"),
        }
    }

    pub fn balance(&self) -> f64 {
        self.revenue - self.expenses
    }

    /// `(label, value)` pairs in display order.
    pub fn figures(&self) -> Vec<(&'static str, String)> {
        let amount = |v: f64| {
            let value = serde_json::Number::from_f64(v).map(Value::Number);
            format::money(value.as_ref())
        };
        vec![
            ("Projects", self.projects.to_string()),
            ("In progress", self.projects_in_progress.to_string()),
            ("Workers", self.workers.to_string()),
            ("Available", self.workers_available.to_string()),
            ("Materials", self.materials.to_string()),
            ("Low stock", self.materials_low_stock.to_string()),
            ("Revenue", amount(self.revenue)),
            ("Expenses", amount(self.expenses)),
            ("Balance", amount(self.balance())),
        ]
    }
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok().filter(|f: &f64| f.is_finite()),
        _ => None,
    }
}

/// Stock strictly under the minimum. Rows missing either quantity are not
/// counted.
fn is_low_stock(material: &Row) -> bool {
    match (
        number(material.get("quantiteStock")),
        number(material.get("quantiteMinimum")),
    ) {
        (Some(stock), Some(minimum)) => stock < minimum,
        _ => false,
    }
}

/// Read the four collections concurrently; any failure fails the whole load.
pub async fn load_dashboard<A: ResourceApi>(api: &A) -> Result<DashboardStats, ApiError> {
    let endpoint = |kind: ResourceKind| kind.def().endpoint;
    let (projects_at, workers_at, materials_at, transactions_at) = (
        endpoint(ResourceKind::Projects),
        endpoint(ResourceKind::Workers),
        endpoint(ResourceKind::Materials),
        endpoint(ResourceKind::Transactions),
    );
    let (projects, workers, materials, transactions) = futures::try_join!(
        fetch(api, &projects_at),
        fetch(api, &workers_at),
        fetch(api, &materials_at),
        fetch(api, &transactions_at),
    )?;
    let stats = DashboardStats::from_collections(&projects, &workers, &materials, &transactions);
    debug!(?stats, "dashboard aggregated");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn rows(values: Value) -> Vec<Row> {
        values
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|v| v.as_object().cloned())
            .collect()
    }

    #[test]
    fn aggregates_every_figure() {
        let projects = rows(json!([
            {"statut": "en_cours"}, {"statut": "planifie"}, {"statut": "en_cours"}
        ]));
        let workers = rows(json!([{"disponible": true}, {"disponible": false}, {}]));
        let materials = rows(json!([
            {"quantiteStock": 2, "quantiteMinimum": 5},
            {"quantiteStock": 5, "quantiteMinimum": 5},
            {"quantiteStock": 9},
        ]));
        let transactions = rows(json!([
            {"type": "entree", "montant": 150000},
            {"type": "entree", "montant": "50000"},
            {"type": "sortie", "montant": 80000},
            {"type": "sortie"},
        ]));

        let stats = DashboardStats::from_collections(&projects, &workers, &materials, &transactions);
        assert_eq!(
            stats,
            DashboardStats {
                projects: 3,
                projects_in_progress: 2,
                workers: 3,
                workers_available: 1,
                materials: 3,
                materials_low_stock: 1,
                revenue: 200000.0,
                expenses: 80000.0,
            }
        );
        assert_eq!(stats.balance(), 120000.0);
    }

    #[test]
    fn figures_format_amounts() {
        let stats = DashboardStats {
            revenue: 1000.0,
            expenses: 2500.0,
            ..Default::default()
        };
        let figures = stats.figures();
        assert_eq!(figures.len(), 9);
        assert_eq!(figures[8], ("Balance", "-1 500 XOF".to_string()));
    }
}
