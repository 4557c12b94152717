//! Non-interactive subcommands.

use std::io::{self, BufRead, Write};

use api::{ApiClient, LoginRequest};
use color_eyre::{Result, eyre::eyre};
use serde_json::Value;
use tracing::info;

use crate::{
    account,
    form::{Form, RawInput},
    resource::{DASHBOARD_LOAD_FAILED, ResourceKind, fetch, load_dashboard},
    table::{Column, PageSlice, SearchScope, SortDirection, SortState, TableView},
};

pub async fn login(client: &ApiClient, email: String, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };
    let session = client.login(&LoginRequest { email, password }).await?;
    let name = session
        .display_name()
        .unwrap_or_else(|| "unknown user".to_string());
    println!("Logged in as {name}");
    Ok(())
}

/// Account details given on the command line.
#[derive(Debug, Clone)]
pub struct Registration {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub telephone: Option<String>,
    pub role: String,
}

/// Run the registration form rules over the command-line values, the
/// password doubling as its confirmation.
pub fn registration_request(
    details: &Registration,
    password: String,
) -> Result<api::RegisterRequest> {
    let mut form = Form::new("Register", account::register_schema());
    form.open(None);
    let fields = [
        ("nom", details.nom.clone()),
        ("prenom", details.prenom.clone()),
        ("email", details.email.clone()),
        ("telephone", details.telephone.clone().unwrap_or_default()),
        ("role", details.role.clone()),
        ("confirmPassword", password.clone()),
        ("password", password),
    ];
    for (name, value) in fields {
        form.change(name, RawInput::Text(value));
    }
    match form.submit() {
        Some(submission) => Ok(account::register_request(&submission)),
        None => {
            let problems: Vec<String> = form
                .schema()
                .fields
                .iter()
                .filter_map(|f| form.error(&f.name).map(|e| format!("{}: {e}", f.label)))
                .collect();
            Err(eyre!("invalid registration: {}", problems.join("; ")))
        }
    }
}

pub async fn register(
    client: &ApiClient,
    details: Registration,
    password: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };
    let request = registration_request(&details, password)?;
    let session = client.register(&request).await?;
    let name = session
        .display_name()
        .unwrap_or_else(|| request.email.clone());
    println!("Account created, logged in as {name}");
    Ok(())
}

pub async fn dashboard(client: &ApiClient) -> Result<()> {
    if !client.credentials().is_authenticated() {
        return Err(eyre!("not logged in, run `chantier login --email <email>` first"));
    }
    let stats = load_dashboard(client)
        .await
        .map_err(|err| eyre!("{DASHBOARD_LOAD_FAILED} {err}"))?;
    for (label, value) in stats.figures() {
        println!("{label:<12} {value}");
    }
    Ok(())
}

fn prompt_password() -> Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn logout(client: &ApiClient) -> Result<()> {
    client.logout()?;
    println!("Logged out");
    Ok(())
}

/// Options of `chantier list`.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub search: String,
    pub rendered: bool,
    pub sort: Option<String>,
    pub descending: bool,
    pub page: i64,
    pub json: bool,
}

impl ListOptions {
    fn view(&self) -> TableView {
        let scope = if self.rendered {
            SearchScope::IncludeRendered
        } else {
            SearchScope::RawStrings
        };
        let mut view = TableView::new().with_scope(scope);
        view.set_search(self.search.as_str());
        view.set_sort(self.sort.clone().map(|key| SortState {
            key,
            direction: if self.descending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        }));
        view
    }
}

pub async fn list(client: &ApiClient, kind: ResourceKind, options: &ListOptions) -> Result<()> {
    if !client.credentials().is_authenticated() {
        return Err(eyre!("not logged in, run `chantier login --email <email>` first"));
    }
    let def = kind.def();
    let rows = fetch(client, &def.endpoint)
        .await
        .map_err(|err| eyre!("{}: {err}", def.endpoint.messages.load_failed))?;
    let columns = def.columns();

    let mut view = options.view();
    let total = view.view(&rows, &columns).total_pages;
    view.set_page(options.page, total);
    let page = view.view(&rows, &columns);
    info!(resource = %kind, matched = page.matched, page = page.page, "listing");

    if options.json {
        let rows: Vec<Value> = page.rows.iter().map(|r| Value::Object((*r).clone())).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", plain_table(&page, &columns, def.no_data_message));
    }
    Ok(())
}

/// Fixed-width text rendering of one page, followed by the result summary.
pub fn plain_table(page: &PageSlice<'_>, columns: &[Column], no_data_message: &str) -> String {
    if page.rows.is_empty() {
        return format!("{no_data_message}\n");
    }
    let cells: Vec<Vec<String>> = page
        .rows
        .iter()
        .map(|row| columns.iter().map(|c| c.cell(row)).collect())
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.label.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: Vec<&str>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(columns.iter().map(|c| c.label.as_str()).collect()));
    out.push('\n');
    for row in &cells {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out.push_str(&page.summary());
    if page.total_pages > 1 {
        out.push_str(&format!(" (page {} of {})", page.page, page.total_pages));
    }
    out.push('\n');
    out
}

pub fn resources() -> String {
    let mut out = String::new();
    for kind in ResourceKind::all() {
        let def = kind.def();
        let delete = if def.deletable { "" } else { "  (no delete)" };
        out.push_str(&format!(
            "{:<14} {:<16}{delete}\n",
            kind.to_string().to_lowercase(),
            def.endpoint.path
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Row;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn rows() -> Vec<Row> {
        [
            json!({"_id": "1", "nom": "Ciment", "quantiteStock": 10}),
            json!({"_id": "2", "nom": "Sable", "quantiteStock": 2}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect()
    }

    #[test]
    fn plain_table_aligns_columns() {
        let columns = vec![Column::new("nom", "Name"), Column::new("quantiteStock", "Stock")];
        let data = rows();
        let mut view = ListOptions {
            sort: Some("quantiteStock".into()),
            page: 1,
            ..Default::default()
        }
        .view();
        let page = view.view(&data, &columns);
        assert_eq!(
            plain_table(&page, &columns, "Nothing"),
            "Name    Stock\nSable   2\nCiment  10\nShowing 1 to 2 of 2 results\n"
        );
    }

    #[test]
    fn empty_page_prints_no_data_message() {
        let columns = vec![Column::new("nom", "Name")];
        let data = rows();
        let mut view = ListOptions {
            search: "gravier".into(),
            page: 1,
            ..Default::default()
        }
        .view();
        let page = view.view(&data, &columns);
        assert_eq!(plain_table(&page, &columns, "No materials"), "No materials\n");
    }

    fn awa() -> Registration {
        Registration {
            nom: "Diallo".into(),
            prenom: "Awa".into(),
            email: "awa@chantier.test".into(),
            telephone: None,
            role: "ingenieur".into(),
        }
    }

    #[test]
    fn registration_runs_form_rules() {
        let request = registration_request(&awa(), "secret1".into()).unwrap();
        assert_eq!(request.role, "ingenieur");
        assert_eq!(request.telephone, None);

        let err = registration_request(&awa(), "abc".into()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid registration: Password: Password must be at least 6 characters"
        );

        let err = registration_request(
            &Registration {
                email: "awa".into(),
                ..awa()
            },
            "secret1".into(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Email: Must be a valid email address"));
    }

    #[test]
    fn resources_lists_every_endpoint() {
        let listing = resources();
        assert_eq!(listing.lines().count(), ResourceKind::all().len());
        assert!(listing.contains("/materiaux"));
        assert!(listing.lines().any(|l| l.starts_with("notifications") && l.ends_with("(no delete)")));
    }
}
