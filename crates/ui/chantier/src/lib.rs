//! Chantier: terminal back office for construction site management.
//!
//! Schema-driven [`form`]s and [`table`]s over the REST backend, wired per
//! resource by [`resource::catalog`] and driven by the [`app::App`] loop.

pub mod account;
pub mod action;
pub mod app;
pub mod cli;
pub mod commands;
pub mod components;
pub mod config;
pub mod errors;
pub mod form;
pub mod pages;
pub mod resource;
pub mod table;
pub mod tui;

use ::app::{AppBuilder, AppPaths, Application};
use api::{ApiClient, CredentialStore};
use color_eyre::{Result, eyre::eyre};
use tokio::sync::mpsc;

use crate::{
    app::App,
    cli::{Cli, Cmd},
    commands::ListOptions,
    config::Config,
};

pub struct Chantier;

impl Application for Chantier {
    const APP_ID: &'static str = "chantier";
}

pub async fn run(cli: Cli) -> Result<()> {
    errors::init()?;

    let cmd = cli.cmd.unwrap_or(Cmd::Run { resource: None });
    let interactive = matches!(cmd, Cmd::Run { .. });

    let paths = AppPaths::resolve(Chantier::QUALIFIER, Chantier::ORGANIZATION, Chantier::APP_ID);
    let config = Config::load(paths.config_dir())?;

    let mut builder = AppBuilder::<Chantier>::new(env!("CARGO_PKG_VERSION"))
        .paths(paths)
        .console(!interactive && cli.log.is_some());
    if let Some(filter) = cli.log.or_else(|| config.log_filter.clone()) {
        builder = builder.filter(filter);
    }
    let ctx = builder.build().map_err(|e| eyre!("unable to initialize logging: {e}"))?;

    let credentials = CredentialStore::persistent(ctx.paths().session_file())?;
    let mut options = config.client_options();
    if let Some(url) = cli.api_url {
        options.base_url = url;
    }

    match cmd {
        Cmd::Run { resource } => {
            let (session_tx, session_rx) = mpsc::unbounded_channel();
            let client = ApiClient::new(options, credentials)?.with_session_events(session_tx);
            let mut app = App::new(config, client, session_rx, resource);
            app.run().await?;
        }
        Cmd::Login { email, password } => {
            let client = ApiClient::new(options, credentials)?;
            commands::login(&client, email, password).await?;
        }
        Cmd::Register {
            email,
            nom,
            prenom,
            telephone,
            role,
            password,
        } => {
            let client = ApiClient::new(options, credentials)?;
            let details = commands::Registration {
                nom,
                prenom,
                email,
                telephone,
                role,
            };
            commands::register(&client, details, password).await?;
        }
        Cmd::Dashboard => {
            let client = ApiClient::new(options, credentials)?;
            commands::dashboard(&client).await?;
        }
        Cmd::Logout => {
            let client = ApiClient::new(options, credentials)?;
            commands::logout(&client)?;
        }
        Cmd::List {
            resource,
            search,
            rendered,
            sort,
            desc,
            page,
            json,
        } => {
            let client = ApiClient::new(options, credentials)?;
            let options = ListOptions {
                search,
                rendered,
                sort,
                descending: desc,
                page,
                json,
            };
            commands::list(&client, resource, &options).await?;
        }
        Cmd::Resources => print!("{}", commands::resources()),
    }
    Ok(())
}
