use clap::{Parser, Subcommand};

use crate::{account, resource::ResourceKind};

#[derive(Parser, Debug)]
#[command(name = "chantier", version, about = "Construction site back office")]
pub struct Cli {
    /// Backend base URL, overrides the configuration.
    #[arg(long, global = true, env = "CHANTIER_API_URL")]
    pub api_url: Option<String>,

    /// Log filter directive for the log file (`debug`, `chantier=trace`, ...).
    #[arg(long, global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Run the interactive TUI (default)
    Run {
        /// Resource tab to open first (`projects`, `ouvriers`, ...)
        #[arg(long)]
        resource: Option<ResourceKind>,
    },
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and store the session it opens
    Register {
        #[arg(long)]
        email: String,
        /// Last name
        #[arg(long)]
        nom: String,
        /// First name
        #[arg(long)]
        prenom: String,
        #[arg(long)]
        telephone: Option<String>,
        #[arg(long, default_value = account::DEFAULT_ROLE, value_parser = account::ROLES.map(|(value, _)| value))]
        role: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Print the dashboard figures
    Dashboard,
    /// Print one page of a resource list
    List {
        resource: ResourceKind,
        #[arg(long, default_value = "")]
        search: String,
        /// Also match the formatted cell text (labels, amounts, dates)
        #[arg(long)]
        rendered: bool,
        /// Column key to sort by
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, requires = "sort")]
        desc: bool,
        #[arg(long, default_value_t = 1)]
        page: i64,
        /// Print the matching rows as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the managed resources and their endpoints
    Resources,
}
