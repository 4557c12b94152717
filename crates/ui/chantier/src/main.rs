use chantier::cli::Cli;
use clap::Parser;
use color_eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    chantier::run(Cli::parse()).await
}
