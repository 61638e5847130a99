mod cli;
mod config;
mod console;
mod coordinator;
mod error;
mod gateway;
mod glossary;
mod store;
mod ui;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};
use config::TandemConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = TandemConfig::load()?;

    match cli.command {
        Command::Files => console::list_files(&config).await,
        Command::Run {
            file,
            stage,
            review,
        } => console::run(&config, file, stage.to_filter(), review).await,
        Command::Glossary { action } => console::glossary(&config, action),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "tandem=debug" } else { "tandem=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
