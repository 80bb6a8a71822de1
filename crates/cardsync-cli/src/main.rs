//! cardsync CLI - imports cards from the external catalog into the record store

mod cli;
mod commands;
mod error;

use std::collections::HashMap;
use std::env;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        tracing::error!(%error, "cardsync failed");
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    #[cfg(debug_assertions)]
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cardsync=info".parse()?)
                .add_directive("cardsync_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let env: HashMap<String, String> = env::vars().collect();

    match cli.command {
        Commands::Import(args) => commands::import::run_import(&args, &env).await,
        Commands::Fetch(args) => commands::fetch::run_fetch(&args, &env).await,
    }
}
