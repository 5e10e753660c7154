use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::FromRef;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod error;
mod ids;
mod models;
mod store;
mod types;

use config::Config;
pub(crate) use error::{ApiError, ApiResult};
use ids::RandomIds;
use store::PasteStore;

#[derive(Debug, Parser)]
#[command(name = "blinkbin", about = "ephemeral text-snippet store")]
struct Cli {
    /// Path to the config file.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (the default).
    Serve,
}

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Config,
    pub store: PasteStore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let store = PasteStore::new(Arc::new(RandomIds::default()));

    let state = AppState { config, store };

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => commands::serve::run(state).await,
    }
}
