use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pastebin_lite::{commands, App, Config};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml if present).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve,
    /// Check that the storage backend is reachable.
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // try to load .env, ignoring any errors
    _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let app = App::open(config).await.context("failed to open storage")?;

    match cli.command {
        Command::Serve => commands::serve::run(app).await,
        Command::Health => commands::health::run(app).await,
    }
}
