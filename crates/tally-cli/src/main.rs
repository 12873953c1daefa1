//! Tally CLI - receipt extraction and expense pipeline
//!
//! Usage:
//!   tally extract receipt.jpg          Extract an expense draft from a receipt
//!   tally parse "Coffee $5"            Parse a freeform sentence
//!   tally coach snapshot.json          Generate a coaching message
//!   tally providers                    Show provider resolution

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Extract { file, content_type } => {
            commands::cmd_extract(&file, content_type.as_deref()).await
        }
        Commands::Parse { text, date } => commands::cmd_parse(&text, date.as_deref()).await,
        Commands::Coach { snapshot } => commands::cmd_coach(&snapshot).await,
        Commands::Providers => commands::cmd_providers(),
    }
}
