//! CLI argument definitions using clap
//!
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Turn receipts and sentences into clean expense records
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Receipt extraction and expense pipeline", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a structured expense draft from a receipt image or PDF
    Extract {
        /// Receipt file (jpg, png, webp, pdf)
        file: PathBuf,

        /// Content type override (inferred from the extension by default)
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Parse a freeform sentence into an expense draft
    Parse {
        /// The sentence, e.g. "Coffee $5, parking $10"
        text: String,

        /// Date to resolve relative mentions against (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Generate a coaching message from an analysis snapshot file
    Coach {
        /// JSON file containing the analysis snapshot
        snapshot: PathBuf,
    },

    /// Show which AI provider would answer requests
    Providers,
}
