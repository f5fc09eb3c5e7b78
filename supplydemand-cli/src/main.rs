//! # supplydemand CLI
//!
//! Command-line host that wires declared suppliers to the supplydemand engine.

mod commands;
mod config;
mod suppliers;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "supplydemand")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "supplydemand.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter supplydemand.yml
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Resolve the root supplier and print its result as JSON
    Run {
        /// JSON payload for the root (overrides `payload` in the config)
        #[arg(long)]
        payload: Option<String>,

        /// Print per-capability demand metrics to stderr
        #[arg(long)]
        stats: bool,

        /// Pretty-print the JSON result
        #[arg(long)]
        pretty: bool,
    },

    /// List the capabilities declared in the base registry
    List {
        /// Return JSON for machine consumption
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for results
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { path } => commands::init_project(path.as_deref()),
        Commands::Run {
            payload,
            stats,
            pretty,
        } => {
            let opts = commands::RunOptions {
                payload,
                stats,
                pretty,
            };
            commands::run_config(&cli.config, opts).await
        }
        Commands::List { json } => commands::list_suppliers(&cli.config, json),
    }
}
