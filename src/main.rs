//! Archgraph CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;

use config::{ArchgraphConfig, CliOverrides};

#[derive(Parser)]
#[command(name = "archgraph")]
#[command(about = "Live layered architecture graph of a Rust code base", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root path (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Quiet period before a changed file is re-parsed
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    /// Number of parser threads
    #[arg(long, global = true)]
    workers: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the tree once and print the components
    Index {
        /// Print nodes as JSON
        #[arg(long)]
        json: bool,
    },
    /// Keep the graph in sync and stream diffs as JSON lines
    Watch,
    /// Print one component as JSON
    Show { id: String },
    /// Print every component reachable from one
    Chain { id: String },
    /// Print the components related to one
    Related { id: String },
    /// Print the reference clean architecture, or scaffold one feature
    Blueprint {
        /// Feature name to scaffold, e.g. UserProfile
        #[arg(long)]
        feature: Option<String>,
        /// Include a ViewModel in the scaffolded feature
        #[arg(long)]
        view_model: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    // Logs go to stderr, stdout carries command output
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("archgraph={}", log_level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Archgraph v{}", env!("CARGO_PKG_VERSION"));

    let overrides = CliOverrides {
        debounce_ms: cli.debounce_ms,
        parser_workers: cli.workers,
    };
    let config = ArchgraphConfig::load(&cli.root, &overrides)?;

    match cli.command {
        Commands::Index { json } => commands::index(config, json).await,
        Commands::Watch => commands::watch(config).await,
        Commands::Show { id } => commands::show(config, id).await,
        Commands::Chain { id } => commands::chain(config, id).await,
        Commands::Related { id } => commands::related(config, id).await,
        Commands::Blueprint { feature, view_model } => commands::blueprint(feature, view_model),
    }
}
