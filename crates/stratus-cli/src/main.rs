//! Stratus CLI - Command-line interface for Stratus
//!
//! Syncs cloud resources into local per-service graphs and answers
//! relationship questions about a resource from them.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use stratus_sync::LookupMode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod provider;

use config::Config;

#[derive(Parser)]
#[command(name = "stratus")]
#[command(author = "Stratus Contributors")]
#[command(version)]
#[command(about = "Local relationship graph of your cloud resources", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.stratus/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration
    Init,

    /// Sync resources from services into the local graphs
    Sync {
        /// Services to sync (defaults to all configured services)
        services: Vec<String>,
    },

    /// Show a resource and its relations via a given id
    Show {
        /// Resource id: instance, subnet, user, policy, ...
        id: String,

        /// Answer from local graphs only, without any sync
        #[arg(long, conflicts_with = "cached")]
        local: bool,

        /// Do not resync the resource's service when it is found locally
        #[arg(long)]
        cached: bool,
    },

    /// Show stored snapshots and when they were synced
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let config_path = cli.config.unwrap_or_else(Config::default_path);

    let result = match cli.command {
        Commands::Init => commands::init(&config_path),
        Commands::Sync { services } => match Config::load(&config_path) {
            Ok(config) => commands::sync(&config, &services).await,
            Err(e) => Err(e.into()),
        },
        Commands::Show { id, local, cached } => {
            let mode = if local {
                LookupMode::LocalOnly
            } else if cached {
                LookupMode::CacheFirst
            } else {
                LookupMode::Refresh
            };
            match Config::load(&config_path) {
                Ok(config) => commands::show(&config, &id, mode).await,
                Err(e) => Err(e.into()),
            }
        }
        Commands::Status => Config::load(&config_path)
            .map_err(Into::into)
            .and_then(|config| commands::status(&config)),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
