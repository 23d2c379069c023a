//! packserve - content package cache and resolver
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use packserve::cli::{Cli, Commands};
use packserve::config::ConfigManager;
use packserve::error::PackserveResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> PackserveResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("packserve=warn"),
        1 => EnvFilter::new("packserve=info"),
        _ => EnvFilter::new("packserve=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Load configuration
    let manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = manager.load().await?;

    ConfigManager::ensure_storage_dirs(&config).await?;

    // Dispatch to command
    match cli.command {
        Commands::Resolve(args) => packserve::cli::commands::resolve(args, &config).await,
        Commands::List(args) => packserve::cli::commands::list(args, &config).await,
        Commands::Cache(args) => packserve::cli::commands::cache(args, &config).await,
        Commands::Config(args) => packserve::cli::commands::config(args, &config, &manager).await,
    }
}
