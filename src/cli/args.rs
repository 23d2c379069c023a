//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// packserve - content package cache and resolver
///
/// Resolves metadata, content, and derived images out of zip-archived
/// content packages through a lazily populated disk cache.
#[derive(Parser, Debug)]
#[command(name = "packserve")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PACKSERVE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a package artifact out of the cache
    Resolve(ResolveArgs),

    /// List indexed packages
    List(ListArgs),

    /// Inspect or tear down cached packages
    Cache(CacheArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// What kind of artifact to resolve
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    /// The package manifest
    Metadata,
    /// A named image, optionally resized
    Image,
    /// The package's primary content
    Content,
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Package identifier
    pub uid: String,

    /// Artifact kind
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Image name (required for image requests)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Target image size as <width>x<height>, e.g. 200x150
    #[arg(short, long)]
    pub size: Option<String>,

    /// Emit the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Output format for listings
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show which packages are cached and what they hold
    Status,

    /// Remove everything cached for a package
    Remove {
        /// Package identifier
        uid: String,
    },

    /// Re-cache a package's manifest from its archive
    Refresh {
        /// Package identifier
        uid: String,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,
}
