//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Larder - Offline Asset Cache
///
/// Pre-populates versioned generations of static assets and serves
/// intercepted requests cache-first, evicting old generations on activate.
#[derive(Parser, Debug)]
#[command(name = "larder")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Manifest file path
    #[arg(
        short,
        long,
        global = true,
        env = "LARDER_MANIFEST",
        default_value = "larder.toml"
    )]
    pub manifest: PathBuf,

    /// Store root directory (defaults to the platform data dir)
    #[arg(long, global = true, env = "LARDER_STORE")]
    pub store: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Populate a generation with every manifest asset
    Install,

    /// Promote the manifest version and evict all other generations
    Activate,

    /// Install, then activate (the usual rollout of a new version)
    Deploy,

    /// List stored generations
    Status(StatusArgs),

    /// Fetch one URL through the cache layer
    Get(GetArgs),

    /// Write a starter larder.toml manifest
    Init(InitArgs),
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// URL (or origin-relative path) to fetch
    pub url: String,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Asset origin for the starter manifest
    #[arg(long, default_value = "https://localhost:3000")]
    pub origin: String,

    /// Overwrite an existing manifest
    #[arg(long)]
    pub force: bool,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
