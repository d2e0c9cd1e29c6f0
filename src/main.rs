//! Larder - Offline Asset Cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use larder::cli::{Cli, Commands};
use larder::error::LarderResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> LarderResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("larder=warn"),
        1 => EnvFilter::new("larder=info"),
        _ => EnvFilter::new("larder=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Install => larder::cli::commands::install(&cli.manifest, cli.store).await,
        Commands::Activate => larder::cli::commands::activate(&cli.manifest, cli.store).await,
        Commands::Deploy => larder::cli::commands::deploy(&cli.manifest, cli.store).await,
        Commands::Status(args) => {
            larder::cli::commands::status(&cli.manifest, cli.store, args.format).await
        }
        Commands::Get(args) => {
            larder::cli::commands::get(&cli.manifest, cli.store, &args.url).await
        }
        Commands::Init(args) => {
            larder::cli::commands::init(&cli.manifest, &args.origin, args.force).await
        }
    }
}
