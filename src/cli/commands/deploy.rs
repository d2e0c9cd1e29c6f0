//! Deploy command - install then activate
//!
//! Activate only runs after install reports success, so a failed install
//! leaves the previously active generation serving.

use crate::cli::commands::{format_bytes, load_manager, store_root};
use crate::error::LarderResult;
use console::style;
use std::path::{Path, PathBuf};

/// Execute the deploy command
pub async fn execute(manifest_path: &Path, store: Option<PathBuf>) -> LarderResult<()> {
    let manager = load_manager(manifest_path, store_root(store)).await?;

    let install = manager.install().await?;
    println!(
        "{} installed generation {} ({} asset(s), {})",
        style("✓").green(),
        style(&install.version).cyan(),
        install.entries,
        format_bytes(install.bytes)
    );

    let activate = manager.activate().await?;
    for name in &activate.evicted {
        println!("  {} evicted {}", style("•").red(), name);
    }
    println!(
        "{} generation {} is active",
        style("✓").green(),
        style(&activate.version).cyan()
    );
    Ok(())
}
