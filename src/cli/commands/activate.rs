//! Activate command - promote the manifest version, evict the rest

use crate::cli::commands::{load_manager, store_root};
use crate::error::LarderResult;
use console::style;
use std::path::{Path, PathBuf};

/// Execute the activate command
pub async fn execute(manifest_path: &Path, store: Option<PathBuf>) -> LarderResult<()> {
    let manager = load_manager(manifest_path, store_root(store)).await?;
    let report = manager.activate().await?;

    for name in &report.evicted {
        println!("  {} evicted {}", style("•").red(), name);
    }
    println!(
        "{} generation {} is active",
        style("✓").green(),
        style(&report.version).cyan()
    );
    Ok(())
}
