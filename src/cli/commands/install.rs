//! Install command - populate a generation from the manifest

use crate::cli::commands::{format_bytes, load_manager, store_root};
use crate::error::LarderResult;
use console::style;
use std::path::{Path, PathBuf};

/// Execute the install command
pub async fn execute(manifest_path: &Path, store: Option<PathBuf>) -> LarderResult<()> {
    let manager = load_manager(manifest_path, store_root(store)).await?;
    let report = manager.install().await?;

    println!(
        "{} installed generation {} ({} asset(s), {})",
        style("✓").green(),
        style(&report.version).cyan(),
        report.entries,
        format_bytes(report.bytes)
    );
    Ok(())
}
