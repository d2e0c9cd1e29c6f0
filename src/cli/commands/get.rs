//! Get command - drive one request through the cache layer
//!
//! Operator debugging aid: resolves the URL against the manifest origin and
//! runs the normal cache-first interception path.

use crate::asset::AssetRequest;
use crate::cli::commands::{build_manager, format_bytes, store_root};
use crate::error::LarderResult;
use crate::manifest::Manifest;
use console::style;
use std::path::{Path, PathBuf};

/// Execute the get command
pub async fn execute(
    manifest_path: &Path,
    store: Option<PathBuf>,
    url: &str,
) -> LarderResult<()> {
    let manifest = Manifest::load(manifest_path).await?;
    let target = manifest.asset_url(url)?;
    let manager = build_manager(manifest, store_root(store));

    let response = manager.handle_fetch(&AssetRequest::get(target.clone())).await?;

    let status_display = if response.is_success() {
        style(response.status.to_string()).green()
    } else {
        style(response.status.to_string()).red()
    };
    println!(
        "{} {} ({}, {})",
        status_display,
        target,
        response.content_type().unwrap_or("unknown type"),
        format_bytes(response.body.len() as u64)
    );
    Ok(())
}
