//! Init command - write a starter manifest

use crate::error::{LarderError, LarderResult};
use crate::manifest::Manifest;
use console::style;
use std::path::Path;
use tokio::fs;

/// Execute the init command
pub async fn execute(manifest_path: &Path, origin: &str, force: bool) -> LarderResult<()> {
    if manifest_path.exists() && !force {
        return Err(LarderError::User(format!(
            "{} already exists (use --force to overwrite)",
            manifest_path.display()
        )));
    }

    let manifest = Manifest::starter(origin);
    manifest.validate()?;

    let content = toml::to_string_pretty(&manifest)?;
    fs::write(manifest_path, content)
        .await
        .map_err(|e| LarderError::io(format!("writing {}", manifest_path.display()), e))?;

    println!(
        "{} wrote {} (version {}, {} asset(s))",
        style("✓").green(),
        manifest_path.display(),
        style(&manifest.version).cyan(),
        manifest.assets.len()
    );
    println!("Edit the asset list, then run: larder deploy");
    Ok(())
}
