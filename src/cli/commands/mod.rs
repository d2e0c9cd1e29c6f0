//! CLI command implementations

pub mod activate;
pub mod deploy;
pub mod get;
pub mod init;
pub mod install;
pub mod status;

pub use activate::execute as activate;
pub use deploy::execute as deploy;
pub use get::execute as get;
pub use init::execute as init;
pub use install::execute as install;
pub use status::execute as status;

use crate::error::LarderResult;
use crate::manager::CacheManager;
use crate::manifest::Manifest;
use crate::store::DiskStore;
use crate::transport::HttpTransport;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolve the store root: explicit flag, else the platform default
pub(crate) fn store_root(overridden: Option<PathBuf>) -> PathBuf {
    overridden.unwrap_or_else(DiskStore::default_root)
}

/// Build a manager for a loaded manifest over the disk store
pub(crate) fn build_manager(manifest: Manifest, store_root: PathBuf) -> CacheManager {
    let transport = Arc::new(HttpTransport::new(&manifest.network));
    let store = Arc::new(DiskStore::new(store_root));
    CacheManager::new(manifest, store, transport)
}

/// Load the manifest and build a manager in one step
pub(crate) async fn load_manager(
    manifest_path: &Path,
    store_root: PathBuf,
) -> LarderResult<CacheManager> {
    let manifest = Manifest::load(manifest_path).await?;
    Ok(build_manager(manifest, store_root))
}

/// Format bytes as human-readable size (e.g., "1.5 MB")
pub(crate) fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
