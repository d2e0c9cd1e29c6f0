//! Manifest loading and validation
//!
//! The manifest is the static configuration of one cache generation: the
//! version identifier, the asset origin, and the list of assets to
//! pre-populate at install time. It is stored at `larder.toml` and read once
//! per run; nothing in it is computed at runtime.

use crate::asset::AssetRequest;
use crate::error::{LarderError, LarderResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::debug;
use url::Url;

/// Static manifest for one cache generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Version identifier naming the generation (e.g. "shop-cache-v3")
    pub version: String,

    /// Base URL that relative asset paths resolve against
    pub origin: String,

    /// Asset URLs (or origin-relative paths) to pre-populate at install
    pub assets: Vec<String>,

    /// Cache policy knobs
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Network settings for install fetches and miss passthrough
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Cache policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Write successful miss responses into the active generation.
    ///
    /// Off by default: a miss is forwarded to the network and *not* cached,
    /// so assets outside the manifest stay uncached until the next version
    /// bump. Turning this on changes observable staleness behavior.
    pub store_on_miss: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            store_on_miss: false,
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl Manifest {
    /// Load and validate a manifest from a TOML file
    pub async fn load(path: &Path) -> LarderResult<Self> {
        if !path.exists() {
            return Err(LarderError::ManifestNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| LarderError::io(format!("reading manifest {}", path.display()), e))?;

        let manifest: Manifest =
            toml::from_str(&content).map_err(|e| LarderError::ManifestInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        manifest.validate()?;

        debug!(
            version = %manifest.version,
            assets = manifest.assets.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    /// Validate version and origin
    pub fn validate(&self) -> LarderResult<()> {
        if self.version.trim().is_empty() {
            return Err(LarderError::ManifestVersionEmpty);
        }

        let origin = Url::parse(&self.origin).map_err(|e| LarderError::AssetUrlInvalid {
            url: self.origin.clone(),
            reason: e.to_string(),
        })?;
        if origin.host_str().is_none() {
            return Err(LarderError::AssetUrlInvalid {
                url: self.origin.clone(),
                reason: "origin has no host".to_string(),
            });
        }

        for asset in &self.assets {
            self.asset_url(asset)?;
        }

        Ok(())
    }

    /// Resolve one asset entry to an absolute URL
    ///
    /// Absolute URLs pass through unchanged; relative paths join the origin.
    pub fn asset_url(&self, asset: &str) -> LarderResult<Url> {
        if let Ok(url) = Url::parse(asset) {
            return Ok(url);
        }

        let origin = Url::parse(&self.origin).map_err(|e| LarderError::AssetUrlInvalid {
            url: self.origin.clone(),
            reason: e.to_string(),
        })?;

        origin.join(asset).map_err(|e| LarderError::AssetUrlInvalid {
            url: asset.to_string(),
            reason: e.to_string(),
        })
    }

    /// The full list of install requests, in manifest order
    pub fn asset_requests(&self) -> LarderResult<Vec<AssetRequest>> {
        self.assets
            .iter()
            .map(|a| Ok(AssetRequest::get(self.asset_url(a)?)))
            .collect()
    }

    /// A starter manifest for `larder init`
    pub fn starter(origin: &str) -> Self {
        Self {
            version: "cache-v1".to_string(),
            origin: origin.to_string(),
            assets: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/manifest.json".to_string(),
                "/favicon.ico".to_string(),
            ],
            policy: PolicyConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}
