//! Error types for Larder
//!
//! All modules use `LarderResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Larder operations
pub type LarderResult<T> = Result<T, LarderError>;

/// All errors that can occur in Larder
#[derive(Error, Debug)]
pub enum LarderError {
    // Manifest errors
    #[error("Manifest file not found: {0}")]
    ManifestNotFound(PathBuf),

    #[error("Invalid manifest at {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("Manifest version must not be empty")]
    ManifestVersionEmpty,

    #[error("Invalid asset URL {url}: {reason}")]
    AssetUrlInvalid { url: String, reason: String },

    // Install errors
    #[error("Install of generation {version} failed on {url}: {reason}")]
    InstallFailed {
        version: String,
        url: String,
        reason: String,
    },

    // Activate errors
    #[error("Cannot activate {version}: generation never completed install")]
    ActivateIncomplete { version: String },

    // Store errors
    #[error("Generation not found: {0}")]
    GenerationNotFound(String),

    #[error("No staged generation to {action}: {name}")]
    GenerationNotStaged { name: String, action: &'static str },

    #[error("Corrupt generation {name}: {reason}")]
    GenerationCorrupt { name: String, reason: String },

    // Network errors
    #[error("Network request failed: {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Unsupported request method: {0}")]
    UnsupportedMethod(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl LarderError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a network error for a request URL
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ManifestNotFound(_) => {
                Some("Run: larder init (or pass --manifest <path>)")
            }
            Self::ActivateIncomplete { .. } => Some("Run: larder install first"),
            Self::Network { .. } => Some("Check that the asset origin is reachable"),
            _ => None,
        }
    }
}
