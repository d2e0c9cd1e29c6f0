//! Generation-keyed storage for cached assets
//!
//! A generation is a named, versioned collection of request/response pairs.
//! Generations are staged during install, promoted on commit, and only
//! complete generations ever serve reads. Entries are written wholesale and
//! never edited in place.
//!
//! # Generation States
//!
//! | State | Reads | Description |
//! |-------|-------|-------------|
//! | Installing | no | Staged by install, invisible to lookups |
//! | Complete | yes | Promoted, immutable lifecycle, evicted as a unit |

pub mod disk;
pub mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use crate::asset::{AssetKey, StoredResponse};
use crate::error::LarderResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

/// State of a stored generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    /// Staged by an in-progress install, not yet serving reads
    Installing,
    /// Promoted and eligible to serve reads
    Complete,
}

impl GenerationState {
    /// Parse from the persisted label value
    pub fn from_label(s: &str) -> Self {
        match s {
            "complete" => Self::Complete,
            _ => Self::Installing,
        }
    }

    /// Convert to the persisted label value
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Installing => "installing",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// Metadata for one stored generation
#[derive(Debug, Clone)]
pub struct Generation {
    /// Version identifier naming the generation
    pub name: String,
    /// Current state
    pub state: GenerationState,
    /// When the generation was staged
    pub created_at: DateTime<Utc>,
    /// Number of stored entries
    pub entries: usize,
}

/// Abstract generation store
///
/// Injected into the cache manager so the persisted-store state is explicit
/// rather than ambient, and swappable for [`MemoryStore`] in tests. Install
/// stages via `begin`/`put`/`commit` (or `discard` on failure); activate
/// evicts via `remove`; fetch interception reads via `get`.
#[async_trait]
pub trait GenerationStore: Send + Sync {
    /// Create (or reset) a staging generation with the given name.
    ///
    /// An existing complete generation of the same name keeps serving reads
    /// until `commit` replaces it.
    async fn begin(&self, name: &str) -> LarderResult<()>;

    /// Write one entry into a generation, wholesale.
    ///
    /// The target may be a staging generation (install population) or a
    /// complete one (opportunistic store-on-miss).
    async fn put(&self, name: &str, key: &AssetKey, response: &StoredResponse)
        -> LarderResult<()>;

    /// Promote a staging generation to complete, replacing any previous
    /// complete generation of the same name as a unit.
    async fn commit(&self, name: &str) -> LarderResult<()>;

    /// Drop a staging generation and everything staged into it.
    ///
    /// A no-op when no staging generation of that name exists.
    async fn discard(&self, name: &str) -> LarderResult<()>;

    /// Read one entry from a *complete* generation.
    ///
    /// Returns `None` when the generation is absent, still staging, or has
    /// no entry under the key.
    async fn get(&self, name: &str, key: &AssetKey) -> LarderResult<Option<StoredResponse>>;

    /// List all persisted generations, staging included.
    async fn list(&self) -> LarderResult<Vec<Generation>>;

    /// Delete a complete generation and all its entries as a unit.
    ///
    /// A no-op when no generation of that name exists.
    async fn remove(&self, name: &str) -> LarderResult<()>;

    /// Whether a complete generation of this name exists
    async fn contains(&self, name: &str) -> LarderResult<bool>;
}
