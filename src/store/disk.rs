//! On-disk generation store
//!
//! One directory per generation under a root. Entry bodies are stored as
//! individual files named by the hex SHA-256 of the asset key; statuses and
//! headers live in the generation's `meta.json`. Staging directories carry a
//! `.staging` suffix and are renamed into place on commit, so a complete
//! generation of the same name keeps serving reads until the swap.

use crate::asset::{AssetKey, StoredResponse};
use crate::error::{LarderError, LarderResult};
use crate::store::{Generation, GenerationState, GenerationStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

const META_FILE: &str = "meta.json";
const STAGING_SUFFIX: &str = ".staging";

/// Generation store rooted at a directory on disk
pub struct DiskStore {
    root: PathBuf,
}

/// Persisted generation metadata
#[derive(Debug, Serialize, Deserialize)]
struct Meta {
    name: String,
    state: String,
    created_at: DateTime<Utc>,
    entries: HashMap<String, EntryMeta>,
}

/// Persisted per-entry metadata; the body lives in `file`
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    status: u16,
    headers: Vec<(String, String)>,
    file: String,
}

impl DiskStore {
    /// Create a store rooted at the given directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The default store root (`<data_local_dir>/larder/store`)
    pub fn default_root() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("larder")
            .join("store")
    }

    /// The root directory this store writes under
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir_name(name: &str) -> String {
        name.replace(['/', '\\', ':'], "_")
    }

    fn complete_dir(&self, name: &str) -> PathBuf {
        self.root.join(Self::dir_name(name))
    }

    fn staging_dir(&self, name: &str) -> PathBuf {
        self.root
            .join(format!("{}{}", Self::dir_name(name), STAGING_SUFFIX))
    }

    async fn load_meta(dir: &Path, name: &str) -> LarderResult<Meta> {
        let path = dir.join(META_FILE);
        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| LarderError::io(format!("reading {}", path.display()), e))?;

        serde_json::from_str(&content).map_err(|e| LarderError::GenerationCorrupt {
            name: name.to_string(),
            reason: format!("bad meta.json: {}", e),
        })
    }

    async fn save_meta(dir: &Path, meta: &Meta) -> LarderResult<()> {
        let path = dir.join(META_FILE);
        let content = serde_json::to_string_pretty(meta)?;
        fs::write(&path, content)
            .await
            .map_err(|e| LarderError::io(format!("writing {}", path.display()), e))
    }

    /// Resolve the directory holding a generation that accepts writes:
    /// staging first, then complete.
    async fn writable_dir(&self, name: &str) -> LarderResult<PathBuf> {
        let staging = self.staging_dir(name);
        if staging.exists() {
            return Ok(staging);
        }
        let complete = self.complete_dir(name);
        if complete.exists() {
            return Ok(complete);
        }
        Err(LarderError::GenerationNotFound(name.to_string()))
    }
}

#[async_trait]
impl GenerationStore for DiskStore {
    async fn begin(&self, name: &str) -> LarderResult<()> {
        let dir = self.staging_dir(name);
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| LarderError::io(format!("resetting staging {}", dir.display()), e))?;
        }
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| LarderError::io(format!("creating staging {}", dir.display()), e))?;

        let meta = Meta {
            name: name.to_string(),
            state: GenerationState::Installing.as_label().to_string(),
            created_at: Utc::now(),
            entries: HashMap::new(),
        };
        Self::save_meta(&dir, &meta).await?;
        debug!(generation = name, "staged generation on disk");
        Ok(())
    }

    async fn put(
        &self,
        name: &str,
        key: &AssetKey,
        response: &StoredResponse,
    ) -> LarderResult<()> {
        let dir = self.writable_dir(name).await?;
        let mut meta = Self::load_meta(&dir, name).await?;

        let file = format!("{}.bin", key.digest());
        let body_path = dir.join(&file);
        fs::write(&body_path, &response.body)
            .await
            .map_err(|e| LarderError::io(format!("writing entry {}", body_path.display()), e))?;

        meta.entries.insert(
            key.as_str().to_string(),
            EntryMeta {
                status: response.status,
                headers: response.headers.clone(),
                file,
            },
        );
        Self::save_meta(&dir, &meta).await
    }

    async fn commit(&self, name: &str) -> LarderResult<()> {
        let staging = self.staging_dir(name);
        if !staging.exists() {
            return Err(LarderError::GenerationNotStaged {
                name: name.to_string(),
                action: "commit",
            });
        }

        let mut meta = Self::load_meta(&staging, name).await?;
        meta.state = GenerationState::Complete.as_label().to_string();
        Self::save_meta(&staging, &meta).await?;

        let complete = self.complete_dir(name);
        if complete.exists() {
            fs::remove_dir_all(&complete).await.map_err(|e| {
                LarderError::io(format!("replacing generation {}", complete.display()), e)
            })?;
        }
        fs::rename(&staging, &complete)
            .await
            .map_err(|e| LarderError::io(format!("promoting {}", staging.display()), e))?;
        debug!(generation = name, "promoted generation");
        Ok(())
    }

    async fn discard(&self, name: &str) -> LarderResult<()> {
        let dir = self.staging_dir(name);
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| LarderError::io(format!("discarding {}", dir.display()), e))?;
        }
        Ok(())
    }

    async fn get(&self, name: &str, key: &AssetKey) -> LarderResult<Option<StoredResponse>> {
        let dir = self.complete_dir(name);
        if !dir.exists() {
            return Ok(None);
        }

        let meta = Self::load_meta(&dir, name).await?;
        let entry = match meta.entries.get(key.as_str()) {
            Some(e) => e,
            None => return Ok(None),
        };

        let body_path = dir.join(&entry.file);
        let body = fs::read(&body_path)
            .await
            .map_err(|e| LarderError::io(format!("reading entry {}", body_path.display()), e))?;

        Ok(Some(StoredResponse::new(
            entry.status,
            entry.headers.clone(),
            body,
        )))
    }

    async fn list(&self) -> LarderResult<Vec<Generation>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut read_dir = fs::read_dir(&self.root)
            .await
            .map_err(|e| LarderError::io(format!("reading store root {}", self.root.display()), e))?;

        let mut generations = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| LarderError::io("reading store root entry", e))?
        {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let dir_name = entry.file_name().to_string_lossy().to_string();
            let staging = dir_name.ends_with(STAGING_SUFFIX);

            match Self::load_meta(&path, &dir_name).await {
                Ok(meta) => generations.push(Generation {
                    name: meta.name,
                    state: if staging {
                        GenerationState::Installing
                    } else {
                        GenerationState::from_label(&meta.state)
                    },
                    created_at: meta.created_at,
                    entries: meta.entries.len(),
                }),
                Err(e) => {
                    // Still listed so activate can evict it
                    warn!(directory = %path.display(), "unreadable generation meta: {}", e);
                    generations.push(Generation {
                        name: dir_name.trim_end_matches(STAGING_SUFFIX).to_string(),
                        state: if staging {
                            GenerationState::Installing
                        } else {
                            GenerationState::Complete
                        },
                        created_at: Utc::now(),
                        entries: 0,
                    });
                }
            }
        }

        generations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(generations)
    }

    async fn remove(&self, name: &str) -> LarderResult<()> {
        let dir = self.complete_dir(name);
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| LarderError::io(format!("removing generation {}", dir.display()), e))?;
            debug!(generation = name, "removed generation");
        }
        Ok(())
    }

    async fn contains(&self, name: &str) -> LarderResult<bool> {
        let dir = self.complete_dir(name);
        if !dir.exists() {
            return Ok(false);
        }
        match Self::load_meta(&dir, name).await {
            Ok(meta) => Ok(GenerationState::from_label(&meta.state) == GenerationState::Complete),
            Err(_) => Ok(false),
        }
    }
}
