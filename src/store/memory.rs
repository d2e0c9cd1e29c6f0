//! In-memory generation store
//!
//! Backs tests and embedded hosts. Staging generations live in a separate
//! map from complete ones, so a failed install leaves no trace.

use crate::asset::{AssetKey, StoredResponse};
use crate::error::{LarderError, LarderResult};
use crate::store::{Generation, GenerationState, GenerationStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

struct MemoryGeneration {
    created_at: DateTime<Utc>,
    entries: HashMap<String, StoredResponse>,
}

impl MemoryGeneration {
    fn new() -> Self {
        Self {
            created_at: Utc::now(),
            entries: HashMap::new(),
        }
    }
}

/// Generation store held entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Maps>,
}

#[derive(Default)]
struct Maps {
    staging: HashMap<String, MemoryGeneration>,
    complete: HashMap<String, MemoryGeneration>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GenerationStore for MemoryStore {
    async fn begin(&self, name: &str) -> LarderResult<()> {
        let mut maps = self.inner.write().await;
        maps.staging.insert(name.to_string(), MemoryGeneration::new());
        Ok(())
    }

    async fn put(
        &self,
        name: &str,
        key: &AssetKey,
        response: &StoredResponse,
    ) -> LarderResult<()> {
        let mut maps = self.inner.write().await;
        if let Some(generation) = maps.staging.get_mut(name) {
            generation
                .entries
                .insert(key.as_str().to_string(), response.clone());
            return Ok(());
        }
        if let Some(generation) = maps.complete.get_mut(name) {
            generation
                .entries
                .insert(key.as_str().to_string(), response.clone());
            return Ok(());
        }
        Err(LarderError::GenerationNotFound(name.to_string()))
    }

    async fn commit(&self, name: &str) -> LarderResult<()> {
        let mut maps = self.inner.write().await;
        let staged = maps
            .staging
            .remove(name)
            .ok_or_else(|| LarderError::GenerationNotStaged {
                name: name.to_string(),
                action: "commit",
            })?;
        maps.complete.insert(name.to_string(), staged);
        Ok(())
    }

    async fn discard(&self, name: &str) -> LarderResult<()> {
        let mut maps = self.inner.write().await;
        maps.staging.remove(name);
        Ok(())
    }

    async fn get(&self, name: &str, key: &AssetKey) -> LarderResult<Option<StoredResponse>> {
        let maps = self.inner.read().await;
        Ok(maps
            .complete
            .get(name)
            .and_then(|g| g.entries.get(key.as_str()))
            .cloned())
    }

    async fn list(&self) -> LarderResult<Vec<Generation>> {
        let maps = self.inner.read().await;
        let mut generations: Vec<Generation> = maps
            .complete
            .iter()
            .map(|(name, g)| Generation {
                name: name.clone(),
                state: GenerationState::Complete,
                created_at: g.created_at,
                entries: g.entries.len(),
            })
            .chain(maps.staging.iter().map(|(name, g)| Generation {
                name: name.clone(),
                state: GenerationState::Installing,
                created_at: g.created_at,
                entries: g.entries.len(),
            }))
            .collect();
        generations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(generations)
    }

    async fn remove(&self, name: &str) -> LarderResult<()> {
        let mut maps = self.inner.write().await;
        maps.complete.remove(name);
        Ok(())
    }

    async fn contains(&self, name: &str) -> LarderResult<bool> {
        let maps = self.inner.read().await;
        Ok(maps.complete.contains_key(name))
    }
}
