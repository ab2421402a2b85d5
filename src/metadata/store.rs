use super::MetadataContainer;
use crate::core::{MetaError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

pub fn new_metadata_id() -> String {
    Uuid::new_v4().to_string()
}

/// Durable home of metadata blobs.
///
/// An entity references at most one blob by id. `save` is called by the owner
/// only while its container is dirty and returns the id the blob is stored under.
pub trait MetadataStore: Send + Sync {
    fn exists(&self, id: &str) -> Result<bool>;
    fn load(&self, id: &str) -> Result<Option<MetadataContainer>>;
    fn save(&self, container: &MetadataContainer) -> Result<String>;
}

/// Blob store kept in process memory. Clones share the same blobs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetadataStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
    saves: Arc<Mutex<usize>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save` calls served so far.
    pub fn save_count(&self) -> Result<usize> {
        Ok(*self.saves.lock()?)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.blobs.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.blobs.lock()?.contains_key(id))
    }

    fn load(&self, id: &str) -> Result<Option<MetadataContainer>> {
        let blobs = self.blobs.lock()?;
        let Some(blob) = blobs.get(id) else {
            return Ok(None);
        };

        let mut container = MetadataContainer::from_blob(blob)?;
        if container.id() != Some(id) {
            container.mark_persisted(id);
        }
        Ok(Some(container))
    }

    fn save(&self, container: &MetadataContainer) -> Result<String> {
        let id = container
            .id()
            .map(str::to_string)
            .unwrap_or_else(new_metadata_id);

        let mut stored = container.clone();
        stored.mark_persisted(id.clone());
        let blob = stored.to_blob()?;

        self.blobs.lock()?.insert(id.clone(), blob);
        *self.saves.lock()? += 1;

        debug!(metadata_id = %id, keys = container.data().len(), "saved metadata blob");
        Ok(id)
    }
}

/// Store that rejects every write, for exercising save failure paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnlyMetadataStore;

impl MetadataStore for ReadOnlyMetadataStore {
    fn exists(&self, _id: &str) -> Result<bool> {
        Ok(false)
    }

    fn load(&self, _id: &str) -> Result<Option<MetadataContainer>> {
        Ok(None)
    }

    fn save(&self, _container: &MetadataContainer) -> Result<String> {
        Err(MetaError::Storage("metadata store is read-only".to_string()))
    }
}
