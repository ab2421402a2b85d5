use crate::core::{Result, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key-value blob holding the virtual field values of one entity.
///
/// Keys are expected to be field names of the owning type but are not checked
/// here. Every write marks the container dirty until a store persists it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataContainer {
    id: Option<String>,
    data: BTreeMap<String, Value>,
    #[serde(skip)]
    dirty: bool,
}

impl MetadataContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: BTreeMap<String, Value>) -> Self {
        Self {
            id: None,
            data,
            dirty: true,
        }
    }

    /// Id assigned by the store on first save.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn data(&self) -> &BTreeMap<String, Value> {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.dirty = true;
        self.data.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.data.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    /// Replaces the whole blob.
    pub fn replace_data(&mut self, data: BTreeMap<String, Value>) {
        self.data = data;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Records a successful save.
    pub fn mark_persisted(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
        self.dirty = false;
    }

    pub fn to_blob(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restores a stored blob; the result is clean.
    pub fn from_blob(blob: &str) -> Result<Self> {
        let mut container: Self = serde_json::from_str(blob)?;
        container.dirty = false;
        Ok(container)
    }
}
