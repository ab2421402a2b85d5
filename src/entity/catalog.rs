use super::{Entity, EntityType};
use crate::core::{MetaError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Entity types keyed by name.
///
/// Immutable once built: adding a type returns a new catalog and leaves the
/// old one untouched, so clones are cheap and can be shared freely.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: Arc<HashMap<String, Arc<EntityType>>>,
    order: Arc<Vec<String>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(self, entity_type: Arc<EntityType>) -> Result<Self> {
        let name = entity_type.name().to_string();

        if self.types.contains_key(&name) {
            return Err(MetaError::Config(format!(
                "Entity type '{}' already exists",
                name
            )));
        }

        let mut types = (*self.types).clone();
        types.insert(name.clone(), entity_type);
        let mut order = (*self.order).clone();
        order.push(name);

        Ok(Self {
            types: Arc::new(types),
            order: Arc::new(order),
        })
    }

    pub fn get(&self, name: &str) -> Option<&Arc<EntityType>> {
        self.types.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&Arc<EntityType>> {
        self.get(name)
            .ok_or_else(|| MetaError::Config(format!("Entity type '{}' not found", name)))
    }

    pub fn new_entity(&self, name: &str) -> Result<Entity> {
        Ok(self.require(name)?.new_entity())
    }

    /// Type names in the order they were added.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
