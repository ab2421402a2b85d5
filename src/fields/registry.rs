use super::FieldSpec;
use crate::core::{MetaError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Ordered virtual-field declarations of one entity type.
///
/// A registry only owns the fields declared on its own type and reaches the
/// inherited ones through `parent`. Parents are shared behind `Arc` and never
/// mutated, so a subtype always sees a superset of its ancestors' fields.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    owner: String,
    parent: Option<Arc<FieldRegistry>>,
    fields: Vec<Arc<FieldSpec>>,
    index: HashMap<String, usize>,
}

impl FieldRegistry {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            parent: None,
            fields: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn inheriting(owner: impl Into<String>, parent: Arc<FieldRegistry>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new(owner)
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn parent(&self) -> Option<&Arc<FieldRegistry>> {
        self.parent.as_ref()
    }

    /// Adds a field at this level. Fails if the name exists here or in any ancestor.
    pub fn register(&mut self, spec: FieldSpec) -> Result<Arc<FieldSpec>> {
        if self.contains(spec.name()) {
            return Err(MetaError::FieldAlreadyDefined(spec.name().to_string()));
        }

        let spec = Arc::new(spec);
        self.index.insert(spec.name().to_string(), self.fields.len());
        self.fields.push(Arc::clone(&spec));

        debug!(
            entity = %self.owner,
            field = %spec.name(),
            data_type = ?spec.data_type().map(ToString::to_string),
            "registered metadata field"
        );

        Ok(spec)
    }

    /// Finds a field declared here or on any ancestor.
    pub fn lookup(&self, name: &str) -> Option<&Arc<FieldSpec>> {
        match self.index.get(name) {
            Some(idx) => Some(&self.fields[*idx]),
            None => self.parent.as_ref().and_then(|parent| parent.lookup(name)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Fields declared directly on this type.
    pub fn own_fields(&self) -> &[Arc<FieldSpec>] {
        &self.fields
    }

    /// Every visible field: ancestors first, each level in declaration order.
    pub fn fields(&self) -> Vec<Arc<FieldSpec>> {
        let mut fields = match &self.parent {
            Some(parent) => parent.fields(),
            None => Vec::new(),
        };
        fields.extend(self.fields.iter().cloned());
        fields
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields()
            .iter()
            .map(|spec| spec.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len() + self.parent.as_ref().map_or(0, |parent| parent.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
