use super::{EntityType, FieldAccessor};
use crate::coercion::Fragment;
use crate::core::{MetaError, Result, Value};
use crate::metadata::{MetadataContainer, MetadataStore};
use crate::validation::ValidationErrors;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Value computed from an entity on demand, exposed to serializers by name.
pub type ComputedMethod = Arc<dyn Fn(&Entity) -> Value + Send + Sync>;

/// One instance of an [`EntityType`].
///
/// Native attributes live on the entity itself; virtual fields live in an
/// optional [`MetadataContainer`] that is created on the first write.
#[derive(Clone)]
pub struct Entity {
    entity_type: Arc<EntityType>,
    attributes: BTreeMap<String, Value>,
    metadata: Option<MetadataContainer>,
    metadata_id: Option<String>,
    errors: ValidationErrors,
    singleton_methods: Vec<(String, ComputedMethod)>,
}

impl Entity {
    pub fn new(entity_type: Arc<EntityType>) -> Self {
        let attributes = entity_type
            .schema()
            .columns()
            .iter()
            .map(|column| (column.name.clone(), Value::Null))
            .collect();

        Self {
            entity_type,
            attributes,
            metadata: None,
            metadata_id: None,
            errors: ValidationErrors::new(),
            singleton_methods: Vec::new(),
        }
    }

    pub fn entity_type(&self) -> &Arc<EntityType> {
        &self.entity_type
    }

    pub fn type_name(&self) -> &str {
        self.entity_type.name()
    }

    // ========================================
    // Native attributes
    // ========================================

    pub fn read_attribute(&self, name: &str) -> Result<Value> {
        self.attributes
            .get(name)
            .cloned()
            .ok_or_else(|| self.unknown_attribute(name))
    }

    /// Writes a native column, coercing to the column type.
    pub fn write_attribute(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let column = self
            .entity_type
            .schema()
            .get_column(name)
            .ok_or_else(|| self.unknown_attribute(name))?;

        let value = value.into();
        let value = if value.is_null() {
            value
        } else {
            self.entity_type
                .coercer()
                .coerce(value, Some(&column.data_type))
                .value
        };

        self.attributes.insert(name.to_string(), value);
        Ok(())
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    // ========================================
    // Virtual field accessors
    // ========================================

    pub fn get(&self, field: &str) -> Result<Value> {
        Ok(self.accessor(field)?.get(self.metadata.as_ref()))
    }

    pub fn get_before_type_cast(&self, field: &str) -> Result<Value> {
        Ok(self.accessor(field)?.get_before_type_cast(self.metadata.as_ref()))
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
        let entity_type = Arc::clone(&self.entity_type);
        let accessor = Self::accessor_of(&entity_type, field)?;
        accessor.set(self.materialize_metadata(), value.into(), entity_type.coercer());
        Ok(())
    }

    /// Assigns a multiparameter value from its fragments.
    ///
    /// The container is only materialized once assembly succeeds.
    pub fn set_fragments(&mut self, field: &str, fragments: Vec<Fragment>) -> Result<()> {
        let entity_type = Arc::clone(&self.entity_type);
        let accessor = Self::accessor_of(&entity_type, field)?;
        let value = accessor.assemble(fragments, entity_type.assembler())?;
        accessor.set_assembled(self.materialize_metadata(), value);
        Ok(())
    }

    pub fn query(&self, field: &str) -> Result<bool> {
        Ok(self.accessor(field)?.query(self.metadata.as_ref()))
    }

    /// Whether `method` names a field accessor, a native attribute or a computed method.
    pub fn responds_to(&self, method: &str) -> bool {
        if self.entity_type.accessors().resolve(method).is_some() {
            return true;
        }

        let attribute = method.strip_suffix('=').unwrap_or(method);
        self.attributes.contains_key(attribute) || self.computed_method(method).is_some()
    }

    /// Reads any readable name: native attribute, virtual field or computed method.
    pub fn call_method(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.attributes.get(name) {
            return Ok(value.clone());
        }
        if let Some(accessor) = self.entity_type.accessor(name) {
            return Ok(accessor.get(self.metadata.as_ref()));
        }
        match self.computed_method(name) {
            Some(method) => Ok(method(self)),
            None => Err(MetaError::UndefinedField {
                entity: self.type_name().to_string(),
                field: name.to_string(),
            }),
        }
    }

    /// Adds a computed method to this instance only, shadowing one of the type.
    pub fn define_method<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Entity) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        self.singleton_methods.retain(|(existing, _)| *existing != name);
        self.singleton_methods.push((name, Arc::new(f)));
    }

    fn computed_method(&self, name: &str) -> Option<ComputedMethod> {
        self.singleton_methods
            .iter()
            .find(|(method, _)| method == name)
            .map(|(_, f)| Arc::clone(f))
            .or_else(|| self.entity_type.method(name).cloned())
    }

    /// Mass assignment of native attributes, virtual fields and multiparameter fragments.
    pub fn assign_attributes<I, K, V>(&mut self, attributes: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let entity_type = Arc::clone(&self.entity_type);
        let partitioned = entity_type.assembler().partition(attributes);

        for (key, value) in partitioned.plain {
            if entity_type.schema().get_column(&key).is_some() {
                self.write_attribute(&key, value)?;
            } else {
                self.set(&key, value)
                    .map_err(|_| self.unknown_attribute(&key))?;
            }
        }

        for (field, fragments) in partitioned.multipart {
            if entity_type.accessor(&field).is_some() {
                self.set_fragments(&field, fragments)?;
            } else if let Some(column) = entity_type.schema().get_column(&field) {
                let value = entity_type.assembler().assemble(
                    &field,
                    Some(&column.data_type),
                    fragments,
                )?;
                self.attributes.insert(field, value);
            } else {
                return Err(self.unknown_attribute(&field));
            }
        }

        Ok(())
    }

    fn accessor(&self, field: &str) -> Result<&FieldAccessor> {
        Self::accessor_of(&self.entity_type, field)
    }

    fn accessor_of<'a>(entity_type: &'a EntityType, field: &str) -> Result<&'a FieldAccessor> {
        entity_type
            .accessor(field)
            .ok_or_else(|| MetaError::UndefinedField {
                entity: entity_type.name().to_string(),
                field: field.to_string(),
            })
    }

    fn unknown_attribute(&self, attribute: &str) -> MetaError {
        MetaError::UnknownAttribute {
            entity: self.type_name().to_string(),
            attribute: attribute.to_string(),
        }
    }

    // ========================================
    // Metadata container
    // ========================================

    pub fn metadata(&self) -> Option<&MetadataContainer> {
        self.metadata.as_ref()
    }

    pub fn metadata_mut(&mut self) -> Option<&mut MetadataContainer> {
        self.metadata.as_mut()
    }

    /// Returns the container, creating it on first use.
    pub fn materialize_metadata(&mut self) -> &mut MetadataContainer {
        self.metadata.get_or_insert_with(|| {
            debug!(entity = %self.entity_type.name(), "creating metadata container");
            MetadataContainer::new()
        })
    }

    pub fn metadata_id(&self) -> Option<&str> {
        self.metadata_id.as_deref()
    }

    /// Points the entity at a stored blob without loading it.
    pub fn set_metadata_id(&mut self, id: impl Into<String>) {
        self.metadata_id = Some(id.into());
    }

    /// Attaches the stored blob referenced by `metadata_id`, if any.
    ///
    /// Returns false when the entity already has a container, has no blob id,
    /// or the store no longer holds the blob.
    pub fn load_metadata(&mut self, store: &dyn MetadataStore) -> Result<bool> {
        if self.metadata.is_some() {
            return Ok(false);
        }
        let Some(id) = self.metadata_id.as_deref() else {
            return Ok(false);
        };

        match store.load(id)? {
            Some(container) => {
                self.metadata = Some(container);
                Ok(true)
            }
            None => {
                warn!(entity = %self.type_name(), metadata_id = %id, "metadata blob is missing");
                Ok(false)
            }
        }
    }

    // ========================================
    // Validation and persistence
    // ========================================

    /// Runs column checks and registered rules, replacing the previous errors.
    pub fn is_valid(&mut self) -> bool {
        let mut errors = ValidationErrors::new();

        for column in self.entity_type.schema().columns() {
            let value = self.attributes.get(&column.name).unwrap_or(&Value::Null);
            if let Err(message) = column.validate(value) {
                errors.add(column.name.clone(), message);
            }
        }

        self.entity_type
            .validations()
            .run(|field| self.read_for_validation(field), &mut errors);

        self.errors = errors;
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    fn read_for_validation(&self, field: &str) -> Value {
        match self.entity_type.accessor(field) {
            Some(accessor) => accessor.get(self.metadata.as_ref()),
            None => self.attributes.get(field).cloned().unwrap_or(Value::Null),
        }
    }

    /// Validates and, when valid, persists a dirty metadata container.
    ///
    /// Returns `Ok(false)` for an invalid entity; storage failures are errors.
    pub fn save(&mut self, store: &dyn MetadataStore) -> Result<bool> {
        if !self.is_valid() {
            debug!(entity = %self.type_name(), errors = %self.errors, "not saving invalid entity");
            return Ok(false);
        }

        self.persist_metadata(store)?;
        Ok(true)
    }

    /// Like [`Entity::save`] but an invalid entity is an error.
    pub fn save_strict(&mut self, store: &dyn MetadataStore) -> Result<()> {
        if self.save(store)? {
            Ok(())
        } else {
            Err(MetaError::RecordInvalid(self.errors.to_string()))
        }
    }

    fn persist_metadata(&mut self, store: &dyn MetadataStore) -> Result<()> {
        let Some(metadata) = self.metadata.as_mut() else {
            return Ok(());
        };
        if !metadata.is_dirty() {
            return Ok(());
        }

        let id = store.save(metadata)?;
        metadata.mark_persisted(id.clone());
        debug!(entity = %self.entity_type.name(), metadata_id = %id, "persisted metadata");
        self.metadata_id = Some(id);
        Ok(())
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("type", &self.entity_type.name())
            .field("attributes", &self.attributes)
            .field("metadata", &self.metadata)
            .field("metadata_id", &self.metadata_id)
            .finish()
    }
}
