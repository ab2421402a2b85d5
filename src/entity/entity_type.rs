use super::{AccessorTable, ComputedMethod, Entity, FieldAccessor};
use crate::coercion::{MultipartAssembler, TypeCoercer};
use crate::core::{Column, MetaError, Result, Schema, Value};
use crate::fields::{FieldRegistry, FieldSpec};
use crate::validation::{Directive, EmptyPolicy, TypeRule, Validations};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Definition of a record type: native columns plus declared virtual fields.
///
/// Built once through [`EntityTypeBuilder`] and shared behind `Arc` by all of
/// its instances. Subtypes keep a reference to their parent and extend copies
/// of its accessor and rule tables.
pub struct EntityType {
    name: String,
    parent: Option<Arc<EntityType>>,
    schema: Schema,
    registry: Arc<FieldRegistry>,
    accessors: AccessorTable,
    validations: Validations,
    methods: Vec<(String, ComputedMethod)>,
    coercer: TypeCoercer,
    assembler: MultipartAssembler,
}

impl EntityType {
    pub fn builder(name: impl Into<String>) -> EntityTypeBuilder {
        let name = name.into();
        EntityTypeBuilder {
            registry: FieldRegistry::new(name.clone()),
            name,
            parent: None,
            schema: Schema::default(),
            accessors: AccessorTable::new(),
            validations: Validations::new(),
            methods: Vec::new(),
        }
    }

    /// Starts a subtype that inherits columns, fields, rules and methods.
    pub fn subtype(parent: &Arc<EntityType>, name: impl Into<String>) -> EntityTypeBuilder {
        let name = name.into();
        EntityTypeBuilder {
            registry: FieldRegistry::inheriting(name.clone(), Arc::clone(&parent.registry)),
            name,
            parent: Some(Arc::clone(parent)),
            schema: parent.schema.clone(),
            accessors: parent.accessors.clone(),
            validations: parent.validations.clone(),
            methods: parent.methods.clone(),
        }
    }

    /// Continues the declaration of this type. Existing instances keep the old definition.
    pub fn reopen(self: &Arc<Self>) -> EntityTypeBuilder {
        EntityTypeBuilder {
            name: self.name.clone(),
            parent: self.parent.clone(),
            schema: self.schema.clone(),
            registry: (*self.registry).clone(),
            accessors: self.accessors.clone(),
            validations: self.validations.clone(),
            methods: self.methods.clone(),
        }
    }

    pub fn new_entity(self: &Arc<Self>) -> Entity {
        Entity::new(Arc::clone(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<EntityType>> {
        self.parent.as_ref()
    }

    /// True for this type and every type it descends from.
    pub fn is_a(&self, name: &str) -> bool {
        self.name == name || self.parent.as_ref().is_some_and(|parent| parent.is_a(name))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn registry(&self) -> &Arc<FieldRegistry> {
        &self.registry
    }

    /// Virtual field names in declaration order, inherited ones first.
    pub fn metadata_fields(&self) -> Vec<String> {
        self.registry.field_names()
    }

    pub fn accessor(&self, field: &str) -> Option<&FieldAccessor> {
        self.accessors.get(field)
    }

    pub fn accessors(&self) -> &AccessorTable {
        &self.accessors
    }

    pub fn validations(&self) -> &Validations {
        &self.validations
    }

    pub fn method(&self, name: &str) -> Option<&ComputedMethod> {
        self.methods
            .iter()
            .find(|(method, _)| method == name)
            .map(|(_, f)| f)
    }

    pub fn coercer(&self) -> &TypeCoercer {
        &self.coercer
    }

    pub fn assembler(&self) -> &MultipartAssembler {
        &self.assembler
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityType")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|parent| parent.name()))
            .field("columns", &self.schema.columns())
            .field("metadata_fields", &self.metadata_fields())
            .field("validations", &self.validations)
            .finish()
    }
}

pub struct EntityTypeBuilder {
    name: String,
    parent: Option<Arc<EntityType>>,
    schema: Schema,
    registry: FieldRegistry,
    accessors: AccessorTable,
    validations: Validations,
    methods: Vec<(String, ComputedMethod)>,
}

impl EntityTypeBuilder {
    /// Adds a native column. Its name must not be taken by a declared field.
    pub fn column(mut self, column: Column) -> Result<Self> {
        if self.registry.contains(&column.name) {
            return Err(MetaError::FieldAlreadyDefined(column.name));
        }
        self.schema.push(column);
        Ok(self)
    }

    /// Declares a batch of virtual fields, halting on the first name collision.
    pub fn has_metadata<I>(mut self, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = FieldSpec>,
    {
        for spec in fields {
            self.declare(spec)?;
        }
        Ok(self)
    }

    /// Registers one field, installs its accessors and registers its rules.
    pub fn declare(&mut self, spec: FieldSpec) -> Result<()> {
        if self.schema.get_column(spec.name()).is_some() {
            return Err(MetaError::FieldAlreadyDefined(spec.name().to_string()));
        }

        let spec = self.registry.register(spec)?;
        self.accessors.install(Arc::clone(&spec));

        if let Some(rule) = TypeRule::for_field(&spec) {
            self.validations.register(spec.name(), Arc::new(rule));
        }

        let policy = EmptyPolicy {
            allow_nil: spec.allows_nil(),
            allow_blank: spec.allows_blank(),
        };
        for directive in spec.directives() {
            self.validations
                .register_with_policy(spec.name(), Arc::new(directive.clone()), policy);
        }

        debug!(
            entity = %self.name,
            field = %spec.name(),
            rules = self.validations.rule_names(spec.name()).len(),
            "declared metadata field"
        );
        Ok(())
    }

    /// Adds a directive for a native column or an already declared field.
    pub fn validates(mut self, field: impl Into<String>, directive: Directive) -> Self {
        self.validations.register(field, Arc::new(directive));
        self
    }

    /// Adds a computed value that serializers can request through `methods`.
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Entity) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        self.methods.retain(|(existing, _)| *existing != name);
        self.methods.push((name, Arc::new(f)));
        self
    }

    pub fn build(self) -> Arc<EntityType> {
        debug!(
            entity = %self.name,
            parent = ?self.parent.as_ref().map(|parent| parent.name().to_string()),
            fields = self.registry.len(),
            "built entity type"
        );

        Arc::new(EntityType {
            name: self.name,
            parent: self.parent,
            schema: self.schema,
            registry: Arc::new(self.registry),
            accessors: self.accessors,
            validations: self.validations,
            methods: self.methods,
            coercer: TypeCoercer::new(),
            assembler: MultipartAssembler::new(),
        })
    }
}

impl fmt::Debug for EntityTypeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityTypeBuilder")
            .field("name", &self.name)
            .field("fields", &self.registry.field_names())
            .finish()
    }
}
