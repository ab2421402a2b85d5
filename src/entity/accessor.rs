//! Per-field accessors
//!
//! Every registered field gets a [`FieldAccessor`] in its type's
//! [`AccessorTable`]. The table is the static dispatch surface of a type: the
//! four operations of each field can be enumerated and resolved by method name
//! (`name`, `name_before_type_cast`, `name=`, `name?`).

use crate::coercion::{CoercionOutcome, Fragment, MultipartAssembler, TypeCoercer};
use crate::core::{Result, Value};
use crate::fields::FieldSpec;
use crate::metadata::MetadataContainer;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    Get,
    GetBeforeTypeCast,
    Set,
    Query,
}

impl AccessorKind {
    pub const ALL: [AccessorKind; 4] = [
        AccessorKind::Get,
        AccessorKind::GetBeforeTypeCast,
        AccessorKind::Set,
        AccessorKind::Query,
    ];

    pub fn method_name(&self, field: &str) -> String {
        match self {
            Self::Get => field.to_string(),
            Self::GetBeforeTypeCast => format!("{}_before_type_cast", field),
            Self::Set => format!("{}=", field),
            Self::Query => format!("{}?", field),
        }
    }

    /// Splits a method name into the field it targets and the operation.
    pub fn parse(method: &str) -> (&str, AccessorKind) {
        if let Some(field) = method.strip_suffix("_before_type_cast") {
            (field, Self::GetBeforeTypeCast)
        } else if let Some(field) = method.strip_suffix('=') {
            (field, Self::Set)
        } else if let Some(field) = method.strip_suffix('?') {
            (field, Self::Query)
        } else {
            (method, Self::Get)
        }
    }
}

/// Operations bound to one field declaration.
#[derive(Debug, Clone)]
pub struct FieldAccessor {
    spec: Arc<FieldSpec>,
}

impl FieldAccessor {
    pub fn new(spec: Arc<FieldSpec>) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &Arc<FieldSpec> {
        &self.spec
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    /// Stored value, else the default when a container exists, else `Null`.
    pub fn get(&self, metadata: Option<&MetadataContainer>) -> Value {
        let Some(metadata) = metadata else {
            return Value::Null;
        };

        match metadata.get(self.spec.name()) {
            Some(value) => value.clone(),
            None => self.spec.default().cloned().unwrap_or(Value::Null),
        }
    }

    /// Values are coerced when written, so the raw read converges with `get`.
    pub fn get_before_type_cast(&self, metadata: Option<&MetadataContainer>) -> Value {
        self.get(metadata)
    }

    pub fn set(&self, metadata: &mut MetadataContainer, raw: Value, coercer: &TypeCoercer) {
        let value = if self.spec.permits_empty(&raw) {
            raw
        } else {
            let coerced = coercer.coerce(raw, self.spec.data_type());
            if coerced.outcome == CoercionOutcome::Mismatched {
                trace!(field = %self.spec.name(), "storing value that does not match the declared type");
            }
            coerced.value
        };

        metadata.insert(self.spec.name(), value);
    }

    /// Assembles fragments into the declared type of this field.
    pub fn assemble(&self, fragments: Vec<Fragment>, assembler: &MultipartAssembler) -> Result<Value> {
        assembler.assemble(self.spec.name(), self.spec.data_type(), fragments)
    }

    /// Stores an assembled value uncoerced.
    pub fn set_assembled(&self, metadata: &mut MetadataContainer, value: Value) {
        metadata.insert(self.spec.name(), value);
    }

    /// Presence of the stored value; absent keys and missing containers are false.
    pub fn query(&self, metadata: Option<&MetadataContainer>) -> bool {
        let Some(value) = metadata.and_then(|m| m.get(self.spec.name())) else {
            return false;
        };

        if self.spec.is_numeric() {
            if let Some(zero) = value.is_zero() {
                return !zero;
            }
        }

        match value {
            Value::Text(s) => !s.trim().is_empty(),
            other => !other.is_null(),
        }
    }
}

/// Accessors of every field visible to one entity type.
#[derive(Debug, Clone, Default)]
pub struct AccessorTable {
    accessors: HashMap<String, FieldAccessor>,
}

impl AccessorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&mut self, spec: Arc<FieldSpec>) {
        trace!(field = %spec.name(), "installing accessors");
        self.accessors
            .insert(spec.name().to_string(), FieldAccessor::new(spec));
    }

    pub fn get(&self, field: &str) -> Option<&FieldAccessor> {
        self.accessors.get(field)
    }

    /// Resolves a method name such as `number=` to its accessor and operation.
    pub fn resolve(&self, method: &str) -> Option<(&FieldAccessor, AccessorKind)> {
        let (field, kind) = AccessorKind::parse(method);
        self.accessors.get(field).map(|accessor| (accessor, kind))
    }

    /// All method names exposed for `field`.
    pub fn method_names(&self, field: &str) -> Vec<String> {
        if !self.accessors.contains_key(field) {
            return Vec::new();
        }
        AccessorKind::ALL
            .iter()
            .map(|kind| kind.method_name(field))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataType;

    fn accessor(spec: FieldSpec) -> FieldAccessor {
        FieldAccessor::new(Arc::new(spec))
    }

    #[test]
    fn test_method_names_round_trip() {
        for kind in AccessorKind::ALL {
            let method = kind.method_name("number");
            assert_eq!(AccessorKind::parse(&method), ("number", kind));
        }
    }

    #[test]
    fn test_get_without_container_ignores_default() {
        let has_default = accessor(FieldSpec::new("has_default").default_value("default"));
        assert_eq!(has_default.get(None), Value::Null);

        let metadata = MetadataContainer::new();
        assert_eq!(has_default.get(Some(&metadata)), Value::from("default"));
        assert_eq!(has_default.get_before_type_cast(Some(&metadata)), Value::from("default"));
    }

    #[test]
    fn test_stored_null_beats_default() {
        let has_default = accessor(FieldSpec::new("has_default").default_value("default"));
        let mut metadata = MetadataContainer::new();
        metadata.insert("has_default", Value::Null);
        assert_eq!(has_default.get(Some(&metadata)), Value::Null);
    }

    #[test]
    fn test_set_coerces_unless_empty_is_allowed() {
        let coercer = TypeCoercer::new();
        let mut metadata = MetadataContainer::new();

        let boolean = accessor(FieldSpec::new("boolean").typed(DataType::Boolean));
        boolean.set(&mut metadata, Value::from("1"), &coercer);
        assert_eq!(metadata.get("boolean"), Some(&Value::Boolean(true)));

        let can_be_blank = accessor(FieldSpec::new("can_be_blank").typed(DataType::Date).allow_blank());
        can_be_blank.set(&mut metadata, Value::from(""), &coercer);
        assert_eq!(metadata.get("can_be_blank"), Some(&Value::from("")));
        assert!(metadata.is_dirty());
    }

    #[test]
    fn test_query_rules() {
        let mut metadata = MetadataContainer::new();
        let number = accessor(FieldSpec::new("number").typed(DataType::Integer));
        let untyped = accessor(FieldSpec::new("untyped"));

        assert!(!number.query(None));
        assert!(!number.query(Some(&metadata)));

        metadata.insert("number", Value::Integer(0));
        assert!(!number.query(Some(&metadata)));
        metadata.insert("number", Value::Integer(4));
        assert!(number.query(Some(&metadata)));

        metadata.insert("untyped", Value::from(" "));
        assert!(!untyped.query(Some(&metadata)));
        metadata.insert("untyped", Value::from("foo"));
        assert!(untyped.query(Some(&metadata)));
    }

    #[test]
    fn test_table_resolution() {
        let mut table = AccessorTable::new();
        table.install(Arc::new(FieldSpec::new("untyped")));

        let (accessor, kind) = table.resolve("untyped=").unwrap();
        assert_eq!(accessor.name(), "untyped");
        assert_eq!(kind, AccessorKind::Set);
        assert!(table.resolve("inherited").is_none());
        assert_eq!(table.method_names("untyped").len(), 4);
    }
}
