//! JSON declaration documents.
//!
//! A document declares entity types with their native columns and virtual
//! fields and builds the same types the builder API would.

use crate::coercion::TypeCoercer;
use crate::core::{Column, DataType, MetaError, Result, Value};
use crate::entity::{EntityType, TypeCatalog};
use crate::fields::FieldSpec;
use crate::validation::Directive;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub types: Vec<TypeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeConfig {
    pub name: String,
    /// Parent type; it must appear earlier in the document.
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    /// Missing for untyped fields.
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub allow_nil: bool,
    #[serde(default)]
    pub allow_blank: bool,
    #[serde(default)]
    pub default: Option<JsonValue>,
    #[serde(default)]
    pub validates: ValidatesConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatesConfig {
    #[serde(default)]
    pub presence: bool,
    #[serde(default)]
    pub numericality: Option<NumericalityConfig>,
    #[serde(default)]
    pub length: Option<LengthConfig>,
    #[serde(default)]
    pub inclusion: Option<Vec<JsonValue>>,
    #[serde(default)]
    pub exclusion: Option<Vec<JsonValue>>,
    #[serde(default)]
    pub format: Option<String>,
}

/// `true` or `{ "only_integer": true }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericalityConfig {
    Enabled(bool),
    Options {
        #[serde(default)]
        only_integer: bool,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LengthConfig {
    #[serde(default)]
    pub min: Option<usize>,
    #[serde(default)]
    pub max: Option<usize>,
}

impl SchemaDocument {
    pub fn from_json_str(source: &str) -> Result<Self> {
        serde_json::from_str(source)
            .map_err(|err| MetaError::Config(format!("Invalid schema document: {}", err)))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|err| {
            MetaError::Config(format!(
                "Failed to read schema file '{}': {}",
                path.display(),
                err
            ))
        })?;
        Self::from_json_str(&source)
    }

    /// Builds every declared type in document order.
    pub fn build_catalog(&self) -> Result<TypeCatalog> {
        let mut catalog = TypeCatalog::new();

        for config in &self.types {
            let entity_type = config.build(&catalog)?;
            catalog = catalog.with_type(entity_type)?;
        }

        debug!(types = catalog.len(), "built type catalog from schema document");
        Ok(catalog)
    }
}

impl TypeConfig {
    fn build(&self, catalog: &TypeCatalog) -> Result<Arc<EntityType>> {
        let mut builder = match &self.extends {
            Some(parent) => {
                let parent = catalog.get(parent).ok_or_else(|| {
                    MetaError::Config(format!(
                        "Type '{}' extends '{}', which is not declared before it",
                        self.name, parent
                    ))
                })?;
                EntityType::subtype(parent, self.name.as_str())
            }
            None => EntityType::builder(self.name.as_str()),
        };

        for column in &self.columns {
            builder = builder.column(column.to_column())?;
        }

        let fields = self
            .fields
            .iter()
            .map(FieldDeclaration::to_field_spec)
            .collect::<Result<Vec<_>>>()?;

        Ok(builder.has_metadata(fields)?.build())
    }
}

impl ColumnConfig {
    pub fn to_column(&self) -> Column {
        let column = Column::new(self.name.as_str(), DataType::from_name(&self.type_name));
        if self.nullable { column } else { column.not_null() }
    }
}

impl FieldDeclaration {
    pub fn to_field_spec(&self) -> Result<FieldSpec> {
        let data_type = self.type_name.as_deref().map(DataType::from_name);

        let mut spec = FieldSpec::new(self.name.as_str()).nullability(self.allow_nil, self.allow_blank);

        if let Some(default) = &self.default {
            spec = spec.default_value(convert_default(&self.name, default, data_type.as_ref())?);
        }
        for directive in self.validates.directives(&self.name, data_type.as_ref())? {
            spec = spec.validates(directive);
        }
        if let Some(data_type) = data_type {
            spec = spec.typed(data_type);
        }

        Ok(spec)
    }
}

impl ValidatesConfig {
    /// Inclusion and exclusion values are converted to the field's type.
    pub fn directives(&self, field: &str, data_type: Option<&DataType>) -> Result<Vec<Directive>> {
        let convert = |values: &[JsonValue]| {
            values
                .iter()
                .map(|value| convert_default(field, value, data_type))
                .collect::<Result<Vec<_>>>()
        };

        let mut directives = Vec::new();

        if self.presence {
            directives.push(Directive::Presence);
        }
        match self.numericality {
            Some(NumericalityConfig::Enabled(true)) => directives.push(Directive::numericality()),
            Some(NumericalityConfig::Options { only_integer: true }) => {
                directives.push(Directive::only_integer())
            }
            Some(NumericalityConfig::Options { only_integer: false }) => {
                directives.push(Directive::numericality())
            }
            Some(NumericalityConfig::Enabled(false)) | None => {}
        }
        if let Some(length) = &self.length {
            directives.push(Directive::length(length.min, length.max));
        }
        if let Some(values) = &self.inclusion {
            directives.push(Directive::Inclusion(convert(values)?));
        }
        if let Some(values) = &self.exclusion {
            directives.push(Directive::Exclusion(convert(values)?));
        }
        if let Some(pattern) = &self.format {
            directives.push(Directive::format(pattern)?);
        }

        Ok(directives)
    }
}

/// Converts a declared JSON value to the type of its field.
fn convert_default(field: &str, json: &JsonValue, data_type: Option<&DataType>) -> Result<Value> {
    let value = Value::from_json(json);

    let invalid = || {
        MetaError::Config(format!(
            "Value for '{}' is not a valid {}: {}",
            field,
            data_type.map(|ty| ty.to_string()).unwrap_or_default(),
            json
        ))
    };

    match (data_type, &value) {
        (_, Value::Null) | (None, _) => Ok(value.clone()),
        (Some(DataType::Date), Value::Text(text)) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .map(Value::Date)
            .map_err(|_| invalid()),
        (Some(DataType::Timestamp), Value::Text(text)) => DateTime::parse_from_rfc3339(text.trim())
            .map(|at| Value::Timestamp(at.with_timezone(&Utc)))
            .map_err(|_| invalid()),
        (Some(data_type), _) => {
            let converted = TypeCoercer::new().coerce(value.clone(), Some(data_type)).value;
            if data_type.is_instance(&converted) || matches!(data_type, DataType::Composite(_)) {
                Ok(converted)
            } else {
                Err(invalid())
            }
        }
    }
}
