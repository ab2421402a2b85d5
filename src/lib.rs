// ============================================================================
// metafields Library
// ============================================================================

//! Typed virtual fields for record types.
//!
//! An entity type declares virtual fields next to its native columns. Their
//! values live in one metadata blob per entity, created on the first write and
//! persisted through a [`MetadataStore`] when the entity is saved.
//!
//! # Examples
//!
//! ```
//! use metafields::{Column, DataType, Directive, EntityType, FieldSpec, InMemoryMetadataStore, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let user_type = EntityType::builder("User")
//!     .column(Column::new("id", DataType::Integer))?
//!     .has_metadata([
//!         FieldSpec::new("nickname"),
//!         FieldSpec::new("karma")
//!             .typed(DataType::Integer)
//!             .validates(Directive::numericality()),
//!     ])?
//!     .build();
//!
//! let mut user = user_type.new_entity();
//! user.set("karma", "08")?;
//! assert_eq!(user.get("karma")?, Value::Integer(8));
//!
//! let store = InMemoryMetadataStore::new();
//! assert!(user.save(&store)?);
//! assert!(user.metadata_id().is_some());
//! # Ok(())
//! # }
//! ```

pub mod coercion;
pub mod config;
pub mod core;
pub mod entity;
pub mod fields;
pub mod metadata;
pub mod serialization;
pub mod validation;

// Re-export main types for convenience
pub use coercion::{Fragment, MultipartAssembler, TypeCoercer};
pub use config::SchemaDocument;
pub use core::{Column, CompositeType, CompositeValue, DataType, MetaError, Result, Schema, Value};
pub use entity::{Entity, EntityType, EntityTypeBuilder, TypeCatalog};
pub use fields::{FieldRegistry, FieldSpec};
pub use metadata::{InMemoryMetadataStore, MetadataContainer, MetadataStore};
pub use serialization::{JsonEncoder, SerializationOverlay, SerializeOptions, StructuredEncoder, XmlEncoder};
pub use validation::{Directive, ValidationErrors, ValidationRule};
