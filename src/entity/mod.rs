//! Entity types and their instances.
//!
//! - `entity_type.rs` - type definitions and the declaration builder
//! - `accessor.rs` - per-field accessor dispatch table
//! - `record.rs` - entity instances, mass assignment, validation and saving
//! - `catalog.rs` - name to type lookup

mod accessor;
mod catalog;
mod entity_type;
mod record;

pub use accessor::{AccessorKind, AccessorTable, FieldAccessor};
pub use catalog::TypeCatalog;
pub use entity_type::{EntityType, EntityTypeBuilder};
pub use record::{ComputedMethod, Entity};
