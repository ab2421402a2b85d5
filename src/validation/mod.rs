//! Validation rules for virtual fields and native columns.
//!
//! - `rule.rs` - the `ValidationRule` seam and the type rule derived from a declaration
//! - `directive.rs` - extra directives attached to a declaration
//! - `validations.rs` - per-type rule table
//! - `errors.rs` - messages keyed by field name

mod directive;
mod errors;
mod rule;
mod validations;

pub use directive::Directive;
pub use errors::ValidationErrors;
pub use rule::{TypeRule, ValidationRule};
pub use validations::{EmptyPolicy, Validations};
