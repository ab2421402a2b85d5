//! Raw input handling for virtual fields.
//!
//! - `coercer.rs` - scalar conversion to a declared type
//! - `multipart.rs` - fragment grouping and composite construction

mod coercer;
mod multipart;

pub use coercer::{Coerced, CoercionOutcome, TypeCoercer};
pub use multipart::{
    CastSuffix, Fragment, MultipartAssembler, MultipartKey, PartitionedAttributes,
};
