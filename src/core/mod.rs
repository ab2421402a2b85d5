pub mod error;
pub mod types;
pub mod value;

pub use error::{MetaError, Result};
pub use types::{Column, CompositeType, DataType, Schema};
pub use value::{CompositeValue, Value};
