mod registry;
mod spec;

pub use registry::FieldRegistry;
pub use spec::FieldSpec;
