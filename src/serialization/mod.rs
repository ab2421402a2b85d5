//! JSON and XML output for entities.
//!
//! The encoders know nothing about virtual fields; the overlay feeds them in
//! through the `methods` option.

mod encoder;
mod options;
mod overlay;

pub use encoder::{EncodedEntry, JsonEncoder, StructuredEncoder, XmlEncoder, encoded_entries};
pub use options::{MethodPlacement, Root, SerializeOptions};
pub use overlay::SerializationOverlay;
