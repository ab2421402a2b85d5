use super::encoder::{JsonEncoder, StructuredEncoder, XmlEncoder};
use super::options::{MethodPlacement, SerializeOptions};
use crate::core::Result;
use crate::entity::Entity;
use serde_json::Value as JsonValue;
use tracing::trace;

/// Adds an entity's virtual fields to whatever the caller asked an encoder for.
///
/// Only `methods` is touched. The caller's `only`, `except` and methods survive,
/// and the encoder output comes back as is.
#[derive(Debug, Clone, Copy)]
pub struct SerializationOverlay<E> {
    encoder: E,
    placement: MethodPlacement,
}

impl<E: StructuredEncoder> SerializationOverlay<E> {
    pub fn new(encoder: E, placement: MethodPlacement) -> Self {
        Self { encoder, placement }
    }

    pub fn placement(&self) -> MethodPlacement {
        self.placement
    }

    pub fn merged_options(&self, entity: &Entity, options: &SerializeOptions) -> SerializeOptions {
        let fields = entity.entity_type().metadata_fields();
        let merged = options.with_extra_methods(&fields, self.placement);
        trace!(
            entity = %entity.type_name(),
            methods = ?merged.method_names(),
            "merged metadata fields into serializer methods"
        );
        merged
    }

    pub fn serialize(&self, entity: &Entity, options: &SerializeOptions) -> Result<E::Output> {
        let merged = self.merged_options(entity, options);
        self.encoder.encode(entity, &merged)
    }
}

impl SerializationOverlay<JsonEncoder> {
    pub fn json() -> Self {
        Self::new(JsonEncoder, MethodPlacement::BeforeCaller)
    }
}

impl SerializationOverlay<XmlEncoder> {
    pub fn xml() -> Self {
        Self::new(XmlEncoder::new(), MethodPlacement::AfterCaller)
    }
}

impl Entity {
    /// JSON form with every visible virtual field included.
    pub fn as_json(&self, options: &SerializeOptions) -> Result<JsonValue> {
        SerializationOverlay::json().serialize(self, options)
    }

    pub fn to_json_string(&self, options: &SerializeOptions) -> Result<String> {
        Ok(serde_json::to_string(&self.as_json(options)?)?)
    }

    /// XML document with every visible virtual field included.
    pub fn to_xml(&self, options: &SerializeOptions) -> Result<String> {
        SerializationOverlay::xml().serialize(self, options)
    }
}
