use super::options::{Root, SerializeOptions};
use crate::core::{DataType, Result, Value};
use crate::entity::Entity;
use convert_case::{Case, Casing};
use serde_json::Value as JsonValue;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Turns an entity into a structured document.
pub trait StructuredEncoder {
    type Output;

    fn encode(&self, entity: &Entity, options: &SerializeOptions) -> Result<Self::Output>;
}

/// One serialized key: a native attribute or a requested method.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedEntry {
    pub name: String,
    pub value: Value,
    /// Column type for native attributes, used when the value is null.
    pub column_type: Option<DataType>,
}

/// Native attributes in column order (filtered by `only`/`except`), then methods in order.
pub fn encoded_entries(entity: &Entity, options: &SerializeOptions) -> Result<Vec<EncodedEntry>> {
    let mut entries = Vec::new();

    for column in entity.entity_type().schema().columns() {
        if !options.includes_attribute(&column.name) {
            continue;
        }
        entries.push(EncodedEntry {
            name: column.name.clone(),
            value: entity.read_attribute(&column.name)?,
            column_type: Some(column.data_type.clone()),
        });
    }

    for method in options.method_names() {
        if entries.iter().any(|entry| entry.name == *method) {
            continue;
        }
        entries.push(EncodedEntry {
            name: method.clone(),
            value: entity.call_method(method)?,
            column_type: None,
        });
    }

    Ok(entries)
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl StructuredEncoder for JsonEncoder {
    type Output = JsonValue;

    fn encode(&self, entity: &Entity, options: &SerializeOptions) -> Result<JsonValue> {
        let mut object = serde_json::Map::new();
        for entry in encoded_entries(entity, options)? {
            object.insert(entry.name, entry.value.to_json());
        }

        let root = match options.root_option() {
            Root::TypeName => entity.type_name().to_case(Case::Snake),
            Root::Named(name) => name.clone(),
            Root::Omitted => return Ok(JsonValue::Object(object)),
        };

        let mut wrapped = serde_json::Map::new();
        wrapped.insert(root, JsonValue::Object(object));
        Ok(JsonValue::Object(wrapped))
    }
}

// ============================================================================
// XML
// ============================================================================

/// Rails-style XML: dasherized element names with `type` and `nil` attributes.
#[derive(Debug, Clone, Copy)]
pub struct XmlEncoder {
    indent: usize,
}

impl Default for XmlEncoder {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl XmlEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(indent: usize) -> Self {
        Self { indent }
    }

    fn element(&self, out: &mut String, entry: &EncodedEntry) {
        let tag = dasherize(&entry.name);
        let type_attr = xml_type(&entry.value)
            .or_else(|| entry.column_type.as_ref().and_then(column_xml_type));

        out.push_str(&format!("{:width$}<{}", "", tag, width = self.indent));
        if let Some(kind) = type_attr {
            out.push_str(&format!(r#" type="{}""#, kind));
        }
        if entry.value.is_null() {
            out.push_str(&format!(r#" nil="true"></{}>"#, tag));
        } else {
            out.push_str(&format!(">{}</{}>", escape(&entry.value.to_string()), tag));
        }
        out.push('\n');
    }
}

impl StructuredEncoder for XmlEncoder {
    type Output = String;

    fn encode(&self, entity: &Entity, options: &SerializeOptions) -> Result<String> {
        let root = match options.root_option() {
            Root::Named(name) => dasherize(name),
            Root::TypeName | Root::Omitted => entity.type_name().to_case(Case::Kebab),
        };

        let mut out = String::new();
        out.push_str(XML_HEADER);
        out.push('\n');
        out.push_str(&format!("<{}>\n", root));
        for entry in encoded_entries(entity, options)? {
            self.element(&mut out, &entry);
        }
        out.push_str(&format!("</{}>\n", root));
        Ok(out)
    }
}

fn dasherize(name: &str) -> String {
    name.replace('_', "-")
}

fn xml_type(value: &Value) -> Option<&'static str> {
    match value {
        Value::Integer(_) => Some("integer"),
        Value::Float(_) => Some("float"),
        Value::Boolean(_) => Some("boolean"),
        Value::Date(_) => Some("date"),
        Value::Timestamp(_) => Some("datetime"),
        Value::Null | Value::Text(_) | Value::Composite(_) => None,
    }
}

fn column_xml_type(data_type: &DataType) -> Option<&'static str> {
    match data_type {
        DataType::Integer => Some("integer"),
        DataType::Float => Some("float"),
        DataType::Boolean => Some("boolean"),
        DataType::Date => Some("date"),
        DataType::Timestamp => Some("datetime"),
        DataType::Text | DataType::Composite(_) => None,
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
