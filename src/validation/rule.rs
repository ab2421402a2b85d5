use crate::core::{DataType, Value};
use crate::fields::FieldSpec;

/// A check run against a field's current accessor value.
///
/// Rules return the message to record against the field, never raise.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, value: &Value) -> Result<(), String>;
}

/// Type and nullability check derived from a typed field declaration.
#[derive(Debug, Clone)]
pub struct TypeRule {
    data_type: DataType,
    allow_nil: bool,
    allow_blank: bool,
}

impl TypeRule {
    pub fn new(data_type: DataType, allow_nil: bool, allow_blank: bool) -> Self {
        Self {
            data_type,
            allow_nil,
            allow_blank,
        }
    }

    /// `None` for untyped fields, which carry no type rule.
    pub fn for_field(spec: &FieldSpec) -> Option<Self> {
        spec.data_type()
            .map(|data_type| Self::new(data_type.clone(), spec.allows_nil(), spec.allows_blank()))
    }
}

impl ValidationRule for TypeRule {
    fn name(&self) -> &'static str {
        "type"
    }

    fn validate(&self, value: &Value) -> Result<(), String> {
        if value.is_null() {
            return if self.allow_nil || self.allow_blank {
                Ok(())
            } else {
                Err("can't be nil".to_string())
            };
        }

        if value.is_blank() {
            return if self.allow_blank {
                Ok(())
            } else {
                Err("can't be blank".to_string())
            };
        }

        if self.data_type.is_instance(value) {
            Ok(())
        } else {
            Err(format!(
                "is not a valid {}",
                self.data_type.to_string().to_lowercase()
            ))
        }
    }
}
