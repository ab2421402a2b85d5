use crate::core::{DataType, Value};
use crate::validation::Directive;

/// Declaration of one virtual field.
///
/// Built with the chained setters below and frozen once registered on an
/// entity type. Fields are required unless `allow_nil` or `allow_blank` is set;
/// an untyped field accepts any value and carries no type rule.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    data_type: Option<DataType>,
    allow_nil: bool,
    allow_blank: bool,
    default: Option<Value>,
    directives: Vec<Directive>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
            allow_nil: false,
            allow_blank: false,
            default: None,
            directives: Vec::new(),
        }
    }

    pub fn typed(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn allow_nil(mut self) -> Self {
        self.allow_nil = true;
        self
    }

    pub fn allow_blank(mut self) -> Self {
        self.allow_blank = true;
        self
    }

    pub fn nullability(mut self, allow_nil: bool, allow_blank: bool) -> Self {
        self.allow_nil = allow_nil;
        self.allow_blank = allow_blank;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn validates(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> Option<&DataType> {
        self.data_type.as_ref()
    }

    pub fn allows_nil(&self) -> bool {
        self.allow_nil
    }

    pub fn allows_blank(&self) -> bool {
        self.allow_blank
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn is_numeric(&self) -> bool {
        self.data_type.as_ref().is_some_and(DataType::is_numeric)
    }

    /// Whether a nil or blank value bypasses coercion and validation for this field.
    pub fn permits_empty(&self, value: &Value) -> bool {
        (self.allow_nil && value.is_null()) || (self.allow_blank && value.is_blank())
    }

    /// True when registering the field produces at least one validation rule.
    pub fn has_rules(&self) -> bool {
        self.data_type.is_some() || !self.directives.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_required_and_untyped() {
        let spec = FieldSpec::new("untyped");
        assert_eq!(spec.name(), "untyped");
        assert!(spec.data_type().is_none());
        assert!(!spec.allows_nil());
        assert!(!spec.allows_blank());
        assert!(spec.default().is_none());
        assert!(!spec.has_rules());
    }

    #[test]
    fn test_empty_values_permitted_by_policy() {
        let nil_ok = FieldSpec::new("a").typed(DataType::Date).allow_nil();
        assert!(nil_ok.permits_empty(&Value::Null));
        assert!(!nil_ok.permits_empty(&Value::from("")));

        let blank_ok = FieldSpec::new("b").typed(DataType::Date).allow_blank();
        assert!(blank_ok.permits_empty(&Value::Null));
        assert!(blank_ok.permits_empty(&Value::from("  ")));
        assert!(!blank_ok.permits_empty(&Value::from("x")));
    }

    #[test]
    fn test_numeric_detection() {
        assert!(FieldSpec::new("n").typed(DataType::Integer).is_numeric());
        assert!(FieldSpec::new("f").typed(DataType::Float).is_numeric());
        assert!(!FieldSpec::new("b").typed(DataType::Boolean).is_numeric());
        assert!(!FieldSpec::new("u").is_numeric());
    }
}
