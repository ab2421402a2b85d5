use super::ValidationRule;
use crate::core::{MetaError, Result, Value};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Extra validation attached to a field declaration and registered as-is.
#[derive(Clone)]
pub enum Directive {
    Presence,
    Numericality { only_integer: bool },
    Length { min: Option<usize>, max: Option<usize> },
    Inclusion(Vec<Value>),
    Exclusion(Vec<Value>),
    Format(Regex),
    Custom(Arc<dyn ValidationRule>),
}

impl Directive {
    pub fn numericality() -> Self {
        Self::Numericality {
            only_integer: false,
        }
    }

    pub fn only_integer() -> Self {
        Self::Numericality { only_integer: true }
    }

    pub fn length(min: Option<usize>, max: Option<usize>) -> Self {
        Self::Length { min, max }
    }

    pub fn format(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self::Format)
            .map_err(|e| MetaError::Config(format!("Invalid format pattern '{}': {}", pattern, e)))
    }

    pub fn custom(rule: impl ValidationRule + 'static) -> Self {
        Self::Custom(Arc::new(rule))
    }
}

impl fmt::Debug for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Presence => write!(f, "Presence"),
            Self::Numericality { only_integer } => f
                .debug_struct("Numericality")
                .field("only_integer", only_integer)
                .finish(),
            Self::Length { min, max } => f
                .debug_struct("Length")
                .field("min", min)
                .field("max", max)
                .finish(),
            Self::Inclusion(values) => f.debug_tuple("Inclusion").field(values).finish(),
            Self::Exclusion(values) => f.debug_tuple("Exclusion").field(values).finish(),
            Self::Format(regex) => f.debug_tuple("Format").field(&regex.as_str()).finish(),
            Self::Custom(rule) => f.debug_tuple("Custom").field(&rule.name()).finish(),
        }
    }
}

impl ValidationRule for Directive {
    fn name(&self) -> &'static str {
        match self {
            Self::Presence => "presence",
            Self::Numericality { .. } => "numericality",
            Self::Length { .. } => "length",
            Self::Inclusion(_) => "inclusion",
            Self::Exclusion(_) => "exclusion",
            Self::Format(_) => "format",
            Self::Custom(rule) => rule.name(),
        }
    }

    fn validate(&self, value: &Value) -> std::result::Result<(), String> {
        match self {
            Self::Presence => {
                if value.is_blank() {
                    Err("can't be blank".to_string())
                } else {
                    Ok(())
                }
            }
            Self::Numericality { only_integer } => check_numericality(value, *only_integer),
            Self::Length { min, max } => {
                let len = value_length(value);
                if let Some(min) = min.filter(|min| len < *min) {
                    return Err(format!("is too short (minimum is {} characters)", min));
                }
                if let Some(max) = max.filter(|max| len > *max) {
                    return Err(format!("is too long (maximum is {} characters)", max));
                }
                Ok(())
            }
            Self::Inclusion(values) => {
                if values.contains(value) {
                    Ok(())
                } else {
                    Err("is not included in the list".to_string())
                }
            }
            Self::Exclusion(values) => {
                if values.contains(value) {
                    Err("is reserved".to_string())
                } else {
                    Ok(())
                }
            }
            Self::Format(regex) => {
                let matched = match value {
                    Value::Null => false,
                    Value::Text(s) => regex.is_match(s),
                    other => regex.is_match(&other.to_string()),
                };
                if matched {
                    Ok(())
                } else {
                    Err("is invalid".to_string())
                }
            }
            Self::Custom(rule) => rule.validate(value),
        }
    }
}

fn check_numericality(value: &Value, only_integer: bool) -> std::result::Result<(), String> {
    let not_a_number = || Err("is not a number".to_string());
    let not_an_integer = || Err("must be an integer".to_string());

    match value {
        Value::Integer(_) => Ok(()),
        Value::Float(f) if only_integer && f.fract() != 0.0 => not_an_integer(),
        Value::Float(_) => Ok(()),
        Value::Text(s) => {
            let trimmed = s.trim();
            if trimmed.parse::<i64>().is_ok() {
                Ok(())
            } else if trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
                if only_integer { not_an_integer() } else { Ok(()) }
            } else {
                not_a_number()
            }
        }
        _ => not_a_number(),
    }
}

fn value_length(value: &Value) -> usize {
    match value {
        Value::Null => 0,
        Value::Text(s) => s.chars().count(),
        Value::Composite(c) => c.args.len(),
        other => other.to_string().chars().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EvenRule;

    impl ValidationRule for EvenRule {
        fn name(&self) -> &'static str {
            "even"
        }

        fn validate(&self, value: &Value) -> std::result::Result<(), String> {
            match value.as_i64() {
                Some(i) if i % 2 == 0 => Ok(()),
                _ => Err("must be even".to_string()),
            }
        }
    }

    #[test]
    fn test_numericality() {
        let rule = Directive::numericality();
        assert!(rule.validate(&Value::Integer(123)).is_ok());
        assert!(rule.validate(&Value::from("10.5")).is_ok());
        assert_eq!(rule.validate(&Value::from("not number")), Err("is not a number".to_string()));
        assert!(rule.validate(&Value::Null).is_err());

        let integers = Directive::only_integer();
        assert!(integers.validate(&Value::from("08")).is_ok());
        assert_eq!(integers.validate(&Value::Float(1.5)), Err("must be an integer".to_string()));
    }

    #[test]
    fn test_presence_and_length() {
        assert!(Directive::Presence.validate(&Value::from(" ")).is_err());
        assert!(Directive::Presence.validate(&Value::Boolean(false)).is_ok());

        let length = Directive::length(Some(2), Some(4));
        assert!(length.validate(&Value::from("a")).is_err());
        assert!(length.validate(&Value::from("abc")).is_ok());
        assert!(length.validate(&Value::from("abcde")).is_err());
    }

    #[test]
    fn test_membership_and_format() {
        let inclusion = Directive::Inclusion(vec![Value::from("red"), Value::from("blue")]);
        assert!(inclusion.validate(&Value::from("red")).is_ok());
        assert!(inclusion.validate(&Value::from("green")).is_err());

        let exclusion = Directive::Exclusion(vec![Value::from("admin")]);
        assert_eq!(exclusion.validate(&Value::from("admin")), Err("is reserved".to_string()));

        let format = Directive::format(r"^\d{3}$").unwrap();
        assert!(format.validate(&Value::from("123")).is_ok());
        assert!(format.validate(&Value::Integer(123)).is_ok());
        assert!(format.validate(&Value::from("12a")).is_err());
        assert!(Directive::format("(").is_err());
    }

    #[test]
    fn test_custom_rule() {
        let rule = Directive::custom(EvenRule);
        assert_eq!(rule.name(), "even");
        assert!(rule.validate(&Value::Integer(4)).is_ok());
        assert_eq!(rule.validate(&Value::Integer(3)), Err("must be even".to_string()));
    }
}
