//! Write-time type coercion
//!
//! Converts raw input into a field's declared type. Coercion never fails:
//! values that cannot be converted are handed back unchanged and the type
//! rule registered for the field reports the mismatch at validation time.

use crate::core::{DataType, Value};
use tracing::trace;

const TRUE_MARKERS: &[&str] = &["1", "t", "T", "true", "TRUE", "True", "on", "yes"];
const FALSE_MARKERS: &[&str] = &["0", "f", "F", "false", "FALSE", "False", "off", "no"];

/// What happened to a raw value on its way into a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionOutcome {
    /// No declared type, or the value already conformed.
    Accepted,
    /// The value was converted to the declared type.
    Converted,
    /// The value could not be converted and is kept as given.
    Mismatched,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub value: Value,
    pub outcome: CoercionOutcome,
}

impl Coerced {
    fn accepted(value: Value) -> Self {
        Self {
            value,
            outcome: CoercionOutcome::Accepted,
        }
    }

    fn converted(value: Value) -> Self {
        Self {
            value,
            outcome: CoercionOutcome::Converted,
        }
    }

    fn mismatched(value: Value) -> Self {
        Self {
            value,
            outcome: CoercionOutcome::Mismatched,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCoercer;

impl TypeCoercer {
    pub fn new() -> Self {
        Self
    }

    pub fn coerce(&self, raw: Value, target: Option<&DataType>) -> Coerced {
        let Some(target) = target else {
            return Coerced::accepted(raw);
        };

        if target.is_instance(&raw) {
            return match (target, raw) {
                (DataType::Float, Value::Integer(i)) => Coerced::converted(Value::Float(i as f64)),
                (_, raw) => Coerced::accepted(raw),
            };
        }

        let coerced = match target {
            DataType::Boolean => coerce_boolean(raw),
            DataType::Integer => coerce_integer(raw),
            DataType::Float => coerce_float(raw),
            _ => Coerced::mismatched(raw),
        };

        if coerced.outcome == CoercionOutcome::Mismatched {
            trace!(target_type = %target, value = %coerced.value, "value left uncoerced");
        }

        coerced
    }
}

fn coerce_boolean(raw: Value) -> Coerced {
    match &raw {
        Value::Text(s) if s.trim().is_empty() => Coerced::converted(Value::Null),
        Value::Text(s) if TRUE_MARKERS.contains(&s.trim()) => Coerced::converted(Value::Boolean(true)),
        Value::Text(s) if FALSE_MARKERS.contains(&s.trim()) => {
            Coerced::converted(Value::Boolean(false))
        }
        Value::Integer(1) => Coerced::converted(Value::Boolean(true)),
        Value::Integer(0) => Coerced::converted(Value::Boolean(false)),
        _ => Coerced::mismatched(raw),
    }
}

fn coerce_integer(raw: Value) -> Coerced {
    match &raw {
        Value::Text(s) if s.trim().is_empty() => Coerced::converted(Value::Null),
        // str::parse is always base 10, so "08" is 8 rather than an octal error.
        Value::Text(s) => match s.trim().parse::<i64>() {
            Ok(i) => Coerced::converted(Value::Integer(i)),
            Err(_) => Coerced::mismatched(raw),
        },
        Value::Float(_) => match raw.as_i64() {
            Some(i) => Coerced::converted(Value::Integer(i)),
            None => Coerced::mismatched(raw),
        },
        _ => Coerced::mismatched(raw),
    }
}

fn coerce_float(raw: Value) -> Coerced {
    match &raw {
        Value::Text(s) if s.trim().is_empty() => Coerced::converted(Value::Null),
        Value::Text(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Coerced::converted(Value::Float(f)),
            _ => Coerced::mismatched(raw),
        },
        _ => Coerced::mismatched(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CompositeType, CompositeValue};
    use chrono::NaiveDate;

    fn coerce(raw: impl Into<Value>, target: DataType) -> Coerced {
        TypeCoercer::new().coerce(raw.into(), Some(&target))
    }

    #[test]
    fn test_boolean_markers() {
        assert_eq!(coerce("1", DataType::Boolean).value, Value::Boolean(true));
        assert_eq!(coerce("0", DataType::Boolean).value, Value::Boolean(false));
        assert_eq!(coerce("true", DataType::Boolean).value, Value::Boolean(true));
        assert_eq!(coerce("f", DataType::Boolean).value, Value::Boolean(false));
        assert_eq!(coerce(false, DataType::Boolean).outcome, CoercionOutcome::Accepted);

        let unknown = coerce("maybe", DataType::Boolean);
        assert_eq!(unknown.outcome, CoercionOutcome::Mismatched);
        assert_eq!(unknown.value, Value::from("maybe"));
    }

    #[test]
    fn test_integer_parsing_is_decimal() {
        assert_eq!(coerce("50", DataType::Integer).value, Value::Integer(50));
        assert_eq!(coerce("08", DataType::Integer).value, Value::Integer(8));
        assert_eq!(coerce(" 09 ", DataType::Integer).value, Value::Integer(9));
        assert_eq!(coerce(4.0, DataType::Integer).value, Value::Integer(4));
        assert_eq!(coerce("", DataType::Integer).value, Value::Null);

        let bad = coerce("not number", DataType::Integer);
        assert_eq!(bad.outcome, CoercionOutcome::Mismatched);
        assert_eq!(bad.value, Value::from("not number"));
    }

    #[test]
    fn test_float_parsing() {
        assert_eq!(coerce("10.5", DataType::Float).value, Value::Float(10.5));
        assert!(matches!(coerce(3i64, DataType::Float).value, Value::Float(f) if f == 3.0));
        assert_eq!(coerce("abc", DataType::Float).outcome, CoercionOutcome::Mismatched);
    }

    #[test]
    fn test_other_types_require_instances() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(coerce(date, DataType::Date).outcome, CoercionOutcome::Accepted);
        assert_eq!(coerce("2024-01-15", DataType::Date).outcome, CoercionOutcome::Mismatched);

        let tester = DataType::Composite(CompositeType::new("ConstructorTester"));
        let instance = CompositeValue::new("ConstructorTester", vec![Value::Integer(1)]);
        assert_eq!(coerce(instance, tester.clone()).outcome, CoercionOutcome::Accepted);
        assert_eq!(coerce("not correct", tester).outcome, CoercionOutcome::Mismatched);
    }

    #[test]
    fn test_untyped_passes_through() {
        let coerced = TypeCoercer::new().coerce(Value::from("anything"), None);
        assert_eq!(coerced.outcome, CoercionOutcome::Accepted);
        assert_eq!(coerced.value, Value::from("anything"));
    }
}
