//! Multiparameter assembly
//!
//! Composite values can be submitted as several fragments keyed
//! `field(position)`, `field(positioni)` or `field(positionf)`. Fragments are
//! grouped per field, ordered by position, stripped of blank parts, cast by
//! suffix, and handed to the declared type's constructor as one argument list.

use crate::core::{DataType, MetaError, Result, Value};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref MULTIPART_KEY: Regex =
        Regex::new(r"^(?P<field>[^()]+)\((?P<position>\d+)(?P<cast>[if])?\)$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastSuffix {
    None,
    Integer,
    Float,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartKey {
    pub field: String,
    pub position: u32,
    pub cast: CastSuffix,
}

impl MultipartKey {
    /// Parses `name(1)`, `name(1i)` or `name(1f)`; any other key is not a fragment.
    pub fn parse(key: &str) -> Option<Self> {
        let caps = MULTIPART_KEY.captures(key)?;
        let position = caps["position"].parse::<u32>().ok()?;
        let cast = match caps.name("cast").map(|m| m.as_str()) {
            Some("i") => CastSuffix::Integer,
            Some("f") => CastSuffix::Float,
            _ => CastSuffix::None,
        };

        Some(Self {
            field: caps["field"].to_string(),
            position,
            cast,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub key: MultipartKey,
    pub value: Value,
}

impl Fragment {
    pub fn new(key: MultipartKey, value: impl Into<Value>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    fn cast(self) -> Result<Value> {
        let Fragment { key, value } = self;
        match key.cast {
            CastSuffix::None => Ok(value),
            CastSuffix::Integer => match &value {
                Value::Integer(_) => Ok(value),
                Value::Text(s) => s.trim().parse::<i64>().map(Value::Integer).map_err(|_| {
                    MetaError::Multiparameter(format!(
                        "'{}' is not an integer for {}({}i)",
                        s, key.field, key.position
                    ))
                }),
                other => Err(MetaError::Multiparameter(format!(
                    "{} cannot be cast to an integer for {}({}i)",
                    other, key.field, key.position
                ))),
            },
            CastSuffix::Float => match &value {
                Value::Float(_) => Ok(value),
                Value::Integer(i) => Ok(Value::Float(*i as f64)),
                Value::Text(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
                    MetaError::Multiparameter(format!(
                        "'{}' is not a float for {}({}f)",
                        s, key.field, key.position
                    ))
                }),
                other => Err(MetaError::Multiparameter(format!(
                    "{} cannot be cast to a float for {}({}f)",
                    other, key.field, key.position
                ))),
            },
        }
    }
}

/// Plain attributes alongside fragment groups, both in first-seen order.
#[derive(Debug, Default)]
pub struct PartitionedAttributes {
    pub plain: Vec<(String, Value)>,
    pub multipart: Vec<(String, Vec<Fragment>)>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MultipartAssembler;

impl MultipartAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Separates fragment keys from ordinary attribute keys, grouping fragments by field.
    pub fn partition<I, K, V>(&self, attributes: I) -> PartitionedAttributes
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut partitioned = PartitionedAttributes::default();

        for (key, value) in attributes {
            let key = key.into();
            match MultipartKey::parse(&key) {
                Some(parsed) => {
                    let fragment = Fragment::new(parsed, value);
                    match partitioned
                        .multipart
                        .iter_mut()
                        .find(|(field, _)| *field == fragment.key.field)
                    {
                        Some((_, group)) => group.push(fragment),
                        None => partitioned
                            .multipart
                            .push((fragment.key.field.clone(), vec![fragment])),
                    }
                }
                None => partitioned.plain.push((key, value.into())),
            }
        }

        partitioned
    }

    /// Ordered, blank-free, cast constructor arguments for one field's fragments.
    pub fn arguments(&self, mut fragments: Vec<Fragment>) -> Result<Vec<Value>> {
        fragments.sort_by_key(|fragment| fragment.key.position);

        fragments
            .into_iter()
            .filter(|fragment| !fragment.value.is_blank())
            .map(Fragment::cast)
            .collect()
    }

    /// Builds the declared type from the fragments. Untyped fields cannot be assembled.
    pub fn assemble(
        &self,
        field: &str,
        data_type: Option<&DataType>,
        fragments: Vec<Fragment>,
    ) -> Result<Value> {
        let data_type = data_type.ok_or_else(|| {
            MetaError::Multiparameter(format!(
                "'{}' has no declared type to build from multiple parameters",
                field
            ))
        })?;

        let args = self.arguments(fragments)?;
        debug!(field, target_type = %data_type, arg_count = args.len(), "assembling multiparameter value");

        data_type.construct(args).map_err(|err| match err {
            MetaError::TypeMismatch(msg) => {
                MetaError::Multiparameter(format!("{}: {}", field, msg))
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments(pairs: &[(&str, &str)]) -> Vec<Fragment> {
        pairs
            .iter()
            .map(|(key, value)| Fragment::new(MultipartKey::parse(key).unwrap(), *value))
            .collect()
    }

    #[test]
    fn test_key_parsing() {
        let key = MultipartKey::parse("multiparam(2f)").unwrap();
        assert_eq!(key.field, "multiparam");
        assert_eq!(key.position, 2);
        assert_eq!(key.cast, CastSuffix::Float);

        assert_eq!(MultipartKey::parse("born_on(1i)").unwrap().cast, CastSuffix::Integer);
        assert_eq!(MultipartKey::parse("name(3)").unwrap().cast, CastSuffix::None);
        assert!(MultipartKey::parse("name").is_none());
        assert!(MultipartKey::parse("name(x)").is_none());
        assert!(MultipartKey::parse("name(1s)").is_none());
    }

    #[test]
    fn test_arguments_are_ordered() {
        let assembler = MultipartAssembler::new();
        let args = assembler
            .arguments(fragments(&[("m(2)", "1"), ("m(1)", "foo")]))
            .unwrap();
        assert_eq!(args, vec![Value::from("foo"), Value::from("1")]);
    }

    #[test]
    fn test_blank_parts_are_dropped() {
        let assembler = MultipartAssembler::new();
        let args = assembler
            .arguments(fragments(&[("m(1)", ""), ("m(2)", "foo"), ("m(3)", "  ")]))
            .unwrap();
        assert_eq!(args, vec![Value::from("foo")]);
    }

    #[test]
    fn test_parts_are_cast_by_suffix() {
        let assembler = MultipartAssembler::new();
        let args = assembler
            .arguments(fragments(&[("m(1i)", "1982"), ("m(2f)", "10.5")]))
            .unwrap();
        assert!(matches!(args[0], Value::Integer(1982)));
        assert!(matches!(args[1], Value::Float(f) if f == 10.5));

        let err = assembler.arguments(fragments(&[("m(1i)", "nope")])).unwrap_err();
        assert!(err.to_string().contains("m(1i)"));
    }

    #[test]
    fn test_partition_groups_fragments() {
        let assembler = MultipartAssembler::new();
        let partitioned = assembler.partition(vec![
            ("name", "x"),
            ("born_on(2i)", "10"),
            ("born_on(1i)", "1982"),
            ("other(1)", "y"),
        ]);

        assert_eq!(partitioned.plain, vec![("name".to_string(), Value::from("x"))]);
        assert_eq!(partitioned.multipart.len(), 2);
        assert_eq!(partitioned.multipart[0].0, "born_on");
        assert_eq!(partitioned.multipart[0].1.len(), 2);
        assert_eq!(partitioned.multipart[1].0, "other");
    }

    #[test]
    fn test_assemble_requires_type() {
        let assembler = MultipartAssembler::new();
        let err = assembler
            .assemble("untyped", None, fragments(&[("untyped(1)", "a")]))
            .unwrap_err();
        assert!(matches!(err, MetaError::Multiparameter(_)));

        let date = assembler
            .assemble(
                "born_on",
                Some(&DataType::Date),
                fragments(&[("born_on(1i)", "1982"), ("born_on(2i)", "10"), ("born_on(3i)", "5")]),
            )
            .unwrap();
        assert_eq!(date.to_string(), "1982-10-05");
    }
}
