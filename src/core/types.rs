use super::{CompositeValue, MetaError, Result, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::sync::Arc;

type Constructor = Arc<dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync>;

/// A user type built from positional constructor arguments.
///
/// Values of the type are recognised by their `type_name`; the default
/// constructor wraps the arguments in a [`CompositeValue`] unchanged.
#[derive(Clone)]
pub struct CompositeType {
    name: String,
    constructor: Constructor,
}

impl CompositeType {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let type_name = name.clone();
        Self {
            name,
            constructor: Arc::new(move |args| {
                Ok(Value::Composite(CompositeValue::new(type_name.clone(), args)))
            }),
        }
    }

    pub fn with_constructor<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            constructor: Arc::new(constructor),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn construct(&self, args: Vec<Value>) -> Result<Value> {
        (self.constructor)(args)
    }

    pub fn is_instance(&self, value: &Value) -> bool {
        matches!(value, Value::Composite(c) if c.type_name == self.name)
    }
}

impl fmt::Debug for CompositeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeType").field("name", &self.name).finish()
    }
}

impl PartialEq for CompositeType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    Integer,
    Float,
    Text,
    Boolean,
    Date,
    Timestamp,
    Composite(CompositeType),
}

impl DataType {
    /// Resolves a declared type name. Unknown names become composite types.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" | "bigint" | "fixnum" => Self::Integer,
            "float" | "double" | "real" => Self::Float,
            "text" | "string" | "varchar" => Self::Text,
            "boolean" | "bool" => Self::Boolean,
            "date" => Self::Date,
            "datetime" | "timestamp" => Self::Timestamp,
            _ => Self::Composite(CompositeType::new(name.trim())),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// True when `value` already belongs to this type. `Null` is never an instance.
    pub fn is_instance(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Integer, Value::Integer(_)) => true,
            (Self::Float, Value::Float(_)) => true,
            (Self::Float, Value::Integer(_)) => true,
            (Self::Text, Value::Text(_)) => true,
            (Self::Boolean, Value::Boolean(_)) => true,
            (Self::Date, Value::Date(_)) => true,
            (Self::Timestamp, Value::Timestamp(_)) => true,
            (Self::Composite(ty), v) => ty.is_instance(v),
            _ => false,
        }
    }

    /// Builds a value of this type from positional arguments.
    pub fn construct(&self, args: Vec<Value>) -> Result<Value> {
        match self {
            Self::Composite(ty) => ty.construct(args),
            Self::Date => {
                let parts = integer_args(&args, 3, 3, "DATE")?;
                let invalid =
                    || MetaError::TypeMismatch(format!("Invalid date components {:?}", parts));
                NaiveDate::from_ymd_opt(
                    component(&parts, 0, invalid)?,
                    component(&parts, 1, invalid)?,
                    component(&parts, 2, invalid)?,
                )
                .map(Value::Date)
                .ok_or_else(invalid)
            }
            Self::Timestamp => {
                let parts = integer_args(&args, 3, 6, "TIMESTAMP")?;
                let invalid =
                    || MetaError::TypeMismatch(format!("Invalid timestamp components {:?}", parts));
                let date = NaiveDate::from_ymd_opt(
                    component(&parts, 0, invalid)?,
                    component(&parts, 1, invalid)?,
                    component(&parts, 2, invalid)?,
                );
                let time = NaiveTime::from_hms_opt(
                    component(&parts, 3, invalid)?,
                    component(&parts, 4, invalid)?,
                    component(&parts, 5, invalid)?,
                );
                match (date, time) {
                    (Some(date), Some(time)) => {
                        Ok(Value::Timestamp(NaiveDateTime::new(date, time).and_utc()))
                    }
                    _ => Err(invalid()),
                }
            }
            other => Err(MetaError::TypeMismatch(format!(
                "Type {} cannot be built from multiple arguments",
                other
            ))),
        }
    }
}

/// Part `index` narrowed to the chrono argument type; missing parts are zero.
fn component<T, F>(parts: &[i64], index: usize, invalid: F) -> Result<T>
where
    T: TryFrom<i64>,
    F: Fn() -> MetaError,
{
    T::try_from(parts.get(index).copied().unwrap_or(0)).map_err(|_| invalid())
}

fn integer_args(args: &[Value], min: usize, max: usize, type_name: &str) -> Result<Vec<i64>> {
    if args.len() < min || args.len() > max {
        return Err(MetaError::TypeMismatch(format!(
            "{} expects {} to {} arguments, got {}",
            type_name,
            min,
            max,
            args.len()
        )));
    }

    args.iter()
        .map(|arg| match arg {
            Value::Integer(i) => Ok(*i),
            Value::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                MetaError::TypeMismatch(format!("{} argument '{}' is not an integer", type_name, s))
            }),
            other => Err(MetaError::TypeMismatch(format!(
                "{} argument {} is not an integer",
                type_name, other
            ))),
        })
        .collect()
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "INTEGER"),
            Self::Float => write!(f, "FLOAT"),
            Self::Text => write!(f, "TEXT"),
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::Date => write!(f, "DATE"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Composite(ty) => write!(f, "{}", ty.name()),
        }
    }
}

/// A native, storage-backed attribute of an entity type.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Checks a value against the column; the message is recorded against the column name.
    pub fn validate(&self, value: &Value) -> std::result::Result<(), String> {
        if value.is_null() {
            if !self.nullable {
                return Err("can't be nil".to_string());
            }
            return Ok(());
        }

        if !self.data_type.is_instance(value) {
            return Err(format!(
                "expects type {}, got {}",
                self.data_type,
                value.type_name()
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn push(&mut self, column: Column) {
        self.columns.push(column);
    }

    pub fn find_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.find_column_index(name).map(|idx| &self.columns[idx])
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
