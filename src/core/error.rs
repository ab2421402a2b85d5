use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetaError {
    #[error("Metadata field '{0}' is already defined")]
    FieldAlreadyDefined(String),

    #[error("Undefined metadata field '{field}' for {entity}")]
    UndefinedField { entity: String, field: String },

    #[error("Unknown attribute '{attribute}' for {entity}")]
    UnknownAttribute { entity: String, attribute: String },

    #[error("Multiparameter assignment error: {0}")]
    Multiparameter(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Validation failed: {0}")]
    RecordInvalid(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

pub type Result<T> = std::result::Result<T, MetaError>;

impl From<serde_json::Error> for MetaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for MetaError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
