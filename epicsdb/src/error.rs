use thiserror::Error;

#[derive(Error, Debug)]
pub enum EpicsDbError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Unknown record type: {0}")]
    UnknownRecordType(String),

    #[error("Invalid field name {field} for record type {record_type}")]
    UnknownField { record_type: String, field: String },

    #[error("Can't write \"{value}\" to field {field}: {message}")]
    InvalidFieldValue {
        field: String,
        value: String,
        message: String,
    },

    #[error("Record type {0} has no unique INP or OUT field for address")]
    NoAddressField(String),

    #[error("ConstArray: {0}")]
    Homogeneity(String),

    #[error("ConstArray: Empty iterable is not allowed.")]
    EmptyArray,

    #[error("ConstArray: expected a sequence, got {0}")]
    NotASequence(String),

    #[error("Record \"{0}\" already defined")]
    DuplicateRecord(String),

    #[error("Parameter name \"{0}\" already defined")]
    DuplicateParameter(String),

    #[error("Record name \"{name}\" too long (max {max})")]
    NameTooLong { name: String, max: usize },

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("No prefix to pop")]
    EmptyPrefixStack,

    #[error("Bit field out of range: {0}")]
    Range(String),

    #[error("Field {field} of record {record} is not set")]
    FieldNotSet { record: String, field: String },

    #[error("Link error: {0}")]
    Link(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EpicsDbError>;
