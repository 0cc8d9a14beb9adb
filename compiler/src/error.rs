use flatrec_schema::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlatrecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}, column {column}: {msg}")]
    ParseError {
        msg:    String,
        line:   usize,
        column: usize,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Emission error: {0}")]
    Emission(#[from] EmissionError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

/// The schema is malformed, ambiguous or cyclic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid identifier {name:?} in {context}")]
    InvalidIdentifier { context: String, name: String },

    #[error("The record {0:?} is defined twice")]
    DuplicateRecord(String),

    #[error("The record name {0:?} is reserved")]
    ReservedName(String),

    #[error("The record {0:?} has no fields")]
    EmptyRecord(String),

    #[error("The field {field:?} is defined twice in record {record:?}")]
    DuplicateField { record: String, field: String },

    #[error("The type {ty:?} is not defined for field {field:?} in record {record:?}")]
    UnknownType { record: String, field: String, ty: String },

    #[error("Field {field:?} in record {record:?} has a zero array dimension")]
    ZeroDimension { record: String, field: String },

    #[error("Recursive nesting of {} is not allowed", .cycle.join(" -> "))]
    RecursiveNesting { cycle: Vec<String> },

    #[error("Nesting depth {depth} of record {record:?} exceeds limit of {limit}")]
    NestingTooDeep { record: String, depth: usize, limit: usize },
}

/// Sizes or offsets for a record cannot be computed within the limits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("Field {field:?} in record {record:?} has zero size")]
    ZeroSize { record: String, field: String },

    #[error("Array too large in record {record:?}, field {field:?}: {count} elements exceeds limit of {limit}")]
    ArrayTooLarge { record: String, field: String, count: u64, limit: u64 },

    #[error("Record {record:?} too large: {size} bytes exceeds limit of {limit}")]
    RecordTooLarge { record: String, size: u64, limit: u64 },

    #[error("Size of field {field:?} in record {record:?} overflows")]
    Overflow { record: String, field: String },

    #[error("Record {record:?} needs {dependency:?}, which has not been laid out")]
    MissingDependency { record: String, dependency: String },
}

/// A target language cannot represent part of the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmissionError {
    #[error("{language}: {name:?} in record {record:?} is a reserved word")]
    ReservedWord { language: String, record: String, name: String },

    #[error("{language}: {name:?} in record {record:?} collides with another generated name")]
    NameCollision { language: String, record: String, name: String },
}
