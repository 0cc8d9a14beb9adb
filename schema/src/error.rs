use thiserror::Error;

/// Failures of the dynamic record codec.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("Unknown record {0:?}")]
    UnknownRecord(String),

    #[error("Record {record:?} is {expected} bytes but {actual} bytes were given")]
    SizeMismatch {
        record:   String,
        expected: u64,
        actual:   u64,
    },

    #[error("Access of {len} bytes at offset {offset} exceeds buffer of {available} bytes")]
    OutOfBounds {
        offset:    u64,
        len:       u64,
        available: u64,
    },

    #[error("Expected {expected} but found {found}")]
    TypeMismatch {
        expected: String,
        found:    String,
    },

    #[error("Value {value} does not fit in {ty} (field {field:?})")]
    OutOfRange {
        field: String,
        ty:    String,
        value: String,
    },

    #[error("Field {field:?}: {source}")]
    InField {
        field:  String,
        #[source]
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Attach the name of the field being processed.
    pub fn in_field(self, field: &str) -> CodecError {
        CodecError::InField {
            field:  field.to_string(),
            source: Box::new(self),
        }
    }
}
