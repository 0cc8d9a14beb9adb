use crate::error::{EmissionError, FlatrecError};
use flatrec_schema::CompiledSchema;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("{:?}", text))
}

pub fn error(msg: &str, line: usize, column: usize) -> FlatrecError {
    FlatrecError::ParseError {
        msg: msg.to_string(),
        line,
        column,
    }
}

pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

lazy_static! {
    static ref PADDING_NAME: Regex = Regex::new(r"^_pad\d+$").unwrap();
}

/// Names the emitters reserve for padding members.
pub fn is_padding_name(name: &str) -> bool {
    PADDING_NAME.is_match(name)
}

/// Reject record and field names that are reserved in `language`, or that
/// shadow a generated padding member.
pub fn check_names(language: &str, reserved: &[&str], schema: &CompiledSchema) -> Result<(), EmissionError> {
    for record in schema.iter() {
        if reserved.contains(&record.name()) {
            return Err(EmissionError::ReservedWord {
                language: language.to_string(),
                record:   record.name().to_string(),
                name:     record.name().to_string(),
            });
        }
        for entry in &record.entries {
            let name = entry.field.name.as_str();
            if reserved.contains(&name) {
                return Err(EmissionError::ReservedWord {
                    language: language.to_string(),
                    record:   record.name().to_string(),
                    name:     name.to_string(),
                });
            }
            if is_padding_name(name) {
                return Err(EmissionError::NameCollision {
                    language: language.to_string(),
                    record:   record.name().to_string(),
                    name:     name.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// `[a][b]` suffix for C-family array declarators.
pub fn dims_suffix(dims: &[u64]) -> String {
    dims.iter().map(|d| format!("[{}]", d)).collect()
}
