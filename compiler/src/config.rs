//! Reader for the JSON schema format:
//!
//! ```json
//! {
//!   "t0": [
//!     { "name": "fee", "type": "u32" },
//!     { "name": "fum", "type": "chars", "capacity": 128 }
//!   ],
//!   "t1": [
//!     { "name": "blee", "type": "u16" },
//!     { "name": "t0s", "type": "t0", "counts": [2, 2] }
//!   ]
//! }
//! ```
//!
//! `counts` may be a single integer or a list of dimensions. A count of `1`
//! (or `[1]`) declares a scalar member. Records keep the order in which they
//! appear in the file.

use crate::{
    error::{FlatrecError, SchemaError},
    types::{Definition, Field, Schema, TypeRef},
};
use serde_json::{Map, Value};

pub fn parse_json_config(text: &str) -> Result<Schema, FlatrecError> {
    let config: Value = serde_json::from_str(text)?;
    Ok(config_to_schema(&config)?)
}

fn invalid(msg: String) -> SchemaError {
    SchemaError::InvalidConfig(msg)
}

pub fn config_to_schema(config: &Value) -> Result<Schema, SchemaError> {
    let Value::Object(records) = config else {
        return Err(invalid(format!(
            "Config must be a JSON object, got {}",
            kind(config)
        )));
    };
    if records.is_empty() {
        return Err(invalid("Config cannot be empty".to_string()));
    }

    let mut definitions = Vec::with_capacity(records.len());
    for (record, members) in records {
        let Value::Array(members) = members else {
            return Err(invalid(format!(
                "Record {:?} must have a list of members, got {}",
                record,
                kind(members)
            )));
        };
        let mut fields = Vec::with_capacity(members.len());
        for (idx, member) in members.iter().enumerate() {
            fields.push(member_to_field(record, idx, member)?);
        }
        definitions.push(Definition {
            name:   record.clone(),
            line:   0,
            column: 0,
            fields,
        });
    }

    Ok(Schema {
        package:     None,
        definitions,
    })
}

fn member_to_field(record: &str, idx: usize, member: &Value) -> Result<Field, SchemaError> {
    let Value::Object(member) = member else {
        return Err(invalid(format!(
            "Member {} in record {:?} must be an object, got {}",
            idx,
            record,
            kind(member)
        )));
    };
    let name = required_str(member, "name", record, idx)?;
    let ty = required_str(member, "type", record, idx)?;

    let type_ = match ty {
        "chars" | "cstr" => {
            let capacity = member
                .get("capacity")
                .and_then(Value::as_u64)
                .ok_or_else(|| {
                    invalid(format!(
                        "Member {:?} in record {:?}: {:?} needs a non-negative integer 'capacity'",
                        name, record, ty
                    ))
                })?;
            if ty == "chars" {
                TypeRef::Chars(capacity)
            } else {
                TypeRef::CStr(capacity)
            }
        }
        other => TypeRef::Named(other.to_string()),
    };

    let mut dims = match member.get("counts") {
        None => Vec::new(),
        Some(Value::Array(counts)) if counts.is_empty() => {
            return Err(invalid(format!(
                "Member {:?} in record {:?}: 'counts' list cannot be empty",
                name, record
            )))
        }
        Some(Value::Array(counts)) => counts
            .iter()
            .enumerate()
            .map(|(i, c)| {
                c.as_u64().ok_or_else(|| {
                    invalid(format!(
                        "Member {:?} in record {:?}: 'counts[{}]' must be a non-negative integer, got {}",
                        name, record, i, c
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(count) => vec![count.as_u64().ok_or_else(|| {
            invalid(format!(
                "Member {:?} in record {:?}: 'counts' must be an integer or list of integers, got {}",
                name, record, count
            ))
        })?],
    };
    if dims == [1] {
        dims.clear();
    }

    Ok(Field {
        name: name.to_string(),
        line: 0,
        column: 0,
        type_,
        dims,
    })
}

fn required_str<'m>(member: &'m Map<String, Value>, key: &str, record: &str, idx: usize) -> Result<&'m str, SchemaError> {
    match member.get(key) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(invalid(format!(
            "Member {} in record {:?}: '{}' must be a string, got {}",
            idx,
            record,
            key,
            kind(other)
        ))),
        None => Err(invalid(format!(
            "Member {} in record {:?} missing required field '{}'",
            idx, record, key
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
