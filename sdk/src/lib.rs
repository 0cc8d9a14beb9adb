//! flatrec
//!
//! This crate provides runtime support for working with Flatrec records.
//!
//! - `FixedRecord` trait implemented by generated Rust records
//! - The compiled record model and the dynamic codec (re-exported from the schema crate)
//! - JSON helpers for encoding and decoding record images

pub use flatrec_compiler::traits::{Emitter, FixedRecord};
pub use flatrec_compiler::error::{EmissionError, FlatrecError, LayoutError, SchemaError};
pub use flatrec_compiler::{compile_file, compile_json_config, compile_schema, emitter_for, CompileOptions, Language};
pub use flatrec_schema::*;

/// Encode a JSON document as the record `name`.
pub fn encode_json(schema: &CompiledSchema, name: &str, json: &str, endian: Endian) -> Result<Vec<u8>, FlatrecError> {
    let json: serde_json::Value = serde_json::from_str(json)?;
    let value = Value::from_json(schema, name, &json)?;
    Ok(value.encode(schema, name, endian)?)
}

/// Decode a record image into a pretty‐printed JSON string.
pub fn decode_to_json(schema: &CompiledSchema, name: &str, bytes: &[u8], endian: Endian) -> Result<String, FlatrecError> {
    let value = Value::decode(schema, name, bytes, endian)?;
    Ok(serde_json::to_string_pretty(&value.to_json())?)
}

pub mod traits {
    pub use flatrec_compiler::traits::{Emitter, FixedRecord};
}

pub mod error {
    pub use flatrec_compiler::error::{EmissionError, FlatrecError, LayoutError, SchemaError};
    pub use flatrec_schema::CodecError;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip() {
        let schema = compile_schema(
            "struct point { i16 x; i16 y; cstr<6> label; }",
            &CompileOptions::default(),
        )
        .unwrap();
        let bytes = encode_json(&schema, "point", r#"{ "x": -2, "y": 7, "label": "origin" }"#, Endian::Little).unwrap();
        assert_eq!(bytes, [0xfe, 0xff, 7, 0, b'o', b'r', b'i', b'g', b'i', 0]);

        let text = decode_to_json(&schema, "point", &bytes, Endian::Little).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json, serde_json::json!({ "x": -2, "y": 7, "label": "origi" }));
    }

    #[test]
    fn unknown_record_is_an_error() {
        let schema = compile_schema("struct p { u8 v; }", &CompileOptions::default()).unwrap();
        let err = decode_to_json(&schema, "q", &[0], Endian::Little).unwrap_err();
        assert!(matches!(err, FlatrecError::Codec(CodecError::UnknownRecord(_))));
    }
}
