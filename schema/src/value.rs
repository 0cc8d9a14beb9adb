use crate::{
    bb::{ByteBuffer, ByteBufferMut, Endian, Scalar},
    error::CodecError,
    schema::{CompiledRecord, CompiledSchema, FieldType, LayoutEntry, Primitive},
};

use log::{debug, warn};
use serde_json::{Map, Number};
use std::fmt;
use std::ops::Index;

/// This type holds dynamic record data.
///
/// Values can represent any record of a [CompiledSchema] and can be converted
/// to and from its fixed-size byte image, or projected to JSON. Object fields
/// keep declaration order, which is also the order of the JSON projection.
#[derive(Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    UInt(u64),
    Int(i64),
    Float(f64),
    Text(String),
    /// Raw content for a text buffer. Only produced by callers; decoding a
    /// text buffer always yields [Text](#variant.Text).
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Object(String, Vec<(String, Value)>),
}

impl Value {
    /// A convenience method to extract the value out of a [Bool](#variant.Bool).
    /// Returns `false` for other value kinds.
    pub fn as_bool(&self) -> bool {
        match *self {
            Value::Bool(value) => value,
            _ => false,
        }
    }

    /// Extracts an unsigned integer. Non-negative [Int](#variant.Int) values
    /// are converted; returns `0` for other value kinds.
    pub fn as_uint(&self) -> u64 {
        match *self {
            Value::UInt(value) => value,
            Value::Int(value) if value >= 0 => value as u64,
            _ => 0,
        }
    }

    pub fn as_int(&self) -> i64 {
        match *self {
            Value::Int(value) => value,
            Value::UInt(value) if value <= i64::MAX as u64 => value as i64,
            _ => 0,
        }
    }

    pub fn as_float(&self) -> f64 {
        match *self {
            Value::Float(value) => value,
            Value::UInt(value) => value as f64,
            Value::Int(value) => value as f64,
            _ => 0.0,
        }
    }

    /// Returns `""` for anything but [Text](#variant.Text).
    pub fn as_text(&self) -> &str {
        match *self {
            Value::Text(ref value) => value.as_str(),
            _ => "",
        }
    }

    /// Returns an empty slice for anything but [Array](#variant.Array).
    pub fn as_array(&self) -> &[Value] {
        match *self {
            Value::Array(ref values) => values.as_slice(),
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        match *self {
            Value::Array(ref values) => values.len(),
            Value::Object(_, ref fields) => fields.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A convenience method to append to an [Array](#variant.Array). Does
    /// nothing for other value kinds.
    pub fn push(&mut self, value: Value) {
        if let Value::Array(ref mut values) = *self {
            values.push(value);
        }
    }

    /// A convenience method to extract a field out of an [Object](#variant.Object).
    pub fn get(&self, name: &str) -> Option<&Value> {
        match *self {
            Value::Object(_, ref fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Replaces the field if present, otherwise appends it. Does nothing for
    /// other value kinds.
    pub fn set(&mut self, name: &str, value: Value) {
        if let Value::Object(_, ref mut fields) = *self {
            match fields.iter_mut().find(|(k, _)| k == name) {
                Some(slot) => slot.1 = value,
                None => fields.push((name.to_string(), value)),
            }
        }
    }

    /// Decodes the record `name` from exactly `record.size` bytes.
    pub fn decode(
        schema: &CompiledSchema,
        name: &str,
        bytes: &[u8],
        endian: Endian,
    ) -> Result<Value, CodecError> {
        let record = lookup(schema, name)?;
        if bytes.len() as u64 != record.size {
            return Err(CodecError::SizeMismatch {
                record:   name.to_string(),
                expected: record.size,
                actual:   bytes.len() as u64,
            });
        }
        Value::decode_record_bb(schema, record, &ByteBuffer::new(bytes, endian), 0)
    }

    /// Encodes this object as record `name`, producing exactly `record.size`
    /// bytes. Padding and missing fields are zero.
    pub fn encode(&self, schema: &CompiledSchema, name: &str, endian: Endian) -> Result<Vec<u8>, CodecError> {
        let record = lookup(schema, name)?;
        let mut bb = ByteBufferMut::new(record.size, endian);
        self.encode_record_bb(schema, record, &mut bb, 0)?;
        Ok(bb.into_bytes())
    }

    /// Decodes `record` placed at `base` inside `bb`. This is mainly useful
    /// as a helper routine for [decode](#method.decode).
    pub fn decode_record_bb(
        schema: &CompiledSchema,
        record: &CompiledRecord,
        bb: &ByteBuffer,
        base: u64,
    ) -> Result<Value, CodecError> {
        let mut fields = Vec::with_capacity(record.entries.len());
        for entry in &record.entries {
            let value = Value::decode_field_bb(schema, entry, bb, base + entry.offset)
                .map_err(|e| e.in_field(&entry.field.name))?;
            fields.push((entry.field.name.clone(), value));
        }
        Ok(Value::Object(record.name().to_string(), fields))
    }

    /// Decodes the field described by `entry` at absolute offset `at`.
    pub fn decode_field_bb(
        schema: &CompiledSchema,
        entry: &LayoutEntry,
        bb: &ByteBuffer,
        at: u64,
    ) -> Result<Value, CodecError> {
        let element = entry.field.ty.element();
        let dims = entry.field.ty.dims();
        if dims.is_empty() {
            return decode_element(schema, element, bb, at);
        }
        let stride = entry.element_size();
        let mut flat = Vec::with_capacity(entry.element_count() as usize);
        for i in 0..entry.element_count() {
            flat.push(decode_element(schema, element, bb, at + i * stride)?);
        }
        Ok(unflatten(flat, dims))
    }

    /// Encodes this object as `record` at `base` inside `bb`.
    pub fn encode_record_bb(
        &self,
        schema: &CompiledSchema,
        record: &CompiledRecord,
        bb: &mut ByteBufferMut,
        base: u64,
    ) -> Result<(), CodecError> {
        let fields = match self {
            Value::Object(_, fields) => fields,
            other => {
                return Err(CodecError::TypeMismatch {
                    expected: format!("record {}", record.name()),
                    found:    other.kind().to_string(),
                })
            }
        };
        for (key, _) in fields {
            if record.entry(key).is_none() {
                debug!("record {}: ignoring unknown field {:?}", record.name(), key);
            }
        }
        for entry in &record.entries {
            let Some(value) = self.get(&entry.field.name) else {
                continue;
            };
            let at = base + entry.offset;
            let dims = entry.field.ty.dims();
            let result = if dims.is_empty() {
                encode_element(schema, entry.field.ty.element(), value, bb, at, &entry.field.name)
            } else {
                encode_array(schema, entry, value, dims, bb, at, entry.size)
            };
            result.map_err(|e| e.in_field(&entry.field.name))?;
        }
        Ok(())
    }

    /// Builds a value for record `name` from JSON, guided by the schema so
    /// integer, float and text fields get the right variants.
    pub fn from_json(schema: &CompiledSchema, name: &str, json: &serde_json::Value) -> Result<Value, CodecError> {
        let record = lookup(schema, name)?;
        record_from_json(schema, record, json)
    }

    /// Structured projection: objects keep declaration order, text stops at
    /// the first NUL, non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(value) => serde_json::Value::Bool(*value),
            Value::UInt(value) => serde_json::Value::from(*value),
            Value::Int(value) => serde_json::Value::from(*value),
            Value::Float(value) => Number::from_f64(*value)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(value) => serde_json::Value::String(value.clone()),
            Value::Bytes(bytes) => serde_json::Value::from(bytes.clone()),
            Value::Array(values) => serde_json::Value::Array(values.iter().map(Value::to_json).collect()),
            Value::Object(_, fields) => {
                let mut map = Map::new();
                for (key, value) in fields {
                    map.insert(key.clone(), value.to_json());
                }
                serde_json::Value::Object(map)
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::UInt(_) => "unsigned integer",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Object(..) => "object",
        }
    }
}

fn lookup<'s>(schema: &'s CompiledSchema, name: &str) -> Result<&'s CompiledRecord, CodecError> {
    schema
        .record(name)
        .ok_or_else(|| CodecError::UnknownRecord(name.to_string()))
}

fn decode_element(
    schema: &CompiledSchema,
    ty: &FieldType,
    bb: &ByteBuffer,
    at: u64,
) -> Result<Value, CodecError> {
    match ty {
        FieldType::Primitive(prim) => Ok(match bb.read_scalar(*prim, at)? {
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::UInt(u) => Value::UInt(u),
            Scalar::Int(i) => Value::Int(i),
            Scalar::Float(f) => Value::Float(f),
        }),
        FieldType::FixedBytes(bytes) => Ok(Value::Text(bb.read_text(at, bytes.capacity)?)),
        FieldType::Record(name) => Value::decode_record_bb(schema, lookup(schema, name)?, bb, at),
        FieldType::Array { .. } => Err(CodecError::TypeMismatch {
            expected: "array element".to_string(),
            found:    "nested array".to_string(),
        }),
    }
}

/// Regroup a flat, row-major element list into nested arrays matching `dims`.
fn unflatten(mut flat: Vec<Value>, dims: &[u64]) -> Value {
    if dims.len() <= 1 {
        return Value::Array(flat);
    }
    let chunk: usize = dims[1..].iter().product::<u64>() as usize;
    if chunk == 0 {
        return Value::Array(Vec::new());
    }
    let mut rows = Vec::with_capacity(dims[0] as usize);
    while !flat.is_empty() {
        let rest = flat.split_off(chunk.min(flat.len()));
        rows.push(unflatten(flat, &dims[1..]));
        flat = rest;
    }
    Value::Array(rows)
}

fn encode_array(
    schema: &CompiledSchema,
    entry: &LayoutEntry,
    value: &Value,
    dims: &[u64],
    bb: &mut ByteBufferMut,
    at: u64,
    span: u64,
) -> Result<(), CodecError> {
    let Value::Array(items) = value else {
        return Err(CodecError::TypeMismatch {
            expected: format!("array of {}", dims[0]),
            found:    value.kind().to_string(),
        });
    };
    if items.len() as u64 > dims[0] {
        return Err(CodecError::TypeMismatch {
            expected: format!("at most {} elements", dims[0]),
            found:    format!("{} elements", items.len()),
        });
    }
    if (items.len() as u64) < dims[0] {
        warn!(
            "input for {} too short: {} of {} elements, remainder zero-filled",
            entry.field.name,
            items.len(),
            dims[0]
        );
    }
    let stride = span / dims[0];
    for (i, item) in items.iter().enumerate() {
        let item_at = at + i as u64 * stride;
        if dims.len() == 1 {
            encode_element(schema, entry.field.ty.element(), item, bb, item_at, &entry.field.name)?;
        } else {
            encode_array(schema, entry, item, &dims[1..], bb, item_at, stride)?;
        }
    }
    Ok(())
}

fn encode_element(
    schema: &CompiledSchema,
    ty: &FieldType,
    value: &Value,
    bb: &mut ByteBufferMut,
    at: u64,
    field: &str,
) -> Result<(), CodecError> {
    match ty {
        FieldType::Primitive(prim) => bb.write_scalar(*prim, at, to_scalar(*prim, value, field)?),
        FieldType::FixedBytes(bytes) => {
            let content: &[u8] = match value {
                Value::Text(text) => text.as_bytes(),
                Value::Bytes(raw) => raw.as_slice(),
                other => {
                    return Err(CodecError::TypeMismatch {
                        expected: "text".to_string(),
                        found:    other.kind().to_string(),
                    })
                }
            };
            if content.len() as u64 > bytes.max_content() {
                debug!(
                    "truncating {} bytes of {} to {}",
                    content.len(),
                    field,
                    bytes.max_content()
                );
            }
            bb.write_text(at, bytes.capacity, bytes.max_content(), content)
        }
        FieldType::Record(name) => value.encode_record_bb(schema, lookup(schema, name)?, bb, at),
        FieldType::Array { .. } => Err(CodecError::TypeMismatch {
            expected: "array element".to_string(),
            found:    "nested array".to_string(),
        }),
    }
}

fn out_of_range(prim: Primitive, value: &Value, field: &str) -> CodecError {
    let shown = match value {
        Value::UInt(u) => u.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        other => other.kind().to_string(),
    };
    CodecError::OutOfRange {
        field: field.to_string(),
        ty:    prim.name().to_string(),
        value: shown,
    }
}

/// Convert a dynamic value into a scalar for `prim`, rejecting values the
/// field cannot hold.
fn to_scalar(prim: Primitive, value: &Value, field: &str) -> Result<Scalar, CodecError> {
    let bits = prim.size() * 8;
    match (prim, value) {
        (Primitive::Bool, Value::Bool(b)) => Ok(Scalar::Bool(*b)),
        (Primitive::Bool, Value::UInt(u)) if *u <= 1 => Ok(Scalar::Bool(*u == 1)),
        (Primitive::F32 | Primitive::F64, Value::Float(f)) => Ok(Scalar::Float(*f)),
        (Primitive::F32 | Primitive::F64, Value::UInt(u)) => Ok(Scalar::Float(*u as f64)),
        (Primitive::F32 | Primitive::F64, Value::Int(i)) => Ok(Scalar::Float(*i as f64)),
        (p, Value::UInt(_) | Value::Int(_)) if !p.is_float() && p != Primitive::Bool => {
            let wide: i128 = match value {
                Value::Int(i) => *i as i128,
                _ => value.as_uint() as i128,
            };
            let (min, max) = if p.is_signed() {
                (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
            } else {
                (0, (1i128 << bits) - 1)
            };
            if wide < min || wide > max {
                return Err(out_of_range(prim, value, field));
            }
            if p.is_signed() {
                Ok(Scalar::Int(wide as i64))
            } else {
                Ok(Scalar::UInt(wide as u64))
            }
        }
        (_, Value::UInt(_) | Value::Int(_) | Value::Float(_)) => Err(out_of_range(prim, value, field)),
        (_, other) => Err(CodecError::TypeMismatch {
            expected: prim.name().to_string(),
            found:    other.kind().to_string(),
        }),
    }
}

fn record_from_json(
    schema: &CompiledSchema,
    record: &CompiledRecord,
    json: &serde_json::Value,
) -> Result<Value, CodecError> {
    let serde_json::Value::Object(map) = json else {
        return Err(CodecError::TypeMismatch {
            expected: format!("object for record {}", record.name()),
            found:    json_kind(json).to_string(),
        });
    };
    let mut fields = Vec::with_capacity(record.entries.len());
    for entry in &record.entries {
        if let Some(field_json) = map.get(&entry.field.name) {
            let value = field_from_json(schema, &entry.field.ty, entry.field.ty.dims(), field_json)
                .map_err(|e| e.in_field(&entry.field.name))?;
            fields.push((entry.field.name.clone(), value));
        }
    }
    Ok(Value::Object(record.name().to_string(), fields))
}

fn field_from_json(
    schema: &CompiledSchema,
    ty: &FieldType,
    dims: &[u64],
    json: &serde_json::Value,
) -> Result<Value, CodecError> {
    if dims.is_empty() {
        return element_from_json(schema, ty.element(), json);
    }
    match json {
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| field_from_json(schema, ty, &dims[1..], item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Err(CodecError::TypeMismatch {
            expected: "array".to_string(),
            found:    json_kind(other).to_string(),
        }),
    }
}

fn element_from_json(
    schema: &CompiledSchema,
    ty: &FieldType,
    json: &serde_json::Value,
) -> Result<Value, CodecError> {
    match (ty, json) {
        (FieldType::Record(name), _) => record_from_json(schema, lookup(schema, name)?, json),
        (FieldType::FixedBytes(_), serde_json::Value::String(text)) => Ok(Value::Text(text.clone())),
        (FieldType::FixedBytes(_), serde_json::Value::Array(items)) => {
            let mut raw = Vec::with_capacity(items.len());
            for item in items {
                match item.as_u64() {
                    Some(b) if b <= u8::MAX as u64 => raw.push(b as u8),
                    _ => {
                        return Err(CodecError::TypeMismatch {
                            expected: "byte".to_string(),
                            found:    item.to_string(),
                        })
                    }
                }
            }
            Ok(Value::Bytes(raw))
        }
        (FieldType::Primitive(_), serde_json::Value::Bool(b)) => Ok(Value::Bool(*b)),
        (FieldType::Primitive(_), serde_json::Value::Number(n)) => {
            if let Some(u) = n.as_u64() {
                Ok(Value::UInt(u))
            } else if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else {
                Ok(Value::Float(n.as_f64().unwrap_or(f64::NAN)))
            }
        }
        (FieldType::Primitive(prim), serde_json::Value::Null) if prim.is_float() => Ok(Value::Float(f64::NAN)),
        (_, other) => Err(CodecError::TypeMismatch {
            expected: match ty {
                FieldType::Primitive(prim) => prim.name().to_string(),
                _ => "text".to_string(),
            },
            found:    json_kind(other).to_string(),
        }),
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl Index<usize> for Value {
    type Output = Value;

    /// A convenience method that adds support for `self[index]` expressions.
    /// It will panic if this value isn't an [Array](#variant.Array) or if the
    /// provided index is out of bounds.
    fn index(&self, index: usize) -> &Value {
        match *self {
            Value::Array(ref values) => &values[index],
            _ => panic!("indexing a non-array value"),
        }
    }
}

impl Index<&str> for Value {
    type Output = Value;

    /// Panics if this value isn't an [Object](#variant.Object) or lacks the field.
    fn index(&self, name: &str) -> &Value {
        match self.get(name) {
            Some(value) => value,
            None => panic!("no field {:?}", name),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match *self {
            Value::Bool(value) => value.fmt(f),
            Value::UInt(value) => value.fmt(f),
            Value::Int(value) => value.fmt(f),
            Value::Float(value) => value.fmt(f),
            Value::Text(ref value) => value.fmt(f),
            Value::Bytes(ref value) => value.fmt(f),
            Value::Array(ref values) => values.fmt(f),

            Value::Object(ref name, ref fields) => {
                write!(f, "{} {{", name)?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {:?}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, FixedBytes, RecordSchema};

    fn entry(name: &str, ty: FieldType, offset: u64, size: u64, align: u64) -> LayoutEntry {
        LayoutEntry {
            field: FieldDef { name: name.to_string(), ty },
            offset,
            size,
            align,
        }
    }

    // Hand-laid `pair { u8 tag; i32 vals[2][2]; chars<5> label; }` plus a
    // wrapper holding one pair.
    fn pair_schema() -> CompiledSchema {
        let pair = CompiledRecord {
            schema:  RecordSchema { name: "pair".to_string(), fields: vec![] },
            entries: vec![
                entry("tag", FieldType::Primitive(Primitive::U8), 0, 1, 1),
                entry(
                    "vals",
                    FieldType::with_dims(FieldType::Primitive(Primitive::I32), vec![2, 2]),
                    4,
                    16,
                    4,
                ),
                entry(
                    "label",
                    FieldType::FixedBytes(FixedBytes { capacity: 5, terminated: false }),
                    20,
                    5,
                    1,
                ),
            ],
            size:    28,
            align:   4,
        };
        let wrap = CompiledRecord {
            schema:  RecordSchema { name: "wrap".to_string(), fields: vec![] },
            entries: vec![
                entry("flag", FieldType::Primitive(Primitive::Bool), 0, 1, 1),
                entry("inner", FieldType::Record("pair".to_string()), 4, 28, 4),
            ],
            size:    32,
            align:   4,
        };
        CompiledSchema::new(None, false, vec![pair, wrap])
    }

    fn sample() -> Value {
        Value::Object(
            "pair".to_string(),
            vec![
                ("tag".to_string(), Value::UInt(7)),
                (
                    "vals".to_string(),
                    Value::Array(vec![
                        Value::Array(vec![Value::Int(-1), Value::Int(2)]),
                        Value::Array(vec![Value::Int(3), Value::Int(-4)]),
                    ]),
                ),
                ("label".to_string(), Value::Text("hello world".to_string())),
            ],
        )
    }

    #[test]
    fn value_basic() {
        let value = sample();
        assert_eq!(value.len(), 3);
        assert_eq!(value["tag"].as_uint(), 7);
        assert_eq!(value["vals"][1][1].as_int(), -4);
        assert_eq!(value["label"].as_text(), "hello world");
        assert!(value.get("missing").is_none());
        assert_eq!(
            format!("{:?}", value),
            "pair {tag: 7, vals: [[-1, 2], [3, -4]], label: \"hello world\"}"
        );
    }

    #[test]
    fn encode_places_fields_at_offsets() {
        let schema = pair_schema();
        let bytes = sample().encode(&schema, "pair", Endian::Little).unwrap();
        assert_eq!(bytes.len(), 28);
        assert_eq!(bytes[0], 7);
        assert_eq!(&bytes[1..4], &[0, 0, 0]);
        assert_eq!(&bytes[4..8], &(-1i32).to_le_bytes());
        assert_eq!(&bytes[16..20], &(-4i32).to_le_bytes());
        assert_eq!(&bytes[20..25], b"hello");
        assert_eq!(&bytes[25..28], &[0, 0, 0]);
    }

    #[test]
    fn decode_recovers_truncated_text() {
        let schema = pair_schema();
        let bytes = sample().encode(&schema, "pair", Endian::Big).unwrap();
        let decoded = Value::decode(&schema, "pair", &bytes, Endian::Big).unwrap();
        assert_eq!(decoded["tag"], Value::UInt(7));
        assert_eq!(decoded["vals"], sample()["vals"]);
        assert_eq!(decoded["label"], Value::Text("hello".to_string()));
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let schema = pair_schema();
        let err = Value::decode(&schema, "pair", &[0; 27], Endian::Little).unwrap_err();
        assert_eq!(
            err,
            CodecError::SizeMismatch { record: "pair".to_string(), expected: 28, actual: 27 }
        );
    }

    #[test]
    fn nested_records_and_json() {
        let schema = pair_schema();
        let json = serde_json::json!({
            "flag": true,
            "inner": { "tag": 1, "vals": [[1]], "label": "ok" },
        });
        let value = Value::from_json(&schema, "wrap", &json).unwrap();
        let bytes = value.encode(&schema, "wrap", Endian::Little).unwrap();
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[4], 1);
        assert_eq!(&bytes[8..12], &1i32.to_le_bytes());
        assert_eq!(&bytes[12..16], &[0, 0, 0, 0]);

        let decoded = Value::decode(&schema, "wrap", &bytes, Endian::Little).unwrap();
        let out = decoded.to_json();
        let keys: Vec<_> = out["inner"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["tag", "vals", "label"]);
        assert_eq!(out["inner"]["vals"], serde_json::json!([[1, 0], [0, 0]]));
        assert_eq!(out["inner"]["label"], "ok");
        assert_eq!(out["flag"], true);
    }

    #[test]
    fn encode_rejects_out_of_range() {
        let schema = pair_schema();
        let mut value = sample();
        value.set("tag", Value::UInt(256));
        let err = value.encode(&schema, "pair", Endian::Little).unwrap_err();
        assert!(
            matches!(&err, CodecError::InField { field, source }
                if field == "tag" && matches!(**source, CodecError::OutOfRange { .. })),
            "unexpected error {:?}",
            err
        );
    }

    #[test]
    fn encode_rejects_too_many_elements() {
        let schema = pair_schema();
        let mut value = sample();
        value.set(
            "vals",
            Value::Array(vec![Value::Array(vec![]), Value::Array(vec![]), Value::Array(vec![])]),
        );
        assert!(value.encode(&schema, "pair", Endian::Little).is_err());
    }

    #[test]
    fn unknown_record() {
        let schema = pair_schema();
        assert_eq!(
            Value::decode(&schema, "nope", &[], Endian::Little),
            Err(CodecError::UnknownRecord("nope".to_string()))
        );
    }
}
