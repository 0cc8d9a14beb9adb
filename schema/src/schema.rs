use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A fixed-width scalar that can appear in a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

pub const PRIMITIVES: [Primitive; 11] = [
    Primitive::Bool,
    Primitive::U8,
    Primitive::I8,
    Primitive::U16,
    Primitive::I16,
    Primitive::U32,
    Primitive::I32,
    Primitive::U64,
    Primitive::I64,
    Primitive::F32,
    Primitive::F64,
];

impl Primitive {
    /// Looks a primitive up by its schema spelling. `float` and `double` are
    /// accepted as aliases of `f32` and `f64`.
    pub fn from_name(name: &str) -> Option<Primitive> {
        let prim = match name {
            "bool" => Primitive::Bool,
            "u8" => Primitive::U8,
            "i8" => Primitive::I8,
            "u16" => Primitive::U16,
            "i16" => Primitive::I16,
            "u32" => Primitive::U32,
            "i32" => Primitive::I32,
            "u64" => Primitive::U64,
            "i64" => Primitive::I64,
            "f32" | "float" => Primitive::F32,
            "f64" | "double" => Primitive::F64,
            _ => return None,
        };
        Some(prim)
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::U8 => "u8",
            Primitive::I8 => "i8",
            Primitive::U16 => "u16",
            Primitive::I16 => "i16",
            Primitive::U32 => "u32",
            Primitive::I32 => "i32",
            Primitive::U64 => "u64",
            Primitive::I64 => "i64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
        }
    }

    /// Size in bytes. Every primitive is naturally aligned, so this is also
    /// its alignment.
    pub fn size(self) -> u64 {
        match self {
            Primitive::Bool | Primitive::U8 | Primitive::I8 => 1,
            Primitive::U16 | Primitive::I16 => 2,
            Primitive::U32 | Primitive::I32 | Primitive::F32 => 4,
            Primitive::U64 | Primitive::I64 | Primitive::F64 => 8,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Primitive::F32 | Primitive::F64)
    }
}

/// A fixed-capacity character buffer.
///
/// When `terminated` is set the last byte is reserved for a NUL, so at most
/// `capacity - 1` bytes of content are stored. Otherwise content may fill the
/// whole buffer and readers stop at the first NUL or at `capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedBytes {
    pub capacity:   u64,
    pub terminated: bool,
}

impl FixedBytes {
    /// Number of content bytes that survive a write.
    pub fn max_content(&self) -> u64 {
        if self.terminated {
            self.capacity.saturating_sub(1)
        } else {
            self.capacity
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Primitive(Primitive),
    FixedBytes(FixedBytes),
    /// A nested record, referenced by name.
    Record(String),
    /// A fixed-size, possibly multi-dimensional array. `element` is never
    /// itself an `Array`.
    Array {
        element: Box<FieldType>,
        dims:    Vec<u64>,
    },
}

impl FieldType {
    /// Wraps `element` in an array when `dims` is non-empty.
    pub fn with_dims(element: FieldType, dims: Vec<u64>) -> FieldType {
        if dims.is_empty() {
            element
        } else {
            FieldType::Array {
                element: Box::new(element),
                dims,
            }
        }
    }

    /// The non-array type at the bottom of this field.
    pub fn element(&self) -> &FieldType {
        match self {
            FieldType::Array { element, .. } => element,
            other => other,
        }
    }

    pub fn dims(&self) -> &[u64] {
        match self {
            FieldType::Array { dims, .. } => dims,
            _ => &[],
        }
    }

    /// Name of the nested record this field refers to, if any.
    pub fn record_name(&self) -> Option<&str> {
        match self.element() {
            FieldType::Record(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty:   FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    pub name:   String,
    pub fields: Vec<FieldDef>,
}

impl RecordSchema {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Placement of one field inside a compiled record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutEntry {
    pub field:  FieldDef,
    pub offset: u64,
    pub size:   u64,
    pub align:  u64,
}

impl LayoutEntry {
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }

    /// Total number of elements (1 for non-array fields).
    pub fn element_count(&self) -> u64 {
        self.field.ty.dims().iter().product()
    }

    pub fn element_size(&self) -> u64 {
        self.size / self.element_count().max(1)
    }
}

/// Either a field or an explicit padding gap, in offset order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member<'a> {
    Field(&'a LayoutEntry),
    Padding { index: usize, offset: u64, size: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledRecord {
    pub schema:  RecordSchema,
    pub entries: Vec<LayoutEntry>,
    pub size:    u64,
    pub align:   u64,
}

impl CompiledRecord {
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn entry(&self, field: &str) -> Option<&LayoutEntry> {
        self.entries.iter().find(|e| e.field.name == field)
    }

    /// Fields interleaved with the padding gaps between them, including the
    /// trailing gap up to `size`. Padding indices count from zero per record.
    pub fn members(&self) -> Vec<Member<'_>> {
        let mut members = Vec::with_capacity(self.entries.len() * 2);
        let mut cursor = 0;
        let mut pad_index = 0;
        for entry in &self.entries {
            if entry.offset > cursor {
                members.push(Member::Padding {
                    index:  pad_index,
                    offset: cursor,
                    size:   entry.offset - cursor,
                });
                pad_index += 1;
            }
            members.push(Member::Field(entry));
            cursor = entry.end();
        }
        if self.size > cursor {
            members.push(Member::Padding {
                index:  pad_index,
                offset: cursor,
                size:   self.size - cursor,
            });
        }
        members
    }

    pub fn padding_count(&self) -> usize {
        self.members()
            .iter()
            .filter(|m| matches!(m, Member::Padding { .. }))
            .count()
    }
}

/// Every record of one compilation run, dependencies first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledSchema {
    pub package: Option<String>,
    pub packed:  bool,
    pub records: Vec<CompiledRecord>,
    #[serde(skip)]
    index:       HashMap<String, usize>,
}

impl CompiledSchema {
    pub fn new(package: Option<String>, packed: bool, records: Vec<CompiledRecord>) -> Self {
        let index = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.schema.name.clone(), i))
            .collect();
        CompiledSchema {
            package,
            packed,
            records,
            index,
        }
    }

    pub fn record(&self, name: &str) -> Option<&CompiledRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledRecord> {
        self.records.iter()
    }
}
