use flatrec_schema::{CompiledRecord, CompiledSchema, FieldType, Member, Primitive};
use crate::{
    error::EmissionError,
    traits::Emitter,
    utils::{check_names, dims_suffix},
};

pub const C_KEYWORDS: [&str; 59] = [
    "auto", "break", "case", "char", "const", "continue", "default", "do",
    "double", "else", "enum", "extern", "float", "for", "goto", "if",
    "inline", "int", "long", "register", "restrict", "return", "short",
    "signed", "sizeof", "static", "struct", "switch", "typedef", "union",
    "unsigned", "void", "volatile", "while", "_Alignas", "_Alignof",
    "_Atomic", "_Bool", "_Complex", "_Generic", "_Imaginary", "_Noreturn",
    "_Static_assert", "_Thread_local", "bool", "true", "false", "offsetof",
    "size_t", "uint8_t", "uint16_t", "uint32_t", "uint64_t", "int8_t",
    "int16_t", "int32_t", "int64_t", "NULL", "static_assert",
];

/// C spelling of a primitive. Shared with the C++ emitter.
pub fn c_primitive(prim: Primitive) -> &'static str {
    match prim {
        Primitive::Bool => "bool",
        Primitive::U8 => "uint8_t",
        Primitive::U16 => "uint16_t",
        Primitive::U32 => "uint32_t",
        Primitive::U64 => "uint64_t",
        Primitive::I8 => "int8_t",
        Primitive::I16 => "int16_t",
        Primitive::I32 => "int32_t",
        Primitive::I64 => "int64_t",
        Primitive::F32 => "float",
        Primitive::F64 => "double",
    }
}

/// Element type name and full declarator suffix (text capacity and array
/// dimensions) for a field.
pub fn c_declarator(ty: &FieldType) -> (String, String) {
    let suffix = dims_suffix(ty.dims());
    match ty.element() {
        FieldType::Primitive(prim) => (c_primitive(*prim).to_string(), suffix),
        FieldType::FixedBytes(bytes) => ("char".to_string(), format!("{}[{}]", suffix, bytes.capacity)),
        FieldType::Record(name) => (name.clone(), suffix),
        FieldType::Array { .. } => (String::new(), suffix),
    }
}

/// Member lines of a struct body, padding included, in the layout's
/// offset order. Shared with the C++ emitter.
pub fn struct_members(record: &CompiledRecord) -> Vec<String> {
    let mut lines = Vec::new();
    for member in record.members() {
        match member {
            Member::Field(entry) => {
                let (type_name, suffix) = c_declarator(&entry.field.ty);
                let decl = format!("{}{};", entry.field.name, suffix);
                lines.push(format!(
                    "  {:20} {:20} // offset 0x{:x}, align 0x{:x}, size 0x{:x}",
                    type_name, decl, entry.offset, entry.align, entry.size
                ));
            }
            Member::Padding { index, offset, size } => {
                let decl = format!("_pad{}[{}];", index, size);
                lines.push(format!(
                    "  {:20} {:20} // offset 0x{:x}, padding",
                    "uint8_t", decl, offset
                ));
            }
        }
    }
    lines
}

pub fn banner(schema: &CompiledSchema) -> Vec<String> {
    let mut lines = vec!["#pragma once".to_string(), "/*".to_string()];
    match &schema.package {
        Some(package) => lines.push(format!("   This file was generated by flatrec for package {}.", package)),
        None => lines.push("   This file was generated by flatrec.".to_string()),
    }
    lines.push("   * DO NOT EDIT *".to_string());
    lines.push("*/".to_string());
    lines.push(String::new());
    lines
}

pub struct CEmitter;

impl Emitter for CEmitter {
    fn language(&self) -> &'static str {
        "C"
    }

    fn supports_structured_dump(&self) -> bool {
        false
    }

    fn emit(&self, schema: &CompiledSchema) -> Result<String, EmissionError> {
        check_names(self.language(), &C_KEYWORDS, schema)?;

        let mut c_code = banner(schema);
        c_code.push("#include <stddef.h>".to_string());
        c_code.push("#include <stdint.h>".to_string());
        c_code.push("#include <stdbool.h>".to_string());
        c_code.push(String::new());

        let attribute = if schema.packed { "__attribute__((packed)) " } else { "" };
        for record in schema.iter() {
            let name = record.name();
            c_code.push(format!("typedef struct {}{} {{", attribute, name));
            c_code.extend(struct_members(record));
            c_code.push(format!("}} {};", name));
            c_code.push(String::new());
            c_code.push(format!(
                "_Static_assert(sizeof({}) == 0x{:x}, \"size of {}\");",
                name, record.size, name
            ));
            for entry in &record.entries {
                c_code.push(format!(
                    "_Static_assert(offsetof({}, {}) == 0x{:x}, \"offset of {}.{}\");",
                    name, entry.field.name, entry.offset, name, entry.field.name
                ));
            }
            c_code.push(String::new());
        }

        Ok(c_code.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{compile_schema, CompileOptions};

    #[test]
    fn emits_padding_and_asserts() {
        let schema = compile_schema(
            "struct s { u8 a; u32 b; cstr<5> name[2]; }",
            &CompileOptions::default(),
        )
        .unwrap();
        let header = CEmitter.emit(&schema).unwrap();
        assert!(header.starts_with("#pragma once\n"));
        assert!(header.contains("typedef struct s {"));
        assert!(header.contains("  uint8_t              _pad0[3];"));
        assert!(header.contains("  char                 name[2][5];"));
        assert!(header.contains("  uint8_t              _pad1[2];"));
        assert!(header.contains("_Static_assert(sizeof(s) == 0x14, \"size of s\");"));
        assert!(header.contains("_Static_assert(offsetof(s, b) == 0x4, \"offset of s.b\");"));
    }

    #[test]
    fn packed_structs_are_marked() {
        let options = CompileOptions { packed: true, ..CompileOptions::default() };
        let schema = compile_schema("struct s { u8 a; u64 b; }", &options).unwrap();
        let header = CEmitter.emit(&schema).unwrap();
        assert!(header.contains("typedef struct __attribute__((packed)) s {"));
        assert!(!header.contains("_pad"));
        assert!(header.contains("_Static_assert(sizeof(s) == 0x9, \"size of s\");"));
    }

    #[test]
    fn rejects_keywords_and_padding_names() {
        let schema = compile_schema("struct s { u8 int; }", &CompileOptions::default()).unwrap();
        assert_eq!(
            CEmitter.emit(&schema),
            Err(EmissionError::ReservedWord {
                language: "C".into(),
                record:   "s".into(),
                name:     "int".into(),
            })
        );

        let schema = compile_schema("struct s { u8 _pad0; }", &CompileOptions::default()).unwrap();
        assert!(matches!(CEmitter.emit(&schema), Err(EmissionError::NameCollision { .. })));
    }
}
