use std::collections::HashMap;
use flatrec_schema::{CompiledRecord, CompiledSchema, FieldType, LayoutEntry, Member, Primitive};
use crate::{
    error::EmissionError,
    traits::Emitter,
    utils::{check_names, is_identifier},
};

/// Converts a string to PascalCase.
/// - If the string contains underscores, it splits on underscores and converts each word
///   so that its first letter is uppercase and the rest lowercase.
/// - If the string is fully uppercase, only the first letter stays uppercase.
/// - Otherwise, it ensures only the first letter is uppercase.
pub fn to_pascal_case(s: &str) -> String {
    fn capitalize(word: &str, lower_rest: bool) -> String {
        let mut chars = word.chars();
        match chars.next() {
            None => String::new(),
            Some(first) if lower_rest => first.to_uppercase().to_string() + &chars.as_str().to_lowercase(),
            Some(first) => first.to_uppercase().to_string() + chars.as_str(),
        }
    }

    if s.contains('_') {
        s.split('_')
            .filter(|word| !word.is_empty())
            .map(|word| capitalize(word, true))
            .collect::<String>()
    } else {
        capitalize(s, s == s.to_uppercase())
    }
}

/// Converts a string to snake_case, keeping acronyms together
/// (e.g. "sessionID" becomes "session_id").
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut snake = String::new();
    for i in 0..chars.len() {
        let c = chars[i];
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                if !prev.is_uppercase() || (i + 1 < chars.len() && chars[i + 1].is_lowercase()) {
                    snake.push('_');
                }
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

/// Escapes Rust reserved keywords by suffixing with an underscore.
pub fn escape_rust_keyword(s: &str) -> String {
    let keywords = [
        "as", "async", "await", "break", "const", "continue", "crate", "dyn",
        "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
        "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
        "self", "Self", "static", "struct", "super", "trait", "true", "type",
        "unsafe", "use", "where", "while", "abstract", "become", "box", "do",
        "final", "gen", "macro", "override", "priv", "try", "typeof",
        "unsized", "virtual", "yield",
    ];
    if keywords.contains(&s) {
        format!("{}_", s)
    } else {
        s.to_string()
    }
}

fn map_primitive(prim: Primitive) -> &'static str {
    match prim {
        // stored as a byte so every bit pattern stays valid
        Primitive::Bool => "u8",
        Primitive::U8 => "u8",
        Primitive::U16 => "u16",
        Primitive::U32 => "u32",
        Primitive::U64 => "u64",
        Primitive::I8 => "i8",
        Primitive::I16 => "i16",
        Primitive::I32 => "i32",
        Primitive::I64 => "i64",
        Primitive::F32 => "f32",
        Primitive::F64 => "f64",
    }
}

fn map_type(ty: &FieldType) -> String {
    let mut rust_type = match ty.element() {
        FieldType::Primitive(prim) => map_primitive(*prim).to_string(),
        FieldType::FixedBytes(bytes) => format!("[u8; {}]", bytes.capacity),
        FieldType::Record(name) => type_name(name),
        FieldType::Array { .. } => String::new(),
    };
    for dim in ty.dims().iter().rev() {
        rust_type = format!("[{}; {}]", rust_type, dim);
    }
    rust_type
}

fn type_name(record: &str) -> String {
    escape_rust_keyword(&to_pascal_case(record))
}

fn field_name(field: &str) -> String {
    escape_rust_keyword(&to_snake_case(field))
}

/// JSON expression for one element value found at `place`.
fn leaf_json(ty: &FieldType, place: &str) -> String {
    match ty.element() {
        FieldType::Primitive(Primitive::Bool) => format!("serde_json::Value::Bool({} != 0)", place),
        FieldType::Primitive(_) => format!("serde_json::Value::from({})", place),
        FieldType::FixedBytes(_) => format!("serde_json::Value::String(flatrec::text_from_bytes(&{}))", place),
        FieldType::Record(_) => format!("{}.to_json()", place),
        FieldType::Array { .. } => "serde_json::Value::Null".to_string(),
    }
}

fn field_json(packed: bool, entry: &LayoutEntry) -> String {
    let name = field_name(&entry.field.name);
    // packed fields may be unaligned, so they are copied out before use
    let place = if packed {
        format!("{{ self.{} }}", name)
    } else {
        format!("self.{}", name)
    };

    fn nest(ty: &FieldType, base: &str, dims: &[u64], level: usize) -> String {
        if dims.is_empty() {
            return leaf_json(ty, base);
        }
        let var = format!("a{}", level);
        format!(
            "serde_json::Value::Array({}.iter().map(|&{}| {}).collect())",
            base,
            var,
            nest(ty, &var, &dims[1..], level + 1)
        )
    }

    nest(&entry.field.ty, &place, entry.field.ty.dims(), 0)
}

/// Setter for a text field that applies the field's own terminator policy.
fn text_setter(entry: &LayoutEntry) -> Option<Vec<String>> {
    let FieldType::FixedBytes(bytes) = entry.field.ty.element() else {
        return None;
    };
    let dims = entry.field.ty.dims();
    let params: String = (0..dims.len()).map(|level| format!("i{}: usize, ", level)).collect();
    let indices: String = (0..dims.len()).map(|level| format!("[i{}]", level)).collect();
    let limit = if bytes.terminated {
        format!("at most {} bytes and a NUL", bytes.max_content())
    } else {
        format!("at most {} bytes", bytes.max_content())
    };
    Some(vec![
        format!("    /// Set `{}`, keeping {}.", entry.field.name, limit),
        format!(
            "    pub fn set_{}(&mut self, {}text: &str) {{",
            to_snake_case(&entry.field.name),
            params
        ),
        format!(
            "        flatrec::write_text(&mut self.{}{}, text.as_bytes(), {});",
            field_name(&entry.field.name),
            indices,
            bytes.terminated
        ),
        "    }".to_string(),
    ])
}

pub struct RustEmitter;

impl RustEmitter {
    fn check(&self, schema: &CompiledSchema) -> Result<(), EmissionError> {
        check_names(self.language(), &[], schema)?;

        let collision = |record: &CompiledRecord, name: String| EmissionError::NameCollision {
            language: self.language().to_string(),
            record:   record.name().to_string(),
            name,
        };

        let mut types: HashMap<String, &str> = HashMap::new();
        for record in schema.iter() {
            let rust_type = type_name(record.name());
            if !is_identifier(&rust_type) || rust_type == "_" {
                return Err(collision(record, record.name().to_string()));
            }
            if rust_type == "FixedRecord" || types.insert(rust_type.clone(), record.name()).is_some() {
                return Err(collision(record, rust_type));
            }

            let mut fields: HashMap<String, &str> = HashMap::new();
            for entry in &record.entries {
                let rust_field = field_name(&entry.field.name);
                if rust_field == "_" {
                    return Err(collision(record, rust_field));
                }
                if fields.insert(rust_field.clone(), &entry.field.name).is_some() {
                    return Err(collision(record, rust_field));
                }
            }
        }
        Ok(())
    }

    fn generate_struct(&self, schema: &CompiledSchema, record: &CompiledRecord) -> Vec<String> {
        let struct_name = type_name(record.name());
        let mut lines = Vec::new();

        lines.push(format!(
            "/// `{}`: {} bytes, align {}.",
            record.name(),
            record.size,
            record.align
        ));
        lines.push(if schema.packed { "#[repr(C, packed)]" } else { "#[repr(C)]" }.to_string());
        lines.push("#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]".to_string());
        lines.push(format!("pub struct {} {{", struct_name));
        for member in record.members() {
            match member {
                Member::Field(entry) => lines.push(format!(
                    "    pub {}: {},",
                    field_name(&entry.field.name),
                    map_type(&entry.field.ty)
                )),
                Member::Padding { index, size, .. } => {
                    lines.push(format!("    pub _pad{}: [u8; {}],", index, size))
                }
            }
        }
        lines.push("}".to_string());
        lines.push(String::new());

        lines.push(format!(
            "const _: () = assert!(core::mem::size_of::<{}>() == {});",
            struct_name, record.size
        ));
        for entry in &record.entries {
            lines.push(format!(
                "const _: () = assert!(core::mem::offset_of!({}, {}) == {});",
                struct_name,
                field_name(&entry.field.name),
                entry.offset
            ));
        }
        lines.push(String::new());

        let setters: Vec<Vec<String>> = record.entries.iter().filter_map(text_setter).collect();
        if !setters.is_empty() {
            lines.push(format!("impl {} {{", struct_name));
            for (i, setter) in setters.into_iter().enumerate() {
                if i > 0 {
                    lines.push(String::new());
                }
                lines.extend(setter);
            }
            lines.push("}".to_string());
            lines.push(String::new());
        }

        lines.push(format!("impl FixedRecord for {} {{", struct_name));
        lines.push(format!("    const NAME: &'static str = \"{}\";", record.name()));
        lines.push(format!("    const SIZE: usize = {};", record.size));
        lines.push(String::new());
        lines.push("    fn to_json(&self) -> serde_json::Value {".to_string());
        lines.push("        let mut map = serde_json::Map::new();".to_string());
        for entry in &record.entries {
            lines.push(format!(
                "        map.insert(\"{}\".to_string(), {});",
                entry.field.name,
                field_json(schema.packed, entry)
            ));
        }
        lines.push("        serde_json::Value::Object(map)".to_string());
        lines.push("    }".to_string());
        lines.push("}".to_string());
        lines.push(String::new());

        lines
    }
}

impl Emitter for RustEmitter {
    fn language(&self) -> &'static str {
        "Rust"
    }

    fn supports_structured_dump(&self) -> bool {
        true
    }

    /// Compiles the schema into a Rust module. The generated code needs the
    /// `flatrec`, `serde_json` and `bytemuck` (with `derive` and
    /// `min_const_generics`) crates.
    fn emit(&self, schema: &CompiledSchema) -> Result<String, EmissionError> {
        self.check(schema)?;

        let mut body: Vec<String> = Vec::new();
        body.push("use flatrec::FixedRecord;".to_string());
        body.push(String::new());
        for record in schema.iter() {
            body.extend(self.generate_struct(schema, record));
        }

        let mut rust_code = vec![
            "// This file was generated by flatrec.".to_string(),
            "// * DO NOT EDIT *".to_string(),
            String::new(),
        ];
        match &schema.package {
            Some(package) => {
                rust_code.push(format!("pub mod {} {{", field_name(package)));
                for line in body {
                    if line.is_empty() {
                        rust_code.push(line);
                    } else {
                        rust_code.push(format!("    {}", line));
                    }
                }
                rust_code.push("}".to_string());
            }
            None => rust_code.extend(body),
        }

        let mut rust_code = rust_code.join("\n");
        if !rust_code.ends_with('\n') {
            rust_code.push('\n');
        }
        Ok(rust_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{compile_schema, CompileOptions};

    #[test]
    fn case_conversion() {
        assert_eq!(to_pascal_case("t0"), "T0");
        assert_eq!(to_pascal_case("sensor_frame"), "SensorFrame");
        assert_eq!(to_pascal_case("HEADER"), "Header");
        assert_eq!(to_pascal_case("fooBar"), "FooBar");
        assert_eq!(to_snake_case("sessionID"), "session_id");
        assert_eq!(to_snake_case("fooBar"), "foo_bar");
        assert_eq!(escape_rust_keyword("type"), "type_");
        assert_eq!(escape_rust_keyword("fee"), "fee");
    }

    #[test]
    fn emits_struct_with_padding_and_dump() {
        let schema = compile_schema(
            "struct inner { u16 v; } struct outer { bool ok; inner grid[2][3]; chars<3> tag; u32 type; }",
            &CompileOptions::default(),
        )
        .unwrap();
        let code = RustEmitter.emit(&schema).unwrap();
        assert!(code.contains("#[repr(C)]\n#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]\npub struct Outer {"));
        assert!(code.contains("    pub ok: u8,\n    pub _pad0: [u8; 1],\n    pub grid: [[Inner; 3]; 2],"));
        assert!(code.contains("    pub tag: [u8; 3],\n    pub _pad1: [u8; 3],\n    pub type_: u32,"));
        assert!(code.contains("const _: () = assert!(core::mem::size_of::<Outer>() == 24);"));
        assert!(code.contains("const _: () = assert!(core::mem::offset_of!(Outer, type_) == 20);"));
        assert!(code.contains("    const NAME: &'static str = \"outer\";"));
        assert!(code.contains("map.insert(\"ok\".to_string(), serde_json::Value::Bool(self.ok != 0));"));
        assert!(code.contains(
            "map.insert(\"grid\".to_string(), serde_json::Value::Array(self.grid.iter().map(|&a0| serde_json::Value::Array(a0.iter().map(|&a1| a1.to_json()).collect())).collect()));"
        ));
        assert!(code.contains("map.insert(\"tag\".to_string(), serde_json::Value::String(flatrec::text_from_bytes(&self.tag)));"));
        assert!(code.contains("map.insert(\"type\".to_string(), serde_json::Value::from(self.type_));"));
    }

    #[test]
    fn packed_module_copies_fields() {
        let options = CompileOptions { packed: true, ..CompileOptions::default() };
        let schema = compile_schema("package wire; struct s { u8 a; u64 b; }", &options).unwrap();
        let code = RustEmitter.emit(&schema).unwrap();
        assert!(code.contains("pub mod wire {\n    use flatrec::FixedRecord;"));
        assert!(code.contains("    #[repr(C, packed)]"));
        assert!(code.contains("serde_json::Value::from({ self.b })"));
        assert!(!code.contains("_pad"));
    }

    #[test]
    fn rejects_colliding_rust_names() {
        let schema = compile_schema("struct s { u8 fooBar; u8 foo_bar; }", &CompileOptions::default()).unwrap();
        assert_eq!(
            RustEmitter.emit(&schema),
            Err(EmissionError::NameCollision {
                language: "Rust".into(),
                record:   "s".into(),
                name:     "foo_bar".into(),
            })
        );

        let schema = compile_schema("struct ab_c { u8 x; } struct AbC { u8 y; }", &CompileOptions::default()).unwrap();
        assert!(matches!(RustEmitter.emit(&schema), Err(EmissionError::NameCollision { .. })));
    }

    #[test]
    fn rejects_underscore_names() {
        for source in ["struct _ { u8 x; }", "struct __ { u8 x; }", "struct _1 { u8 x; }", "struct s { u8 _; }"] {
            let schema = compile_schema(source, &CompileOptions::default()).unwrap();
            assert!(
                matches!(RustEmitter.emit(&schema), Err(EmissionError::NameCollision { .. })),
                "{} was accepted",
                source
            );
        }
    }

    #[test]
    fn text_setters_carry_terminator_policy() {
        let open = compile_schema("struct s { chars<8> t; }", &CompileOptions::default()).unwrap();
        let closed = compile_schema("struct s { cstr<8> t; }", &CompileOptions::default()).unwrap();
        let open = RustEmitter.emit(&open).unwrap();
        let closed = RustEmitter.emit(&closed).unwrap();
        assert_ne!(open, closed);
        assert!(open.contains(
            "impl S {\n    /// Set `t`, keeping at most 8 bytes.\n    pub fn set_t(&mut self, text: &str) {\n        flatrec::write_text(&mut self.t, text.as_bytes(), false);\n    }\n}"
        ));
        assert!(closed.contains("    /// Set `t`, keeping at most 7 bytes and a NUL."));
        assert!(closed.contains("flatrec::write_text(&mut self.t, text.as_bytes(), true);"));

        let grid = compile_schema("struct g { u8 n; cstr<4> names[2][3]; }", &CompileOptions::default()).unwrap();
        let code = RustEmitter.emit(&grid).unwrap();
        assert!(code.contains("pub fn set_names(&mut self, i0: usize, i1: usize, text: &str) {"));
        assert!(code.contains("flatrec::write_text(&mut self.names[i0][i1], text.as_bytes(), true);"));
        assert!(!code.contains("set_n("));
    }
}
