use flatrec_schema::{CompiledSchema, FieldType, LayoutEntry};
use crate::{
    error::EmissionError,
    gen_c::{banner, c_primitive, struct_members, C_KEYWORDS},
    traits::Emitter,
    utils::check_names,
};

pub const CPP_KEYWORDS: [&str; 55] = [
    "alignas", "alignof", "and", "and_eq", "asm", "bitand", "bitor", "catch",
    "char8_t", "char16_t", "char32_t", "class", "compl", "concept",
    "consteval", "constexpr", "constinit", "const_cast", "co_await",
    "co_return", "co_yield", "decltype", "delete", "dynamic_cast",
    "explicit", "export", "friend", "mutable", "namespace", "new",
    "noexcept", "not", "not_eq", "nullptr", "operator", "or", "or_eq",
    "private", "protected", "public", "reinterpret_cast", "requires",
    "static_cast", "template", "this", "thread_local", "throw", "try",
    "typeid", "typename", "using", "virtual", "wchar_t", "xor", "xor_eq",
];

/// Identifiers the generated header defines besides the records.
const CPP_GENERATED: [&str; 4] = ["std", "nlohmann", "flatrec_text", "flatrec_set_text"];

const TEXT_HELPER: &str = r#"// toJS() keeps text bytes as stored. Dump with
// dump(-1, ' ', false, nlohmann::ordered_json::error_handler_t::replace)
// to replace invalid UTF-8 with U+FFFD like the Rust and dynamic dumps.
#ifndef FLATREC_TEXT_HELPER
#define FLATREC_TEXT_HELPER
inline std::string flatrec_text(const char *data, size_t capacity) {
  size_t len = 0;
  while (len < capacity && data[len] != '\0') len++;
  return std::string(data, len);
}

inline void flatrec_set_text(char *data, size_t capacity, const std::string &text, bool terminated) {
  size_t limit = (terminated && capacity > 0) ? capacity - 1 : capacity;
  size_t len = text.size() < limit ? text.size() : limit;
  std::memcpy(data, text.data(), len);
  std::memset(data + len, 0, capacity - len);
}
#endif
"#;

pub struct CppEmitter;

impl CppEmitter {
    fn check(&self, schema: &CompiledSchema) -> Result<(), EmissionError> {
        let reserved: Vec<&str> = C_KEYWORDS
            .iter()
            .chain(CPP_KEYWORDS.iter())
            .chain(CPP_GENERATED.iter())
            .copied()
            .collect();
        check_names(self.language(), &reserved, schema)?;

        let collision = |record: &str, name: &str| EmissionError::NameCollision {
            language: self.language().to_string(),
            record:   record.to_string(),
            name:     name.to_string(),
        };
        for record in schema.iter() {
            if record.name() == "toJS" || record.entry("toJS").is_some() {
                return Err(collision(record.name(), "toJS"));
            }
            for entry in &record.entries {
                let name = entry.field.name.as_str();
                // a member named after a record changes what that type name means
                if schema.record(name).is_some() {
                    return Err(collision(record.name(), name));
                }
                if Self::setter(entry).is_some() && record.entry(&format!("set_{}", name)).is_some() {
                    return Err(collision(record.name(), &format!("set_{}", name)));
                }
            }
        }
        Ok(())
    }

    /// Setter for a text field, applying the field's terminator policy.
    fn setter(entry: &LayoutEntry) -> Option<Vec<String>> {
        let FieldType::FixedBytes(bytes) = entry.field.ty.element() else {
            return None;
        };
        let name = &entry.field.name;
        let dims = entry.field.ty.dims();
        let params: String = (0..dims.len()).map(|level| format!("size_t i{}, ", level)).collect();
        let indices: String = (0..dims.len()).map(|level| format!("[i{}]", level)).collect();
        Some(vec![
            format!("  void set_{}({}const std::string &text) {{", name, params),
            format!(
                "    flatrec_set_text(this->{}{}, {}, text, {});",
                name, indices, bytes.capacity, bytes.terminated
            ),
            "  }".to_string(),
        ])
    }

    /// JSON expression for one element of `entry`, found at `place`.
    fn leaf(packed: bool, entry: &LayoutEntry, place: &str) -> String {
        match entry.field.ty.element() {
            FieldType::Primitive(prim) if packed => format!("static_cast<{}>({})", c_primitive(*prim), place),
            FieldType::Primitive(_) => place.to_string(),
            FieldType::FixedBytes(bytes) => format!("flatrec_text({}, {})", place, bytes.capacity),
            FieldType::Record(_) => format!("{}.toJS()", place),
            FieldType::Array { .. } => "nullptr".to_string(),
        }
    }

    fn to_js(packed: bool, entry: &LayoutEntry, lines: &mut Vec<String>) {
        let name = &entry.field.name;
        let dims = entry.field.ty.dims();
        if dims.is_empty() {
            let place = format!("this->{}", name);
            lines.push(format!("    j[\"{}\"] = {};", name, Self::leaf(packed, entry, &place)));
            return;
        }

        lines.push("    {".to_string());
        for (level, dim) in dims.iter().enumerate() {
            let pad = "  ".repeat(level + 3);
            lines.push(format!("{}nlohmann::ordered_json a{} = nlohmann::ordered_json::array();", pad, level));
            lines.push(format!("{}for (size_t i{} = 0; i{} < {}; i{}++) {{", pad, level, level, dim, level));
        }
        let indices: String = (0..dims.len()).map(|level| format!("[i{}]", level)).collect();
        let place = format!("this->{}{}", name, indices);
        lines.push(format!(
            "{}a{}.push_back({});",
            "  ".repeat(dims.len() + 3),
            dims.len() - 1,
            Self::leaf(packed, entry, &place)
        ));
        for level in (0..dims.len()).rev() {
            let pad = "  ".repeat(level + 3);
            lines.push(format!("{}}}", pad));
            if level > 0 {
                lines.push(format!("{}a{}.push_back(a{});", pad, level - 1, level));
            }
        }
        lines.push(format!("      j[\"{}\"] = a0;", name));
        lines.push("    }".to_string());
    }
}

impl Emitter for CppEmitter {
    fn language(&self) -> &'static str {
        "C++"
    }

    fn supports_structured_dump(&self) -> bool {
        true
    }

    fn emit(&self, schema: &CompiledSchema) -> Result<String, EmissionError> {
        self.check(schema)?;

        let mut cpp_code = banner(schema);
        cpp_code.push("#include <cstddef>".to_string());
        cpp_code.push("#include <cstdint>".to_string());
        cpp_code.push("#include <cstring>".to_string());
        cpp_code.push("#include <string>".to_string());
        cpp_code.push("#include <nlohmann/json.hpp>".to_string());
        cpp_code.push(String::new());
        cpp_code.push(TEXT_HELPER.to_string());

        if let Some(package) = &schema.package {
            cpp_code.push(format!("namespace {} {{", package));
            cpp_code.push(String::new());
        }

        let attribute = if schema.packed { "__attribute__((packed)) " } else { "" };
        for record in schema.iter() {
            let name = record.name();
            cpp_code.push(format!("struct {}{} {{", attribute, name));
            cpp_code.extend(struct_members(record));
            cpp_code.push(String::new());
            cpp_code.push("  nlohmann::ordered_json toJS() const {".to_string());
            cpp_code.push("    nlohmann::ordered_json j = nlohmann::ordered_json::object();".to_string());
            for entry in &record.entries {
                Self::to_js(schema.packed, entry, &mut cpp_code);
            }
            cpp_code.push("    return j;".to_string());
            cpp_code.push("  }".to_string());
            for entry in &record.entries {
                if let Some(setter) = Self::setter(entry) {
                    cpp_code.push(String::new());
                    cpp_code.extend(setter);
                }
            }
            cpp_code.push("};".to_string());
            cpp_code.push(String::new());
            cpp_code.push(format!(
                "static_assert(sizeof({}) == 0x{:x}, \"size of {}\");",
                name, record.size, name
            ));
            for entry in &record.entries {
                cpp_code.push(format!(
                    "static_assert(offsetof({}, {}) == 0x{:x}, \"offset of {}.{}\");",
                    name, entry.field.name, entry.offset, name, entry.field.name
                ));
            }
            cpp_code.push(String::new());
        }

        if let Some(package) = &schema.package {
            cpp_code.push(format!("}} // namespace {}", package));
        }

        Ok(cpp_code.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{compile_schema, CompileOptions};

    #[test]
    fn emits_nested_array_dump() {
        let schema = compile_schema(
            "package demo; struct p { i16 v; } struct s { p grid[2][3]; cstr<4> tag; }",
            &CompileOptions::default(),
        )
        .unwrap();
        let header = CppEmitter.emit(&schema).unwrap();
        assert!(header.contains("namespace demo {"));
        assert!(header.contains("} // namespace demo"));
        assert!(header.contains("    j[\"v\"] = this->v;"));
        assert!(header.contains("      for (size_t i0 = 0; i0 < 2; i0++) {"));
        assert!(header.contains("        for (size_t i1 = 0; i1 < 3; i1++) {"));
        assert!(header.contains("          a1.push_back(this->grid[i0][i1].toJS());"));
        assert!(header.contains("        a0.push_back(a1);"));
        assert!(header.contains("      j[\"grid\"] = a0;"));
        assert!(header.contains("    j[\"tag\"] = flatrec_text(this->tag, 4);"));
        assert!(header.contains("static_assert(offsetof(s, tag) == 0xc, \"offset of s.tag\");"));
    }

    #[test]
    fn packed_scalars_are_copied() {
        let options = CompileOptions { packed: true, ..CompileOptions::default() };
        let schema = compile_schema("struct s { u8 a; u32 b; }", &options).unwrap();
        let header = CppEmitter.emit(&schema).unwrap();
        assert!(header.contains("struct __attribute__((packed)) s {"));
        assert!(header.contains("    j[\"b\"] = static_cast<uint32_t>(this->b);"));
    }

    #[test]
    fn rejects_cpp_only_names() {
        let schema = compile_schema("struct s { u8 class; }", &CompileOptions::default()).unwrap();
        assert!(matches!(CppEmitter.emit(&schema), Err(EmissionError::ReservedWord { .. })));

        let schema = compile_schema("struct s { u8 toJS; }", &CompileOptions::default()).unwrap();
        assert_eq!(
            CppEmitter.emit(&schema),
            Err(EmissionError::NameCollision {
                language: "C++".into(),
                record:   "s".into(),
                name:     "toJS".into(),
            })
        );
    }

    #[test]
    fn rejects_fields_named_after_records() {
        let schema = compile_schema("struct t0 { u8 v; } struct t2 { u8 a; t0 t0; }", &CompileOptions::default()).unwrap();
        assert_eq!(
            CppEmitter.emit(&schema),
            Err(EmissionError::NameCollision {
                language: "C++".into(),
                record:   "t2".into(),
                name:     "t0".into(),
            })
        );
        assert!(crate::gen_c::CEmitter.emit(&schema).is_ok());

        let schema = compile_schema("struct s { cstr<4> tag; u8 set_tag; }", &CompileOptions::default()).unwrap();
        assert!(matches!(CppEmitter.emit(&schema), Err(EmissionError::NameCollision { .. })));
    }

    #[test]
    fn text_setters_carry_terminator_policy() {
        let open = compile_schema("struct s { chars<8> t; }", &CompileOptions::default()).unwrap();
        let closed = compile_schema("struct s { cstr<8> t; }", &CompileOptions::default()).unwrap();
        let open = CppEmitter.emit(&open).unwrap();
        let closed = CppEmitter.emit(&closed).unwrap();
        assert_ne!(open, closed);
        assert!(open.contains("  void set_t(const std::string &text) {\n    flatrec_set_text(this->t, 8, text, false);\n  }"));
        assert!(closed.contains("    flatrec_set_text(this->t, 8, text, true);"));
        assert!(open.contains("error_handler_t::replace"));

        let grid = compile_schema("struct g { cstr<4> names[2][3]; }", &CompileOptions::default()).unwrap();
        let header = CppEmitter.emit(&grid).unwrap();
        assert!(header.contains("  void set_names(size_t i0, size_t i1, const std::string &text) {"));
        assert!(header.contains("    flatrec_set_text(this->names[i0][i1], 4, text, true);"));
    }
}
