use std::path::Path;
use flatrec_schema::CompiledSchema;
use log::info;
use serde::{Deserialize, Serialize};
use crate::{
    config::parse_json_config,
    error::{EmissionError, FlatrecError},
    gen_c::CEmitter,
    gen_cpp::CppEmitter,
    gen_rust::RustEmitter,
    layout::layout_records,
    parser::parse_schema,
    tokenizer::tokenize_schema,
    traits::Emitter,
    types::Schema,
    verifier::verify_schema,
};

/// Knobs for one compilation. Can be embedded in a larger serde config;
/// missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Lay every field out with alignment 1 and mark emitted structs packed.
    pub packed:             bool,
    pub max_record_size:    u64,
    /// Limit on the element count of a single array field, all dimensions
    /// multiplied together.
    pub max_array_elements: u64,
    pub max_nesting_depth:  usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            packed:             false,
            max_record_size:    65535,
            max_array_elements: 65535,
            max_nesting_depth:  16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Idl,
    Json,
}

impl SchemaFormat {
    /// `.json` files are JSON configs, anything else is IDL text.
    pub fn from_path(path: &Path) -> SchemaFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SchemaFormat::Json,
            _ => SchemaFormat::Idl,
        }
    }
}

pub fn parse_source(text: &str, format: SchemaFormat) -> Result<Schema, FlatrecError> {
    match format {
        SchemaFormat::Idl => {
            let tokens = tokenize_schema(text)?;
            parse_schema(&tokens)
        }
        SchemaFormat::Json => parse_json_config(text),
    }
}

/// Compile IDL text into laid-out records.
/// Returns `Err(FlatrecError)` if tokenizing, parsing, verification or layout fails.
pub fn compile_schema(text: &str, options: &CompileOptions) -> Result<CompiledSchema, FlatrecError> {
    compile_source(text, SchemaFormat::Idl, options)
}

/// Compile a JSON config into laid-out records.
pub fn compile_json_config(text: &str, options: &CompileOptions) -> Result<CompiledSchema, FlatrecError> {
    compile_source(text, SchemaFormat::Json, options)
}

pub fn compile_source(text: &str, format: SchemaFormat, options: &CompileOptions) -> Result<CompiledSchema, FlatrecError> {
    let schema = parse_source(text, format)?;
    compile_parsed(&schema, options)
}

pub fn compile_file(path: &Path, options: &CompileOptions) -> Result<CompiledSchema, FlatrecError> {
    let text = std::fs::read_to_string(path)?;
    compile_source(&text, SchemaFormat::from_path(path), options)
}

pub fn compile_parsed(schema: &Schema, options: &CompileOptions) -> Result<CompiledSchema, FlatrecError> {
    let records = verify_schema(schema, options)?;
    let compiled = layout_records(&records, options)?;
    info!(
        "compiled {} records{}",
        compiled.len(),
        if options.packed { " (packed)" } else { "" }
    );
    Ok(CompiledSchema::new(schema.package.clone(), options.packed, compiled))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    C,
    Cpp,
    Rust,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::C, Language::Cpp, Language::Rust];
}

pub fn emitter_for(language: Language) -> Box<dyn Emitter> {
    match language {
        Language::C => Box::new(CEmitter),
        Language::Cpp => Box::new(CppEmitter),
        Language::Rust => Box::new(RustEmitter),
    }
}

/// Run each emitter independently. A failing target does not stop the others.
pub fn emit_all(schema: &CompiledSchema, languages: &[Language]) -> Vec<(Language, Result<String, EmissionError>)> {
    languages
        .iter()
        .map(|&language| (language, emitter_for(language).emit(schema)))
        .collect()
}
