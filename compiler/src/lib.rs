//! flatrec-compiler
//!
//! This crate implements:
//!  1) A tokenizer + parser for `.frec` IDL files, and a reader for JSON configs,
//!  2) A schema verifier (duplicate names, unknown types, recursive nesting, etc.),
//!  3) The layout engine that assigns offsets, sizes and alignments,
//!  4) Code generation for C, C++ and Rust (`Emitter`),
//!  5) Error types (`FlatrecError` and friends), and the `FixedRecord` trait.

pub mod error;
pub mod types;
pub mod utils;
pub mod tokenizer;
pub mod parser;
pub mod config;
pub mod verifier;
pub mod layout;
pub mod compiler;
pub mod gen_c;
pub mod gen_cpp;
pub mod gen_rust;
pub mod traits;

pub use compiler::{
    compile_file, compile_json_config, compile_parsed, compile_schema, compile_source, emit_all, emitter_for,
    parse_source, CompileOptions, Language, SchemaFormat,
};
pub use error::{EmissionError, FlatrecError, LayoutError, SchemaError};
pub use gen_c::CEmitter;
pub use gen_cpp::CppEmitter;
pub use gen_rust::RustEmitter;
pub use layout::LayoutEngine;
pub use traits::{Emitter, FixedRecord};
