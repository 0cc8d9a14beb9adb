use serde::Serialize;

/// A schema as written, before names are resolved.
#[derive(Debug, PartialEq, Serialize)]
pub struct Schema {
    pub package:     Option<String>,
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeRef {
    /// A primitive or a record name.
    Named(String),
    /// `chars<N>`: text buffer without a terminator guarantee.
    Chars(u64),
    /// `cstr<N>`: text buffer whose last byte is always NUL.
    CStr(u64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name:   String,
    pub line:   usize,
    pub column: usize,
    pub type_:  TypeRef,
    pub dims:   Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definition {
    pub name:   String,
    pub line:   usize,
    pub column: usize,
    pub fields: Vec<Field>,
}
