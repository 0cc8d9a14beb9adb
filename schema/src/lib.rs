//! Record model and runtime helpers for Flatrec fixed-layout records.
//!
//! The compiler lays records out into a [CompiledSchema]; this crate holds
//! that model plus a dynamic codec that reads and writes record bytes
//! without generated code.
//!
//! ```
//! use flatrec_schema::*;
//!
//! let record = CompiledRecord {
//!     schema: RecordSchema { name: "point".to_owned(), fields: vec![] },
//!     entries: vec![
//!         LayoutEntry {
//!             field: FieldDef { name: "x".to_owned(), ty: FieldType::Primitive(Primitive::U16) },
//!             offset: 0, size: 2, align: 2,
//!         },
//!         LayoutEntry {
//!             field: FieldDef { name: "y".to_owned(), ty: FieldType::Primitive(Primitive::U16) },
//!             offset: 2, size: 2, align: 2,
//!         },
//!     ],
//!     size: 4,
//!     align: 2,
//! };
//! let schema = CompiledSchema::new(None, false, vec![record]);
//!
//! let value = Value::decode(&schema, "point", &[1, 0, 2, 0], Endian::Little).unwrap();
//! assert_eq!(format!("{:?}", value), "point {x: 1, y: 2}");
//! assert_eq!(value.encode(&schema, "point", Endian::Little).unwrap(), [1, 0, 2, 0]);
//! ```

pub mod bb;
pub mod error;
pub mod schema;
pub mod value;

pub use bb::*;
pub use error::*;
pub use schema::*;
pub use value::*;
