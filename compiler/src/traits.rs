use flatrec_schema::{CodecError, CompiledSchema};
use crate::error::EmissionError;

/// A target language for generated record definitions.
pub trait Emitter {
    /// Display name, also used in [EmissionError]s.
    fn language(&self) -> &'static str;

    /// Whether the generated records can dump themselves as JSON.
    fn supports_structured_dump(&self) -> bool;

    fn emit(&self, schema: &CompiledSchema) -> Result<String, EmissionError>;
}

/// Implemented by generated Rust records. The in-memory image of a record is
/// exactly its wire image in host byte order.
pub trait FixedRecord: bytemuck::Pod {
    const NAME: &'static str;
    const SIZE: usize;

    /// Declaration-ordered JSON projection of the record.
    fn to_json(&self) -> serde_json::Value;

    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() != Self::SIZE {
            return Err(CodecError::SizeMismatch {
                record:   Self::NAME.to_string(),
                expected: Self::SIZE as u64,
                actual:   bytes.len() as u64,
            });
        }
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    fn to_bytes(&self) -> Vec<u8> {
        bytemuck::bytes_of(self).to_vec()
    }
}
