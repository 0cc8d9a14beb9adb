use crate::{
    error::CodecError,
    schema::{FixedBytes, Primitive},
};
use serde::{Deserialize, Serialize};

/// Byte order used by the dynamic codec. Generated code always uses the
/// host's native order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// A scalar read from or written to a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    UInt(u64),
    Int(i64),
    Float(f64),
}

/// A read-only view over one whole record's bytes.
///
/// Example usage:
///
/// ```
/// use flatrec_schema::{ByteBuffer, Endian, Primitive, Scalar};
/// let bb = ByteBuffer::new(&[0xfe, 0xca, 0, 0], Endian::Little);
/// assert_eq!(bb.read_scalar(Primitive::U16, 0), Ok(Scalar::UInt(0xcafe)));
/// ```
///
pub struct ByteBuffer<'a> {
    data:   &'a [u8],
    endian: Endian,
}

impl<'a> ByteBuffer<'a> {
    pub fn new(data: &'a [u8], endian: Endian) -> ByteBuffer<'a> {
        ByteBuffer { data, endian }
    }

    /// Retrieves the underlying byte slice.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Borrow `len` bytes starting at `offset`.
    pub fn read_bytes(&self, offset: u64, len: u64) -> Result<&'a [u8], CodecError> {
        let start = offset as usize;
        let end = start
            .checked_add(len as usize)
            .filter(|&end| end <= self.data.len())
            .ok_or(CodecError::OutOfBounds {
                offset,
                len,
                available: self.data.len() as u64,
            })?;
        Ok(&self.data[start..end])
    }

    /// Read an unsigned integer of `width` bytes.
    pub fn read_uint(&self, offset: u64, width: u64) -> Result<u64, CodecError> {
        let bytes = self.read_bytes(offset, width)?;
        let mut value: u64 = 0;
        match self.endian {
            Endian::Little => {
                for &b in bytes.iter().rev() {
                    value = (value << 8) | b as u64;
                }
            }
            Endian::Big => {
                for &b in bytes {
                    value = (value << 8) | b as u64;
                }
            }
        }
        Ok(value)
    }

    pub fn read_scalar(&self, prim: Primitive, offset: u64) -> Result<Scalar, CodecError> {
        let raw = self.read_uint(offset, prim.size())?;
        let scalar = match prim {
            Primitive::Bool => Scalar::Bool(raw != 0),
            Primitive::U8 | Primitive::U16 | Primitive::U32 | Primitive::U64 => Scalar::UInt(raw),
            Primitive::I8 => Scalar::Int(raw as u8 as i8 as i64),
            Primitive::I16 => Scalar::Int(raw as u16 as i16 as i64),
            Primitive::I32 => Scalar::Int(raw as u32 as i32 as i64),
            Primitive::I64 => Scalar::Int(raw as i64),
            Primitive::F32 => Scalar::Float(f32::from_bits(raw as u32) as f64),
            Primitive::F64 => Scalar::Float(f64::from_bits(raw)),
        };
        Ok(scalar)
    }

    /// Read a text buffer: bytes up to the first NUL (or the whole slice),
    /// decoded as lossy UTF-8.
    pub fn read_text(&self, offset: u64, capacity: u64) -> Result<String, CodecError> {
        Ok(text_from_bytes(self.read_bytes(offset, capacity)?))
    }
}

/// Decode a fixed text buffer up to its first NUL byte.
pub fn text_from_bytes(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Fill a text buffer in place with the given terminator policy. Generated
/// setters call this with the field's own policy.
pub fn write_text(dst: &mut [u8], text: &[u8], terminated: bool) {
    let policy = FixedBytes {
        capacity: dst.len() as u64,
        terminated,
    };
    fill_text(dst, policy.max_content(), text);
}

fn fill_text(slot: &mut [u8], max_content: u64, text: &[u8]) {
    let len = text.len().min(max_content as usize).min(slot.len());
    slot[..len].copy_from_slice(&text[..len]);
    for b in &mut slot[len..] {
        *b = 0;
    }
}

/// A zero-filled, fixed-size buffer for writing one whole record.
pub struct ByteBufferMut {
    data:   Vec<u8>,
    endian: Endian,
}

impl ByteBufferMut {
    pub fn new(size: u64, endian: Endian) -> ByteBufferMut {
        ByteBufferMut {
            data: vec![0; size as usize],
            endian,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn slot(&mut self, offset: u64, len: u64) -> Result<&mut [u8], CodecError> {
        let available = self.data.len() as u64;
        let start = offset as usize;
        match start.checked_add(len as usize) {
            Some(end) if end <= self.data.len() => Ok(&mut self.data[start..end]),
            _ => Err(CodecError::OutOfBounds {
                offset,
                len,
                available,
            }),
        }
    }

    pub fn write_uint(&mut self, offset: u64, width: u64, value: u64) -> Result<(), CodecError> {
        let endian = self.endian;
        let slot = self.slot(offset, width)?;
        for i in 0..slot.len() {
            let shift = 8 * i;
            let byte = (value >> shift) as u8;
            match endian {
                Endian::Little => slot[i] = byte,
                Endian::Big => slot[slot.len() - 1 - i] = byte,
            }
        }
        Ok(())
    }

    /// Write `scalar` as `prim`. The caller is responsible for range checks.
    pub fn write_scalar(&mut self, prim: Primitive, offset: u64, scalar: Scalar) -> Result<(), CodecError> {
        let raw = match (prim, scalar) {
            (Primitive::F32, Scalar::Float(f)) => (f as f32).to_bits() as u64,
            (Primitive::F64, Scalar::Float(f)) => f.to_bits(),
            (_, Scalar::Bool(b)) => b as u64,
            (_, Scalar::UInt(u)) => u,
            (_, Scalar::Int(i)) => i as u64,
            (_, Scalar::Float(f)) => {
                return Err(CodecError::TypeMismatch {
                    expected: prim.name().to_string(),
                    found:    format!("float {}", f),
                })
            }
        };
        self.write_uint(offset, prim.size(), raw)
    }

    /// Copy `text` into a buffer of `capacity` bytes, truncating to
    /// `max_content` and leaving the remainder NUL.
    pub fn write_text(&mut self, offset: u64, capacity: u64, max_content: u64, text: &[u8]) -> Result<(), CodecError> {
        let slot = self.slot(offset, capacity)?;
        fill_text(slot, max_content, text);
        Ok(())
    }
}

#[test]
fn read_uint_orders() {
    let data = [0x01, 0x02, 0x03, 0x04];
    assert_eq!(ByteBuffer::new(&data, Endian::Little).read_uint(0, 4), Ok(0x0403_0201));
    assert_eq!(ByteBuffer::new(&data, Endian::Big).read_uint(0, 4), Ok(0x0102_0304));
    assert_eq!(ByteBuffer::new(&data, Endian::Little).read_uint(2, 2), Ok(0x0403));
}

#[test]
fn read_out_of_bounds() {
    let bb = ByteBuffer::new(&[0, 0], Endian::Little);
    assert_eq!(
        bb.read_uint(1, 2),
        Err(CodecError::OutOfBounds { offset: 1, len: 2, available: 2 })
    );
}

#[test]
fn read_signed_and_float() {
    let bb = ByteBuffer::new(&[0xff, 0xfe, 0xff], Endian::Little);
    assert_eq!(bb.read_scalar(Primitive::I8, 0), Ok(Scalar::Int(-1)));
    assert_eq!(bb.read_scalar(Primitive::I16, 1), Ok(Scalar::Int(-2)));

    let bits = 1.5f32.to_bits().to_le_bytes();
    let bb = ByteBuffer::new(&bits, Endian::Little);
    assert_eq!(bb.read_scalar(Primitive::F32, 0), Ok(Scalar::Float(1.5)));
}

#[test]
fn write_uint_orders() {
    let mut bb = ByteBufferMut::new(4, Endian::Little);
    bb.write_uint(0, 2, 0xcafe).unwrap();
    assert_eq!(bb.data(), &[0xfe, 0xca, 0, 0]);

    let mut bb = ByteBufferMut::new(4, Endian::Big);
    bb.write_uint(2, 2, 0xcafe).unwrap();
    assert_eq!(bb.data(), &[0, 0, 0xca, 0xfe]);
}

#[test]
fn write_negative_int() {
    let mut bb = ByteBufferMut::new(2, Endian::Little);
    bb.write_scalar(Primitive::I16, 0, Scalar::Int(-2)).unwrap();
    assert_eq!(bb.data(), &[0xfe, 0xff]);
}

#[test]
fn write_text_truncates_and_pads() {
    let mut bb = ByteBufferMut::new(6, Endian::Little);
    bb.write_text(0, 6, 6, b"abcdefgh").unwrap();
    assert_eq!(bb.data(), b"abcdef");
    bb.write_text(0, 6, 5, b"abcdefgh").unwrap();
    assert_eq!(bb.data(), b"abcde\0");
    bb.write_text(0, 6, 6, b"ab").unwrap();
    assert_eq!(bb.data(), b"ab\0\0\0\0");
}

#[test]
fn write_text_in_place_follows_policy() {
    let mut open = [0xffu8; 4];
    write_text(&mut open, b"abcdef", false);
    assert_eq!(&open, b"abcd");

    let mut closed = [0xffu8; 4];
    write_text(&mut closed, b"abcdef", true);
    assert_eq!(&closed, b"abc\0");

    write_text(&mut closed, b"x", true);
    assert_eq!(&closed, b"x\0\0\0");
}

#[test]
fn text_stops_at_nul() {
    assert_eq!(text_from_bytes(b"hi\0there"), "hi");
    assert_eq!(text_from_bytes(b"full"), "full");
    assert_eq!(text_from_bytes(b""), "");
}
