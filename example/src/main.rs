// example/src/main.rs

mod generated;

use flatrec::*;

// Bring the generated types into scope:
use generated::{Label, T0, T1};

const SCHEMA: &str = include_str!("../schema/t0_t1.frec");

/// Generated records use the host byte order.
fn native_endian() -> Endian {
    if cfg!(target_endian = "big") {
        Endian::Big
    } else {
        Endian::Little
    }
}

fn build_t1(text: &str) -> T1 {
    let mut t1: T1 = bytemuck::Zeroable::zeroed();
    t1.blee = 0xcafe;
    for i in 0..2 {
        for j in 0..2 {
            let k = (i + 2 * j) as u64;
            let mut temp: T0 = bytemuck::Zeroable::zeroed();
            temp.fee = (k * 0x02202202) as u32;
            temp.fi = (k * 0x0202) as u16;
            temp.fo = k * 0x2200220022002200;
            temp.set_fum(text);
            t1.t0s[i][j] = temp;
        }
    }
    t1
}

fn main() -> Result<(), FlatrecError> {
    let schema = compile_schema(SCHEMA, &CompileOptions::default())?;

    // Write through the generated struct...
    let t1 = build_t1("Just Buffers are chill");
    let bytes = t1.to_bytes();
    println!("{} is {} bytes", T1::NAME, bytes.len());

    // ...and read it back through the dynamic codec.
    let value = Value::decode(&schema, "t1", &bytes, native_endian())?;
    let dynamic = value.to_json();
    let generated = t1.to_json();
    assert_eq!(dynamic, generated, "generated and dynamic views disagree");

    let back = T1::from_bytes(&bytes)?;
    for i in 0..2 {
        for j in 0..2 {
            let entry = back.t0s[i][j];
            let k = (i + 2 * j) as u64;
            assert_eq!(entry.fee as u64, k * 0x02202202);
            assert_eq!(entry.fi as u64, k * 0x0202);
            assert_eq!(entry.fo, k * 0x2200220022002200);
            assert_eq!(text_from_bytes(&entry.fum), "Just Buffers are chill");
        }
    }

    let mut label: Label = bytemuck::Zeroable::zeroed();
    label.set_name("t1 demo");
    println!("{}: {}", Label::NAME, label.to_json());

    println!("{}", serde_json::to_string_pretty(&generated)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_module_is_current() {
        let schema = compile_schema(SCHEMA, &CompileOptions::default()).unwrap();
        let code = emitter_for(Language::Rust).emit(&schema).unwrap();
        assert_eq!(code, include_str!("generated.rs"));
    }

    #[test]
    fn dynamic_encode_matches_generated_bytes() {
        let schema = compile_schema(SCHEMA, &CompileOptions::default()).unwrap();
        let t1 = build_t1("Relax, they're Just Buffers");
        let value = Value::from_json(&schema, "t1", &t1.to_json()).unwrap();
        assert_eq!(value.encode(&schema, "t1", native_endian()).unwrap(), t1.to_bytes());
    }

    #[test]
    fn setters_follow_field_policy() {
        // `fum` is chars<128>: all 128 bytes are kept
        let long = "x".repeat(200);
        let mut t0: T0 = bytemuck::Zeroable::zeroed();
        t0.set_fum(&long);
        assert!(t0.fum.iter().all(|&b| b == b'x'));
        assert_eq!(text_from_bytes(&t0.fum).len(), 128);

        let schema = compile_schema(SCHEMA, &CompileOptions::default()).unwrap();
        let json = serde_json::json!({ "fum": long });
        let value = Value::from_json(&schema, "t0", &json).unwrap();
        assert_eq!(value.encode(&schema, "t0", native_endian()).unwrap(), t0.to_bytes());

        t0.set_fum("short");
        assert_eq!(&t0.fum[..6], b"short\0");
        assert!(t0.fum[5..].iter().all(|&b| b == 0));

        // `name` is cstr<8>: the last byte stays NUL
        let mut label: Label = bytemuck::Zeroable::zeroed();
        label.set_name("abcdefghij");
        assert_eq!(&label.name, b"abcdefg\0");
        assert_eq!(label.to_json(), serde_json::json!({ "name": "abcdefg" }));

        let value = Value::from_json(&schema, "label", &serde_json::json!({ "name": "abcdefghij" })).unwrap();
        assert_eq!(value.encode(&schema, "label", native_endian()).unwrap(), label.to_bytes());
    }

    #[test]
    fn from_bytes_rejects_other_lengths() {
        assert_eq!(
            T0::from_bytes(&[0u8; 143]).unwrap_err(),
            CodecError::SizeMismatch { record: "t0".into(), expected: 144, actual: 143 }
        );
    }
}
