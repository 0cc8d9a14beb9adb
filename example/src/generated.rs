// This file was generated by flatrec.
// * DO NOT EDIT *

use flatrec::FixedRecord;

/// `t0`: 144 bytes, align 8.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct T0 {
    pub fee: u32,
    pub fi: u16,
    pub _pad0: [u8; 2],
    pub fo: u64,
    pub fum: [u8; 128],
}

const _: () = assert!(core::mem::size_of::<T0>() == 144);
const _: () = assert!(core::mem::offset_of!(T0, fee) == 0);
const _: () = assert!(core::mem::offset_of!(T0, fi) == 4);
const _: () = assert!(core::mem::offset_of!(T0, fo) == 8);
const _: () = assert!(core::mem::offset_of!(T0, fum) == 16);

impl T0 {
    /// Set `fum`, keeping at most 128 bytes.
    pub fn set_fum(&mut self, text: &str) {
        flatrec::write_text(&mut self.fum, text.as_bytes(), false);
    }
}

impl FixedRecord for T0 {
    const NAME: &'static str = "t0";
    const SIZE: usize = 144;

    fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("fee".to_string(), serde_json::Value::from(self.fee));
        map.insert("fi".to_string(), serde_json::Value::from(self.fi));
        map.insert("fo".to_string(), serde_json::Value::from(self.fo));
        map.insert("fum".to_string(), serde_json::Value::String(flatrec::text_from_bytes(&self.fum)));
        serde_json::Value::Object(map)
    }
}

/// `t1`: 584 bytes, align 8.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct T1 {
    pub blee: u16,
    pub _pad0: [u8; 6],
    pub t0s: [[T0; 2]; 2],
}

const _: () = assert!(core::mem::size_of::<T1>() == 584);
const _: () = assert!(core::mem::offset_of!(T1, blee) == 0);
const _: () = assert!(core::mem::offset_of!(T1, t0s) == 8);

impl FixedRecord for T1 {
    const NAME: &'static str = "t1";
    const SIZE: usize = 584;

    fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("blee".to_string(), serde_json::Value::from(self.blee));
        map.insert("t0s".to_string(), serde_json::Value::Array(self.t0s.iter().map(|&a0| serde_json::Value::Array(a0.iter().map(|&a1| a1.to_json()).collect())).collect()));
        serde_json::Value::Object(map)
    }
}

/// `label`: 8 bytes, align 1.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Label {
    pub name: [u8; 8],
}

const _: () = assert!(core::mem::size_of::<Label>() == 8);
const _: () = assert!(core::mem::offset_of!(Label, name) == 0);

impl Label {
    /// Set `name`, keeping at most 7 bytes and a NUL.
    pub fn set_name(&mut self, text: &str) {
        flatrec::write_text(&mut self.name, text.as_bytes(), true);
    }
}

impl FixedRecord for Label {
    const NAME: &'static str = "label";
    const SIZE: usize = 8;

    fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("name".to_string(), serde_json::Value::String(flatrec::text_from_bytes(&self.name)));
        serde_json::Value::Object(map)
    }
}
