//! Binary layout under natural alignment, in declaration order.

use std::collections::HashMap;
use flatrec_schema::{CompiledRecord, FieldDef, FieldType, LayoutEntry, RecordSchema};
use log::{debug, info};
use crate::{compiler::CompileOptions, error::LayoutError};

/// Round `offset` up to the next multiple of `align`.
pub fn align_up(offset: u64, align: u64) -> Option<u64> {
    let rem = offset % align;
    if rem == 0 {
        Some(offset)
    } else {
        offset.checked_add(align - rem)
    }
}

/// Lays out records one at a time. Each record is laid out once and cached
/// by name; nested records must be laid out before the records that use
/// them, which is the order the verifier produces.
pub struct LayoutEngine<'o> {
    options: &'o CompileOptions,
    records: Vec<CompiledRecord>,
    by_name: HashMap<String, usize>,
}

impl<'o> LayoutEngine<'o> {
    pub fn new(options: &'o CompileOptions) -> Self {
        LayoutEngine {
            options,
            records: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CompiledRecord> {
        self.by_name.get(name).map(|&i| &self.records[i])
    }

    /// Lay out `record`, or return the cached layout if it was already done.
    pub fn layout(&mut self, record: &RecordSchema) -> Result<&CompiledRecord, LayoutError> {
        if let Some(&i) = self.by_name.get(&record.name) {
            return Ok(&self.records[i]);
        }

        let mut entries = Vec::with_capacity(record.fields.len());
        let mut cursor: u64 = 0;
        let mut record_align: u64 = 1;

        for field in &record.fields {
            let (offset, size, align) = self.place_field(record, field, cursor)?;
            if offset > cursor {
                debug!(
                    "record {:?}: {} padding bytes inserted before {:?}",
                    record.name,
                    offset - cursor,
                    field.name
                );
            }
            entries.push(LayoutEntry {
                field: field.clone(),
                offset,
                size,
                align,
            });
            record_align = record_align.max(align);
            cursor = offset + size;
        }

        let overflow = || LayoutError::RecordTooLarge {
            record: record.name.clone(),
            size:   u64::MAX,
            limit:  self.options.max_record_size,
        };
        let size = align_up(cursor, record_align).ok_or_else(overflow)?;
        if size > cursor {
            debug!(
                "record {:?}: {} trailing padding bytes appended",
                record.name,
                size - cursor
            );
        }
        if size > self.options.max_record_size {
            return Err(LayoutError::RecordTooLarge {
                record: record.name.clone(),
                size,
                limit:  self.options.max_record_size,
            });
        }

        info!(
            "record {:?}: {} bytes, align {}, {} fields",
            record.name,
            size,
            record_align,
            entries.len()
        );
        self.by_name.insert(record.name.clone(), self.records.len());
        self.records.push(CompiledRecord {
            schema: record.clone(),
            entries,
            size,
            align: record_align,
        });
        Ok(&self.records[self.records.len() - 1])
    }

    /// Returns `(offset, size, align)` for `field` placed at or after `cursor`.
    fn place_field(&self, record: &RecordSchema, field: &FieldDef, cursor: u64) -> Result<(u64, u64, u64), LayoutError> {
        let overflow = || LayoutError::Overflow {
            record: record.name.clone(),
            field:  field.name.clone(),
        };

        let (element_size, natural_align) = match field.ty.element() {
            FieldType::Primitive(prim) => (prim.size(), prim.size()),
            FieldType::FixedBytes(bytes) => (bytes.capacity, 1),
            FieldType::Record(name) => {
                let nested = self.get(name).ok_or_else(|| LayoutError::MissingDependency {
                    record:     record.name.clone(),
                    dependency: name.clone(),
                })?;
                (nested.size, nested.align)
            }
            FieldType::Array { .. } => return Err(overflow()),
        };
        let align = if self.options.packed { 1 } else { natural_align };

        let mut count: u64 = 1;
        for &dim in field.ty.dims() {
            count = count.checked_mul(dim).ok_or_else(overflow)?;
        }
        if count > self.options.max_array_elements {
            return Err(LayoutError::ArrayTooLarge {
                record: record.name.clone(),
                field:  field.name.clone(),
                count,
                limit:  self.options.max_array_elements,
            });
        }

        let size = element_size.checked_mul(count).ok_or_else(overflow)?;
        if size == 0 {
            return Err(LayoutError::ZeroSize {
                record: record.name.clone(),
                field:  field.name.clone(),
            });
        }

        let offset = align_up(cursor, align).ok_or_else(overflow)?;
        offset.checked_add(size).ok_or_else(overflow)?;
        Ok((offset, size, align))
    }

    pub fn finish(self) -> Vec<CompiledRecord> {
        self.records
    }
}

/// Lay out every record of a verified schema.
pub fn layout_records(records: &[RecordSchema], options: &CompileOptions) -> Result<Vec<CompiledRecord>, LayoutError> {
    let mut engine = LayoutEngine::new(options);
    for record in records {
        engine.layout(record)?;
    }
    Ok(engine.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatrec_schema::{FixedBytes, Primitive};

    fn field(name: &str, ty: FieldType) -> FieldDef {
        FieldDef { name: name.to_string(), ty }
    }

    fn prim(p: Primitive) -> FieldType {
        FieldType::Primitive(p)
    }

    #[test]
    fn align_up_rounds() {
        assert_eq!(align_up(0, 8), Some(0));
        assert_eq!(align_up(1, 8), Some(8));
        assert_eq!(align_up(8, 8), Some(8));
        assert_eq!(align_up(6, 4), Some(8));
        assert_eq!(align_up(u64::MAX, 8), None);
    }

    #[test]
    fn natural_alignment_with_trailing_padding() {
        let record = RecordSchema {
            name:   "r".to_string(),
            fields: vec![
                field("a", prim(Primitive::U8)),
                field("b", prim(Primitive::U64)),
                field("c", prim(Primitive::U16)),
            ],
        };
        let options = CompileOptions::default();
        let compiled = layout_records(&[record], &options).unwrap();
        let offsets: Vec<_> = compiled[0].entries.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![0, 8, 16]);
        assert_eq!(compiled[0].size, 24);
        assert_eq!(compiled[0].align, 8);
    }

    #[test]
    fn packed_layout_has_no_padding() {
        let record = RecordSchema {
            name:   "r".to_string(),
            fields: vec![field("a", prim(Primitive::U8)), field("b", prim(Primitive::U64))],
        };
        let options = CompileOptions { packed: true, ..CompileOptions::default() };
        let compiled = layout_records(&[record], &options).unwrap();
        assert_eq!(compiled[0].entries[1].offset, 1);
        assert_eq!(compiled[0].size, 9);
        assert_eq!(compiled[0].align, 1);
    }

    #[test]
    fn nested_record_uses_cached_layout() {
        let inner = RecordSchema {
            name:   "inner".to_string(),
            fields: vec![field("x", prim(Primitive::U32)), field("y", prim(Primitive::U8))],
        };
        let outer = RecordSchema {
            name:   "outer".to_string(),
            fields: vec![
                field("tag", prim(Primitive::U8)),
                field("items", FieldType::with_dims(FieldType::Record("inner".into()), vec![3])),
            ],
        };
        let options = CompileOptions::default();
        let mut engine = LayoutEngine::new(&options);
        engine.layout(&inner).unwrap();
        let compiled = engine.layout(&outer).unwrap().clone();
        assert_eq!(compiled.entries[1].offset, 4);
        assert_eq!(compiled.entries[1].size, 24);
        assert_eq!(compiled.size, 28);

        // second request is served from the cache
        let again = engine.layout(&outer).unwrap();
        assert_eq!(again, &compiled);
        assert_eq!(engine.finish().len(), 2);
    }

    #[test]
    fn missing_dependency_is_reported() {
        let outer = RecordSchema {
            name:   "outer".to_string(),
            fields: vec![field("i", FieldType::Record("inner".into()))],
        };
        let options = CompileOptions::default();
        assert_eq!(
            layout_records(&[outer], &options),
            Err(LayoutError::MissingDependency { record: "outer".into(), dependency: "inner".into() })
        );
    }

    #[test]
    fn zero_capacity_text_is_rejected() {
        let record = RecordSchema {
            name:   "r".to_string(),
            fields: vec![field(
                "t",
                FieldType::FixedBytes(FixedBytes { capacity: 0, terminated: false }),
            )],
        };
        assert_eq!(
            layout_records(&[record], &CompileOptions::default()),
            Err(LayoutError::ZeroSize { record: "r".into(), field: "t".into() })
        );
    }

    #[test]
    fn limits_are_enforced() {
        let big_array = RecordSchema {
            name:   "r".to_string(),
            fields: vec![field("a", FieldType::with_dims(prim(Primitive::U8), vec![300, 300]))],
        };
        assert!(matches!(
            layout_records(&[big_array], &CompileOptions::default()),
            Err(LayoutError::ArrayTooLarge { count: 90000, .. })
        ));

        let big_record = RecordSchema {
            name:   "r".to_string(),
            fields: vec![field("a", FieldType::with_dims(prim(Primitive::U64), vec![10000]))],
        };
        assert_eq!(
            layout_records(&[big_record], &CompileOptions::default()),
            Err(LayoutError::RecordTooLarge { record: "r".into(), size: 80000, limit: 65535 })
        );

        let overflow = RecordSchema {
            name:   "r".to_string(),
            fields: vec![field("a", FieldType::with_dims(prim(Primitive::U64), vec![u64::MAX, 2]))],
        };
        assert!(matches!(
            layout_records(&[overflow], &CompileOptions::default()),
            Err(LayoutError::Overflow { .. })
        ));
    }
}
