use std::collections::{HashMap, HashSet};
use flatrec_schema::{FieldDef, FieldType, FixedBytes, Primitive, RecordSchema};
use log::debug;
use crate::{
    compiler::CompileOptions,
    types::{Definition, Schema, TypeRef},
    utils::is_identifier,
    error::SchemaError,
};

pub const RESERVED_NAMES: [&str; 4] = ["chars", "cstr", "float", "double"];

/// Checks the schema and resolves every field type. Returns the records in
/// dependency order: a record always comes after every record it nests,
/// otherwise declaration order is kept.
pub fn verify_schema(schema: &Schema, options: &CompileOptions) -> Result<Vec<RecordSchema>, SchemaError> {
    let mut definitions_map: HashMap<&str, &Definition> = HashMap::new();

    // 1) Record names: well-formed, unique, not reserved
    for def in &schema.definitions {
        if !is_identifier(&def.name) {
            return Err(SchemaError::InvalidIdentifier {
                context: "record name".to_string(),
                name:    def.name.clone(),
            });
        }
        if Primitive::from_name(&def.name).is_some() || RESERVED_NAMES.contains(&def.name.as_str()) {
            return Err(SchemaError::ReservedName(def.name.clone()));
        }
        if definitions_map.insert(&def.name, def).is_some() {
            return Err(SchemaError::DuplicateRecord(def.name.clone()));
        }
    }

    // 2) Fields: well-formed, unique, resolvable, non-zero dimensions
    let mut resolved: HashMap<&str, RecordSchema> = HashMap::new();
    for def in &schema.definitions {
        if def.fields.is_empty() {
            return Err(SchemaError::EmptyRecord(def.name.clone()));
        }
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(def.fields.len());
        for field in &def.fields {
            if !is_identifier(&field.name) {
                return Err(SchemaError::InvalidIdentifier {
                    context: format!("record {:?}", def.name),
                    name:    field.name.clone(),
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    record: def.name.clone(),
                    field:  field.name.clone(),
                });
            }
            if field.dims.contains(&0) {
                return Err(SchemaError::ZeroDimension {
                    record: def.name.clone(),
                    field:  field.name.clone(),
                });
            }
            let element = match &field.type_ {
                TypeRef::Chars(capacity) => FieldType::FixedBytes(FixedBytes {
                    capacity:   *capacity,
                    terminated: false,
                }),
                TypeRef::CStr(capacity) => FieldType::FixedBytes(FixedBytes {
                    capacity:   *capacity,
                    terminated: true,
                }),
                TypeRef::Named(name) => match Primitive::from_name(name) {
                    Some(prim) => FieldType::Primitive(prim),
                    None if definitions_map.contains_key(name.as_str()) => FieldType::Record(name.clone()),
                    None => {
                        return Err(SchemaError::UnknownType {
                            record: def.name.clone(),
                            field:  field.name.clone(),
                            ty:     name.clone(),
                        })
                    }
                },
            };
            fields.push(FieldDef {
                name: field.name.clone(),
                ty:   FieldType::with_dims(element, field.dims.clone()),
            });
        }
        resolved.insert(&def.name, RecordSchema {
            name: def.name.clone(),
            fields,
        });
    }

    // 3) Order by dependency, rejecting cycles. 1 = on the stack, 2 = done.
    fn visit<'s>(
        name: &'s str,
        resolved: &'s HashMap<&str, RecordSchema>,
        state: &mut HashMap<&'s str, u8>,
        stack: &mut Vec<&'s str>,
        order: &mut Vec<&'s str>,
    ) -> Result<(), SchemaError> {
        match state.get(name) {
            Some(1) => {
                let start = stack.iter().position(|&n| n == name).unwrap_or(0);
                let mut cycle: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
                cycle.push(name.to_string());
                return Err(SchemaError::RecursiveNesting { cycle });
            }
            Some(_) => return Ok(()),
            None => {}
        }
        let Some(record) = resolved.get(name) else {
            return Ok(());
        };
        state.insert(name, 1);
        stack.push(name);
        for field in &record.fields {
            if let Some(nested) = field.ty.record_name() {
                visit(nested, resolved, state, stack, order)?;
            }
        }
        stack.pop();
        state.insert(name, 2);
        order.push(name);
        Ok(())
    }

    let mut state = HashMap::new();
    let mut stack = Vec::new();
    let mut order = Vec::with_capacity(schema.definitions.len());
    for def in &schema.definitions {
        visit(&def.name, &resolved, &mut state, &mut stack, &mut order)?;
    }

    // 4) Nesting depth, computed bottom-up along the dependency order
    let mut depths: HashMap<&str, usize> = HashMap::new();
    for &name in &order {
        let record = &resolved[name];
        let depth = record
            .fields
            .iter()
            .filter_map(|f| f.ty.record_name())
            .map(|nested| depths.get(nested).copied().unwrap_or(0) + 1)
            .max()
            .unwrap_or(0);
        if depth > options.max_nesting_depth {
            return Err(SchemaError::NestingTooDeep {
                record: name.to_string(),
                depth,
                limit:  options.max_nesting_depth,
            });
        }
        depths.insert(name, depth);
    }

    debug!("verified {} records, order {:?}", order.len(), order);
    Ok(order.into_iter().map(|name| resolved[name].clone()).collect())
}
