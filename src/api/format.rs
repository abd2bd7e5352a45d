// Stored row -> wire record
use serde_json::{Map, Value};

use crate::database::record::Record;
use crate::database::schema::{EntitySchema, FieldKind};

/// Convert a decoded storage row into its wire representation.
///
/// Integer-backed booleans become JSON booleans, missing many-to-many lists become `[]`,
/// then the entity's computed fields are added.
pub fn to_wire(schema: &EntitySchema, mut row: Map<String, Value>) -> Record {
    for field in schema.fields {
        match field.kind {
            FieldKind::Bool => {
                if let Some(value) = row.get_mut(field.name) {
                    if let Some(i) = value.as_i64() {
                        *value = Value::Bool(i != 0);
                    }
                }
            }
            FieldKind::RefList { .. } => {
                let value = row.entry(field.name.to_string()).or_insert(Value::Null);
                if value.is_null() {
                    *value = Value::Array(vec![]);
                }
            }
            _ => {}
        }
    }

    if let Some(compute) = schema.computed {
        compute(&mut row);
    }

    Record::from_map(row)
}
