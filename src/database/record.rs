use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::database::schema::{EntitySchema, FieldDef, FieldKind};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Expected a JSON object")]
    NotAnObject,
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
    #[error("Invalid fields: {0:?}")]
    Fields(HashMap<String, String>),
}

/// A wire-mapped record: a JSON object keyed by field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: Value) -> Result<Self, RecordError> {
        match json {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(RecordError::NotAnObject),
        }
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    pub fn to_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn to_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    pub fn to_api_output(self) -> Value {
        Value::Object(self.fields)
    }

    pub fn to_api_output_array(records: Vec<Self>) -> Value {
        Value::Array(records.into_iter().map(Record::to_api_output).collect())
    }

    /// Validate this record as a create payload.
    ///
    /// Unknown keys and read-only fields are ignored; absent optional fields take their
    /// defaults. All field problems are reported together.
    pub fn prepare_create(&self, schema: &EntitySchema) -> Result<WriteSet, RecordError> {
        let mut write = WriteSet::default();
        let mut errors = HashMap::new();

        for field in schema.fields {
            let incoming = if field.read_only { None } else { self.fields.get(field.name) };
            match incoming {
                Some(value) => match field.normalize(value) {
                    Ok(normalized) => write.push(field, normalized),
                    Err(message) => {
                        errors.insert(field.name.to_string(), message);
                    }
                },
                None => match field.default_value() {
                    Some(default) => write.push(field, default),
                    None => {
                        errors.insert(field.name.to_string(), "This field is required.".to_string());
                    }
                },
            }
        }

        if errors.is_empty() {
            Ok(write)
        } else {
            Err(RecordError::Fields(errors))
        }
    }

    /// Validate this record as an update payload. Only supplied fields are written;
    /// a full update additionally requires every required field.
    pub fn prepare_update(&self, schema: &EntitySchema, partial: bool) -> Result<WriteSet, RecordError> {
        let mut write = WriteSet::default();
        let mut errors = HashMap::new();

        for field in schema.fields.iter().filter(|f| !f.read_only) {
            match self.fields.get(field.name) {
                Some(value) => match field.normalize(value) {
                    Ok(normalized) => write.push(field, normalized),
                    Err(message) => {
                        errors.insert(field.name.to_string(), message);
                    }
                },
                None if !partial && field.default_value().is_none() => {
                    errors.insert(field.name.to_string(), "This field is required.".to_string());
                }
                None => {}
            }
        }

        if errors.is_empty() {
            Ok(write)
        } else {
            Err(RecordError::Fields(errors))
        }
    }
}

/// Normalized values ready to be written: plain columns and many-to-many id lists
#[derive(Debug, Default)]
pub struct WriteSet {
    pub columns: Vec<(&'static FieldDef, Value)>,
    pub lists: Vec<(&'static FieldDef, Vec<String>)>,
}

impl WriteSet {
    pub fn push(&mut self, field: &'static FieldDef, value: Value) {
        if let FieldKind::RefList { .. } = field.kind {
            let ids = value
                .as_array()
                .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default();
            self.lists.push((field, ids));
        } else {
            self.columns.push((field, value));
        }
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.columns.iter().find(|(f, _)| f.name == name).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.lists.is_empty()
    }
}

impl From<RecordError> for DatabaseError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Fields(errors) => DatabaseError::Validation(errors),
            other => DatabaseError::QueryError(other.to_string()),
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
