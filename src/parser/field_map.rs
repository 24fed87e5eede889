use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use super::EntityKind;
use crate::error::{AppError, AppResult, MALFORMED_PAYLOAD};
use crate::schema::definitions::lookup_field;

/// A raw, unvalidated value as submitted by a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    List(Vec<String>),
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<Vec<String>> for RawValue {
    fn from(values: Vec<String>) -> Self {
        RawValue::List(values)
    }
}

impl From<Vec<&str>> for RawValue {
    fn from(values: Vec<&str>) -> Self {
        RawValue::List(values.into_iter().map(str::to_string).collect())
    }
}

/// Field name to raw value mapping for one record kind
///
/// Keys are resolved to canonical field names on insertion; keys that do not
/// belong to the record kind are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    kind: EntityKind,
    values: BTreeMap<&'static str, RawValue>,
}

impl FieldMap {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            values: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Insert a value under a canonical key or alias
    ///
    /// Returns false when the key is not a field of this record kind.
    pub fn insert(&mut self, key: &str, value: impl Into<RawValue>) -> bool {
        match lookup_field(self.kind, key) {
            Some(def) => {
                self.values.insert(def.name, value.into());
                true
            }
            None => false,
        }
    }

    /// Builder form of [`FieldMap::insert`]
    pub fn with(mut self, key: &str, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Text value of a field; absent fields and list values read as empty
    pub fn text(&self, field: &str) -> &str {
        match self.values.get(field) {
            Some(RawValue::Text(value)) => value,
            _ => "",
        }
    }

    /// List value of a field; a text value is split on commas
    pub fn list(&self, field: &str) -> Vec<String> {
        match self.values.get(field) {
            Some(RawValue::List(values)) => values.clone(),
            Some(RawValue::Text(value)) => value
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Replace every field present in `changes`, keeping the rest
    pub fn overlay(&mut self, changes: &FieldMap) {
        for (field, value) in &changes.values {
            self.values.insert(*field, value.clone());
        }
    }

    /// Parse a JSON document into a field mapping
    pub fn from_json_slice(kind: EntityKind, payload: &[u8]) -> AppResult<Self> {
        let value: Value = serde_json::from_slice(payload).map_err(|e| {
            debug!("Rejected {} payload: {}", kind, e);
            malformed()
        })?;
        Self::from_json_value(kind, &value)
    }

    /// Convert an already decoded JSON object into a field mapping
    ///
    /// Strings, numbers and booleans become text, `null` becomes empty text and
    /// arrays are accepted for list-valued fields only. Anything else makes the
    /// whole payload malformed.
    pub fn from_json_value(kind: EntityKind, value: &Value) -> AppResult<Self> {
        let object = value.as_object().ok_or_else(malformed)?;
        let mut fields = Self::new(kind);

        for (key, raw) in object {
            let Some(def) = lookup_field(kind, key) else {
                debug!("Ignoring unknown {} field '{}'", kind, key);
                continue;
            };

            let value = match raw {
                Value::Array(items) if def.multi_valued => {
                    let values = items
                        .iter()
                        .map(scalar_to_text)
                        .collect::<Option<Vec<String>>>()
                        .ok_or_else(malformed)?;
                    RawValue::List(values)
                }
                Value::Array(_) | Value::Object(_) => return Err(malformed()),
                scalar => RawValue::Text(scalar_to_text(scalar).ok_or_else(malformed)?),
            };

            fields.values.insert(def.name, value);
        }

        Ok(fields)
    }
}

fn scalar_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn malformed() -> AppError {
    AppError::MalformedRequest(MALFORMED_PAYLOAD.to_string())
}
