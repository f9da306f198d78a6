//! Record model: one document of a collection, as seen by the sweep.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A transient snapshot of one document.
///
/// The store owns the document; the sweep only reads this view and writes a
/// single field back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Build a record from a JSON value. Non-object values yield an empty field map.
    pub fn from_value(id: impl Into<String>, value: Value) -> Self {
        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(id, fields)
    }

    /// String value of `field`. Missing, null and non-string values are all absent.
    pub fn string_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}
