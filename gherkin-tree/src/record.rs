//! Canonical records
//!
//! The version-independent shape every adapter produces: a JSON object with a
//! required `kind` plus kind-specific fields. Adapters always emit every key
//! of a kind (empty string, empty list or null when the parser had nothing),
//! so the builder never has to know which parser produced a record.
//!
//! ```text
//! { "kind": "step", "keyword": "Given", "text": "a step", "location": { "line": 4 },
//!   "block": { "kind": "doc_string", "content_type": null, "contents": "...", ... } }
//! ```

use crate::error::{ModelError, ModelResult};
use crate::tree::ElementKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An owned canonical record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalRecord(Map<String, Value>);

impl CanonicalRecord {
    pub fn view(&self) -> RecordView<'_> {
        RecordView { map: &self.0 }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// The declared kind, as written.
    pub fn kind_name(&self) -> Option<&str> {
        self.view().kind_name()
    }
}

impl TryFrom<Value> for CanonicalRecord {
    type Error = ModelError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(CanonicalRecord(map)),
            other => Err(ModelError::malformed(format!(
                "a canonical record must be an object, found {}",
                other
            ))),
        }
    }
}

impl<'a> From<RecordView<'a>> for CanonicalRecord {
    fn from(view: RecordView<'a>) -> Self {
        CanonicalRecord(view.map.clone())
    }
}

/// Borrowed, zero-copy access to a record and its nested records.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> RecordView<'a> {
    pub fn kind_name(&self) -> Option<&'a str> {
        self.map.get("kind").and_then(Value::as_str)
    }

    /// The declared kind; unknown kinds are fatal.
    pub fn kind(&self) -> ModelResult<ElementKind> {
        match self.map.get("kind") {
            Some(Value::String(kind)) => kind.parse(),
            Some(other) => Err(ModelError::UnknownKind(other.to_string())),
            None => Err(ModelError::malformed("record has no kind")),
        }
    }

    /// A string field; missing or null fields read as empty.
    pub fn text(&self, key: &str) -> &'a str {
        self.optional_text(key).unwrap_or("")
    }

    pub fn optional_text(&self, key: &str) -> Option<&'a str> {
        self.map.get(key).and_then(Value::as_str)
    }

    pub fn line(&self) -> Option<usize> {
        self.map
            .get("location")
            .and_then(|location| location.get("line"))
            .and_then(Value::as_u64)
            .map(|line| line as usize)
    }

    /// Nested records stored as a list under `key`.
    pub fn children(&self, key: &str) -> ModelResult<Vec<RecordView<'a>>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items.iter().map(|item| view_of(item, key)).collect(),
            Some(_) => Err(ModelError::malformed(format!("'{}' must be a list", key))),
        }
    }

    /// A single nested record stored under `key`.
    pub fn child(&self, key: &str) -> ModelResult<Option<RecordView<'a>>> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => view_of(value, key).map(Some),
        }
    }
}

fn view_of<'a>(value: &'a Value, key: &str) -> ModelResult<RecordView<'a>> {
    value
        .as_object()
        .map(|map| RecordView { map })
        .ok_or_else(|| ModelError::malformed(format!("'{}' must hold records", key)))
}
