//! Canonical record adapters
//!
//! Parser releases disagree on field names, nesting and which fields are
//! written at all. Every supported release is mapped to exactly one
//! [`Adapter`] by a static table; releases whose output is identical share a
//! [`Strategy`] and differ only in their version number.
//!
//! | Versions | Strategy | Raw shape |
//! |---|---|---|
//! | 20 - 27 | `JsonSchema` | `gherkinDocument` envelope, every field written, `mediaType` on doc strings |
//! | 6 - 19 | `Protobuf` | same envelope, empty strings and lists left out, `contentType` on doc strings |
//! | 3 - 5 | `TypedAst` | `{"type": "GherkinDocument"}`, a `type` on every node, no rules |
//!
//! The adapter is a static choice: a modeler pins one at construction. When a
//! raw result of unknown origin has to be modeled, [`detect`] inspects its
//! shape, newest family first. Nothing ever falls back to a best effort
//! guess; a shape no family claims is a [`ConfigurationError`].

mod messages;
mod typed;

use crate::dialect::{self, Dialect};
use crate::error::{ConfigurationError, ModelResult};
use crate::record::CanonicalRecord;
use serde_json::{json, Map, Value};
use std::fmt;
use std::ops::RangeInclusive;
use tracing::debug;

/// One normalization strategy per parser family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    JsonSchema,
    Protobuf,
    TypedAst,
}

impl Strategy {
    pub fn versions(self) -> RangeInclusive<u32> {
        match self {
            Strategy::JsonSchema => 20..=27,
            Strategy::Protobuf => 6..=19,
            Strategy::TypedAst => 3..=5,
        }
    }

    /// Whether a raw result carries this family's signature.
    fn matches(self, raw: &Value) -> bool {
        match self {
            Strategy::TypedAst => raw.get("type").and_then(Value::as_str) == Some("GherkinDocument"),
            Strategy::JsonSchema => envelope(raw).is_some_and(|document| {
                document.get("comments").is_some_and(Value::is_array)
                    && !names_content_type(raw, "contentType")
            }),
            Strategy::Protobuf => envelope(raw).is_some_and(|document| {
                let comments = document
                    .get("comments")
                    .and_then(Value::as_array)
                    .map_or(true, |comments| !comments.is_empty());
                (comments || names_content_type(raw, "contentType"))
                    && !names_content_type(raw, "mediaType")
            }),
        }
    }
}

/// Whether any doc string under `node` spells its content type with `key`.
fn names_content_type(node: &Value, key: &str) -> bool {
    match node {
        Value::Object(map) => map.iter().any(|(name, value)| {
            (name == "docString" && value.get(key).is_some()) || names_content_type(value, key)
        }),
        Value::Array(items) => items.iter().any(|item| names_content_type(item, key)),
        _ => false,
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::JsonSchema => "json schema messages",
            Strategy::Protobuf => "protobuf messages",
            Strategy::TypedAst => "typed ast",
        };
        f.write_str(name)
    }
}

fn envelope(raw: &Value) -> Option<&Map<String, Value>> {
    raw.get("gherkinDocument").and_then(Value::as_object)
}

/// The normalizer for one parser release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Adapter {
    pub version: u32,
    pub strategy: Strategy,
}

macro_rules! adapter_table {
    ($($strategy:ident => [$($version:literal),* $(,)?];)*) => {
        /// Every supported release, newest first.
        static ADAPTERS: &[Adapter] = &[
            $($(Adapter { version: $version, strategy: Strategy::$strategy },)*)*
        ];
    };
}

adapter_table! {
    JsonSchema => [27, 26, 25, 24, 23, 22, 21, 20];
    Protobuf => [19, 18, 17, 16, 15, 14, 13, 12, 11, 10, 9, 8, 7, 6];
    TypedAst => [5, 4, 3];
}

/// Every supported adapter, newest first.
pub fn adapters() -> &'static [Adapter] {
    ADAPTERS
}

pub fn adapter_for(version: u32) -> Result<Adapter, ConfigurationError> {
    ADAPTERS
        .iter()
        .copied()
        .find(|adapter| adapter.version == version)
        .ok_or(ConfigurationError::UnsupportedVersion(version))
}

pub fn newest() -> Adapter {
    ADAPTERS[0]
}

/// Picks the newest adapter of the first family, newest family first, whose
/// signature the raw result carries.
pub fn detect(raw: &Value) -> Result<Adapter, ConfigurationError> {
    let adapter = ADAPTERS
        .iter()
        .copied()
        .find(|adapter| adapter.strategy.matches(raw))
        .ok_or_else(|| ConfigurationError::UnrecognizedShape(describe(raw)))?;
    debug!("Detected gherkin {} output ({})", adapter.version, adapter.strategy);
    Ok(adapter)
}

impl Adapter {
    /// Configuration name of the adapter, e.g. `gherkin_18`.
    pub fn name(&self) -> String {
        format!("gherkin_{}", self.version)
    }

    pub fn supports_rules(&self) -> bool {
        self.version >= 6
    }

    pub fn supports_rule_tags(&self) -> bool {
        self.version >= 18
    }

    pub fn accepts(&self, raw: &Value) -> bool {
        self.strategy.matches(raw)
    }

    /// Maps a raw parse result onto a `feature_file` record.
    pub fn normalize(&self, raw: &Value) -> ModelResult<CanonicalRecord> {
        if !self.accepts(raw) {
            return Err(ConfigurationError::ShapeMismatch(self.version).into());
        }
        debug!("Normalizing parse result with {} ({})", self.name(), self.strategy);

        let record = match self.strategy {
            Strategy::JsonSchema | Strategy::Protobuf => messages::normalize(raw, self)?,
            Strategy::TypedAst => typed::normalize(raw)?,
        };
        CanonicalRecord::try_from(record)
    }
}

fn describe(raw: &Value) -> String {
    match raw {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("an object with keys [{}]", keys.join(", "))
        }
        Value::Array(_) => "a list".to_string(),
        Value::String(_) => "a string".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Null => "null".to_string(),
    }
}

// =====================
// Shared field readers
// =====================

fn text(node: &Value, key: &str) -> Value {
    json!(node.get(key).and_then(Value::as_str).unwrap_or(""))
}

fn items<'v>(node: &'v Value, key: &str) -> &'v [Value] {
    node.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn location(node: &Value) -> Value {
    match node
        .get("location")
        .and_then(|location| location.get("line"))
        .and_then(Value::as_u64)
    {
        Some(line) => json!({ "line": line }),
        None => Value::Null,
    }
}

fn tag(node: &Value) -> Value {
    json!({
        "kind": "tag",
        "location": location(node),
        "name": text(node, "name"),
    })
}

fn tags(node: &Value) -> Value {
    Value::Array(items(node, "tags").iter().map(tag).collect())
}

fn row(node: &Value) -> Value {
    let cells: Vec<Value> = items(node, "cells")
        .iter()
        .map(|cell| {
            json!({
                "kind": "cell",
                "location": location(cell),
                "value": text(cell, "value"),
            })
        })
        .collect();
    json!({
        "kind": "row",
        "location": location(node),
        "cells": cells,
    })
}

fn table(node: &Value) -> Value {
    json!({
        "kind": "table",
        "location": location(node),
        "rows": items(node, "rows").iter().map(row).collect::<Vec<_>>(),
    })
}

fn doc_string(node: &Value, content_type_key: &str) -> Value {
    let content_type = node
        .get(content_type_key)
        .and_then(Value::as_str)
        .filter(|content_type| !content_type.is_empty());
    json!({
        "kind": "doc_string",
        "location": location(node),
        "content_type": content_type,
        "contents": text(node, "content"),
    })
}

fn examples(node: &Value) -> Value {
    let rows: Vec<Value> = node
        .get("tableHeader")
        .filter(|header| !header.is_null())
        .into_iter()
        .chain(items(node, "tableBody"))
        .map(row)
        .collect();
    json!({
        "kind": "example",
        "keyword": text(node, "keyword"),
        "name": text(node, "name"),
        "description": text(node, "description"),
        "location": location(node),
        "tags": tags(node),
        "rows": rows,
    })
}

/// The dialect a document was written in, used to recognize outline keywords.
fn document_dialect(feature: &Value) -> &'static Dialect {
    feature
        .get("language")
        .and_then(Value::as_str)
        .and_then(|code| dialect::lookup(code).ok())
        .unwrap_or_else(dialect::active_dialect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_version_has_exactly_one_adapter() {
        for version in 3..=27 {
            let matching = adapters()
                .iter()
                .filter(|adapter| adapter.version == version)
                .count();
            assert_eq!(matching, 1, "version {}", version);
            let adapter = adapter_for(version).unwrap();
            assert!(adapter.strategy.versions().contains(&version));
        }
        assert_eq!(adapter_for(2), Err(ConfigurationError::UnsupportedVersion(2)));
        assert_eq!(adapter_for(28), Err(ConfigurationError::UnsupportedVersion(28)));
    }

    #[test]
    fn test_aliases_share_strategy_but_stay_distinct() {
        let eighteen = adapter_for(18).unwrap();
        let nineteen = adapter_for(19).unwrap();
        assert_eq!(eighteen.strategy, nineteen.strategy);
        assert_ne!(eighteen, nineteen);
        assert_eq!(eighteen.name(), "gherkin_18");
        assert!(eighteen.supports_rule_tags());
        assert!(!adapter_for(17).unwrap().supports_rule_tags());
        assert!(!adapter_for(5).unwrap().supports_rules());
    }

    #[test]
    fn test_detect_prefers_newest_family() {
        let json_schema = json!({ "gherkinDocument": { "uri": "a", "comments": [] } });
        let protobuf = json!({ "gherkinDocument": { "uri": "a" } });
        let typed = json!({ "type": "GherkinDocument", "feature": null, "comments": [] });

        assert_eq!(detect(&json_schema).unwrap().version, 27);
        assert_eq!(detect(&protobuf).unwrap().version, 19);
        assert_eq!(detect(&typed).unwrap().version, 5);
    }

    #[test]
    fn test_detect_reads_doc_string_content_type_key() {
        let doc_string = |key: &str| {
            json!({ "scenario": { "steps": [{ "docString": { "content": "{}", (key): "json" } }] } })
        };
        let comment = json!([{ "location": { "line": 1, "column": 1 }, "text": "# c" }]);

        let protobuf = json!({
            "gherkinDocument": { "comments": comment, "feature": { "children": [doc_string("contentType")] } }
        });
        assert_eq!(detect(&protobuf).unwrap().strategy, Strategy::Protobuf);
        assert!(!adapter_for(27).unwrap().accepts(&protobuf));

        let uncommented = json!({
            "gherkinDocument": { "comments": [], "feature": { "children": [doc_string("contentType")] } }
        });
        assert_eq!(detect(&uncommented).unwrap().strategy, Strategy::Protobuf);

        let json_schema = json!({
            "gherkinDocument": { "comments": comment, "feature": { "children": [doc_string("mediaType")] } }
        });
        assert_eq!(detect(&json_schema).unwrap().strategy, Strategy::JsonSchema);
        assert!(!adapter_for(19).unwrap().accepts(&json_schema));
    }

    #[test]
    fn test_unknown_shape() {
        let error = detect(&json!({ "document": {} })).unwrap_err();
        assert_eq!(
            error,
            ConfigurationError::UnrecognizedShape("an object with keys [document]".to_string())
        );
    }

    #[test]
    fn test_pinned_adapter_rejects_other_families() {
        let typed = json!({ "type": "GherkinDocument", "feature": null });
        let error = adapter_for(27).unwrap().normalize(&typed).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Parse result does not match the output of gherkin 27"
        );
    }

    #[test]
    fn test_row_reader() {
        let raw = json!({
            "location": { "line": 3, "column": 5 },
            "cells": [{ "location": { "line": 3, "column": 7 }, "value": "a" }, {}]
        });
        assert_eq!(
            row(&raw),
            json!({
                "kind": "row",
                "location": { "line": 3 },
                "cells": [
                    { "kind": "cell", "location": { "line": 3 }, "value": "a" },
                    { "kind": "cell", "location": null, "value": "" }
                ]
            })
        );
    }
}
