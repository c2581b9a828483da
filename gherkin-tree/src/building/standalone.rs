//! Stand-alone element construction
//!
//! A fragment such as a single step or table cannot be parsed on its own, so
//! it is wrapped in the smallest document that gives it a legal home. The
//! wrapper is written with the dialect's own keywords and only exists in the
//! raw parse result: the element is located in the normalized record and
//! built from its own sub-record, so no wrapper node ever reaches the tree.

use crate::dialect::{Dialect, KeywordKind};
use crate::error::{ModelError, ModelResult};
use crate::record::CanonicalRecord;
use crate::tree::ElementKind;
use serde_json::Value;

/// File name the synthetic document is parsed under.
pub(crate) fn file_name(kind: ElementKind) -> String {
    format!("gherkin_tree_stand_alone_{}.feature", kind)
}

/// Wraps `fragment` in a minimal document that can hold an element of `kind`.
pub(crate) fn wrap(kind: ElementKind, fragment: &str, dialect: &Dialect) -> ModelResult<String> {
    let feature = format!("{}:", dialect.primary(KeywordKind::Feature));
    let scenario = format!("{}:", dialect.primary(KeywordKind::Scenario));
    let outline = format!("{}:", dialect.primary(KeywordKind::ScenarioOutline));
    let step = format!("{}step", dialect.primary(KeywordKind::Step));

    let source = match kind {
        ElementKind::FeatureFile | ElementKind::Feature => fragment.to_string(),
        ElementKind::Tag => format!("{}\n{}", fragment, feature),
        ElementKind::Rule
        | ElementKind::Background
        | ElementKind::Scenario
        | ElementKind::Outline => format!("{}\n{}", feature, fragment),
        ElementKind::Example => format!("{}\n{}\n{}", feature, outline, fragment),
        ElementKind::Step => format!("{}\n{}\n{}", feature, scenario, fragment),
        ElementKind::Table | ElementKind::DocString | ElementKind::Row => {
            format!("{}\n{}\n{}\n{}", feature, scenario, step, fragment)
        }
        ElementKind::Directory | ElementKind::Cell => {
            return Err(ModelError::argument(format!(
                "A {} cannot be built from source text",
                kind
            )))
        }
    };
    Ok(source)
}

/// The first record of `kind` in `document`, depth first.
pub(crate) fn locate(document: &CanonicalRecord, kind: ElementKind) -> ModelResult<CanonicalRecord> {
    if document.kind_name() == Some(kind.as_str()) {
        return Ok(document.clone());
    }
    document
        .as_map()
        .values()
        .find_map(|nested| find(nested, kind.as_str()))
        .ok_or_else(|| {
            ModelError::argument(format!(
                "The given source text does not contain an element of kind '{}'",
                kind
            ))
        })
        .and_then(|found| CanonicalRecord::try_from(found.clone()))
}

fn find<'v>(value: &'v Value, kind: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => {
            if map.get("kind").and_then(Value::as_str) == Some(kind) {
                return Some(value);
            }
            map.iter()
                .filter(|(key, _)| key.as_str() != "kind")
                .find_map(|(_, nested)| find(nested, kind))
        }
        Value::Array(items) => items.iter().find_map(|item| find(item, kind)),
        _ => None,
    }
}
