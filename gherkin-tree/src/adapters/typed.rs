//! Typed AST normalization
//!
//! Every node names its own type, outlines are a node type of their own and
//! step arguments share one `argument` field. There are no rules.

use super::{doc_string, examples, items, location, table, tags, text};
use crate::error::ModelResult;
use serde_json::{json, Value};

pub(super) fn normalize(raw: &Value) -> ModelResult<Value> {
    let feature = match raw.get("feature") {
        Some(feature) if !feature.is_null() => self::feature(feature),
        _ => Value::Null,
    };
    Ok(json!({
        "kind": "feature_file",
        "uri": text(raw, "uri"),
        "feature": feature,
    }))
}

fn node_type(node: &Value) -> &str {
    node.get("type").and_then(Value::as_str).unwrap_or("")
}

fn feature(feature: &Value) -> Value {
    json!({
        "kind": "feature",
        "keyword": text(feature, "keyword"),
        "name": text(feature, "name"),
        "description": text(feature, "description"),
        "language": text(feature, "language"),
        "location": location(feature),
        "tags": tags(feature),
        "children": items(feature, "children").iter().map(child).collect::<Vec<_>>(),
    })
}

fn child(node: &Value) -> Value {
    match node_type(node) {
        "Background" => json!({
            "kind": "background",
            "keyword": text(node, "keyword"),
            "name": text(node, "name"),
            "description": text(node, "description"),
            "location": location(node),
            "steps": steps(node),
        }),
        "Scenario" => json!({
            "kind": "scenario",
            "keyword": text(node, "keyword"),
            "name": text(node, "name"),
            "description": text(node, "description"),
            "location": location(node),
            "tags": tags(node),
            "steps": steps(node),
        }),
        "ScenarioOutline" => json!({
            "kind": "outline",
            "keyword": text(node, "keyword"),
            "name": text(node, "name"),
            "description": text(node, "description"),
            "location": location(node),
            "tags": tags(node),
            "steps": steps(node),
            "examples": items(node, "examples").iter().map(examples).collect::<Vec<_>>(),
        }),
        other => json!({ "kind": other }),
    }
}

fn steps(parent: &Value) -> Vec<Value> {
    items(parent, "steps")
        .iter()
        .map(|step| {
            let block = match step.get("argument") {
                Some(argument) if node_type(argument) == "DataTable" => table(argument),
                Some(argument) if node_type(argument) == "DocString" => {
                    doc_string(argument, "contentType")
                }
                Some(argument) if !argument.is_null() => json!({ "kind": node_type(argument) }),
                _ => Value::Null,
            };
            json!({
                "kind": "step",
                "keyword": step
                    .get("keyword")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .trim_end(),
                "text": text(step, "text"),
                "location": location(step),
                "block": block,
            })
        })
        .collect()
}
