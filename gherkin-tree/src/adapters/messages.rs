//! Message family normalization (`JsonSchema` and `Protobuf`)
//!
//! Both families nest children in single-key wrappers (`{"rule": {...}}`) and
//! differ only in which fields they bother to write, so one walk serves both.
//! Missing fields read as empty. Scenarios are a single node type here; a
//! scenario becomes an outline when it has examples or was introduced with an
//! outline keyword.

use super::{
    document_dialect, doc_string, examples, items, location, table, tags, text, Adapter, Strategy,
};
use crate::dialect::{Dialect, KeywordKind};
use crate::error::{ModelError, ModelResult};
use serde_json::{json, Value};

pub(super) fn normalize(raw: &Value, adapter: &Adapter) -> ModelResult<Value> {
    let document = raw
        .get("gherkinDocument")
        .ok_or_else(|| ModelError::malformed("missing gherkinDocument"))?;
    let walker = Walker {
        adapter,
        content_type_key: match adapter.strategy {
            Strategy::JsonSchema => "mediaType",
            Strategy::Protobuf | Strategy::TypedAst => "contentType",
        },
    };

    let feature = match document.get("feature") {
        Some(feature) if !feature.is_null() => walker.feature(feature),
        _ => Value::Null,
    };
    Ok(json!({
        "kind": "feature_file",
        "uri": text(document, "uri"),
        "feature": feature,
    }))
}

struct Walker<'a> {
    adapter: &'a Adapter,
    content_type_key: &'static str,
}

impl Walker<'_> {
    fn feature(&self, feature: &Value) -> Value {
        let dialect = document_dialect(feature);
        json!({
            "kind": "feature",
            "keyword": text(feature, "keyword"),
            "name": text(feature, "name"),
            "description": text(feature, "description"),
            "language": text(feature, "language"),
            "location": location(feature),
            "tags": tags(feature),
            "children": self.children(feature, dialect),
        })
    }

    fn children(&self, parent: &Value, dialect: &Dialect) -> Vec<Value> {
        items(parent, "children")
            .iter()
            .map(|wrapper| self.child(wrapper, dialect))
            .collect()
    }

    fn child(&self, wrapper: &Value, dialect: &Dialect) -> Value {
        let Some((key, node)) = wrapper.as_object().and_then(|map| map.iter().next()) else {
            return json!({ "kind": Value::Null });
        };
        match key.as_str() {
            "background" => json!({
                "kind": "background",
                "keyword": text(node, "keyword"),
                "name": text(node, "name"),
                "description": text(node, "description"),
                "location": location(node),
                "steps": self.steps(node),
            }),
            "scenario" => self.scenario(node, dialect),
            "rule" => self.rule(node, dialect),
            other => json!({ "kind": other }),
        }
    }

    fn rule(&self, rule: &Value, dialect: &Dialect) -> Value {
        let rule_tags = if self.adapter.supports_rule_tags() {
            tags(rule)
        } else {
            json!([])
        };
        json!({
            "kind": "rule",
            "keyword": text(rule, "keyword"),
            "name": text(rule, "name"),
            "description": text(rule, "description"),
            "location": location(rule),
            "tags": rule_tags,
            "children": self.children(rule, dialect),
        })
    }

    fn scenario(&self, scenario: &Value, dialect: &Dialect) -> Value {
        let raw_examples = items(scenario, "examples");
        let keyword = scenario.get("keyword").and_then(Value::as_str).unwrap_or("");
        let outline = !raw_examples.is_empty()
            || dialect.kind_of(keyword) == Some(KeywordKind::ScenarioOutline);

        let kind = if outline { "outline" } else { "scenario" };
        let mut record = json!({
            "kind": kind,
            "keyword": keyword,
            "name": text(scenario, "name"),
            "description": text(scenario, "description"),
            "location": location(scenario),
            "tags": tags(scenario),
            "steps": self.steps(scenario),
        });
        if outline {
            record["examples"] = Value::Array(raw_examples.iter().map(examples).collect());
        }
        record
    }

    fn steps(&self, parent: &Value) -> Vec<Value> {
        items(parent, "steps")
            .iter()
            .map(|step| {
                let block = if let Some(data_table) = step.get("dataTable") {
                    table(data_table)
                } else if let Some(doc) = step.get("docString") {
                    doc_string(doc, self.content_type_key)
                } else {
                    Value::Null
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
}
