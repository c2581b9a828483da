//! Raw result emission
//!
//! Writes a parsed document out as JSON in the shape one parser family
//! produces:
//!
//! - message families wrap everything in a `gherkinDocument` envelope, give
//!   every node an `id` and nest children as `{"scenario": {...}}` style
//!   wrappers. The JSON schema family writes every field; the protobuf family
//!   leaves out empty strings and empty lists.
//! - the typed AST family tags every node with a `type` and has no envelope.

use super::grammar::{
    ArgumentNode, BackgroundNode, ChildNode, Document, ExamplesNode, FeatureNode, Header, Location,
    RowNode, RuleNode, ScenarioNode, StepNode, TagNode,
};
use crate::adapters::Strategy;
use serde_json::{json, Map, Value};

pub(crate) fn emit(document: &Document, uri: &str, strategy: Strategy) -> Value {
    let mut emitter = Emitter {
        strategy,
        next_id: 0,
    };
    emitter.document(document, uri)
}

struct Emitter {
    strategy: Strategy,
    next_id: usize,
}

impl Emitter {
    fn typed(&self) -> bool {
        self.strategy == Strategy::TypedAst
    }

    fn node(&self, node_type: &str, location: &Location) -> Map<String, Value> {
        let mut map = Map::new();
        if self.typed() {
            map.insert("type".into(), json!(node_type));
        }
        map.insert(
            "location".into(),
            json!({ "line": location.line, "column": location.column }),
        );
        map
    }

    fn with_id(&mut self, mut map: Map<String, Value>) -> Map<String, Value> {
        if !self.typed() {
            map.insert("id".into(), json!(self.next_id.to_string()));
            self.next_id += 1;
        }
        map
    }

    fn string(&self, map: &mut Map<String, Value>, key: &str, value: &str) {
        if value.is_empty() && self.strategy == Strategy::Protobuf {
            return;
        }
        map.insert(key.into(), json!(value));
    }

    /// Descriptions are left out by the typed family when there are none.
    fn description(&self, map: &mut Map<String, Value>, value: &str) {
        if value.is_empty() && self.typed() {
            return;
        }
        self.string(map, "description", value);
    }

    fn list(&self, map: &mut Map<String, Value>, key: &str, values: Vec<Value>) {
        if values.is_empty() && self.strategy == Strategy::Protobuf {
            return;
        }
        map.insert(key.into(), Value::Array(values));
    }

    fn header(&self, map: &mut Map<String, Value>, header: &Header) {
        self.string(map, "keyword", &header.keyword);
        self.string(map, "name", &header.name);
        self.description(map, &header.description);
    }

    /// Message families nest children inside a single-key wrapper.
    fn child(&self, key: &str, node: Map<String, Value>) -> Value {
        if self.typed() {
            return Value::Object(node);
        }
        let mut wrapper = Map::new();
        wrapper.insert(key.to_string(), Value::Object(node));
        Value::Object(wrapper)
    }

    fn document(&mut self, document: &Document, uri: &str) -> Value {
        let feature = document
            .feature
            .as_ref()
            .map(|feature| self.feature(feature));

        match self.strategy {
            Strategy::TypedAst => json!({
                "type": "GherkinDocument",
                "feature": feature,
                "comments": [],
            }),
            Strategy::JsonSchema | Strategy::Protobuf => {
                let mut body = Map::new();
                body.insert("uri".into(), json!(uri));
                if let Some(feature) = feature {
                    body.insert("feature".into(), feature);
                }
                self.list(&mut body, "comments", Vec::new());
                json!({ "gherkinDocument": body })
            }
        }
    }

    fn feature(&mut self, feature: &FeatureNode) -> Value {
        let tags = self.tags(&feature.tags);
        let children = self.children(&feature.children);
        let mut map = self.node("Feature", &feature.header.location);
        self.list(&mut map, "tags", tags);
        self.string(&mut map, "language", &feature.language);
        self.header(&mut map, &feature.header);
        self.list(&mut map, "children", children);
        Value::Object(map)
    }

    fn children(&mut self, children: &[ChildNode]) -> Vec<Value> {
        children
            .iter()
            .map(|child| match child {
                ChildNode::Background(background) => {
                    let node = self.background(background);
                    self.child("background", node)
                }
                ChildNode::Scenario(scenario) => {
                    let node = self.scenario(scenario);
                    self.child("scenario", node)
                }
                ChildNode::Rule(rule) => {
                    let node = self.rule(rule);
                    self.child("rule", node)
                }
            })
            .collect()
    }

    fn rule(&mut self, rule: &RuleNode) -> Map<String, Value> {
        let tags = self.tags(&rule.tags);
        let children = self.children(&rule.children);
        let mut map = self.node("Rule", &rule.header.location);
        self.list(&mut map, "tags", tags);
        self.header(&mut map, &rule.header);
        self.list(&mut map, "children", children);
        self.with_id(map)
    }

    fn background(&mut self, background: &BackgroundNode) -> Map<String, Value> {
        let steps = self.steps(&background.steps);
        let mut map = self.node("Background", &background.header.location);
        self.header(&mut map, &background.header);
        self.list(&mut map, "steps", steps);
        self.with_id(map)
    }

    fn scenario(&mut self, scenario: &ScenarioNode) -> Map<String, Value> {
        let tags = self.tags(&scenario.tags);
        let steps = self.steps(&scenario.steps);
        let examples: Vec<Value> = scenario
            .examples
            .iter()
            .map(|examples| Value::Object(self.examples(examples)))
            .collect();

        let node_type = if scenario.is_outline() {
            "ScenarioOutline"
        } else {
            "Scenario"
        };
        let mut map = self.node(node_type, &scenario.header.location);
        self.list(&mut map, "tags", tags);
        self.header(&mut map, &scenario.header);
        self.list(&mut map, "steps", steps);
        if !self.typed() || scenario.is_outline() {
            self.list(&mut map, "examples", examples);
        }
        self.with_id(map)
    }

    fn examples(&mut self, examples: &ExamplesNode) -> Map<String, Value> {
        let tags = self.tags(&examples.tags);
        let table_header = examples
            .table_header
            .as_ref()
            .map(|row| Value::Object(self.row(row)));
        let table_body: Vec<Value> = examples
            .table_body
            .iter()
            .map(|row| Value::Object(self.row(row)))
            .collect();

        let mut map = self.node("Examples", &examples.header.location);
        self.list(&mut map, "tags", tags);
        self.header(&mut map, &examples.header);
        if let Some(table_header) = table_header {
            map.insert("tableHeader".into(), table_header);
        }
        self.list(&mut map, "tableBody", table_body);
        self.with_id(map)
    }

    fn steps(&mut self, steps: &[StepNode]) -> Vec<Value> {
        steps
            .iter()
            .map(|step| Value::Object(self.step(step)))
            .collect()
    }

    fn step(&mut self, step: &StepNode) -> Map<String, Value> {
        let argument = step.argument.as_ref().map(|argument| self.argument(argument));
        let mut map = self.node("Step", &step.location);
        self.string(&mut map, "keyword", &step.keyword);
        self.string(&mut map, "text", &step.text);
        if let Some((key, argument)) = argument {
            map.insert(key.into(), argument);
        }
        self.with_id(map)
    }

    fn argument(&mut self, argument: &ArgumentNode) -> (&'static str, Value) {
        match argument {
            ArgumentNode::DataTable { location, rows } => {
                let rows: Vec<Value> = rows.iter().map(|row| Value::Object(self.row(row))).collect();
                let mut map = self.node("DataTable", location);
                self.list(&mut map, "rows", rows);
                let key = if self.typed() { "argument" } else { "dataTable" };
                (key, Value::Object(map))
            }
            ArgumentNode::DocString {
                location,
                delimiter,
                content_type,
                content,
            } => {
                let mut map = self.node("DocString", location);
                let type_key = match self.strategy {
                    Strategy::JsonSchema => "mediaType",
                    Strategy::Protobuf | Strategy::TypedAst => "contentType",
                };
                if let Some(content_type) = content_type {
                    map.insert(type_key.into(), json!(content_type));
                }
                self.string(&mut map, "content", content);
                if !self.typed() {
                    map.insert("delimiter".into(), json!(delimiter));
                }
                let key = if self.typed() { "argument" } else { "docString" };
                (key, Value::Object(map))
            }
        }
    }

    fn row(&mut self, row: &RowNode) -> Map<String, Value> {
        let cells: Vec<Value> = row
            .cells
            .iter()
            .map(|cell| {
                let location = Location {
                    line: row.location.line,
                    column: cell.column,
                };
                let mut map = self.node("TableCell", &location);
                // Empty cells keep their value in every family
                map.insert("value".into(), json!(cell.value));
                Value::Object(map)
            })
            .collect();
        let mut map = self.node("TableRow", &row.location);
        self.list(&mut map, "cells", cells);
        self.with_id(map)
    }

    fn tags(&mut self, tags: &[TagNode]) -> Vec<Value> {
        tags.iter()
            .map(|tag| {
                let mut map = self.node("Tag", &tag.location);
                map.insert("name".into(), json!(tag.name));
                Value::Object(self.with_id(map))
            })
            .collect()
    }
}
