//! Parser release matrix: every family models the same document the same way

use gherkin_tree::adapters::{self, Strategy};
use gherkin_tree::modeling::model_raw;
use gherkin_tree::{
    render, CanonicalRecord, ConfigurationError, GrammarParser, LineParser, ModelError, Modeler,
    Tree,
};
use rstest::rstest;
use serde_json::{json, Value};

const DOCUMENT: &str = "\
@f
Feature: f

  Background:
    Given a background step

  @s
  Scenario: s
    When a table
      | a | b |
      | 1 | 2 |

  Scenario Outline: o
    Then a doc string
      \"\"\" text
      contents
      \"\"\"

    Examples:
      | x |
      | 1 |";

fn modeler(version: u32) -> Modeler {
    Modeler::with_parser(LineParser::with_version(version).unwrap()).unwrap()
}

#[rstest(version => [3, 4, 5, 6, 11, 17, 18, 19, 20, 24, 27])]
fn test_every_release_models_the_same_tree(version: u32) {
    let (tree, file) = modeler(version)
        .parse_document(DOCUMENT, "f.feature")
        .unwrap();

    assert_eq!(render(&tree, file), DOCUMENT);
    assert_eq!(tree.test_count(file), 2);
}

#[rstest(version => [3, 5, 6, 12, 19, 20, 27])]
fn test_canonical_records_agree(version: u32) {
    let newest = modeler(27).normalize(DOCUMENT, "f.feature").unwrap();
    let record = modeler(version).normalize(DOCUMENT, "f.feature").unwrap();

    // Typed results carry no uri
    let strip_uri = |record: CanonicalRecord| {
        let mut value = record.into_value();
        value["uri"] = Value::Null;
        value
    };
    assert_eq!(strip_uri(record), strip_uri(newest));
}

#[rstest(version => [6, 12, 17])]
fn test_rule_tags_need_release_18(version: u32) {
    let error = modeler(version)
        .parse_document("Feature: f\n  @r\n  Rule: r", "f.feature")
        .unwrap_err();
    assert!(matches!(error, ModelError::Syntax(_)));

    let (tree, file) = modeler(version)
        .parse_document("Feature: f\n  Rule: r", "f.feature")
        .unwrap();
    let feature = tree.element(file).as_feature_file().unwrap().feature().unwrap();
    assert_eq!(tree.rules(feature).len(), 1);
}

#[test]
fn test_rule_tags_dropped_by_older_adapters() {
    let raw = LineParser::new()
        .parse("Feature: f\n  @r\n  Rule: r", "f.feature")
        .unwrap();
    // Newest output shape, read as an older message release would read it
    let raw = json!({ "gherkinDocument": {
        "uri": "f.feature",
        "feature": raw["gherkinDocument"]["feature"].clone(),
    }});

    let mut tree = Tree::new();
    let record = adapters::adapter_for(17).unwrap().normalize(&raw).unwrap();
    let file = tree.build(&record).unwrap();
    let feature = tree.element(file).as_feature_file().unwrap().feature().unwrap();
    assert!(tree.tags(tree.rules(feature)[0]).is_empty());

    let record = adapters::adapter_for(18).unwrap().normalize(&raw).unwrap();
    let file = tree.build(&record).unwrap();
    let feature = tree.element(file).as_feature_file().unwrap().feature().unwrap();
    assert_eq!(tree.tag_names(tree.tags(tree.rules(feature)[0])), vec!["@r"]);
}

#[rstest(version => [4, 15, 26])]
fn test_detection_picks_the_family(version: u32) {
    let raw = LineParser::with_version(version)
        .unwrap()
        .parse(DOCUMENT, "f.feature")
        .unwrap();
    let detected = adapters::detect(&raw).unwrap();
    assert_eq!(detected.strategy, adapters::adapter_for(version).unwrap().strategy);

    let mut tree = Tree::new();
    let file = model_raw(&mut tree, &raw).unwrap();
    assert_eq!(tree.test_count(file), 2);
}

#[test]
fn test_commented_protobuf_output_keeps_content_types() {
    let source = "Feature: f\n  Scenario: s\n    Given x\n      \"\"\" json\n      {}\n      \"\"\"";
    let mut raw = LineParser::with_version(19)
        .unwrap()
        .parse(source, "f.feature")
        .unwrap();
    raw["gherkinDocument"]["comments"] =
        json!([{ "location": { "line": 1, "column": 1 }, "text": "# c" }]);

    let detected = adapters::detect(&raw).unwrap();
    assert_eq!(detected.strategy, Strategy::Protobuf);
    assert_eq!(detected.version, 19);

    let mut tree = Tree::new();
    let file = model_raw(&mut tree, &raw).unwrap();
    assert!(render(&tree, file).contains("\"\"\" json\n      {}"));
}

#[test]
fn test_strategy_ranges() {
    assert_eq!(Strategy::JsonSchema.versions(), 20..=27);
    assert_eq!(Strategy::Protobuf.versions(), 6..=19);
    assert_eq!(Strategy::TypedAst.versions(), 3..=5);
    assert_eq!(adapters::adapters().len(), 25);
    assert!(matches!(
        LineParser::with_version(30),
        Err(ConfigurationError::UnsupportedVersion(30))
    ));
}

const UNKNOWN_KIND: &str = "
kind: feature_file
uri: weird.feature
feature:
  kind: feature
  keyword: Feature
  name: weird
  description: ''
  language: en
  tags: []
  children:
    - kind: scenario
      keyword: Scenario
      name: fine
      description: ''
      tags: []
      steps: []
    - kind: some_unknown_type
";

#[test]
fn test_unknown_kind_is_fatal() {
    let record: CanonicalRecord = serde_yaml::from_str(UNKNOWN_KIND).unwrap();
    let mut tree = Tree::new();

    let error = tree.build(&record).unwrap_err();

    assert!(matches!(error, ModelError::UnknownKind(ref kind) if kind == "some_unknown_type"));
    assert!(tree.is_empty());
}

#[test]
fn test_unknown_raw_node_is_fatal() {
    let raw = json!({ "gherkinDocument": {
        "uri": "f.feature",
        "comments": [],
        "feature": { "keyword": "Feature", "children": [{ "futureNode": {} }] }
    }});
    let mut tree = Tree::new();
    let error = model_raw(&mut tree, &raw).unwrap_err();
    assert_eq!(error.to_string(), "Unknown element kind 'futureNode'");
}

#[test]
fn test_unrecognized_shape() {
    let mut tree = Tree::new();
    let error = model_raw(&mut tree, &json!(["not", "a", "document"])).unwrap_err();
    assert!(matches!(
        error,
        ModelError::Configuration(ConfigurationError::UnrecognizedShape(_))
    ));
}
