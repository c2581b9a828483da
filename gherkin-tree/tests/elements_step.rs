//! Steps and their blocks: tables and doc strings

use gherkin_tree::tree::{DocString, Row, Step, Table};
use gherkin_tree::{render, ElementKind, ModelError, Modeler, NodeId, Tree};
use rstest::rstest;

fn element(kind: ElementKind, source: &str) -> (Tree, NodeId) {
    Modeler::new()
        .parse_element(kind, source)
        .expect("fragment should model")
}

#[test]
fn test_step_with_table() {
    let (tree, step) = element(ElementKind::Step, "Given a table\n  | a | b |\n  | 1 | 2 |");
    let element = tree.element(step).as_step().unwrap();
    assert_eq!(element.keyword, "Given");
    assert_eq!(element.text, "a table");

    let table = element.block().unwrap();
    assert_eq!(tree.kind(table), ElementKind::Table);
    assert_eq!(tree.parent(table), Some(step));
    let rows: Vec<&[String]> = tree.rows(table).iter().map(|row| tree.row_values(*row)).collect();
    assert_eq!(rows, vec![&["a", "b"][..], &["1", "2"][..]]);
}

#[test]
fn test_step_with_doc_string() {
    let source = "* a doc string\n  \"\"\" json\n  {\n    \"key\": \"value\"\n  }\n  \"\"\"";
    let (tree, step) = element(ElementKind::Step, source);
    let block = tree.element(step).as_step().unwrap().block().unwrap();
    let doc_string = tree.element(block).as_doc_string().unwrap();

    assert_eq!(doc_string.content_type.as_deref(), Some("json"));
    assert_eq!(doc_string.contents, "{\n  \"key\": \"value\"\n}");
    assert_eq!(render(&tree, step), source);
}

#[test]
fn test_doc_string_with_backticks() {
    let (tree, doc_string) = element(ElementKind::DocString, "```\nsome text\n```");
    assert_eq!(
        tree.element(doc_string).as_doc_string().unwrap().contents,
        "some text"
    );
    // Rendering settles on the quote delimiter
    assert_eq!(render(&tree, doc_string), "\"\"\"\nsome text\n\"\"\"");
}

#[test]
fn test_escaped_doc_string_delimiter() {
    let (tree, doc_string) = element(ElementKind::DocString, "\"\"\"\na\n\\\"\\\"\\\"\nb\n\"\"\"");
    let contents = &tree.element(doc_string).as_doc_string().unwrap().contents;
    assert_eq!(contents, "a\n\"\"\"\nb");
    assert_eq!(render(&tree, doc_string), "\"\"\"\na\n\\\"\\\"\\\"\nb\n\"\"\"");
}

#[test]
fn test_escaped_cells() {
    let (tree, row) = element(ElementKind::Row, "| a \\| b | c \\\\ d | e \\n f |");
    assert_eq!(tree.row_values(row), &["a | b", "c \\ d", "e \n f"]);
    assert_eq!(render(&tree, row), "| a \\| b | c \\\\ d | e \\n f |");
}

#[rstest(
    kind,
    source,
    case(ElementKind::Step, "Then it works"),
    case(ElementKind::Table, "| a |\n| b |"),
    case(ElementKind::Row, "| a | b |"),
    case(ElementKind::DocString, "\"\"\" text\n  indented\n\n\"\"\""),
    case(ElementKind::Tag, "@smoke"),
    case(ElementKind::Background, "Background: b\n  Given x"),
    case(ElementKind::Scenario, "@t\nScenario: s\n\ndescribed\n\n  When y")
)]
fn test_fragments_round_trip(kind: ElementKind, source: &str) {
    let (tree, id) = element(kind, source);
    assert_eq!(tree.kind(id), kind);
    assert_eq!(tree.parent(id), None);
    assert_eq!(render(&tree, id), source);
}

#[test]
fn test_bad_table_names_synthetic_file() {
    let error = Modeler::new()
        .parse_element(ElementKind::Table, "bad table text")
        .unwrap_err();
    assert!(matches!(error, ModelError::Syntax(_)));
    assert!(error
        .to_string()
        .starts_with("Error encountered while parsing 'gherkin_tree_stand_alone_table.feature'"));
}

#[test]
fn test_cells_and_directories_are_not_fragments() {
    let modeler = Modeler::new();
    assert!(matches!(
        modeler.parse_element(ElementKind::Cell, "x"),
        Err(ModelError::Argument(_))
    ));
    assert!(matches!(
        modeler.parse_element(ElementKind::Directory, "features"),
        Err(ModelError::Argument(_))
    ));
}

#[test]
fn test_built_programmatically() {
    let mut tree = Tree::new();
    let step = tree.add(Step::new("When", "the table is edited"));
    let table = tree.add(Table::default());
    let rows = vec![tree.add(Row::new(["name", "age"])), tree.add(Row::new(["Ada", "36"]))];
    tree.set_rows(table, rows).unwrap();
    tree.set_block(step, Some(table)).unwrap();

    assert_eq!(
        render(&tree, step),
        "When the table is edited\n  | name | age |\n  | Ada  | 36  |"
    );

    let doc_string = tree.add(DocString::new(None, "swapped in"));
    tree.set_block(step, Some(doc_string)).unwrap();
    assert_eq!(tree.parent(table), None);
    assert_eq!(
        render(&tree, step),
        "When the table is edited\n  \"\"\"\n  swapped in\n  \"\"\""
    );
}
