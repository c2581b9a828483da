//! Round trip stability
//!
//! Rendering a tree, rebuilding it from the rendered text and rendering again
//! must give the same text, for every kind of element.

use gherkin_tree::tree::{DocString, Row, Step, Table};
use gherkin_tree::{render, ElementKind, Modeler, Tree};
use proptest::prelude::*;

const KITCHEN_SINK: &str = "\
# language: en
@feature @sink
Feature:   Kitchen sink
  Everything the format has to offer.
     Second line, indented.

  Background:   shared setup
    Given   a user
      \"\"\"
      Hello
        indented
      \"\"\"

  @first
  Scenario: plain
    * a star step
    And   a table
      |name|value|
      | a \\| b | long value |

  Scenario Outline: outlined <x>
    Given <x>

    @data
    Examples: set
      | x |
      | 1 |
    Examples:
      | x |

  Rule: grouped
    Rule description.

    Example: inside rule
      Then it passes
";

fn rebuild(kind: ElementKind, text: &str) -> String {
    let (tree, id) = Modeler::new()
        .parse_element(kind, text)
        .unwrap_or_else(|error| panic!("failed to rebuild {}: {}\n{}", kind, error, text));
    render(&tree, id)
}

#[test]
fn test_document_snapshot() {
    let (tree, file) = Modeler::new()
        .parse_document(KITCHEN_SINK, "sink.feature")
        .unwrap();

    insta::assert_snapshot!(render(&tree, file), @r###"
    @feature @sink
    Feature: Kitchen sink

    Everything the format has to offer.
       Second line, indented.

      Background: shared setup
        Given a user
          """
          Hello
            indented
          """

      @first
      Scenario: plain
        * a star step
        And a table
          | name   | value      |
          | a \| b | long value |

      Scenario Outline: outlined <x>
        Given <x>

        @data
        Examples: set
          | x |
          | 1 |

        Examples:
          | x |

      Rule: grouped

      Rule description.

        Example: inside rule
          Then it passes
    "###);
}

#[test]
fn test_document_is_stable() {
    let modeler = Modeler::new();
    let (tree, file) = modeler.parse_document(KITCHEN_SINK, "sink.feature").unwrap();
    let first = render(&tree, file);

    let (tree, file) = modeler.parse_document(&first, "sink.feature").unwrap();
    assert_eq!(render(&tree, file), first);
}

#[test]
fn test_same_text_models_same_content() {
    let modeler = Modeler::new();
    let mut tree = Tree::new();
    let first = modeler
        .model_document(&mut tree, KITCHEN_SINK, "sink.feature")
        .unwrap();
    let second = modeler
        .model_document(&mut tree, KITCHEN_SINK, "sink.feature")
        .unwrap();

    assert_ne!(tree.element(first), tree.element(second));
    assert!(tree.same_content(first, &tree, second));

    let step = tree
        .descendants(second)
        .into_iter()
        .find(|id| tree.kind(*id) == ElementKind::Step)
        .unwrap();
    tree.element_mut(step).as_step_mut().unwrap().text.push('!');
    assert!(!tree.same_content(first, &tree, second));
}

#[test]
fn test_every_kind_is_stable() {
    let modeler = Modeler::new();
    let (tree, file) = modeler.parse_document(KITCHEN_SINK, "sink.feature").unwrap();

    for id in std::iter::once(file).chain(tree.descendants(file)) {
        let kind = tree.kind(id);
        let first = render(&tree, id);
        assert_eq!(rebuild(kind, &first), first, "{} did not survive", kind);
    }
}

fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9]{1,8}",
        "[a-z]{1,4}[|\\\\][a-z]{1,4}",
        "[a-z]{1,3}\n[a-z]{1,3}",
        "[äöüß名前]{1,3}",
        Just(String::new()),
    ]
}

fn table_rows() -> impl Strategy<Value = Vec<Vec<String>>> {
    (1usize..4).prop_flat_map(|width| {
        prop::collection::vec(prop::collection::vec(cell(), width), 1..5)
    })
}

fn doc_string_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ]{0,12}[a-zA-Z]",
        " {1,4}[a-z]{1,6}",
        Just("\"\"\"".to_string()),
        Just(String::new()),
    ]
}

proptest! {
    #[test]
    fn test_tables_survive(rows in table_rows()) {
        let mut tree = Tree::new();
        let table = tree.add(Table::default());
        let ids = rows.iter().map(|cells| tree.add(Row::new(cells.clone()))).collect();
        tree.set_rows(table, ids).unwrap();

        let first = render(&tree, table);
        let (rebuilt, id) = Modeler::new().parse_element(ElementKind::Table, &first).unwrap();
        let values: Vec<Vec<String>> = rebuilt
            .rows(id)
            .iter()
            .map(|row| rebuilt.row_values(*row).to_vec())
            .collect();

        prop_assert_eq!(&values, &rows);
        prop_assert_eq!(render(&rebuilt, id), first);
    }

    #[test]
    fn test_doc_strings_survive(
        lines in prop::collection::vec(doc_string_line(), 1..6),
        content_type in prop::option::of("[a-z]{1,6}"),
    ) {
        let contents = lines.join("\n");
        let mut tree = Tree::new();
        let step = tree.add(Step::new("Given", "a doc string"));
        let doc_string = tree.add(DocString::new(content_type.as_deref(), contents.clone()));
        tree.set_block(step, Some(doc_string)).unwrap();

        let first = render(&tree, step);
        let (rebuilt, id) = Modeler::new().parse_element(ElementKind::Step, &first).unwrap();
        let block = rebuilt.element(id).as_step().unwrap().block().unwrap();
        let parsed = rebuilt.element(block).as_doc_string().unwrap();

        prop_assert_eq!(&parsed.contents, &contents);
        prop_assert_eq!(&parsed.content_type, &content_type);
        prop_assert_eq!(render(&rebuilt, id), first);
    }
}
