//! The element tree
//!
//! All nodes of a modeled document live in one [`Tree`] arena and refer to one
//! another through [`NodeId`]s. Ownership is strictly downward: a node belongs
//! to the collection of its parent, and the `parent` link is a plain id that
//! never keeps anything alive. Nodes are never freed individually; whatever is
//! no longer reachable from a root is simply ignored.
//!
//! Child collections can only be rewritten through the `set_*` methods, which
//! keep both directions of every link in agreement:
//!
//! - a newly attached child is detached from its previous owner,
//! - children dropped from a collection become parentless,
//! - an element cannot be attached beneath itself.

mod ancestry;
mod elements;
mod rows;
mod taggable;

pub use ancestry::{AncestorKind, Ancestors};
pub use elements::{
    Background, Directory, DocString, Element, ElementKind, Example, Feature, FeatureFile,
    NodeId, Outline, Row, Rule, Scenario, Step, Table, Tag,
};
pub(crate) use elements::{Slot, SlotMut};
pub use rows::RowValues;
pub use taggable::Taggable;

use crate::error::{ModelError, ModelResult};
use crate::record::CanonicalRecord;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) element: Element,
    pub(crate) parent: Option<NodeId>,
    pub(crate) source_line: Option<usize>,
}

impl Node {
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Line the element started on, when it was built from parsed source.
    pub fn source_line(&self) -> Option<usize> {
        self.source_line
    }
}

/// Arena holding every node of one or more modeled documents.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    parsing_data: HashMap<NodeId, CanonicalRecord>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a detached element and returns its id.
    pub fn add(&mut self, element: impl Into<Element>) -> NodeId {
        self.insert(element.into(), None)
    }

    pub(crate) fn insert(&mut self, element: Element, source_line: Option<usize>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            element,
            parent: None,
            source_line,
        });
        id
    }

    /// Drops every node added after `len`; used to undo a failed build.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
        self.parsing_data.retain(|id, _| id.0 < len);
    }

    /// # Panics
    ///
    /// Panics if `id` was issued by another tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn element(&self, id: NodeId) -> &Element {
        &self.nodes[id.0].element
    }

    /// Mutable access to an element's scalar fields.
    pub fn element_mut(&mut self, id: NodeId) -> &mut Element {
        &mut self.nodes[id.0].element
    }

    pub fn kind(&self, id: NodeId) -> ElementKind {
        self.element(id).kind()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn source_line(&self, id: NodeId) -> Option<usize> {
        self.nodes[id.0].source_line
    }

    /// The canonical record a build root was created from.
    pub fn parsing_data(&self, id: NodeId) -> Option<&CanonicalRecord> {
        self.parsing_data.get(&id)
    }

    pub fn set_parsing_data(&mut self, id: NodeId, record: CanonicalRecord) {
        self.parsing_data.insert(id, record);
    }

    /// Nodes that have no parent.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(index, _)| NodeId(index))
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.element(id).children()
    }

    /// Every node below `id`, depth first in rendering order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut pending: Vec<NodeId> = self.children(id).into_iter().rev().collect();
        while let Some(next) = pending.pop() {
            found.push(next);
            pending.extend(self.children(next).into_iter().rev());
        }
        found
    }

    /// Whether the subtree at `id` and the one at `other_id` in `other` read
    /// the same, field for field and child for child. Parents, source lines
    /// and parsing data are not compared.
    pub fn same_content(&self, id: NodeId, other: &Tree, other_id: NodeId) -> bool {
        if !self.element(id).same_fields(other.element(other_id)) {
            return false;
        }
        let children = self.children(id);
        let other_children = other.children(other_id);
        children.len() == other_children.len()
            && children
                .into_iter()
                .zip(other_children)
                .all(|(child, other_child)| self.same_content(child, other, other_child))
    }

    // =====================
    // Structural views
    // =====================

    pub fn background(&self, id: NodeId) -> Option<NodeId> {
        match self.element(id) {
            Element::Feature(f) => f.background,
            Element::Rule(r) => r.background,
            _ => None,
        }
    }

    /// Scenarios and outlines of a feature or rule, in source order.
    pub fn tests(&self, id: NodeId) -> &[NodeId] {
        match self.element(id) {
            Element::Feature(f) => &f.tests,
            Element::Rule(r) => &r.tests,
            _ => &[],
        }
    }

    pub fn scenarios(&self, id: NodeId) -> Vec<NodeId> {
        self.tests_of_kind(id, ElementKind::Scenario)
    }

    pub fn outlines(&self, id: NodeId) -> Vec<NodeId> {
        self.tests_of_kind(id, ElementKind::Outline)
    }

    fn tests_of_kind(&self, id: NodeId, kind: ElementKind) -> Vec<NodeId> {
        self.tests(id)
            .iter()
            .copied()
            .filter(|test| self.kind(*test) == kind)
            .collect()
    }

    pub fn rules(&self, id: NodeId) -> &[NodeId] {
        match self.element(id) {
            Element::Feature(f) => &f.rules,
            _ => &[],
        }
    }

    pub fn steps(&self, id: NodeId) -> &[NodeId] {
        match self.element(id) {
            Element::Background(b) => &b.steps,
            Element::Scenario(s) => &s.steps,
            Element::Outline(o) => &o.steps,
            _ => &[],
        }
    }

    pub fn examples(&self, id: NodeId) -> &[NodeId] {
        match self.element(id) {
            Element::Outline(o) => &o.examples,
            _ => &[],
        }
    }

    /// Rows of a table or examples block.
    pub fn rows(&self, id: NodeId) -> &[NodeId] {
        match self.element(id) {
            Element::Table(t) => &t.rows,
            Element::Example(e) => &e.rows,
            _ => &[],
        }
    }

    pub fn parameter_row(&self, example: NodeId) -> Option<NodeId> {
        self.element(example)
            .as_example()
            .and_then(Example::parameter_row)
    }

    pub fn argument_rows(&self, example: NodeId) -> &[NodeId] {
        self.element(example)
            .as_example()
            .map(Example::argument_rows)
            .unwrap_or(&[])
    }

    pub fn row_values(&self, row: NodeId) -> &[String] {
        self.element(row)
            .as_row()
            .map(|row| row.cells.as_slice())
            .unwrap_or(&[])
    }

    /// Number of test cases an element expands to: one per scenario and one
    /// per outline argument row.
    pub fn test_count(&self, id: NodeId) -> usize {
        match self.element(id) {
            Element::Scenario(_) => 1,
            Element::Outline(o) => o
                .examples
                .iter()
                .map(|example| self.argument_rows(*example).len())
                .sum(),
            Element::Rule(_) | Element::Feature(_) => self
                .tests(id)
                .iter()
                .chain(self.rules(id))
                .map(|child| self.test_count(*child))
                .sum(),
            Element::FeatureFile(f) => f.feature.map_or(0, |feature| self.test_count(feature)),
            Element::Directory(d) => d
                .feature_files
                .iter()
                .chain(&d.directories)
                .map(|child| self.test_count(*child))
                .sum(),
            _ => 0,
        }
    }

    // =====================
    // Mutation
    // =====================

    pub fn set_tags(&mut self, id: NodeId, tags: Vec<NodeId>) -> ModelResult<()> {
        self.assign(id, Slot::Tags, tags)
    }

    pub fn set_background(&mut self, id: NodeId, background: Option<NodeId>) -> ModelResult<()> {
        self.assign(id, Slot::Background, background.into_iter().collect())
    }

    pub fn set_tests(&mut self, id: NodeId, tests: Vec<NodeId>) -> ModelResult<()> {
        self.assign(id, Slot::Tests, tests)
    }

    pub fn set_rules(&mut self, id: NodeId, rules: Vec<NodeId>) -> ModelResult<()> {
        self.assign(id, Slot::Rules, rules)
    }

    pub fn set_steps(&mut self, id: NodeId, steps: Vec<NodeId>) -> ModelResult<()> {
        self.assign(id, Slot::Steps, steps)
    }

    pub fn set_examples(&mut self, id: NodeId, examples: Vec<NodeId>) -> ModelResult<()> {
        self.assign(id, Slot::Examples, examples)
    }

    pub fn set_rows(&mut self, id: NodeId, rows: Vec<NodeId>) -> ModelResult<()> {
        self.assign(id, Slot::Rows, rows)
    }

    /// Sets the table or doc string of a step.
    pub fn set_block(&mut self, step: NodeId, block: Option<NodeId>) -> ModelResult<()> {
        self.assign(step, Slot::Block, block.into_iter().collect())
    }

    pub fn set_feature(&mut self, file: NodeId, feature: Option<NodeId>) -> ModelResult<()> {
        self.assign(file, Slot::Feature, feature.into_iter().collect())
    }

    pub fn set_feature_files(&mut self, directory: NodeId, files: Vec<NodeId>) -> ModelResult<()> {
        self.assign(directory, Slot::FeatureFiles, files)
    }

    pub fn set_directories(&mut self, directory: NodeId, children: Vec<NodeId>) -> ModelResult<()> {
        self.assign(directory, Slot::Directories, children)
    }

    /// Removes `id` from its parent's collection and clears its parent link.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].element.forget_child(id);
        }
    }

    pub(crate) fn expect_kind(&self, id: NodeId, kind: ElementKind) -> ModelResult<()> {
        let actual = self.kind(id);
        if actual != kind {
            return Err(ModelError::argument(format!(
                "Expected a {} but received a {}",
                kind, actual
            )));
        }
        Ok(())
    }

    /// Replaces one child collection wholesale.
    fn assign(&mut self, parent: NodeId, slot: Slot, children: Vec<NodeId>) -> ModelResult<()> {
        let parent_kind = self.kind(parent);
        let single = match self.nodes[parent.0].element.slot_mut(slot) {
            Some(SlotMut::Many(_)) => false,
            Some(SlotMut::One(_)) => true,
            None => {
                return Err(ModelError::argument(format!(
                    "A {} has no {}",
                    parent_kind,
                    slot.name()
                )))
            }
        };
        if single && children.len() > 1 {
            return Err(ModelError::argument(format!(
                "A {} holds at most one {}",
                parent_kind,
                slot.name()
            )));
        }

        for (index, child) in children.iter().enumerate() {
            self.check_attachable(parent, slot, *child)?;
            if children[..index].contains(child) {
                return Err(ModelError::argument(format!(
                    "The same {} was given twice",
                    self.kind(*child)
                )));
            }
        }

        let previous = match self.nodes[parent.0].element.slot_mut(slot) {
            Some(SlotMut::Many(ids)) => std::mem::take(ids),
            Some(SlotMut::One(id)) => id.take().into_iter().collect(),
            None => Vec::new(),
        };
        for dropped in previous.into_iter().filter(|old| !children.contains(old)) {
            self.nodes[dropped.0].parent = None;
        }
        for child in &children {
            self.adopt(parent, *child);
        }

        match self.nodes[parent.0].element.slot_mut(slot) {
            Some(SlotMut::Many(ids)) => *ids = children,
            Some(SlotMut::One(id)) => *id = children.first().copied(),
            None => {}
        }
        Ok(())
    }

    /// Appends one child to a collection (or fills a single slot).
    pub(crate) fn push_child(&mut self, parent: NodeId, slot: Slot, child: NodeId) -> ModelResult<()> {
        self.check_attachable(parent, slot, child)?;
        let parent_kind = self.kind(parent);
        let child_kind = self.kind(child);
        let occupied = match self.nodes[parent.0].element.slot_mut(slot) {
            Some(SlotMut::Many(_)) => false,
            Some(SlotMut::One(id)) => id.is_some(),
            None => {
                return Err(ModelError::Misplaced {
                    parent: parent_kind,
                    child: child_kind,
                })
            }
        };
        if occupied {
            return Err(ModelError::malformed(format!(
                "a {} holds at most one {}",
                parent_kind,
                slot.name()
            )));
        }

        self.adopt(parent, child);
        match self.nodes[parent.0].element.slot_mut(slot) {
            Some(SlotMut::Many(ids)) => ids.push(child),
            Some(SlotMut::One(id)) => *id = Some(child),
            None => {}
        }
        Ok(())
    }

    fn check_attachable(&self, parent: NodeId, slot: Slot, child: NodeId) -> ModelResult<()> {
        let child_kind = self.kind(child);
        if !slot.accepts(child_kind) {
            return Err(ModelError::Misplaced {
                parent: self.kind(parent),
                child: child_kind,
            });
        }
        if child == parent || self.is_ancestor_of(child, parent) {
            return Err(ModelError::argument(format!(
                "A {} cannot be attached beneath itself",
                child_kind
            )));
        }
        Ok(())
    }

    /// Points `child` at `parent`, detaching it from any other owner first.
    fn adopt(&mut self, parent: NodeId, child: NodeId) {
        if let Some(previous) = self.nodes[child.0].parent {
            if previous != parent {
                self.nodes[previous.0].element.forget_child(child);
            }
        }
        self.nodes[child.0].parent = Some(parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Tree>();
    }

    fn scenario_with_step(tree: &mut Tree, text: &str) -> NodeId {
        let scenario = tree.add(Scenario::new("Scenario", "s"));
        let tag = tree.add(Tag::new("@t"));
        let step = tree.add(Step::new("Given ", text));
        tree.set_tags(scenario, vec![tag]).unwrap();
        tree.set_steps(scenario, vec![step]).unwrap();
        scenario
    }

    #[test]
    fn test_same_content_compares_fields_not_handles() {
        let mut tree = Tree::new();
        tree.add(Tag::new("@offset"));
        let first = scenario_with_step(&mut tree, "a step");
        let mut other = Tree::new();
        let second = scenario_with_step(&mut other, "a step");

        assert_ne!(tree.element(first), other.element(second));
        assert!(tree.same_content(first, &other, second));
        assert!(other.same_content(second, &tree, first));

        let changed = scenario_with_step(&mut other, "another step");
        assert!(!tree.same_content(first, &other, changed));

        let untagged = other.add(Scenario::new("Scenario", "s"));
        assert!(!tree.same_content(first, &other, untagged));
        let renamed = other.add(Outline::new("Scenario", "s"));
        assert!(!other.same_content(untagged, &other, renamed));
    }

    #[test]
    fn test_set_children_links_parents() {
        let mut tree = Tree::new();
        let rule = tree.add(Rule::new("Rule", "r"));
        let background = tree.add(Background::new("Background", ""));
        let scenario = tree.add(Scenario::new("Scenario", "s"));
        let outline = tree.add(Outline::new("Scenario Outline", "o"));

        tree.set_background(rule, Some(background)).unwrap();
        tree.set_tests(rule, vec![scenario, outline]).unwrap();

        assert_eq!(tree.parent(background), Some(rule));
        assert_eq!(tree.parent(scenario), Some(rule));
        assert_eq!(tree.parent(outline), Some(rule));
        assert_eq!(tree.scenarios(rule), vec![scenario]);
        assert_eq!(tree.outlines(rule), vec![outline]);
        assert_eq!(tree.children(rule), vec![background, scenario, outline]);
    }

    #[test]
    fn test_replacing_children_orphans_old_ones() {
        let mut tree = Tree::new();
        let scenario = tree.add(Scenario::new("Scenario", "s"));
        let first = tree.add(Step::new("Given", "one"));
        let second = tree.add(Step::new("Given", "two"));

        tree.set_steps(scenario, vec![first]).unwrap();
        tree.set_steps(scenario, vec![second]).unwrap();

        assert_eq!(tree.parent(first), None);
        assert_eq!(tree.parent(second), Some(scenario));
        assert_eq!(tree.steps(scenario), &[second]);
    }

    #[test]
    fn test_reattaching_moves_child() {
        let mut tree = Tree::new();
        let old = tree.add(Scenario::new("Scenario", "old"));
        let new = tree.add(Scenario::new("Scenario", "new"));
        let step = tree.add(Step::new("Given", "x"));

        tree.set_steps(old, vec![step]).unwrap();
        tree.set_steps(new, vec![step]).unwrap();

        assert!(tree.steps(old).is_empty());
        assert_eq!(tree.parent(step), Some(new));
    }

    #[test]
    fn test_rejects_wrong_kinds() {
        let mut tree = Tree::new();
        let feature = tree.add(Feature::new("Feature", "f"));
        let step = tree.add(Step::new("Given", "x"));

        let error = tree.set_tests(feature, vec![step]).unwrap_err();
        assert!(matches!(
            error,
            ModelError::Misplaced {
                parent: ElementKind::Feature,
                child: ElementKind::Step
            }
        ));

        let error = tree.set_steps(feature, vec![step]).unwrap_err();
        assert_eq!(error.to_string(), "A feature has no steps");
        assert_eq!(tree.parent(step), None);
    }

    #[test]
    fn test_rejects_cycles() {
        let mut tree = Tree::new();
        let outer = tree.add(Directory::new("features"));
        let inner = tree.add(Directory::new("features/nested"));
        tree.set_directories(outer, vec![inner]).unwrap();

        let error = tree.set_directories(inner, vec![outer]).unwrap_err();
        assert_eq!(error.to_string(), "A directory cannot be attached beneath itself");
        assert_eq!(tree.parent(outer), None);
    }

    #[test]
    fn test_rejects_duplicates() {
        let mut tree = Tree::new();
        let scenario = tree.add(Scenario::new("Scenario", "s"));
        let step = tree.add(Step::new("Given", "x"));
        assert!(tree.set_steps(scenario, vec![step, step]).is_err());
        assert_eq!(tree.parent(step), None);
    }

    #[test]
    fn test_descendants_are_depth_first() {
        let mut tree = Tree::new();
        let scenario = tree.add(Scenario::new("Scenario", "s"));
        let first = tree.add(Step::new("Given", "one"));
        let table = tree.add(Table::default());
        let row = tree.add(Row::new(["a"]));
        let second = tree.add(Step::new("Then", "two"));

        tree.set_rows(table, vec![row]).unwrap();
        tree.set_block(first, Some(table)).unwrap();
        tree.set_steps(scenario, vec![first, second]).unwrap();

        assert_eq!(tree.descendants(scenario), vec![first, table, row, second]);
    }

    #[test]
    fn test_detach() {
        let mut tree = Tree::new();
        let feature = tree.add(Feature::new("Feature", "f"));
        let scenario = tree.add(Scenario::new("Scenario", "s"));
        tree.set_tests(feature, vec![scenario]).unwrap();

        tree.detach(scenario);

        assert!(tree.tests(feature).is_empty());
        assert_eq!(tree.parent(scenario), None);
        assert_eq!(tree.roots().count(), 2);
    }

    #[test]
    fn test_test_count() {
        let mut tree = Tree::new();
        let feature = tree.add(Feature::new("Feature", "f"));
        let scenario = tree.add(Scenario::new("Scenario", "s"));
        let outline = tree.add(Outline::new("Scenario Outline", "o"));
        let example = tree.add(Example::new("Examples", ""));
        let rows = vec![
            tree.add(Row::new(["p"])),
            tree.add(Row::new(["1"])),
            tree.add(Row::new(["2"])),
        ];
        tree.set_rows(example, rows).unwrap();
        tree.set_examples(outline, vec![example]).unwrap();
        tree.set_tests(feature, vec![scenario, outline]).unwrap();

        assert_eq!(tree.test_count(feature), 3);
    }
}
