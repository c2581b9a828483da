//! Ancestor queries
//!
//! Lookups walk parent links upward and match purely by kind. `Test` is the one
//! abstract kind: it stands for either a Scenario or an Outline.

use super::{ElementKind, NodeId, Tree};
use crate::error::ModelError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AncestorKind {
    Directory,
    FeatureFile,
    Feature,
    Rule,
    Background,
    Scenario,
    Outline,
    /// Either a Scenario or an Outline.
    Test,
    Example,
    Step,
    Table,
    Row,
    DocString,
    Tag,
}

impl AncestorKind {
    pub fn matches(self, kind: ElementKind) -> bool {
        match self {
            AncestorKind::Test => kind.is_test(),
            AncestorKind::Directory => kind == ElementKind::Directory,
            AncestorKind::FeatureFile => kind == ElementKind::FeatureFile,
            AncestorKind::Feature => kind == ElementKind::Feature,
            AncestorKind::Rule => kind == ElementKind::Rule,
            AncestorKind::Background => kind == ElementKind::Background,
            AncestorKind::Scenario => kind == ElementKind::Scenario,
            AncestorKind::Outline => kind == ElementKind::Outline,
            AncestorKind::Example => kind == ElementKind::Example,
            AncestorKind::Step => kind == ElementKind::Step,
            AncestorKind::Table => kind == ElementKind::Table,
            AncestorKind::Row => kind == ElementKind::Row,
            AncestorKind::DocString => kind == ElementKind::DocString,
            AncestorKind::Tag => kind == ElementKind::Tag,
        }
    }
}

impl FromStr for AncestorKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "directory" => AncestorKind::Directory,
            "feature_file" => AncestorKind::FeatureFile,
            "feature" => AncestorKind::Feature,
            "rule" => AncestorKind::Rule,
            "background" => AncestorKind::Background,
            "scenario" => AncestorKind::Scenario,
            "outline" => AncestorKind::Outline,
            "test" => AncestorKind::Test,
            "example" => AncestorKind::Example,
            "step" => AncestorKind::Step,
            "table" => AncestorKind::Table,
            "row" => AncestorKind::Row,
            "doc_string" => AncestorKind::DocString,
            "tag" => AncestorKind::Tag,
            other => return Err(ModelError::UnknownKind(other.to_string())),
        };
        Ok(kind)
    }
}

impl From<ElementKind> for AncestorKind {
    /// Cells have no node of their own, so they map onto their row.
    fn from(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Directory => AncestorKind::Directory,
            ElementKind::FeatureFile => AncestorKind::FeatureFile,
            ElementKind::Feature => AncestorKind::Feature,
            ElementKind::Rule => AncestorKind::Rule,
            ElementKind::Background => AncestorKind::Background,
            ElementKind::Scenario => AncestorKind::Scenario,
            ElementKind::Outline => AncestorKind::Outline,
            ElementKind::Example => AncestorKind::Example,
            ElementKind::Step => AncestorKind::Step,
            ElementKind::Table => AncestorKind::Table,
            ElementKind::Row | ElementKind::Cell => AncestorKind::Row,
            ElementKind::DocString => AncestorKind::DocString,
            ElementKind::Tag => AncestorKind::Tag,
        }
    }
}

/// Iterator over the strict ancestors of a node, nearest first.
pub struct Ancestors<'t> {
    tree: &'t Tree,
    next: Option<NodeId>,
}

impl<'t> Ancestors<'t> {
    pub(crate) fn new(tree: &'t Tree, id: NodeId) -> Self {
        Self {
            tree,
            next: tree.parent(id),
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

impl Tree {
    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors::new(self, id)
    }

    /// The nearest strict ancestor of `id` whose kind matches `kind`.
    pub fn get_ancestor(&self, id: NodeId, kind: impl Into<AncestorKind>) -> Option<NodeId> {
        let kind = kind.into();
        self.ancestors(id)
            .find(|ancestor| kind.matches(self.kind(*ancestor)))
    }

    pub(crate) fn is_ancestor_of(&self, candidate: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|ancestor| ancestor == candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Background, Feature, FeatureFile, Scenario, Step};

    #[test]
    fn test_test_matches_scenarios_and_outlines() {
        assert!(AncestorKind::Test.matches(ElementKind::Scenario));
        assert!(AncestorKind::Test.matches(ElementKind::Outline));
        assert!(!AncestorKind::Test.matches(ElementKind::Background));
    }

    #[test]
    fn test_parse_symbols() {
        assert_eq!("feature_file".parse::<AncestorKind>().unwrap(), AncestorKind::FeatureFile);
        assert_eq!("test".parse::<AncestorKind>().unwrap(), AncestorKind::Test);
        assert!("bogus".parse::<AncestorKind>().is_err());
    }

    #[test]
    fn test_get_ancestor_walks_up() {
        let mut tree = Tree::new();
        let file = tree.add(FeatureFile::new("a.feature"));
        let feature = tree.add(Feature::new("Feature", "f"));
        let background = tree.add(Background::new("Background", ""));
        let step = tree.add(Step::new("*", "a step"));

        tree.set_feature(file, Some(feature)).unwrap();
        tree.set_background(feature, Some(background)).unwrap();
        tree.set_steps(background, vec![step]).unwrap();

        assert_eq!(tree.get_ancestor(step, AncestorKind::FeatureFile), Some(file));
        assert_eq!(tree.get_ancestor(step, ElementKind::Feature), Some(feature));
        assert_eq!(tree.get_ancestor(step, AncestorKind::Example), None);
        assert_eq!(tree.get_ancestor(step, AncestorKind::Test), None);
        assert_eq!(tree.get_ancestor(file, AncestorKind::FeatureFile), None);
        assert_eq!(tree.ancestors(step).collect::<Vec<_>>(), vec![background, feature, file]);
    }

    #[test]
    fn test_get_ancestor_test_equivalence() {
        let mut tree = Tree::new();
        let scenario = tree.add(Scenario::new("Scenario", "s"));
        let step = tree.add(Step::new("Given", "x"));
        tree.set_steps(scenario, vec![step]).unwrap();

        assert_eq!(tree.get_ancestor(step, AncestorKind::Test), Some(scenario));
        assert_eq!(tree.get_ancestor(step, AncestorKind::Outline), None);
    }
}
