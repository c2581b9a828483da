//! Element types
//!
//! Every node of a [`Tree`](super::Tree) holds one [`Element`]. Child
//! collections store [`NodeId`]s into the owning arena and are only writable
//! through the tree, which keeps the parent links consistent. Scalar fields
//! (keywords, names, descriptions, cell values) are public and can be edited in
//! place.

use crate::error::ModelError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Stable handle of a node inside one [`Tree`](super::Tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The closed set of kinds a canonical record may declare.
///
/// `Cell` only exists at the record level: cells are folded into their
/// [`Row`] as plain strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Directory,
    FeatureFile,
    Feature,
    Rule,
    Background,
    Scenario,
    Outline,
    Example,
    Step,
    Table,
    Row,
    Cell,
    DocString,
    Tag,
}

impl ElementKind {
    pub const ALL: [ElementKind; 14] = [
        ElementKind::Directory,
        ElementKind::FeatureFile,
        ElementKind::Feature,
        ElementKind::Rule,
        ElementKind::Background,
        ElementKind::Scenario,
        ElementKind::Outline,
        ElementKind::Example,
        ElementKind::Step,
        ElementKind::Table,
        ElementKind::Row,
        ElementKind::Cell,
        ElementKind::DocString,
        ElementKind::Tag,
    ];

    /// The symbol used for this kind in canonical records.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Directory => "directory",
            ElementKind::FeatureFile => "feature_file",
            ElementKind::Feature => "feature",
            ElementKind::Rule => "rule",
            ElementKind::Background => "background",
            ElementKind::Scenario => "scenario",
            ElementKind::Outline => "outline",
            ElementKind::Example => "example",
            ElementKind::Step => "step",
            ElementKind::Table => "table",
            ElementKind::Row => "row",
            ElementKind::Cell => "cell",
            ElementKind::DocString => "doc_string",
            ElementKind::Tag => "tag",
        }
    }

    pub fn is_taggable(self) -> bool {
        matches!(
            self,
            ElementKind::Feature
                | ElementKind::Rule
                | ElementKind::Scenario
                | ElementKind::Outline
                | ElementKind::Example
        )
    }

    pub fn is_test(self) -> bool {
        matches!(self, ElementKind::Scenario | ElementKind::Outline)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ModelError::UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directory {
    pub path: PathBuf,
    pub(crate) feature_files: Vec<NodeId>,
    pub(crate) directories: Vec<NodeId>,
}

impl Directory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn feature_files(&self) -> &[NodeId] {
        &self.feature_files
    }

    pub fn directories(&self) -> &[NodeId] {
        &self.directories
    }

    /// The last path component, the way a directory listing shows it.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFile {
    pub path: PathBuf,
    pub(crate) feature: Option<NodeId>,
}

impl FeatureFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            feature: None,
        }
    }

    pub fn feature(&self) -> Option<NodeId> {
        self.feature
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    pub keyword: String,
    pub name: String,
    pub description: String,
    /// Dialect code the feature was written in; empty when unknown.
    pub language: String,
    pub(crate) background: Option<NodeId>,
    pub(crate) tests: Vec<NodeId>,
    pub(crate) rules: Vec<NodeId>,
    pub(crate) tags: Vec<NodeId>,
}

impl Feature {
    pub fn new(keyword: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn background(&self) -> Option<NodeId> {
        self.background
    }

    pub fn tests(&self) -> &[NodeId] {
        &self.tests
    }

    pub fn rules(&self) -> &[NodeId] {
        &self.rules
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rule {
    pub keyword: String,
    pub name: String,
    pub description: String,
    pub(crate) background: Option<NodeId>,
    pub(crate) tests: Vec<NodeId>,
    pub(crate) tags: Vec<NodeId>,
}

impl Rule {
    pub fn new(keyword: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn background(&self) -> Option<NodeId> {
        self.background
    }

    pub fn tests(&self) -> &[NodeId] {
        &self.tests
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Background {
    pub keyword: String,
    pub name: String,
    pub description: String,
    pub(crate) steps: Vec<NodeId>,
}

impl Background {
    pub fn new(keyword: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn steps(&self) -> &[NodeId] {
        &self.steps
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scenario {
    pub keyword: String,
    pub name: String,
    pub description: String,
    pub(crate) steps: Vec<NodeId>,
    pub(crate) tags: Vec<NodeId>,
}

impl Scenario {
    pub fn new(keyword: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn steps(&self) -> &[NodeId] {
        &self.steps
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    pub keyword: String,
    pub name: String,
    pub description: String,
    pub(crate) steps: Vec<NodeId>,
    pub(crate) examples: Vec<NodeId>,
    pub(crate) tags: Vec<NodeId>,
}

impl Outline {
    pub fn new(keyword: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn steps(&self) -> &[NodeId] {
        &self.steps
    }

    pub fn examples(&self) -> &[NodeId] {
        &self.examples
    }
}

/// An examples block. The first row holds the parameters, the rest are argument rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Example {
    pub keyword: String,
    pub name: String,
    pub description: String,
    pub(crate) rows: Vec<NodeId>,
    pub(crate) tags: Vec<NodeId>,
}

impl Example {
    pub fn new(keyword: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[NodeId] {
        &self.rows
    }

    pub fn parameter_row(&self) -> Option<NodeId> {
        self.rows.first().copied()
    }

    pub fn argument_rows(&self) -> &[NodeId] {
        self.rows.get(1..).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    pub keyword: String,
    pub text: String,
    pub(crate) block: Option<NodeId>,
}

impl Step {
    pub fn new(keyword: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            text: text.into(),
            block: None,
        }
    }

    pub fn block(&self) -> Option<NodeId> {
        self.block
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub(crate) rows: Vec<NodeId>,
}

impl Table {
    pub fn rows(&self) -> &[NodeId] {
        &self.rows
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<String>,
}

impl Row {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocString {
    pub content_type: Option<String>,
    pub contents: String,
}

impl DocString {
    pub fn new(content_type: Option<&str>, contents: impl Into<String>) -> Self {
        Self {
            content_type: content_type.map(str::to_string),
            contents: contents.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One node's payload, closed over the modeled kinds.
///
/// Children are held as [`NodeId`]s, so `==` tells whether two elements hold
/// the same nodes of one tree. Use [`Tree::same_content`](super::Tree::same_content)
/// to compare what two subtrees say.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Directory(Directory),
    FeatureFile(FeatureFile),
    Feature(Feature),
    Rule(Rule),
    Background(Background),
    Scenario(Scenario),
    Outline(Outline),
    Example(Example),
    Step(Step),
    Table(Table),
    Row(Row),
    DocString(DocString),
    Tag(Tag),
}

macro_rules! element_variants {
    ($($variant:ident => $as_ref:ident, $as_mut:ident;)*) => {
        impl Element {
            pub fn kind(&self) -> ElementKind {
                match self {
                    $(Element::$variant(_) => ElementKind::$variant,)*
                }
            }

            $(
                pub fn $as_ref(&self) -> Option<&$variant> {
                    match self {
                        Element::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }

                pub fn $as_mut(&mut self) -> Option<&mut $variant> {
                    match self {
                        Element::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            )*
        }

        $(
            impl From<$variant> for Element {
                fn from(inner: $variant) -> Self {
                    Element::$variant(inner)
                }
            }
        )*
    };
}

element_variants! {
    Directory => as_directory, as_directory_mut;
    FeatureFile => as_feature_file, as_feature_file_mut;
    Feature => as_feature, as_feature_mut;
    Rule => as_rule, as_rule_mut;
    Background => as_background, as_background_mut;
    Scenario => as_scenario, as_scenario_mut;
    Outline => as_outline, as_outline_mut;
    Example => as_example, as_example_mut;
    Step => as_step, as_step_mut;
    Table => as_table, as_table_mut;
    Row => as_row, as_row_mut;
    DocString => as_doc_string, as_doc_string_mut;
    Tag => as_tag, as_tag_mut;
}

impl Element {
    /// All structural children, in rendering order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Element::Directory(d) => d
                .feature_files
                .iter()
                .chain(d.directories.iter())
                .copied()
                .collect(),
            Element::FeatureFile(f) => f.feature.into_iter().collect(),
            Element::Feature(f) => f
                .tags
                .iter()
                .copied()
                .chain(f.background)
                .chain(f.tests.iter().copied())
                .chain(f.rules.iter().copied())
                .collect(),
            Element::Rule(r) => r
                .tags
                .iter()
                .copied()
                .chain(r.background)
                .chain(r.tests.iter().copied())
                .collect(),
            Element::Background(b) => b.steps.clone(),
            Element::Scenario(s) => s.tags.iter().chain(s.steps.iter()).copied().collect(),
            Element::Outline(o) => o
                .tags
                .iter()
                .chain(o.steps.iter())
                .chain(o.examples.iter())
                .copied()
                .collect(),
            Element::Example(e) => e.tags.iter().chain(e.rows.iter()).copied().collect(),
            Element::Step(s) => s.block.into_iter().collect(),
            Element::Table(t) => t.rows.clone(),
            Element::Row(_) | Element::DocString(_) | Element::Tag(_) => Vec::new(),
        }
    }

    /// Keyword, name and description of the elements that have a header line.
    pub fn header(&self) -> Option<(&str, &str, &str)> {
        match self {
            Element::Feature(f) => Some((&f.keyword, &f.name, &f.description)),
            Element::Rule(r) => Some((&r.keyword, &r.name, &r.description)),
            Element::Background(b) => Some((&b.keyword, &b.name, &b.description)),
            Element::Scenario(s) => Some((&s.keyword, &s.name, &s.description)),
            Element::Outline(o) => Some((&o.keyword, &o.name, &o.description)),
            Element::Example(e) => Some((&e.keyword, &e.name, &e.description)),
            _ => None,
        }
    }

    /// Whether both elements are of one kind and agree on every field that is
    /// not a child link.
    pub(crate) fn same_fields(&self, other: &Element) -> bool {
        match (self, other) {
            (Element::Directory(a), Element::Directory(b)) => a.path == b.path,
            (Element::FeatureFile(a), Element::FeatureFile(b)) => a.path == b.path,
            (Element::Feature(a), Element::Feature(b)) => {
                a.language == b.language && self.header() == other.header()
            }
            (Element::Step(a), Element::Step(b)) => a.keyword == b.keyword && a.text == b.text,
            (Element::Table(_), Element::Table(_)) => true,
            (Element::Row(a), Element::Row(b)) => a.cells == b.cells,
            (Element::DocString(a), Element::DocString(b)) => a == b,
            (Element::Tag(a), Element::Tag(b)) => a.name == b.name,
            _ => self.kind() == other.kind() && self.header() == other.header(),
        }
    }

    pub(crate) fn slot_mut(&mut self, slot: Slot) -> Option<SlotMut<'_>> {
        let slot = match (self, slot) {
            (Element::Directory(d), Slot::FeatureFiles) => SlotMut::Many(&mut d.feature_files),
            (Element::Directory(d), Slot::Directories) => SlotMut::Many(&mut d.directories),
            (Element::FeatureFile(f), Slot::Feature) => SlotMut::One(&mut f.feature),
            (Element::Feature(f), Slot::Background) => SlotMut::One(&mut f.background),
            (Element::Feature(f), Slot::Tests) => SlotMut::Many(&mut f.tests),
            (Element::Feature(f), Slot::Rules) => SlotMut::Many(&mut f.rules),
            (Element::Feature(f), Slot::Tags) => SlotMut::Many(&mut f.tags),
            (Element::Rule(r), Slot::Background) => SlotMut::One(&mut r.background),
            (Element::Rule(r), Slot::Tests) => SlotMut::Many(&mut r.tests),
            (Element::Rule(r), Slot::Tags) => SlotMut::Many(&mut r.tags),
            (Element::Background(b), Slot::Steps) => SlotMut::Many(&mut b.steps),
            (Element::Scenario(s), Slot::Steps) => SlotMut::Many(&mut s.steps),
            (Element::Scenario(s), Slot::Tags) => SlotMut::Many(&mut s.tags),
            (Element::Outline(o), Slot::Steps) => SlotMut::Many(&mut o.steps),
            (Element::Outline(o), Slot::Examples) => SlotMut::Many(&mut o.examples),
            (Element::Outline(o), Slot::Tags) => SlotMut::Many(&mut o.tags),
            (Element::Example(e), Slot::Rows) => SlotMut::Many(&mut e.rows),
            (Element::Example(e), Slot::Tags) => SlotMut::Many(&mut e.tags),
            (Element::Step(s), Slot::Block) => SlotMut::One(&mut s.block),
            (Element::Table(t), Slot::Rows) => SlotMut::Many(&mut t.rows),
            _ => return None,
        };
        Some(slot)
    }

    /// Drops `child` from whichever collection holds it.
    pub(crate) fn forget_child(&mut self, child: NodeId) {
        for slot in Slot::ALL {
            match self.slot_mut(slot) {
                Some(SlotMut::Many(ids)) => ids.retain(|id| *id != child),
                Some(SlotMut::One(id)) if *id == Some(child) => *id = None,
                _ => {}
            }
        }
    }
}

/// A named child collection of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    FeatureFiles,
    Directories,
    Feature,
    Background,
    Tests,
    Rules,
    Tags,
    Steps,
    Examples,
    Rows,
    Block,
}

impl Slot {
    const ALL: [Slot; 11] = [
        Slot::FeatureFiles,
        Slot::Directories,
        Slot::Feature,
        Slot::Background,
        Slot::Tests,
        Slot::Rules,
        Slot::Tags,
        Slot::Steps,
        Slot::Examples,
        Slot::Rows,
        Slot::Block,
    ];

    pub(crate) fn accepts(self, kind: ElementKind) -> bool {
        match self {
            Slot::FeatureFiles => kind == ElementKind::FeatureFile,
            Slot::Directories => kind == ElementKind::Directory,
            Slot::Feature => kind == ElementKind::Feature,
            Slot::Background => kind == ElementKind::Background,
            Slot::Tests => kind.is_test(),
            Slot::Rules => kind == ElementKind::Rule,
            Slot::Tags => kind == ElementKind::Tag,
            Slot::Steps => kind == ElementKind::Step,
            Slot::Examples => kind == ElementKind::Example,
            Slot::Rows => kind == ElementKind::Row,
            Slot::Block => matches!(kind, ElementKind::Table | ElementKind::DocString),
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Slot::FeatureFiles => "feature files",
            Slot::Directories => "directories",
            Slot::Feature => "feature",
            Slot::Background => "background",
            Slot::Tests => "tests",
            Slot::Rules => "rules",
            Slot::Tags => "tags",
            Slot::Steps => "steps",
            Slot::Examples => "examples",
            Slot::Rows => "rows",
            Slot::Block => "block",
        }
    }
}

pub(crate) enum SlotMut<'a> {
    Many(&'a mut Vec<NodeId>),
    One(&'a mut Option<NodeId>),
}
