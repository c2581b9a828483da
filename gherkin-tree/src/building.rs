//! Tree building
//!
//! Turns canonical records into nodes of a [`Tree`]. The walk is recursive and
//! order preserving: every nested record is built and appended to the
//! collection it belongs to, which also sets its parent link. A record may
//! declare any known kind, but only where that kind can live; an unknown kind
//! or a misplaced one aborts the whole build.
//!
//! A failed build leaves the arena exactly as it was before the call.

pub(crate) mod standalone;

use crate::error::{ModelError, ModelResult};
use crate::record::{CanonicalRecord, RecordView};
use crate::tree::{
    Background, Directory, DocString, Element, ElementKind, Example, Feature, FeatureFile,
    NodeId, Outline, Row, Rule, Scenario, Slot, Step, Table, Tag, Tree,
};
use tracing::trace;

impl Tree {
    /// Builds the element described by `record` and everything below it.
    ///
    /// The returned root is detached and keeps a copy of `record` as its
    /// parsing data.
    pub fn build(&mut self, record: &CanonicalRecord) -> ModelResult<NodeId> {
        let mark = self.len();
        let result = Builder { tree: self }.element(record.view());
        match result {
            Ok(root) => {
                self.set_parsing_data(root, record.clone());
                Ok(root)
            }
            Err(error) => {
                self.truncate(mark);
                Err(error)
            }
        }
    }
}

struct Builder<'t> {
    tree: &'t mut Tree,
}

impl Builder<'_> {
    fn element(&mut self, record: RecordView<'_>) -> ModelResult<NodeId> {
        let kind = record.kind()?;
        let line = record.line();
        trace!("Building {} (line {:?})", kind, line);

        let element: Element = match kind {
            ElementKind::Directory => Directory::new(record.text("path")).into(),
            ElementKind::FeatureFile => FeatureFile::new(record.text("uri")).into(),
            ElementKind::Feature => Feature {
                keyword: record.text("keyword").to_string(),
                name: record.text("name").to_string(),
                description: trim_description(record.text("description")),
                language: record.text("language").to_string(),
                ..Feature::default()
            }
            .into(),
            ElementKind::Rule => Rule {
                description: trim_description(record.text("description")),
                ..Rule::new(record.text("keyword"), record.text("name"))
            }
            .into(),
            ElementKind::Background => Background {
                description: trim_description(record.text("description")),
                ..Background::new(record.text("keyword"), record.text("name"))
            }
            .into(),
            ElementKind::Scenario => Scenario {
                description: trim_description(record.text("description")),
                ..Scenario::new(record.text("keyword"), record.text("name"))
            }
            .into(),
            ElementKind::Outline => Outline {
                description: trim_description(record.text("description")),
                ..Outline::new(record.text("keyword"), record.text("name"))
            }
            .into(),
            ElementKind::Example => Example {
                description: trim_description(record.text("description")),
                ..Example::new(record.text("keyword"), record.text("name"))
            }
            .into(),
            ElementKind::Step => Step::new(record.text("keyword"), record.text("text")).into(),
            ElementKind::Table => Table::default().into(),
            ElementKind::Row => Row::new(cells(&record)?).into(),
            ElementKind::Cell => {
                return Err(ModelError::argument(
                    "A cell is part of its row and cannot be built on its own",
                ))
            }
            ElementKind::DocString => {
                DocString::new(record.optional_text("content_type"), record.text("contents"))
                    .into()
            }
            ElementKind::Tag => Tag::new(record.text("name")).into(),
        };
        let id = self.tree.insert(element, line);

        match kind {
            ElementKind::Directory => {
                self.attach_all(id, Slot::FeatureFiles, &record, "feature_files")?;
                self.attach_all(id, Slot::Directories, &record, "directories")?;
            }
            ElementKind::FeatureFile => self.attach_one(id, Slot::Feature, &record, "feature")?,
            ElementKind::Feature | ElementKind::Rule => {
                self.attach_all(id, Slot::Tags, &record, "tags")?;
                for child in record.children("children")? {
                    let slot = match child.kind()? {
                        ElementKind::Background => Slot::Background,
                        ElementKind::Scenario | ElementKind::Outline => Slot::Tests,
                        ElementKind::Rule => Slot::Rules,
                        other => {
                            return Err(ModelError::Misplaced {
                                parent: kind,
                                child: other,
                            })
                        }
                    };
                    self.attach(id, slot, child)?;
                }
            }
            ElementKind::Background => self.attach_all(id, Slot::Steps, &record, "steps")?,
            ElementKind::Scenario => {
                self.attach_all(id, Slot::Tags, &record, "tags")?;
                self.attach_all(id, Slot::Steps, &record, "steps")?;
            }
            ElementKind::Outline => {
                self.attach_all(id, Slot::Tags, &record, "tags")?;
                self.attach_all(id, Slot::Steps, &record, "steps")?;
                self.attach_all(id, Slot::Examples, &record, "examples")?;
            }
            ElementKind::Example => {
                self.attach_all(id, Slot::Tags, &record, "tags")?;
                self.attach_all(id, Slot::Rows, &record, "rows")?;
            }
            ElementKind::Step => self.attach_one(id, Slot::Block, &record, "block")?,
            ElementKind::Table => self.attach_all(id, Slot::Rows, &record, "rows")?,
            ElementKind::Row
            | ElementKind::Cell
            | ElementKind::DocString
            | ElementKind::Tag => {}
        }
        Ok(id)
    }

    fn attach_all(
        &mut self,
        parent: NodeId,
        slot: Slot,
        record: &RecordView<'_>,
        key: &str,
    ) -> ModelResult<()> {
        for child in record.children(key)? {
            self.attach(parent, slot, child)?;
        }
        Ok(())
    }

    fn attach_one(
        &mut self,
        parent: NodeId,
        slot: Slot,
        record: &RecordView<'_>,
        key: &str,
    ) -> ModelResult<()> {
        match record.child(key)? {
            Some(child) => self.attach(parent, slot, child),
            None => Ok(()),
        }
    }

    fn attach(&mut self, parent: NodeId, slot: Slot, record: RecordView<'_>) -> ModelResult<()> {
        let kind = record.kind()?;
        if !slot.accepts(kind) {
            return Err(ModelError::Misplaced {
                parent: self.tree.kind(parent),
                child: kind,
            });
        }
        let child = self.element(record)?;
        self.tree.push_child(parent, slot, child)
    }
}

fn cells(record: &RecordView<'_>) -> ModelResult<Vec<String>> {
    record
        .children("cells")?
        .into_iter()
        .map(|cell| match cell.kind()? {
            ElementKind::Cell => Ok(cell.text("value").to_string()),
            other => Err(ModelError::Misplaced {
                parent: ElementKind::Row,
                child: other,
            }),
        })
        .collect()
}

/// Normalizes a raw description.
///
/// Trailing whitespace goes, leading and trailing blank lines are dropped,
/// and the indentation shared by every non-blank line is removed. Relative
/// indentation and inner blank lines survive.
pub fn trim_description(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().map(str::trim_end).collect();
    let first = lines.iter().position(|line| !line.is_empty());
    let last = lines.iter().rposition(|line| !line.is_empty());
    let (first, last) = match (first, last) {
        (Some(first), Some(last)) => (first, last),
        _ => return String::new(),
    };

    let lines = &lines[first..=last];
    let indent = lines
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| {
            line.char_indices()
                .nth(indent)
                .map_or("", |(offset, _)| &line[offset..])
        })
        .collect::<Vec<_>>()
        .join("\n")
}
