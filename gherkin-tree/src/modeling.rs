//! Modeling facade
//!
//! A [`Modeler`] pins one grammar parser and the adapter matching the
//! parser's release. Everything that turns text or files into trees goes
//! through it:
//!
//! - whole documents, from text or from a feature file on disk,
//! - directories, recursively (`.feature` files and subdirectories, sorted by
//!   name),
//! - single elements from a fragment of source text.
//!
//! Every operation either adds a complete, detached subtree to the given
//! [`Tree`] or leaves the tree untouched.

use crate::adapters::{self, Adapter};
use crate::building::standalone;
use crate::error::{ConfigurationError, ModelError, ModelResult};
use crate::parsing::{GrammarParser, LineParser};
use crate::record::CanonicalRecord;
use crate::tree::{Directory, ElementKind, NodeId, Slot, Tree};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

pub const FEATURE_EXTENSION: &str = "feature";

#[derive(Debug, Clone)]
pub struct Modeler<P: GrammarParser = LineParser> {
    parser: P,
    adapter: Adapter,
}

impl Modeler<LineParser> {
    /// A modeler using the bundled parser at its newest release.
    pub fn new() -> Self {
        Self {
            parser: LineParser::new(),
            adapter: adapters::newest(),
        }
    }
}

impl Default for Modeler<LineParser> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: GrammarParser> Modeler<P> {
    /// Pins `parser` together with the adapter for the release it reports.
    pub fn with_parser(parser: P) -> Result<Self, ConfigurationError> {
        let adapter = adapters::adapter_for(parser.version())?;
        Ok(Self { parser, adapter })
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    pub fn adapter(&self) -> Adapter {
        self.adapter
    }

    /// Parses `source` and normalizes the raw result.
    pub fn normalize(&self, source: &str, uri: &str) -> ModelResult<CanonicalRecord> {
        let raw = self.parser.parse(source, uri)?;
        self.adapter.normalize(&raw)
    }

    /// Models a whole document into `tree` and returns its feature file.
    pub fn model_document(&self, tree: &mut Tree, source: &str, uri: &str) -> ModelResult<NodeId> {
        debug!("Modeling document '{}' with {}", uri, self.adapter.name());
        let record = self.normalize(source, uri)?;
        let root = tree.build(&record)?;
        // Not every parser family reports the uri it was given
        if let Some(file) = tree.element_mut(root).as_feature_file_mut() {
            file.path = PathBuf::from(uri);
        }
        Ok(root)
    }

    /// Models a whole document into a fresh tree.
    pub fn parse_document(&self, source: &str, uri: &str) -> ModelResult<(Tree, NodeId)> {
        let mut tree = Tree::new();
        let root = self.model_document(&mut tree, source, uri)?;
        Ok((tree, root))
    }

    /// Builds one element of `kind` from a fragment of source text.
    ///
    /// The element comes back detached and carries its own canonical record
    /// as parsing data. Syntax errors name the synthetic file the fragment was
    /// parsed under, e.g. `gherkin_tree_stand_alone_step.feature`.
    pub fn model_element(
        &self,
        tree: &mut Tree,
        kind: ElementKind,
        source: &str,
    ) -> ModelResult<NodeId> {
        let wrapped = standalone::wrap(kind, source, self.parser.dialect())?;
        let document = self.normalize(&wrapped, &standalone::file_name(kind))?;
        let record = standalone::locate(&document, kind)?;
        tree.build(&record)
    }

    /// Builds one element of `kind` into a fresh tree.
    pub fn parse_element(&self, kind: ElementKind, source: &str) -> ModelResult<(Tree, NodeId)> {
        let mut tree = Tree::new();
        let root = self.model_element(&mut tree, kind, source)?;
        Ok((tree, root))
    }

    /// Reads and models one feature file.
    pub fn load_feature_file(&self, tree: &mut Tree, path: impl AsRef<Path>) -> ModelResult<NodeId> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.model_document(tree, &source, &path.to_string_lossy())
    }

    /// Models a directory with every feature file and subdirectory below it.
    pub fn load_directory(&self, tree: &mut Tree, path: impl AsRef<Path>) -> ModelResult<NodeId> {
        let mark = tree.len();
        let result = self.directory(tree, path.as_ref());
        if result.is_err() {
            tree.truncate(mark);
        }
        result
    }

    fn directory(&self, tree: &mut Tree, path: &Path) -> ModelResult<NodeId> {
        if !path.is_dir() {
            return Err(ModelError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }
        debug!("Loading directory '{}'", path.display());

        let directory = tree.add(Directory::new(path));
        let entries = WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in entries {
            let entry = entry.map_err(|error| ModelError::Io {
                path: path.to_path_buf(),
                source: error.into(),
            })?;
            let entry_path = entry.path();

            if entry.file_type().is_dir() {
                let child = self.directory(tree, entry_path)?;
                tree.push_child(directory, Slot::Directories, child)?;
            } else if is_feature_file(entry_path) {
                let child = self.load_feature_file(tree, entry_path)?;
                tree.push_child(directory, Slot::FeatureFiles, child)?;
            } else {
                trace!("Skipping '{}'", entry_path.display());
            }
        }
        Ok(directory)
    }
}

/// Models a raw parse result of unknown origin, picking the adapter by shape.
pub fn model_raw(tree: &mut Tree, raw: &Value) -> ModelResult<NodeId> {
    let adapter = adapters::detect(raw)?;
    let record = adapter.normalize(raw)?;
    tree.build(&record)
}

fn is_feature_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|extension| extension == FEATURE_EXTENSION)
}
