//! Error types for modeling operations
//!
//! Every failure in the crate is local and synchronous: nothing is retried and
//! no partially built tree is ever handed back to the caller.

use crate::tree::ElementKind;
use std::path::PathBuf;
use thiserror::Error;

/// A static configuration choice that cannot be honored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No adapter is registered for the requested parser version.
    #[error("Unsupported parser version: {0}")]
    UnsupportedVersion(u32),
    /// The raw parse result matches no known adapter signature.
    #[error("Unrecognized parse result shape ({0}); no adapter supports it")]
    UnrecognizedShape(String),
    /// The raw parse result was produced by a different parser family than the pinned one.
    #[error("Parse result does not match the output of gherkin {0}")]
    ShapeMismatch(u32),
    /// The requested dialect has no keyword table.
    #[error("Unknown dialect '{0}'")]
    UnknownDialect(String),
}

/// A syntax failure reported by the grammar collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error encountered while parsing '{file}' ({line}:{column}): {message}")]
pub struct SyntaxError {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Errors raised while normalizing, building, mutating or loading element trees.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A canonical record declared a kind the builder does not know.
    #[error("Unknown element kind '{0}'")]
    UnknownKind(String),

    /// A known kind showed up somewhere it cannot live.
    #[error("A {child} cannot be placed inside a {parent}")]
    Misplaced {
        parent: ElementKind,
        child: ElementKind,
    },

    /// A raw or canonical record is missing structure the schema requires.
    #[error("Malformed record: {0}")]
    Malformed(String),

    /// Invalid input to a mutation or construction API.
    #[error("{0}")]
    Argument(String),

    #[error("Unable to read '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ModelError {
    pub(crate) fn argument(message: impl Into<String>) -> Self {
        ModelError::Argument(message.into())
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        ModelError::Malformed(message.into())
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
