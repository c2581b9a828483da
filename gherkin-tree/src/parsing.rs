//! Grammar parsing
//!
//! The modeler never reads Gherkin itself: it hands source text to a
//! [`GrammarParser`] and normalizes whatever raw result comes back. Real
//! parsers change their output shape from one release to the next, so a
//! parser declares the version it behaves like and the adapters take it from
//! there.
//!
//! [`LineParser`] is the bundled implementation. It works in two passes:
//!
//! 1. Line classification ([`lines`]): every source line is classified once
//!    against the dialect's keyword table (tags, table rows, doc string
//!    separators, headers, steps, free text). Table rows are split into cells
//!    by a small logos lexer ([`cells`]).
//! 2. Recursive descent ([`grammar`]) over the classified lines builds a plain
//!    syntax tree, which [`emit`] then writes out as JSON in the shape the
//!    configured parser version produces.
//!
//! Keyword matching is dialect driven. The dialect is the parser's own when one
//! was given, the process-wide active dialect otherwise, and a
//! `# language: xx` header overrides either for the one document.

pub(crate) mod cells;
pub(crate) mod emit;
pub(crate) mod grammar;
pub(crate) mod lines;

use crate::adapters::{self, Strategy};
use crate::dialect::{self, Dialect};
use crate::error::{ConfigurationError, SyntaxError};
use serde_json::Value;

/// The newest parser version the bundled parser can imitate.
pub const NEWEST_VERSION: u32 = 27;

/// An external grammar that turns source text into a raw parse result.
pub trait GrammarParser {
    /// The parser release whose output shape [`parse`](Self::parse) produces.
    fn version(&self) -> u32;

    /// Keyword table used when the source has no language header.
    fn dialect(&self) -> &'static Dialect {
        dialect::active_dialect()
    }

    fn parse(&self, source: &str, uri: &str) -> Result<Value, SyntaxError>;
}

/// Which constructs a parser release understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GrammarOptions {
    pub rules: bool,
    pub rule_tags: bool,
    pub examples_in_scenarios: bool,
}

impl GrammarOptions {
    pub(crate) fn for_version(version: u32) -> Self {
        Self {
            rules: version >= 6,
            rule_tags: version >= 18,
            examples_in_scenarios: version >= 6,
        }
    }
}

/// Line based Gherkin parser emitting the raw shape of a given parser version.
#[derive(Debug, Clone, Copy)]
pub struct LineParser {
    version: u32,
    strategy: Strategy,
    dialect: Option<&'static Dialect>,
}

impl LineParser {
    /// A parser behaving like the newest supported release.
    pub fn new() -> Self {
        Self {
            version: NEWEST_VERSION,
            strategy: Strategy::JsonSchema,
            dialect: None,
        }
    }

    pub fn with_version(version: u32) -> Result<Self, ConfigurationError> {
        let adapter = adapters::adapter_for(version)?;
        Ok(Self {
            version,
            strategy: adapter.strategy,
            dialect: None,
        })
    }

    /// Pins the keyword table instead of following the active dialect.
    pub fn with_dialect(mut self, dialect: &'static Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarParser for LineParser {
    fn version(&self) -> u32 {
        self.version
    }

    fn dialect(&self) -> &'static Dialect {
        self.dialect.unwrap_or_else(dialect::active_dialect)
    }

    fn parse(&self, source: &str, uri: &str) -> Result<Value, SyntaxError> {
        let options = GrammarOptions::for_version(self.version);
        let document = grammar::Grammar::new(source, uri, self.dialect(), options).parse()?;
        Ok(emit::emit(&document, uri, self.strategy))
    }
}
