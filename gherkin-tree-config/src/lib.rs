//! Layered settings for gherkin-tree.
//!
//! The defaults live in `defaults/gherkin-tree.default.toml` and are compiled
//! in. A [`Loader`] stacks TOML files and single-key overrides
//! on top and yields a [`TreeConfig`]. Its sections convert into what the
//! library consumes: [`FormattingRules`] for rendering and a pinned
//! [`Modeler`] for parsing.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use gherkin_tree::dialect;
use gherkin_tree::{ConfigurationError, FormattingRules, LineParser, Modeler};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/gherkin-tree.default.toml");

/// Top-level configuration consumed by gherkin-tree applications.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeConfig {
    pub formatting: FormattingConfig,
    pub parsing: ParsingConfig,
}

/// Formatting-related configuration groups.
#[derive(Debug, Clone, Deserialize)]
pub struct FormattingConfig {
    pub rules: FormattingRulesConfig,
}

/// Mirrors the knobs exposed by the Gherkin serializer.
#[derive(Debug, Clone, Deserialize)]
pub struct FormattingRulesConfig {
    pub indent_string: String,
}

impl From<&FormattingRulesConfig> for FormattingRules {
    fn from(config: &FormattingRulesConfig) -> Self {
        FormattingRules {
            indent_string: config.indent_string.clone(),
        }
    }
}

/// Which grammar release to emulate and which keywords it reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ParsingConfig {
    pub dialect: String,
    pub parser_version: u32,
}

impl ParsingConfig {
    /// A parser at the configured release, pinned to the configured dialect.
    ///
    /// A `# language:` header in a document still takes precedence.
    pub fn parser(&self) -> Result<LineParser, ConfigurationError> {
        let dialect = dialect::lookup(&self.dialect)?;
        Ok(LineParser::with_version(self.parser_version)?.with_dialect(dialect))
    }

    pub fn modeler(&self) -> Result<Modeler, ConfigurationError> {
        Modeler::with_parser(self.parser()?)
    }
}

/// Stacks project and user settings on the embedded defaults. Later layers win.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let defaults = File::from_str(DEFAULT_TOML, FileFormat::Toml);
        Self {
            builder: Config::builder().add_source(defaults),
        }
    }

    /// Adds a TOML file that must exist, e.g. a project's `gherkin-tree.toml`.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    /// Adds a TOML file that is skipped when absent, e.g. per-user settings.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), false)
    }

    fn layer(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Pins one dotted key, such as `parsing.parser_version`, above every file.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Merges the layers into a [`TreeConfig`]. Missing required files and
    /// mistyped settings surface here.
    pub fn build(self) -> Result<TreeConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults with nothing layered on top.
pub fn load_defaults() -> Result<TreeConfig, ConfigError> {
    Loader::new().build()
}
