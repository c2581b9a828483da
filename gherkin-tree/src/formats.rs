//! Output formats
//!
//! Gherkin source is the only output format. [`render`] uses the default
//! [`FormattingRules`]; build a [`GherkinSerializer`] for anything else.

pub mod serializer;

pub use serializer::GherkinSerializer;

use crate::tree::{NodeId, Tree};

/// Layout knobs of the serializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattingRules {
    /// One level of indentation.
    pub indent_string: String,
}

impl Default for FormattingRules {
    fn default() -> Self {
        Self {
            indent_string: "  ".to_string(),
        }
    }
}

/// Renders `id` and everything below it with the default rules.
pub fn render(tree: &Tree, id: NodeId) -> String {
    GherkinSerializer::new(FormattingRules::default()).serialize(tree, id)
}
