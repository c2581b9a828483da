//! # gherkin-tree
//!
//! Typed, navigable element trees for Gherkin feature files.
//!
//! Architecture
//!
//!     Source text goes through a grammar parser whose raw output shape depends on the parser
//!     release. An adapter, chosen once per modeler by release, maps that raw result onto one
//!     canonical record schema. The builder turns canonical records into a [`tree::Tree`], and
//!     the serializer renders any element of the tree back to source text:
//!
//!     source ──parser──▶ raw JSON ──adapter──▶ canonical record ──builder──▶ Tree ──serializer──▶ source
//!
//!     Rendering a built tree, rebuilding it and rendering again gives the same text.
//!
//!     The file structure :
//!     .
//!     ├── adapters            # Raw shape → canonical record, one strategy per parser family
//!     ├── building            # Canonical record → tree nodes, stand-alone fragments
//!     ├── dialect.rs          # Keyword tables and the active dialect
//!     ├── error.rs
//!     ├── formats
//!     │   └── serializer.rs   # Tree → Gherkin source
//!     ├── modeling.rs         # Modeler facade: documents, fragments, files, directories
//!     ├── parsing             # Bundled line based grammar parser
//!     ├── record.rs           # Canonical records
//!     └── tree                # Arena, elements, tags, ancestry, example rows
//!
//! Testing
//!
//!     Unit tests live next to the code. Integration tests under tests/ are grouped by element
//!     family, plus the round trip properties and the adapter version matrix.

pub mod adapters;
pub mod building;
pub mod dialect;
pub mod error;
pub mod formats;
pub mod modeling;
pub mod parsing;
pub mod record;
pub mod tree;

pub use error::{ConfigurationError, ModelError, ModelResult, SyntaxError};
pub use formats::{render, FormattingRules, GherkinSerializer};
pub use modeling::Modeler;
pub use parsing::{GrammarParser, LineParser};
pub use record::CanonicalRecord;
pub use tree::{AncestorKind, Element, ElementKind, NodeId, Tree};
