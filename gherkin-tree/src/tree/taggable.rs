//! Tag storage and inheritance
//!
//! Own tags are stored on the element. Inherited tags are never copied: they
//! are read off the nearest taggable ancestor, so a Scenario inside a Rule
//! inside a Feature sees the feature's tags, then the rule's, then its own.

use super::{Element, Feature, NodeId, Tree};
use super::{Example, Outline, Rule, Scenario};

/// Elements that carry their own tags.
pub trait Taggable {
    fn tag_ids(&self) -> &[NodeId];
}

macro_rules! impl_taggable {
    ($($ty:ty),*) => {
        $(
            impl Taggable for $ty {
                fn tag_ids(&self) -> &[NodeId] {
                    &self.tags
                }
            }
        )*
    };
}

impl_taggable!(Feature, Rule, Scenario, Outline, Example);

impl Element {
    pub fn as_taggable(&self) -> Option<&dyn Taggable> {
        match self {
            Element::Feature(f) => Some(f),
            Element::Rule(r) => Some(r),
            Element::Scenario(s) => Some(s),
            Element::Outline(o) => Some(o),
            Element::Example(e) => Some(e),
            _ => None,
        }
    }
}

impl Tree {
    /// The element's own tags; empty for elements that cannot be tagged.
    pub fn tags(&self, id: NodeId) -> &[NodeId] {
        self.element(id)
            .as_taggable()
            .map(|taggable| taggable.tag_ids())
            .unwrap_or(&[])
    }

    /// Tags inherited from the nearest taggable ancestor.
    pub fn applied_tags(&self, id: NodeId) -> Vec<NodeId> {
        self.ancestors(id)
            .find(|ancestor| self.element(*ancestor).as_taggable().is_some())
            .map(|ancestor| self.all_tags(ancestor))
            .unwrap_or_default()
    }

    /// Inherited tags followed by the element's own tags.
    pub fn all_tags(&self, id: NodeId) -> Vec<NodeId> {
        let mut tags = self.applied_tags(id);
        tags.extend_from_slice(self.tags(id));
        tags
    }

    /// Names of the given tag nodes; ids that are not tags are skipped.
    pub fn tag_names(&self, ids: &[NodeId]) -> Vec<&str> {
        ids.iter()
            .filter_map(|id| self.element(*id).as_tag())
            .map(|tag| tag.name.as_str())
            .collect()
    }
}
