//! Reference links for every node of a documentation tree.
//!
//! Each node gets a definition keyed by its dotted id, so `[m.f]` and
//! ``[`m.f`]`` resolve to the node's header anywhere in the document.

use crate::model::{DocNode, Document, NodeKind};
use indexmap::IndexMap;

/// First line of the block of link definitions.
pub const MARKER: &str = "<!-- references -->";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Dotted id: ancestor names joined by `.`.
    pub id: String,
    pub anchor: String,
    pub title: String,
}

impl Reference {
    fn new(node: &DocNode, id: String) -> Self {
        Self {
            anchor: anchor(node.kind, &id),
            title: format!("{} {}", node.kind, node.name),
            id,
        }
    }
}

/// Heading anchor of a node, built the way GitHub slugs the rendered
/// header `Kind a.b.c`: lowercase, separators replaced by hyphens.
pub fn anchor(kind: NodeKind, id: &str) -> String {
    format!("{}-{}", kind, id).replace('.', "-").to_lowercase()
}

/// One reference per node in pre-order, documented or not. A repeated id
/// keeps its first position and takes the last node's values.
pub fn collect(doc: &Document) -> Vec<Reference> {
    let mut refs = IndexMap::new();
    for node in &doc.content {
        collect_node(node, "", &mut refs);
    }
    refs.into_values().collect()
}

fn collect_node(node: &DocNode, prefix: &str, refs: &mut IndexMap<String, Reference>) {
    let id = format!("{}{}", prefix, node.name);
    refs.insert(id.clone(), Reference::new(node, id.clone()));
    let prefix = format!("{}.", id);
    for child in &node.content {
        collect_node(child, &prefix, refs);
    }
}

/// The link definition block: the marker, then a plain and a backticked
/// definition per reference.
pub fn block(refs: &[Reference]) -> Vec<String> {
    let mut lines = Vec::with_capacity(refs.len() * 2 + 1);
    lines.push(MARKER.to_string());
    for r in refs {
        lines.push(format!("[{}]: #{} \"{}\"", r.id, r.anchor, r.title));
        lines.push(format!("[`{}`]: #{} \"{}\"", r.id, r.anchor, r.title));
    }
    lines
}
