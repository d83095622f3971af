//! Children normalization.
//!
//! Child content reaches the reconciler in exactly one of three shapes:
//! nothing, a text payload (elements with pure text content skip per-child
//! vnodes entirely), or an ordered vnode sequence. List diffing classifies a
//! sequence once per patch as keyed (every child carries a key) or unkeyed.

use crate::node::VNode;

/// Normalized child content of a virtual node.
#[derive(Debug, Clone, Default)]
pub enum Children {
	/// No children.
	#[default]
	None,
	/// Pure text content, set on the host element directly.
	Text(String),
	/// Ordered child nodes.
	Nodes(Vec<VNode>),
}

impl Children {
	/// Normalizes a child list: empty lists collapse to `None`.
	pub fn normalize(nodes: Vec<VNode>) -> Self {
		if nodes.is_empty() {
			Self::None
		} else {
			Self::Nodes(nodes)
		}
	}

	pub fn text(content: impl Into<String>) -> Self {
		Self::Text(content.into())
	}

	/// Child nodes as a slice (empty for `None`/`Text`).
	pub fn nodes(&self) -> &[VNode] {
		match self {
			Self::Nodes(nodes) => nodes,
			_ => &[],
		}
	}

	pub fn len(&self) -> usize {
		self.nodes().len()
	}

	pub fn is_empty(&self) -> bool {
		match self {
			Self::None => true,
			Self::Text(text) => text.is_empty(),
			Self::Nodes(nodes) => nodes.is_empty(),
		}
	}

	/// A sequence is keyed when every child has a non-null key. Classified
	/// once per patch; mixed sequences diff positionally.
	pub fn is_keyed(&self) -> bool {
		match self {
			Self::Nodes(nodes) => !nodes.is_empty() && nodes.iter().all(|n| n.key().is_some()),
			_ => false,
		}
	}
}
