//! Fluent constructors for virtual trees.
//!
//! ```
//! use grappelli_vdom::{element, EventHandler};
//!
//! let node = element("button")
//! 	.class("primary")
//! 	.on("click", EventHandler::new(|| {}))
//! 	.text("Save")
//! 	.build();
//! ```

use crate::children::Children;
use crate::node::{Key, VNode, VNodeKind};
use crate::patch_flag::PatchFlag;
use crate::props::{EventHandler, PropValue, Props};

/// Starts building a host element node.
pub fn element(tag: impl Into<String>) -> ElementBuilder {
	ElementBuilder {
		tag: tag.into(),
		props: Props::new(),
		children: Vec::new(),
		text: None,
		key: None,
		patch_flag: PatchFlag::empty(),
	}
}

/// Text node shorthand.
pub fn text(content: impl Into<String>) -> VNode {
	VNode::text(content)
}

/// Comment node shorthand.
pub fn comment(content: impl Into<String>) -> VNode {
	VNode::comment(content)
}

/// Fragment shorthand.
pub fn fragment(children: Vec<VNode>) -> VNode {
	VNode::fragment(children)
}

/// Static block: a fragment whose children are known never to change.
pub fn static_block(children: Vec<VNode>) -> VNode {
	VNode::new(VNodeKind::Static, Props::new(), Children::normalize(children))
		.with_patch_flag(PatchFlag::HOISTED)
}

/// Builder for element nodes.
pub struct ElementBuilder {
	tag: String,
	props: Props,
	children: Vec<VNode>,
	text: Option<String>,
	key: Option<Key>,
	patch_flag: PatchFlag,
}

impl ElementBuilder {
	/// Sets a prop.
	pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
		self.props.insert(name, value);
		self
	}

	/// `class` shorthand.
	pub fn class(self, value: impl Into<String>) -> Self {
		self.prop("class", value.into())
	}

	/// `id` shorthand.
	pub fn id(self, value: impl Into<String>) -> Self {
		self.prop("id", value.into())
	}

	/// Attaches an event handler as an `on<event>` prop.
	pub fn on(self, event: impl AsRef<str>, handler: EventHandler) -> Self {
		self.prop(format!("on{}", event.as_ref()), handler)
	}

	/// Sets the diffing key.
	pub fn key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	/// Sets patch-flag hints.
	pub fn patch_flag(mut self, flag: PatchFlag) -> Self {
		self.patch_flag = flag;
		self
	}

	/// Sets pure text content. Mutually exclusive with `child`; text wins
	/// only when no child nodes were added.
	pub fn text(mut self, content: impl Into<String>) -> Self {
		self.text = Some(content.into());
		self
	}

	/// Appends a child node.
	pub fn child(mut self, child: VNode) -> Self {
		self.children.push(child);
		self
	}

	/// Appends several child nodes.
	pub fn children(mut self, children: impl IntoIterator<Item = VNode>) -> Self {
		self.children.extend(children);
		self
	}

	pub fn build(self) -> VNode {
		let children = if self.children.is_empty() {
			match self.text {
				Some(content) => Children::text(content),
				None => Children::None,
			}
		} else {
			Children::normalize(self.children)
		};

		let mut node = VNode::new(VNodeKind::Element(self.tag), self.props, children);
		if let Some(key) = self.key {
			node = node.with_key(key);
		}
		node.with_patch_flag(self.patch_flag)
	}
}
