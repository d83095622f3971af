//! The mock host arena.

use core::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::rc::Rc;

use grappelli_runtime::{Platform, PlatformError};
use grappelli_vdom::{HostId, PropValue};
use indexmap::IndexMap;

use crate::ops::Op;

enum NodeKind {
	Element(String),
	Text,
	Comment,
	/// Root and offstage containers.
	Container,
}

struct MockNode {
	kind: NodeKind,
	props: IndexMap<String, PropValue>,
	/// Payload for text/comment nodes; text content for elements whose
	/// children were replaced via `set_element_text`.
	text: String,
	children: Vec<HostId>,
	parent: Option<HostId>,
}

impl MockNode {
	fn new(kind: NodeKind) -> Self {
		Self {
			kind,
			props: IndexMap::new(),
			text: String::new(),
			children: Vec::new(),
			parent: None,
		}
	}
}

/// An in-memory host tree with a full mutation log.
pub struct MockDom {
	nodes: RefCell<HashMap<HostId, MockNode>>,
	next_id: Cell<u64>,
	ops: RefCell<Vec<Op>>,
	selectors: RefCell<HashMap<String, HostId>>,
}

impl MockDom {
	pub fn new() -> Rc<Self> {
		Rc::new(Self {
			nodes: RefCell::new(HashMap::new()),
			next_id: Cell::new(1),
			ops: RefCell::new(Vec::new()),
			selectors: RefCell::new(HashMap::new()),
		})
	}

	fn alloc(&self, kind: NodeKind) -> HostId {
		let id = HostId::from_raw(self.next_id.get());
		self.next_id.set(self.next_id.get() + 1);
		self.nodes.borrow_mut().insert(id, MockNode::new(kind));
		id
	}

	fn log(&self, op: Op) {
		self.ops.borrow_mut().push(op);
	}

	/// Creates a detached root container to mount an app or tree into.
	pub fn create_root(&self) -> HostId {
		self.alloc(NodeKind::Container)
	}

	/// Binds a selector to a host node so teleport targets resolve.
	pub fn register_target(&self, selector: impl Into<String>, node: HostId) {
		self.selectors.borrow_mut().insert(selector.into(), node);
	}

	/// Snapshot of the op log.
	pub fn ops(&self) -> Vec<Op> {
		self.ops.borrow().clone()
	}

	/// Drains the op log, returning everything recorded so far. Tests call
	/// this after setup so assertions only see the interesting window.
	pub fn take_ops(&self) -> Vec<Op> {
		std::mem::take(&mut *self.ops.borrow_mut())
	}

	pub fn clear_ops(&self) {
		self.ops.borrow_mut().clear();
	}

	pub fn move_count(&self) -> usize {
		self.ops.borrow().iter().filter(|op| op.is_move()).count()
	}

	pub fn remove_count(&self) -> usize {
		self.ops.borrow().iter().filter(|op| op.is_remove()).count()
	}

	pub fn create_count(&self) -> usize {
		self.ops.borrow().iter().filter(|op| op.is_create()).count()
	}

	pub fn contains(&self, node: HostId) -> bool {
		self.nodes.borrow().contains_key(&node)
	}

	/// Child ids of a node, in document order.
	pub fn children_of(&self, node: HostId) -> Vec<HostId> {
		self.nodes
			.borrow()
			.get(&node)
			.map(|entry| entry.children.clone())
			.unwrap_or_default()
	}

	fn detach(&self, node: HostId) -> Option<HostId> {
		let mut nodes = self.nodes.borrow_mut();
		let old_parent = nodes.get(&node)?.parent?;
		if let Some(parent_node) = nodes.get_mut(&old_parent) {
			parent_node.children.retain(|&child| child != node);
		}
		if let Some(entry) = nodes.get_mut(&node) {
			entry.parent = None;
		}
		Some(old_parent)
	}

	fn delete_subtree(&self, node: HostId) {
		let children = match self.nodes.borrow_mut().remove(&node) {
			Some(entry) => entry.children,
			None => return,
		};
		for child in children {
			self.delete_subtree(child);
		}
	}

	/// HTML-ish serialization of a subtree, for readable assertions.
	/// Containers render as their concatenated children; handler props and
	/// false booleans are omitted.
	pub fn render_to_string(&self, node: HostId) -> String {
		let mut out = String::new();
		self.write_node(node, &mut out);
		out
	}

	fn write_node(&self, node: HostId, out: &mut String) {
		let nodes = self.nodes.borrow();
		let Some(entry) = nodes.get(&node) else {
			return;
		};
		match &entry.kind {
			NodeKind::Text => out.push_str(&entry.text),
			NodeKind::Comment => {
				let _ = write!(out, "<!--{}-->", entry.text);
			}
			NodeKind::Container => {
				let children = entry.children.clone();
				drop(nodes);
				for child in children {
					self.write_node(child, out);
				}
			}
			NodeKind::Element(tag) => {
				let _ = write!(out, "<{tag}");
				for (name, value) in &entry.props {
					match value {
						PropValue::Text(text) => {
							let _ = write!(out, " {name}=\"{text}\"");
						}
						PropValue::Number(number) => {
							let _ = write!(out, " {name}=\"{number}\"");
						}
						PropValue::Bool(true) => {
							let _ = write!(out, " {name}");
						}
						PropValue::Bool(false) | PropValue::Handler(_) => {}
					}
				}
				out.push('>');
				let tag = tag.clone();
				let text = entry.text.clone();
				let children = entry.children.clone();
				drop(nodes);
				if children.is_empty() {
					out.push_str(&text);
				}
				for child in children {
					self.write_node(child, out);
				}
				let _ = write!(out, "</{tag}>");
			}
		}
	}

	/// Fires the `name` event handler on `node`, if one is attached.
	/// Returns whether a handler ran.
	pub fn dispatch_event(&self, node: HostId, name: &str) -> bool {
		let handler = {
			let nodes = self.nodes.borrow();
			match nodes.get(&node).and_then(|entry| entry.props.get(name)) {
				Some(PropValue::Handler(handler)) => Some(handler.clone()),
				_ => None,
			}
		};
		match handler {
			Some(handler) => {
				handler.call();
				true
			}
			None => false,
		}
	}
}

impl Platform for MockDom {
	fn create_element(&self, tag: &str) -> Result<HostId, PlatformError> {
		let id = self.alloc(NodeKind::Element(tag.to_string()));
		self.log(Op::CreateElement {
			tag: tag.to_string(),
		});
		Ok(id)
	}

	fn create_text(&self, text: &str) -> Result<HostId, PlatformError> {
		let id = self.alloc(NodeKind::Text);
		if let Some(entry) = self.nodes.borrow_mut().get_mut(&id) {
			entry.text = text.to_string();
		}
		self.log(Op::CreateText);
		Ok(id)
	}

	fn create_comment(&self, text: &str) -> Result<HostId, PlatformError> {
		let id = self.alloc(NodeKind::Comment);
		if let Some(entry) = self.nodes.borrow_mut().get_mut(&id) {
			entry.text = text.to_string();
		}
		self.log(Op::CreateComment);
		Ok(id)
	}

	fn create_container(&self) -> Result<HostId, PlatformError> {
		let id = self.alloc(NodeKind::Container);
		self.log(Op::CreateContainer);
		Ok(id)
	}

	fn insert(
		&self,
		node: HostId,
		parent: HostId,
		anchor: Option<HostId>,
	) -> Result<(), PlatformError> {
		if !self.contains(node) {
			return Err(PlatformError::UnknownNode(node));
		}
		if !self.contains(parent) {
			return Err(PlatformError::UnknownNode(parent));
		}
		let was_attached = self.detach(node).is_some();
		{
			let mut nodes = self.nodes.borrow_mut();
			let parent_node = nodes
				.get_mut(&parent)
				.ok_or(PlatformError::UnknownNode(parent))?;
			let index = anchor
				.and_then(|anchor| parent_node.children.iter().position(|&child| child == anchor))
				.unwrap_or(parent_node.children.len());
			parent_node.children.insert(index, node);
			if let Some(entry) = nodes.get_mut(&node) {
				entry.parent = Some(parent);
			}
		}
		if was_attached {
			self.log(Op::Move { node, parent });
		} else {
			self.log(Op::Insert { node, parent });
		}
		Ok(())
	}

	fn remove(&self, node: HostId) -> Result<(), PlatformError> {
		if !self.contains(node) {
			return Err(PlatformError::UnknownNode(node));
		}
		self.detach(node);
		self.delete_subtree(node);
		self.log(Op::Remove { node });
		Ok(())
	}

	fn set_text(&self, node: HostId, text: &str) -> Result<(), PlatformError> {
		let mut nodes = self.nodes.borrow_mut();
		let entry = nodes.get_mut(&node).ok_or(PlatformError::UnknownNode(node))?;
		entry.text = text.to_string();
		drop(nodes);
		self.log(Op::SetText { node });
		Ok(())
	}

	fn set_element_text(&self, element: HostId, text: &str) -> Result<(), PlatformError> {
		let children = {
			let mut nodes = self.nodes.borrow_mut();
			let entry = nodes
				.get_mut(&element)
				.ok_or(PlatformError::UnknownNode(element))?;
			entry.text = text.to_string();
			std::mem::take(&mut entry.children)
		};
		for child in children {
			self.delete_subtree(child);
		}
		self.log(Op::SetElementText { node: element });
		Ok(())
	}

	fn patch_prop(
		&self,
		element: HostId,
		name: &str,
		_old: Option<&PropValue>,
		new: Option<&PropValue>,
	) -> Result<(), PlatformError> {
		let mut nodes = self.nodes.borrow_mut();
		let entry = nodes
			.get_mut(&element)
			.ok_or(PlatformError::UnknownNode(element))?;
		match new {
			Some(value) => {
				entry.props.insert(name.to_string(), value.clone());
			}
			None => {
				entry.props.shift_remove(name);
			}
		}
		drop(nodes);
		self.log(Op::PatchProp {
			node: element,
			name: name.to_string(),
		});
		Ok(())
	}

	fn parent(&self, node: HostId) -> Result<Option<HostId>, PlatformError> {
		self.nodes
			.borrow()
			.get(&node)
			.map(|entry| entry.parent)
			.ok_or(PlatformError::UnknownNode(node))
	}

	fn next_sibling(&self, node: HostId) -> Result<Option<HostId>, PlatformError> {
		let nodes = self.nodes.borrow();
		let entry = nodes.get(&node).ok_or(PlatformError::UnknownNode(node))?;
		let Some(parent) = entry.parent else {
			return Ok(None);
		};
		let Some(parent_node) = nodes.get(&parent) else {
			return Ok(None);
		};
		let index = parent_node.children.iter().position(|&child| child == node);
		Ok(index.and_then(|index| parent_node.children.get(index + 1).copied()))
	}

	fn query_selector(&self, selector: &str) -> Result<Option<HostId>, PlatformError> {
		Ok(self.selectors.borrow().get(selector).copied())
	}
}
