//! The virtual node itself.
//!
//! A `VNode`, once handed to the reconciler, is treated as immutable: the
//! reconciler never changes its structural shape, it only annotates the node
//! with host back-references (and, for component nodes, the runtime's opaque
//! instance state). Both annotation slots use interior mutability so the
//! rest of the node can be shared freely behind `&VNode`.

use core::fmt;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::children::Children;
use crate::patch_flag::PatchFlag;
use crate::props::Props;
use crate::slots::Slots;

/// Error type for user-supplied callbacks (render functions, setup, hooks).
pub type BoxError = Box<dyn std::error::Error + 'static>;

/// Non-owning handle to a materialized host node.
///
/// The host tree (or the platform adapter's arena) owns the actual nodes;
/// virtual nodes and instances only hold these indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostId(u64);

impl HostId {
	pub fn from_raw(raw: u64) -> Self {
		Self(raw)
	}

	pub fn raw(self) -> u64 {
		self.0
	}
}

/// Stable identity for keyed list diffing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
	Int(i64),
	Str(String),
}

impl From<i64> for Key {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for Key {
	fn from(value: i32) -> Self {
		Self::Int(value as i64)
	}
}

impl From<&str> for Key {
	fn from(value: &str) -> Self {
		Self::Str(value.to_string())
	}
}

impl From<String> for Key {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

/// Render function: produces the next virtual tree from props and slots.
///
/// Reactive state read inside the call is tracked by the owning instance's
/// effect; the function must not mutate instance lifecycle state.
pub type RenderFn = Rc<dyn Fn(&Props, &Slots) -> Result<VNode, BoxError>>;

/// Setup function: runs once before the first render, with the instance
/// current, so lifecycle hooks and provides can be registered.
pub type SetupFn = Rc<dyn Fn(&Props) -> Result<(), BoxError>>;

/// A component definition. Identity (`Rc` pointer) is the component's type:
/// two component vnodes are patchable in place only when they share a
/// definition.
pub struct ComponentDef {
	name: String,
	setup: Option<SetupFn>,
	render: RenderFn,
}

impl ComponentDef {
	pub fn new<F>(name: impl Into<String>, render: F) -> Rc<Self>
	where
		F: Fn(&Props, &Slots) -> Result<VNode, BoxError> + 'static,
	{
		Rc::new(Self {
			name: name.into(),
			setup: None,
			render: Rc::new(render),
		})
	}

	pub fn with_setup<S, F>(name: impl Into<String>, setup: S, render: F) -> Rc<Self>
	where
		S: Fn(&Props) -> Result<(), BoxError> + 'static,
		F: Fn(&Props, &Slots) -> Result<VNode, BoxError> + 'static,
	{
		Rc::new(Self {
			name: name.into(),
			setup: Some(Rc::new(setup)),
			render: Rc::new(render),
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn setup(&self) -> Option<&SetupFn> {
		self.setup.as_ref()
	}

	pub fn render(&self) -> &RenderFn {
		&self.render
	}
}

impl fmt::Debug for ComponentDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentDef")
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}

/// Closed tagged union over everything a virtual node can describe.
///
/// The reconciler dispatches on this discriminant with an exhaustive match;
/// adding a kind is a compile-visible change everywhere it matters.
#[derive(Clone)]
pub enum VNodeKind {
	/// Host element with the given tag name.
	Element(String),
	/// Text node; the payload is the only thing patched.
	Text(String),
	/// Comment node (also used as a structural placeholder).
	Comment(String),
	/// Child list without a host wrapper; carries start/end anchor nodes.
	Fragment,
	/// Fragment whose children never change after mount.
	Static,
	/// User component; identity is the definition pointer.
	Component(Rc<ComponentDef>),
	/// Children render into a different host container (`to` prop).
	Teleport,
	/// Children are deactivated into an offstage cache instead of unmounted.
	KeepAlive,
	/// Fallback tree until descendant async dependencies resolve.
	Suspense,
}

impl fmt::Debug for VNodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Element(tag) => write!(f, "Element({tag})"),
			Self::Text(text) => write!(f, "Text({text:?})"),
			Self::Comment(text) => write!(f, "Comment({text:?})"),
			Self::Fragment => write!(f, "Fragment"),
			Self::Static => write!(f, "Static"),
			Self::Component(def) => write!(f, "Component({})", def.name()),
			Self::Teleport => write!(f, "Teleport"),
			Self::KeepAlive => write!(f, "KeepAlive"),
			Self::Suspense => write!(f, "Suspense"),
		}
	}
}

/// One node of a virtual tree.
#[derive(Debug, Clone)]
pub struct VNode {
	kind: VNodeKind,
	props: Props,
	children: Children,
	key: Option<Key>,
	patch_flag: PatchFlag,
	slots: Slots,
	/// Host node materialized for this vnode (elements, text, comments; for
	/// fragments this is the start anchor).
	host: Cell<Option<HostId>>,
	/// End anchor for fragment-shaped nodes.
	anchor: Cell<Option<HostId>>,
	/// Runtime-owned state (component instance, keep-alive cache, suspense
	/// boundary). Opaque to this crate.
	state: RefCell<Option<Rc<dyn Any>>>,
}

impl VNode {
	pub fn new(kind: VNodeKind, props: Props, children: Children) -> Self {
		Self {
			kind,
			props,
			children,
			key: None,
			patch_flag: PatchFlag::empty(),
			slots: Slots::new(),
			host: Cell::new(None),
			anchor: Cell::new(None),
			state: RefCell::new(None),
		}
	}

	/// Plain text node.
	pub fn text(content: impl Into<String>) -> Self {
		Self::new(VNodeKind::Text(content.into()), Props::new(), Children::None)
	}

	/// Comment / placeholder node.
	pub fn comment(content: impl Into<String>) -> Self {
		Self::new(
			VNodeKind::Comment(content.into()),
			Props::new(),
			Children::None,
		)
	}

	/// Fragment over an already-built child list.
	pub fn fragment(children: Vec<VNode>) -> Self {
		Self::new(VNodeKind::Fragment, Props::new(), Children::normalize(children))
	}

	/// Component node.
	pub fn component(def: Rc<ComponentDef>, props: Props) -> Self {
		Self::new(VNodeKind::Component(def), props, Children::None)
	}

	/// Component node with slot content supplied by the parent.
	pub fn component_with_slots(def: Rc<ComponentDef>, props: Props, slots: Slots) -> Self {
		let mut node = Self::component(def, props);
		node.slots = slots;
		node
	}

	/// Teleport node; `to` is a platform selector for the target container.
	pub fn teleport(to: impl Into<String>, children: Vec<VNode>) -> Self {
		let mut props = Props::new();
		props.insert("to", to.into());
		Self::new(VNodeKind::Teleport, props, Children::normalize(children))
	}

	/// Keep-alive wrapper around a single component child.
	pub fn keep_alive(child: VNode) -> Self {
		Self::new(VNodeKind::KeepAlive, Props::new(), Children::normalize(vec![child]))
	}

	/// Suspense boundary: `content` is the real tree, `fallback` shows while
	/// descendant async dependencies are outstanding.
	pub fn suspense(content: VNode, fallback: VNode) -> Self {
		Self::new(
			VNodeKind::Suspense,
			Props::new(),
			Children::Nodes(vec![content, fallback]),
		)
	}

	pub fn with_key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	pub fn with_patch_flag(mut self, flag: PatchFlag) -> Self {
		self.patch_flag = flag;
		self
	}

	pub fn kind(&self) -> &VNodeKind {
		&self.kind
	}

	pub fn props(&self) -> &Props {
		&self.props
	}

	pub fn children(&self) -> &Children {
		&self.children
	}

	pub fn key(&self) -> Option<&Key> {
		self.key.as_ref()
	}

	pub fn patch_flag(&self) -> PatchFlag {
		self.patch_flag
	}

	pub fn slots(&self) -> &Slots {
		&self.slots
	}

	pub fn host(&self) -> Option<HostId> {
		self.host.get()
	}

	pub fn set_host(&self, host: Option<HostId>) {
		self.host.set(host);
	}

	pub fn anchor(&self) -> Option<HostId> {
		self.anchor.get()
	}

	pub fn set_anchor(&self, anchor: Option<HostId>) {
		self.anchor.set(anchor);
	}

	pub fn state(&self) -> Option<Rc<dyn Any>> {
		self.state.borrow().clone()
	}

	pub fn set_state(&self, state: Option<Rc<dyn Any>>) {
		*self.state.borrow_mut() = state;
	}

	/// Whether `other` describes the same node type for patching purposes:
	/// same discriminant (and tag / component definition) and same key.
	/// Anything else is a replacement, never an in-place patch.
	pub fn same_type(&self, other: &VNode) -> bool {
		if self.key != other.key {
			return false;
		}
		match (&self.kind, &other.kind) {
			(VNodeKind::Element(a), VNodeKind::Element(b)) => a == b,
			(VNodeKind::Text(_), VNodeKind::Text(_)) => true,
			(VNodeKind::Comment(_), VNodeKind::Comment(_)) => true,
			(VNodeKind::Fragment, VNodeKind::Fragment) => true,
			(VNodeKind::Static, VNodeKind::Static) => true,
			(VNodeKind::Component(a), VNodeKind::Component(b)) => Rc::ptr_eq(a, b),
			(VNodeKind::Teleport, VNodeKind::Teleport) => true,
			(VNodeKind::KeepAlive, VNodeKind::KeepAlive) => true,
			(VNodeKind::Suspense, VNodeKind::Suspense) => true,
			_ => false,
		}
	}
}
