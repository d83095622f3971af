//! Named slots.
//!
//! A slot is a producer of child content, supplied by the parent and invoked
//! inside the child's render. Because the producer runs during the child's
//! render pass, parent-side dynamic data flows into the child's output
//! without the child ever reading parent state directly.

use std::collections::HashMap;
use std::rc::Rc;

use crate::node::VNode;

/// Producer of slot content, invoked during the slotted component's render.
pub type SlotFn = Rc<dyn Fn() -> Vec<VNode>>;

/// The conventional name of the unnamed slot.
pub const DEFAULT_SLOT: &str = "default";

/// Mapping from slot name to content producer.
#[derive(Clone, Default)]
pub struct Slots(HashMap<String, SlotFn>);

impl Slots {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a named slot.
	pub fn insert<F>(&mut self, name: impl Into<String>, producer: F)
	where
		F: Fn() -> Vec<VNode> + 'static,
	{
		self.0.insert(name.into(), Rc::new(producer));
	}

	/// Registers the default slot.
	pub fn set_default<F>(&mut self, producer: F)
	where
		F: Fn() -> Vec<VNode> + 'static,
	{
		self.insert(DEFAULT_SLOT, producer);
	}

	pub fn get(&self, name: &str) -> Option<&SlotFn> {
		self.0.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Invokes a named slot, producing its content for this render pass.
	/// Returns `None` when the parent supplied no such slot.
	pub fn render(&self, name: &str) -> Option<Vec<VNode>> {
		self.0.get(name).map(|producer| producer())
	}

	/// Invokes the default slot, falling back to `fallback` content.
	pub fn render_default_or(&self, fallback: Vec<VNode>) -> Vec<VNode> {
		self.render(DEFAULT_SLOT).unwrap_or(fallback)
	}
}

impl std::fmt::Debug for Slots {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_set().entries(self.0.keys()).finish()
	}
}
