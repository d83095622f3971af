//! Reactive signals.
//!
//! A `Signal<T>` holds a value and the edges to whoever read it. Reads
//! inside an effect subscribe the effect; writes notify subscribers through
//! the dispatch in [`crate::effect`].

use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

use crate::effect;
use crate::runtime::{NodeId, try_with_runtime, with_runtime};

/// A piece of reactive state.
///
/// Cloning is cheap and shares the underlying value; all clones carry the
/// same identity in the dependency graph.
#[derive(Clone)]
pub struct Signal<T: 'static> {
	id: NodeId,
	value: Rc<RefCell<T>>,
}

impl<T: 'static> Signal<T> {
	pub fn new(value: T) -> Self {
		Self {
			id: NodeId::new(),
			value: Rc::new(RefCell::new(value)),
		}
	}

	/// Reads the value, subscribing the currently running effect.
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		with_runtime(|rt| rt.track_dependency(self.id));
		self.get_untracked()
	}

	/// Reads the value without creating a dependency edge.
	pub fn get_untracked(&self) -> T
	where
		T: Clone,
	{
		self.value.borrow().clone()
	}

	/// Borrows the value for inspection without cloning, tracked.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		with_runtime(|rt| rt.track_dependency(self.id));
		f(&self.value.borrow())
	}

	/// Replaces the value and notifies subscribers.
	pub fn set(&self, value: T) {
		*self.value.borrow_mut() = value;
		effect::trigger(self.id);
	}

	/// Mutates the value in place and notifies subscribers once.
	pub fn update<F>(&self, f: F)
	where
		F: FnOnce(&mut T),
	{
		f(&mut self.value.borrow_mut());
		effect::trigger(self.id);
	}

	pub fn id(&self) -> NodeId {
		self.id
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("id", &self.id)
			.field("value", &*self.value.borrow())
			.finish()
	}
}

impl<T: 'static> Drop for Signal<T> {
	fn drop(&mut self) {
		// Last clone cleans the graph node up.
		if Rc::strong_count(&self.value) == 1 {
			let _ = try_with_runtime(|rt| rt.remove_node(self.id));
		}
	}
}
