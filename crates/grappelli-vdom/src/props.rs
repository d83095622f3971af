//! Ordered property maps and property values.
//!
//! Props are an insertion-ordered `name → value` mapping. Event-handler
//! values (`PropValue::Handler`) get special treatment during diffing: they
//! are attached/detached by identity instead of being diffed structurally.

use core::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// An opaque event callback attached to a host node.
///
/// Handlers are compared by `Rc` identity: a handler prop only counts as
/// "changed" when the application supplies a different closure allocation.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn()>);

impl EventHandler {
	/// Wraps a closure as an attachable event handler.
	pub fn new<F>(f: F) -> Self
	where
		F: Fn() + 'static,
	{
		Self(Rc::new(f))
	}

	/// Invokes the handler.
	pub fn call(&self) {
		(self.0)()
	}

	/// Identity comparison; the only equality handlers have.
	pub fn same(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl PartialEq for EventHandler {
	fn eq(&self, other: &Self) -> bool {
		self.same(other)
	}
}

impl fmt::Debug for EventHandler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0))
	}
}

/// A single property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
	/// Plain text attribute value.
	Text(String),
	/// Boolean attribute (present/absent semantics are the platform's call).
	Bool(bool),
	/// Numeric attribute value.
	Number(f64),
	/// Event handler; attached/detached, never value-diffed.
	Handler(EventHandler),
}

impl PropValue {
	/// Whether this value is an event handler.
	pub fn is_handler(&self) -> bool {
		matches!(self, Self::Handler(_))
	}
}

impl From<&str> for PropValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for PropValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<bool> for PropValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for PropValue {
	fn from(value: i64) -> Self {
		Self::Number(value as f64)
	}
}

impl From<f64> for PropValue {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl From<EventHandler> for PropValue {
	fn from(value: EventHandler) -> Self {
		Self::Handler(value)
	}
}

/// Insertion-ordered property mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props(IndexMap<String, PropValue>);

impl Props {
	/// Creates an empty prop map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a prop, replacing any previous value under the same name.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
		self.0.insert(name.into(), value.into());
	}

	/// Looks up a prop by name.
	pub fn get(&self, name: &str) -> Option<&PropValue> {
		self.0.get(name)
	}

	/// Returns the text payload of a prop, if it is text.
	pub fn get_text(&self, name: &str) -> Option<&str> {
		match self.0.get(name) {
			Some(PropValue::Text(text)) => Some(text),
			_ => None,
		}
	}

	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Iterates props in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
		self.0.iter().map(|(name, value)| (name.as_str(), value))
	}

	/// Removes a prop and returns its value.
	pub fn remove(&mut self, name: &str) -> Option<PropValue> {
		self.0.shift_remove(name)
	}

	/// Merges `other` into `self`; values from `other` win on collision.
	pub fn merge(&mut self, other: &Props) {
		for (name, value) in other.iter() {
			self.0.insert(name.to_string(), value.clone());
		}
	}
}

impl FromIterator<(String, PropValue)> for Props {
	fn from_iter<I: IntoIterator<Item = (String, PropValue)>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_props_preserve_insertion_order() {
		let mut props = Props::new();
		props.insert("class", "box");
		props.insert("id", "main");
		props.insert("title", "hello");

		let names: Vec<&str> = props.iter().map(|(name, _)| name).collect();
		assert_eq!(names, vec!["class", "id", "title"]);
	}

	#[test]
	fn test_handler_identity_equality() {
		let a = EventHandler::new(|| {});
		let b = a.clone();
		let c = EventHandler::new(|| {});

		assert_eq!(a, b);
		assert_ne!(a, c);
	}

	#[test]
	fn test_merge_later_values_win() {
		let mut base = Props::new();
		base.insert("class", "a");
		base.insert("id", "x");

		let mut patch = Props::new();
		patch.insert("class", "b");

		base.merge(&patch);
		assert_eq!(base.get_text("class"), Some("b"));
		assert_eq!(base.get_text("id"), Some("x"));
	}
}
