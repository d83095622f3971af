//! Provide / inject.
//!
//! Context is a chained mapping. `provide` writes into the current
//! instance's own map; `inject` walks from the requesting instance up
//! through its ancestors until a value is found. Each instance's map is
//! local, so a provide never leaks sideways or upward.

use std::any::Any;
use std::rc::Rc;

use crate::instance::current_instance;

/// Makes `value` injectable by every descendant of the current component.
/// Outside a component this is a logged no-op.
pub fn provide<T: 'static>(key: impl Into<String>, value: T) {
	match current_instance() {
		Some(instance) => instance.provide_value(key, Rc::new(value)),
		None => {
			tracing::warn!("provide called outside component setup; ignored");
		}
	}
}

/// Looks `key` up along the ancestor chain, nearest provider first.
/// `None` when no ancestor provided the key or the provided value has a
/// different type.
pub fn inject<T: 'static>(key: &str) -> Option<Rc<T>> {
	let value = current_instance()?.inject_value(key)?;
	match value.downcast::<T>() {
		Ok(value) => Some(value),
		Err(_) => {
			tracing::warn!(key, "injected value has an unexpected type");
			None
		}
	}
}

/// Like [`inject`], but falls back to `default` when the chain has no
/// provider for `key`.
pub fn inject_or<T: 'static>(key: &str, default: T) -> Rc<T> {
	inject(key).unwrap_or_else(|| Rc::new(default))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serial_test::serial;

	#[test]
	#[serial]
	fn test_inject_outside_component_is_none() {
		assert!(inject::<String>("anything").is_none());
	}

	#[test]
	#[serial]
	fn test_inject_or_falls_back() {
		let theme = inject_or("theme", String::from("light"));
		assert_eq!(theme.as_str(), "light");
	}
}
