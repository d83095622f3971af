//! # Grappelli
//!
//! A platform-agnostic reactive UI runtime: virtual node trees, keyed
//! reconciliation, signal-driven updates, and batched flush scheduling.
//!
//! The workspace crates are re-exported here under stable paths:
//!
//! - [`vdom`]: virtual node types, props, children normalization, builders
//! - [`reactive`]: signals, effects, dependency tracking
//! - [`scheduler`]: the batched flush queue and `next_tick`
//! - [`runtime`]: the renderer, component instances, lifecycle hooks,
//!   provide/inject, error capture, and the structural components
//!   (teleport, keep-alive, suspense)
//! - [`testkit`] (feature `testkit`, on by default): an in-memory host
//!   platform with a mutation-op log, for tests and examples
//!
//! ## Quick start
//!
//! ```
//! use grappelli::prelude::*;
//! use grappelli::testkit::MockDom;
//!
//! let hello = ComponentDef::new("hello", |_, _| {
//! 	Ok(element("p").text("hello").build())
//! });
//!
//! let dom = MockDom::new();
//! let root = dom.create_root();
//! let app = create_app(dom.clone(), hello);
//! app.mount(root).unwrap();
//! assert_eq!(dom.render_to_string(root), "<p>hello</p>");
//! ```

pub use grappelli_reactive as reactive;
pub use grappelli_runtime as runtime;
pub use grappelli_scheduler as scheduler;
#[cfg(feature = "testkit")]
pub use grappelli_testkit as testkit;
pub use grappelli_vdom as vdom;

/// Everything a typical application needs in scope.
pub mod prelude {
	pub use grappelli_reactive::{Effect, Signal};
	pub use grappelli_runtime::{
		App, CaptureOutcome, ComponentInstance, Platform, PlatformError, Renderer, RuntimeError,
		SuspenseDep, WatchHandle, create_app, current_instance, inject, inject_or, on_activated,
		on_before_mount, on_before_unmount, on_before_update, on_deactivated, on_error_captured,
		on_mounted, on_unmounted, on_updated, provide, register_async_dep, set_error_handler,
		watch_effect,
	};
	pub use grappelli_scheduler::{flush_jobs, next_tick};
	pub use grappelli_vdom::{
		Children, ComponentDef, EventHandler, HostId, Key, PatchFlag, PropValue, Props, Slots,
		VNode, comment, element, fragment, text,
	};
}
