//! Component runtime and reconciler for Grappelli
//!
//! This crate turns virtual trees into host mutations and keeps them in
//! sync as reactive state changes. It hosts the reconciler (`Renderer`),
//! component instances with their lifecycle and update cycle, slots and
//! provide/inject context, error capture, the structural components
//! (teleport, keep-alive, suspense), and the `App` root surface.
//!
//! ## Update cycle
//!
//! Each mounted component owns one reactive effect wrapping its render
//! function. A write to tracked state does not re-render inline: the
//! effect's scheduler override queues the instance's update job, and the
//! scheduler flush re-renders once per instance per tick, parents before
//! children. The new tree is then diffed against the previous one and only
//! the differences reach the [`Platform`] adapter.
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use grappelli_runtime::create_app;
//! use grappelli_testkit::MockDom;
//! use grappelli_vdom::{ComponentDef, element};
//!
//! let hello = ComponentDef::new("hello", |_, _| {
//! 	Ok(element("p").text("hello").build())
//! });
//! let dom = MockDom::new();
//! let root = dom.create_root();
//! let app = create_app(dom.clone(), hello);
//! app.mount(root).unwrap();
//! assert_eq!(dom.render_to_string(root), "<p>hello</p>");
//! ```

mod app;
mod builtins;
mod context;
mod errors;
mod instance;
mod lifecycle;
mod platform;
mod renderer;
mod watch;

pub use app::{App, create_app};
pub use builtins::{SuspenseDep, register_async_dep};
pub use context::{inject, inject_or, provide};
pub use errors::{
	CaptureOutcome, ErrorSource, RuntimeError, call_with_error_handling, handle_error,
	reset_error_handler, set_error_handler,
};
pub use instance::{ComponentInstance, HookKind, current_instance, with_current_instance};
pub use lifecycle::{
	on_activated, on_before_mount, on_before_unmount, on_before_update, on_deactivated,
	on_error_captured, on_mounted, on_unmounted, on_updated,
};
pub use platform::{Platform, PlatformError};
pub use renderer::Renderer;
pub use watch::{WatchHandle, watch_effect};
