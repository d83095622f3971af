//! Lifecycle hook registration.
//!
//! These free functions register hooks on the instance currently running
//! its setup (or render) phase. Calling one outside a component is a
//! logged no-op, not an error.

use std::rc::Rc;

use grappelli_vdom::BoxError;

use crate::errors::{CaptureOutcome, RuntimeError};
use crate::instance::{HookKind, current_instance};

fn register<F>(kind: HookKind, hook: F)
where
	F: Fn() -> Result<(), BoxError> + 'static,
{
	match current_instance() {
		Some(instance) => instance.register_hook(kind, Rc::new(hook)),
		None => {
			tracing::warn!(hook = %kind, "lifecycle hook registered outside component setup; ignored");
		}
	}
}

/// Runs before the component's first render is patched into the host tree.
pub fn on_before_mount<F>(hook: F)
where
	F: Fn() -> Result<(), BoxError> + 'static,
{
	register(HookKind::BeforeMount, hook);
}

/// Runs post-flush, once the component's host nodes are in the tree.
pub fn on_mounted<F>(hook: F)
where
	F: Fn() -> Result<(), BoxError> + 'static,
{
	register(HookKind::Mounted, hook);
}

/// Runs just before a re-render is patched.
pub fn on_before_update<F>(hook: F)
where
	F: Fn() -> Result<(), BoxError> + 'static,
{
	register(HookKind::BeforeUpdate, hook);
}

/// Runs post-flush after a re-render's host mutations are applied.
pub fn on_updated<F>(hook: F)
where
	F: Fn() -> Result<(), BoxError> + 'static,
{
	register(HookKind::Updated, hook);
}

pub fn on_before_unmount<F>(hook: F)
where
	F: Fn() -> Result<(), BoxError> + 'static,
{
	register(HookKind::BeforeUnmount, hook);
}

/// Runs post-flush after the component's host nodes are gone.
pub fn on_unmounted<F>(hook: F)
where
	F: Fn() -> Result<(), BoxError> + 'static,
{
	register(HookKind::Unmounted, hook);
}

/// Keep-alive reinsertion; fires instead of `mounted` on reactivation.
pub fn on_activated<F>(hook: F)
where
	F: Fn() -> Result<(), BoxError> + 'static,
{
	register(HookKind::Activated, hook);
}

/// Keep-alive removal; fires instead of `unmounted` on deactivation.
pub fn on_deactivated<F>(hook: F)
where
	F: Fn() -> Result<(), BoxError> + 'static,
{
	register(HookKind::Deactivated, hook);
}

/// Registers an error-capture hook: this component gets first refusal on
/// any error raised by a descendant. Returning
/// [`CaptureOutcome::Handled`] stops the walk.
pub fn on_error_captured<F>(hook: F)
where
	F: Fn(&RuntimeError) -> CaptureOutcome + 'static,
{
	match current_instance() {
		Some(instance) => instance.register_error_hook(Rc::new(hook)),
		None => {
			tracing::warn!("error_captured hook registered outside component setup; ignored");
		}
	}
}
