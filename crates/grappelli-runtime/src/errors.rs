//! Error taxonomy and the ancestor capture chain.
//!
//! Every user-supplied callback (render, setup, lifecycle hooks, watchers)
//! runs through [`call_with_error_handling`]. On failure the error walks the
//! failing instance's ancestor chain, giving each registered capture hook
//! first refusal; an unhandled error lands in the process-wide reporter.
//! Scheduler overflow bypasses capture entirely, since the capture machinery
//! itself may be what is looping.

use core::cell::RefCell;
use std::rc::Rc;

use grappelli_scheduler::SchedulerError;
use grappelli_vdom::BoxError;

use crate::instance::{ComponentInstance, HookKind};
use crate::platform::PlatformError;

/// Everything that can go wrong inside the runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
	#[error("render function of component `{component}` failed: {error}")]
	Render { component: String, error: BoxError },

	#[error("setup of component `{component}` failed: {error}")]
	Setup { component: String, error: BoxError },

	#[error("{hook} hook of component `{component}` failed: {error}")]
	LifecycleHook {
		hook: HookKind,
		component: String,
		error: BoxError,
	},

	#[error("watcher callback failed: {error}")]
	Watcher { error: BoxError },

	/// Fatal: the recursion guard tripped. Never routed through capture
	/// hooks.
	#[error(transparent)]
	SchedulerOverflow(#[from] SchedulerError),

	#[error(transparent)]
	Adapter(#[from] PlatformError),

	/// A patch target was never mounted or has lost its host annotation.
	#[error("`{node}` has no host node to patch against")]
	MissingHost { node: String },
}

/// Verdict returned by an `error_captured` hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
	/// The hook dealt with the error; the walk stops here.
	Handled,
	/// Keep walking up the ancestor chain.
	Propagate,
}

/// Which kind of user callback produced a failure.
#[derive(Debug, Clone, Copy)]
pub enum ErrorSource {
	Setup,
	Render,
	Hook(HookKind),
	Watcher,
}

type ErrorReporter = Rc<dyn Fn(&RuntimeError)>;

thread_local! {
	static REPORTER: RefCell<Option<ErrorReporter>> = const { RefCell::new(None) };
}

/// Installs the process-wide unhandled-error reporter. The default logs
/// through `tracing::error!`.
pub fn set_error_handler<F>(handler: F)
where
	F: Fn(&RuntimeError) + 'static,
{
	REPORTER.with(|reporter| {
		*reporter.borrow_mut() = Some(Rc::new(handler));
	});
}

/// Restores the default reporter. Used by tests for isolation.
pub fn reset_error_handler() {
	REPORTER.with(|reporter| {
		*reporter.borrow_mut() = None;
	});
}

pub(crate) fn report_unhandled(error: &RuntimeError) {
	let reporter = REPORTER.with(|reporter| reporter.borrow().clone());
	match reporter {
		Some(reporter) => reporter(error),
		None => tracing::error!(error = %error, "unhandled runtime error"),
	}
}

/// Invokes `f`, routing any failure through the capture chain.
///
/// Returns `None` on failure; the calling operation aborts at that point.
/// Host mutations already applied are left as-is, never rolled back.
pub fn call_with_error_handling<T, F>(
	f: F,
	instance: Option<&ComponentInstance>,
	source: ErrorSource,
) -> Option<T>
where
	F: FnOnce() -> Result<T, BoxError>,
{
	match f() {
		Ok(value) => Some(value),
		Err(error) => {
			let component = instance
				.map(|i| i.name().to_string())
				.unwrap_or_else(|| String::from("<root>"));
			let error = match source {
				ErrorSource::Setup => RuntimeError::Setup { component, error },
				ErrorSource::Render => RuntimeError::Render { component, error },
				ErrorSource::Hook(hook) => RuntimeError::LifecycleHook {
					hook,
					component,
					error,
				},
				ErrorSource::Watcher => RuntimeError::Watcher { error },
			};
			handle_error(&error, instance);
			None
		}
	}
}

/// Walks `origin`'s ancestors, offering the error to each instance's
/// capture hooks in registration order. The first [`CaptureOutcome::Handled`]
/// stops the walk; otherwise the error reaches the process-wide reporter.
pub fn handle_error(error: &RuntimeError, origin: Option<&ComponentInstance>) {
	if matches!(error, RuntimeError::SchedulerOverflow(_)) {
		report_unhandled(error);
		return;
	}
	let mut cursor = origin.and_then(ComponentInstance::parent);
	while let Some(instance) = cursor {
		for hook in instance.error_hooks() {
			if hook(error) == CaptureOutcome::Handled {
				tracing::debug!(component = instance.name(), "error captured by ancestor");
				return;
			}
		}
		cursor = instance.parent();
	}
	report_unhandled(error);
}
