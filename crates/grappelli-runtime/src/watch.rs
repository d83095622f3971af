//! Reactive watchers.
//!
//! `watch_effect` re-runs a fallible closure whenever a signal it read
//! changes, scheduled pre-flush so watchers observe state *before* the
//! same flush's host mutations. Failures are routed through the owning
//! component's capture chain as watcher errors.

use core::cell::RefCell;
use std::rc::Rc;

use grappelli_reactive::Effect;
use grappelli_scheduler::{Job, JobId, queue_pre_flush_cb};
use grappelli_vdom::BoxError;

use crate::errors::{ErrorSource, call_with_error_handling};
use crate::instance::current_instance;

/// Keeps a watcher alive. Dropping the handle (or calling
/// [`stop`](WatchHandle::stop)) detaches it from the dependency graph.
pub struct WatchHandle {
	effect: Rc<RefCell<Option<Effect>>>,
}

impl WatchHandle {
	pub fn stop(&self) {
		if let Some(effect) = self.effect.borrow_mut().take() {
			effect.stop();
		}
	}
}

impl Drop for WatchHandle {
	fn drop(&mut self) {
		self.stop();
	}
}

/// Runs `f` immediately with dependency tracking, then re-runs it on every
/// change to a signal it read. Re-runs go through the scheduler's pre-flush
/// queue, so a burst of writes in one tick produces a single re-run.
pub fn watch_effect<F>(f: F) -> WatchHandle
where
	F: Fn() -> Result<(), BoxError> + 'static,
{
	// The owning component at creation time anchors error routing.
	let owner = current_instance();
	let body = move || {
		call_with_error_handling(&f, owner.as_deref(), ErrorSource::Watcher);
	};

	// The job and the effect reference each other; the shared slot breaks
	// the cycle at construction time.
	let slot: Rc<RefCell<Option<Effect>>> = Rc::new(RefCell::new(None));
	let job_slot = slot.clone();
	let job = Job::new(JobId::next(), move || {
		if let Some(effect) = &*job_slot.borrow() {
			effect.run();
		}
	});
	let effect = Effect::with_scheduler(body, move || queue_pre_flush_cb(job.clone()));
	*slot.borrow_mut() = Some(effect);

	WatchHandle { effect: slot }
}
