//! Scheduler jobs.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::rc::Rc;

/// Total order key and identity of a job.
///
/// Component update jobs reuse their instance's uid, which is allocated in
/// creation order. A parent's id is always lower than any descendant's, so
/// ascending-id flushes run ancestors first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(u64);

impl JobId {
	/// Allocates a fresh id for standalone jobs (watchers, post callbacks).
	pub fn next() -> Self {
		static COUNTER: AtomicU64 = AtomicU64::new(1 << 32);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}

	/// Wraps an externally allocated ordering key (component uids).
	pub fn from_raw(raw: u64) -> Self {
		Self(raw)
	}

	pub fn raw(self) -> u64 {
		self.0
	}
}

/// A deduplicated, identity-tracked unit of deferred work.
#[derive(Clone)]
pub struct Job {
	id: JobId,
	allow_recurse: bool,
	callback: Rc<dyn Fn()>,
}

impl Job {
	pub fn new<F>(id: JobId, callback: F) -> Self
	where
		F: Fn() + 'static,
	{
		Self {
			id,
			allow_recurse: false,
			callback: Rc::new(callback),
		}
	}

	/// Allows the job to re-queue itself while it is running. Component
	/// update jobs need this: their own effect can be re-triggered by state
	/// they write during render.
	pub fn allow_recurse(mut self) -> Self {
		self.allow_recurse = true;
		self
	}

	pub fn id(&self) -> JobId {
		self.id
	}

	pub fn recurse_allowed(&self) -> bool {
		self.allow_recurse
	}

	pub(crate) fn invoke(&self) {
		(self.callback)()
	}
}

impl fmt::Debug for Job {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Job")
			.field("id", &self.id)
			.field("allow_recurse", &self.allow_recurse)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_job_ids_allocate_increasing() {
		let a = JobId::next();
		let b = JobId::next();
		assert!(a < b);
	}

	#[test]
	fn test_raw_ids_order_before_allocated_ones() {
		// Component uids start at zero; standalone ids live above 2^32 so
		// they never interleave with instance ordering.
		let component = JobId::from_raw(17);
		let standalone = JobId::next();
		assert!(component < standalone);
	}
}
