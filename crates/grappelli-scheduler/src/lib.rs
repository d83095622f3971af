//! Batched update scheduling for Grappelli
//!
//! The scheduler is the process-wide (per rendering thread) queue that turns
//! bursts of reactive invalidations into exactly one coherent update pass
//! per tick. Component re-renders, pre-DOM-write watchers, and
//! after-DOM-write lifecycle callbacks all flow through it.
//!
//! ## Ordering model
//!
//! One **flush** drains three queues in order:
//!
//! 1. pre-flush callbacks (work that must observe state *before* host
//!    mutations, e.g. `watch_effect` re-runs),
//! 2. the main queue (component update jobs), ascending by job id. Ids are
//!    allocated in instance-creation order, so ancestors always run before
//!    descendants,
//! 3. post-flush callbacks (mounted/updated hooks, work that must observe
//!    the settled host tree).
//!
//! A job is removed from its queue just before execution, so a job that
//! re-queues itself while running is picked up by the *next* pass of the
//! same flush. A job identity is pending at most once per queue at a time.
//!
//! ## Coalescing
//!
//! The first `queue_job` in an idle state schedules a flush through the
//! installed tick spawner (a microtask-equivalent hook); every further call
//! before that flush runs is absorbed into it. Without a spawner installed
//! (the test configuration), flushes are driven manually with
//! [`flush_jobs`].

mod job;
mod queue;

pub use job::{Job, JobId};
pub use queue::{
	NextTick, RECURSION_LIMIT, SchedulerError, flush_jobs, invalidate_job, next_tick,
	on_next_tick, queue_job, queue_post_flush_cb, queue_pre_flush_cb, reset_scheduler,
	set_overflow_handler, set_tick_spawner,
};
