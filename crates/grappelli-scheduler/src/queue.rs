//! The flush loop and its queues.

use core::cell::{Cell, RefCell};
use core::pin::Pin;
use core::task::{Context, Poll};
use std::collections::HashMap;
use std::rc::Rc;

use futures::channel::oneshot;

use crate::job::{Job, JobId};

/// How many times one job identity may re-trigger itself within a single
/// flush cycle before the scheduler declares an infinite update loop.
pub const RECURSION_LIMIT: u32 = 100;

/// Fatal scheduler failures.
///
/// An infinite update loop means the capture-hook machinery itself might be
/// the thing looping, so this error always surfaces to the process-wide
/// handler and is never routed through component error capture.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
	#[error(
		"job {job_id} re-triggered itself more than {limit} times in one flush; \
		 assuming an infinite update loop and dropping the job"
	)]
	InfiniteUpdateLoop { job_id: u64, limit: u32 },
}

type TickSpawner = Rc<dyn Fn(Box<dyn FnOnce()>)>;
type OverflowHandler = Rc<dyn Fn(&SchedulerError)>;

enum Waiter {
	Sender(oneshot::Sender<()>),
	Callback(Box<dyn FnOnce()>),
}

#[derive(Default)]
struct Scheduler {
	queue: RefCell<Vec<Job>>,
	pre_cbs: RefCell<Vec<Job>>,
	post_cbs: RefCell<Vec<Job>>,
	is_flushing: Cell<bool>,
	is_flush_pending: Cell<bool>,
	/// Identity of the job currently executing, for recursion gating.
	current_job: Cell<Option<JobId>>,
	/// Per-identity trigger counts within the current flush cycle.
	flush_counts: RefCell<HashMap<JobId, u32>>,
	waiters: RefCell<Vec<Waiter>>,
	spawner: RefCell<Option<TickSpawner>>,
	overflow_handler: RefCell<Option<OverflowHandler>>,
}

thread_local! {
	static SCHEDULER: Scheduler = Scheduler::default();
}

fn with_scheduler<F, R>(f: F) -> R
where
	F: FnOnce(&Scheduler) -> R,
{
	SCHEDULER.with(f)
}

/// Enqueues a component update job (or any main-queue work).
///
/// A job identity already pending in the main queue is absorbed; a job
/// re-queueing itself while running is accepted only when it was built with
/// [`Job::allow_recurse`]. The first call in an idle state schedules a
/// flush.
pub fn queue_job(job: Job) {
	with_scheduler(|s| {
		if s.current_job.get() == Some(job.id()) && !job.recurse_allowed() {
			return;
		}
		{
			let mut queue = s.queue.borrow_mut();
			if queue.iter().any(|pending| pending.id() == job.id()) {
				return;
			}
			queue.push(job);
		}
		ensure_flush(s);
	});
}

/// Enqueues work to run before the next batch of host mutations.
pub fn queue_pre_flush_cb(job: Job) {
	with_scheduler(|s| {
		{
			let mut pre = s.pre_cbs.borrow_mut();
			if pre.iter().any(|pending| pending.id() == job.id()) {
				return;
			}
			pre.push(job);
		}
		ensure_flush(s);
	});
}

/// Enqueues work to run after the host tree is consistent (mounted/updated
/// hooks, transition bookkeeping). Deduplicated by identity.
pub fn queue_post_flush_cb(job: Job) {
	with_scheduler(|s| {
		{
			let mut post = s.post_cbs.borrow_mut();
			if post.iter().any(|pending| pending.id() == job.id()) {
				return;
			}
			post.push(job);
		}
		ensure_flush(s);
	});
}

/// Drops a pending main-queue job. Used when a parent re-render already
/// covered a child's update: the child's stale job must not run against a
/// replaced or destroyed instance.
pub fn invalidate_job(id: JobId) {
	with_scheduler(|s| {
		s.queue.borrow_mut().retain(|job| job.id() != id);
	});
}

fn ensure_flush(s: &Scheduler) {
	if s.is_flushing.get() || s.is_flush_pending.get() {
		return;
	}
	s.is_flush_pending.set(true);
	let spawner = s.spawner.borrow().clone();
	if let Some(spawner) = spawner {
		spawner(Box::new(flush_jobs));
	}
	// Without a spawner the flush stays pending until `flush_jobs` is
	// called manually in the test-harness configuration.
}

/// Installs the tick hook used to defer flushes to the next
/// microtask-equivalent boundary (e.g. `spawn_local` on a wasm host).
pub fn set_tick_spawner<F>(spawner: F)
where
	F: Fn(Box<dyn FnOnce()>) + 'static,
{
	with_scheduler(|s| {
		*s.spawner.borrow_mut() = Some(Rc::new(spawner));
	});
}

/// Replaces the process-wide recursion-overflow reporter. The default logs
/// through `tracing::error!`.
pub fn set_overflow_handler<F>(handler: F)
where
	F: Fn(&SchedulerError) + 'static,
{
	with_scheduler(|s| {
		*s.overflow_handler.borrow_mut() = Some(Rc::new(handler));
	});
}

fn report_overflow(error: &SchedulerError) {
	let handler = with_scheduler(|s| s.overflow_handler.borrow().clone());
	match handler {
		Some(handler) => handler(error),
		None => tracing::error!(error = %error, "scheduler recursion guard tripped"),
	}
}

/// Drains all queues in pre → main → post order.
///
/// Re-entrant calls while a flush is active are no-ops; the in-progress
/// flush picks up whatever was queued meanwhile. Jobs run ascending by id
/// and are removed from their queue just before execution. When post-flush
/// work queues more jobs, the loop runs another full cycle before the
/// flush (and any [`next_tick`] waiter) completes.
pub fn flush_jobs() {
	let reentrant = with_scheduler(|s| {
		if s.is_flushing.get() {
			return true;
		}
		s.is_flushing.set(true);
		s.is_flush_pending.set(false);
		false
	});
	if reentrant {
		return;
	}

	// Each cycle drains pre, main, then post to exhaustion. Work queued
	// into an earlier phase while a later one is running (e.g. a main job
	// queueing a pre-flush callback) waits for the next cycle, so it still
	// runs in phase order, after this cycle's post callbacks.
	loop {
		flush_queue_ordered(|s| &s.pre_cbs);
		flush_queue_ordered(|s| &s.queue);
		flush_queue_ordered(|s| &s.post_cbs);

		let drained = with_scheduler(|s| {
			s.pre_cbs.borrow().is_empty()
				&& s.queue.borrow().is_empty()
				&& s.post_cbs.borrow().is_empty()
		});
		if drained {
			break;
		}
		tracing::trace!("post-flush work queued more jobs; running another cycle");
	}

	let waiters = with_scheduler(|s| {
		s.is_flushing.set(false);
		s.flush_counts.borrow_mut().clear();
		std::mem::take(&mut *s.waiters.borrow_mut())
	});
	for waiter in waiters {
		match waiter {
			Waiter::Sender(sender) => {
				let _ = sender.send(());
			}
			Waiter::Callback(callback) => callback(),
		}
	}
}

/// Runs one queue to exhaustion in ascending-id order.
fn flush_queue_ordered<F>(select: F)
where
	F: Fn(&Scheduler) -> &RefCell<Vec<Job>>,
{
	loop {
		let (job, overflow) = with_scheduler(|s| {
			let next = {
				let mut queue = select(s).borrow_mut();
				if queue.is_empty() {
					return (None, None);
				}
				queue.sort_by_key(Job::id);
				queue.remove(0)
			};
			let mut counts = s.flush_counts.borrow_mut();
			let count = counts.entry(next.id()).or_insert(0);
			*count += 1;
			if *count > RECURSION_LIMIT {
				// Drop the job instead of running it again.
				let error = SchedulerError::InfiniteUpdateLoop {
					job_id: next.id().raw(),
					limit: RECURSION_LIMIT,
				};
				return (None, Some(error));
			}
			s.current_job.set(Some(next.id()));
			(Some(next), None)
		});
		if let Some(error) = overflow {
			// Reported outside the queue borrow so the handler may itself
			// queue work.
			report_overflow(&error);
			continue;
		}
		match job {
			None => break,
			Some(job) => {
				job.invoke();
				with_scheduler(|s| s.current_job.set(None));
			}
		}
	}
}

/// Completion future returned by [`next_tick`]. Resolves once the current
/// (or next) flush, including chained re-flush cycles, has finished.
pub struct NextTick(Option<oneshot::Receiver<()>>);

impl Future for NextTick {
	type Output = ();

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match self.0.as_mut() {
			None => Poll::Ready(()),
			Some(receiver) => match Pin::new(receiver).poll(cx) {
				// A torn-down scheduler counts as "flush finished".
				Poll::Ready(_) => Poll::Ready(()),
				Poll::Pending => Poll::Pending,
			},
		}
	}
}

/// Returns a completion signal for "the host tree reflects the latest
/// state". Resolves immediately when nothing is pending.
pub fn next_tick() -> NextTick {
	with_scheduler(|s| {
		if scheduler_idle(s) {
			return NextTick(None);
		}
		let (sender, receiver) = oneshot::channel();
		s.waiters.borrow_mut().push(Waiter::Sender(sender));
		NextTick(Some(receiver))
	})
}

/// Callback flavor of [`next_tick`]. Runs `callback` after the current (or
/// next) flush finishes; immediately when nothing is pending.
pub fn on_next_tick<F>(callback: F)
where
	F: FnOnce() + 'static,
{
	let settled = with_scheduler(move |s| {
		if scheduler_idle(s) {
			return Some(callback);
		}
		s.waiters.borrow_mut().push(Waiter::Callback(Box::new(callback)));
		None
	});
	if let Some(callback) = settled {
		// Nothing pending; the tree is already settled.
		callback();
	}
}

fn scheduler_idle(s: &Scheduler) -> bool {
	!s.is_flushing.get()
		&& !s.is_flush_pending.get()
		&& s.queue.borrow().is_empty()
		&& s.pre_cbs.borrow().is_empty()
		&& s.post_cbs.borrow().is_empty()
}

/// Flushes whatever is pending, then clears all scheduler state, including
/// the tick spawner and overflow handler. Test-run isolation entry point.
pub fn reset_scheduler() {
	flush_jobs();
	with_scheduler(|s| {
		s.queue.borrow_mut().clear();
		s.pre_cbs.borrow_mut().clear();
		s.post_cbs.borrow_mut().clear();
		s.is_flushing.set(false);
		s.is_flush_pending.set(false);
		s.current_job.set(None);
		s.flush_counts.borrow_mut().clear();
		s.waiters.borrow_mut().clear();
		*s.spawner.borrow_mut() = None;
		*s.overflow_handler.borrow_mut() = None;
	});
}
