//! Reactive effects.
//!
//! An effect wraps a closure, runs it with dependency tracking active, and
//! re-runs it whenever a tracked signal changes. Re-runs happen inline by
//! default; installing a *scheduler override* redirects them through an
//! external queue instead. Component instances use this single slot to
//! batch their re-renders through the job scheduler.

use core::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::runtime::{NodeId, try_with_runtime, with_runtime};

type EffectFn = Rc<dyn Fn()>;
type SchedulerFn = Rc<dyn Fn()>;

struct EffectEntry {
	run: EffectFn,
	scheduler: Option<SchedulerFn>,
}

thread_local! {
	static EFFECTS: RefCell<BTreeMap<NodeId, EffectEntry>> = RefCell::new(BTreeMap::new());
}

/// A unit of tracked work that re-runs when its dependencies change.
///
/// Dropping or [`stop`](Effect::stop)ping an effect removes it from the
/// dependency graph; any notification that was already routed to it becomes
/// a no-op.
pub struct Effect {
	id: NodeId,
	stopped: Rc<Cell<bool>>,
}

impl Effect {
	/// Creates an effect that runs `f` immediately and re-runs it inline on
	/// every change to a signal read during the previous run.
	pub fn new<F>(f: F) -> Self
	where
		F: Fn() + 'static,
	{
		Self::build(f, None)
	}

	/// Creates an effect whose re-runs are redirected through `scheduler`
	/// instead of running inline. The initial run still happens here,
	/// synchronously, so first-render dependencies get tracked.
	pub fn with_scheduler<F, S>(f: F, scheduler: S) -> Self
	where
		F: Fn() + 'static,
		S: Fn() + 'static,
	{
		Self::build(f, Some(Rc::new(scheduler)))
	}

	fn build<F>(f: F, scheduler: Option<SchedulerFn>) -> Self
	where
		F: Fn() + 'static,
	{
		let id = NodeId::new();
		let stopped = Rc::new(Cell::new(false));

		let stopped_guard = stopped.clone();
		let run: EffectFn = Rc::new(move || {
			if !stopped_guard.get() {
				f();
			}
		});

		EFFECTS.with(|effects| {
			effects.borrow_mut().insert(id, EffectEntry { run, scheduler });
		});

		execute(id);
		Self { id, stopped }
	}

	pub fn id(&self) -> NodeId {
		self.id
	}

	/// Re-runs the effect now, with tracking. This is what a scheduler
	/// override should eventually call from its queue.
	pub fn run(&self) {
		execute(self.id);
	}

	/// Detaches the effect: no further tracking, no further re-runs.
	pub fn stop(&self) {
		self.stopped.set(true);
		let _ = try_with_runtime(|rt| rt.remove_node(self.id));
		let _ = EFFECTS.try_with(|effects| {
			effects.borrow_mut().remove(&self.id);
		});
	}
}

impl Drop for Effect {
	fn drop(&mut self) {
		self.stop();
	}
}

/// Runs a registered effect with tracking. Old dependencies are cleared
/// first so each run subscribes to exactly the signals it actually read.
///
/// The entry is cloned out of the registry before the call: effects create
/// other effects (a component render mounts child components), so no
/// registry borrow may be held across the user closure.
fn execute(id: NodeId) {
	let run = EFFECTS.with(|effects| effects.borrow().get(&id).map(|entry| entry.run.clone()));
	let Some(run) = run else {
		return;
	};

	with_runtime(|rt| {
		rt.clear_dependencies(id);
		rt.push_observer(id);
	});
	run();
	with_runtime(|rt| {
		rt.pop_observer();
	});
}

/// Dispatches a signal change to its subscribers: scheduled effects go
/// through their override, everything else re-runs inline.
pub(crate) fn trigger(signal_id: NodeId) {
	let subscribers = with_runtime(|rt| rt.subscribers_of(signal_id));
	for effect_id in subscribers {
		let scheduler = EFFECTS
			.with(|effects| effects.borrow().get(&effect_id).map(|entry| entry.scheduler.clone()))
			.flatten();
		match scheduler {
			Some(scheduler) => scheduler(),
			None => execute(effect_id),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::signal::Signal;
	use serial_test::serial;

	#[test]
	#[serial]
	fn test_effect_runs_immediately() {
		let runs = Rc::new(Cell::new(0));
		let runs_in_effect = runs.clone();
		let _effect = Effect::new(move || {
			runs_in_effect.set(runs_in_effect.get() + 1);
		});
		assert_eq!(runs.get(), 1);
	}

	#[test]
	#[serial]
	fn test_effect_reruns_inline_on_change() {
		let count = Signal::new(0);
		let seen = Rc::new(RefCell::new(Vec::new()));

		let seen_in_effect = seen.clone();
		let count_in_effect = count.clone();
		let _effect = Effect::new(move || {
			seen_in_effect.borrow_mut().push(count_in_effect.get());
		});

		count.set(10);
		count.set(20);
		assert_eq!(*seen.borrow(), vec![0, 10, 20]);
	}

	#[test]
	#[serial]
	fn test_scheduler_override_redirects_reruns() {
		let count = Signal::new(0);
		let runs = Rc::new(Cell::new(0));
		let scheduled = Rc::new(Cell::new(0));

		let runs_in_effect = runs.clone();
		let count_in_effect = count.clone();
		let scheduled_in_override = scheduled.clone();
		let effect = Effect::with_scheduler(
			move || {
				let _ = count_in_effect.get();
				runs_in_effect.set(runs_in_effect.get() + 1);
			},
			move || {
				scheduled_in_override.set(scheduled_in_override.get() + 1);
			},
		);

		// Initial run happened, nothing scheduled yet.
		assert_eq!((runs.get(), scheduled.get()), (1, 0));

		// Writes only schedule; the effect body does not re-run.
		count.set(1);
		count.set(2);
		assert_eq!((runs.get(), scheduled.get()), (1, 2));

		// The queue owner eventually runs the effect.
		effect.run();
		assert_eq!(runs.get(), 2);
	}

	#[test]
	#[serial]
	fn test_stopped_effect_ignores_changes() {
		let count = Signal::new(0);
		let runs = Rc::new(Cell::new(0));

		let runs_in_effect = runs.clone();
		let count_in_effect = count.clone();
		let effect = Effect::new(move || {
			let _ = count_in_effect.get();
			runs_in_effect.set(runs_in_effect.get() + 1);
		});

		effect.stop();
		count.set(5);
		assert_eq!(runs.get(), 1);
	}

	#[test]
	#[serial]
	fn test_dependencies_reset_each_run() {
		let gate = Signal::new(true);
		let a = Signal::new(0);
		let b = Signal::new(0);
		let runs = Rc::new(Cell::new(0));

		let runs_in_effect = runs.clone();
		let (gate_in, a_in, b_in) = (gate.clone(), a.clone(), b.clone());
		let _effect = Effect::new(move || {
			runs_in_effect.set(runs_in_effect.get() + 1);
			if gate_in.get() {
				let _ = a_in.get();
			} else {
				let _ = b_in.get();
			}
		});
		assert_eq!(runs.get(), 1);

		// While the gate is open only `a` re-triggers.
		b.set(1);
		assert_eq!(runs.get(), 1);
		a.set(1);
		assert_eq!(runs.get(), 2);

		// After flipping, only `b` re-triggers.
		gate.set(false);
		assert_eq!(runs.get(), 3);
		a.set(2);
		assert_eq!(runs.get(), 3);
		b.set(2);
		assert_eq!(runs.get(), 4);
	}

	#[test]
	#[serial]
	fn test_nested_effect_creation_does_not_deadlock() {
		let inner_runs = Rc::new(Cell::new(0));

		let inner_runs_outer = inner_runs.clone();
		let inner_holder: Rc<RefCell<Option<Effect>>> = Rc::new(RefCell::new(None));
		let holder = inner_holder.clone();
		let _outer = Effect::new(move || {
			let inner_runs_inner = inner_runs_outer.clone();
			let inner = Effect::new(move || {
				inner_runs_inner.set(inner_runs_inner.get() + 1);
			});
			*holder.borrow_mut() = Some(inner);
		});

		assert_eq!(inner_runs.get(), 1);
	}
}
