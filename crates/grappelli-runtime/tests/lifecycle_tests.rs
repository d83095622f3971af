//! Lifecycle hook ordering and watcher flush timing.

use core::cell::{Cell, RefCell};
use std::rc::Rc;

use grappelli_reactive::Signal;
use grappelli_runtime::{
	create_app, on_before_mount, on_before_unmount, on_before_update, on_mounted, on_unmounted,
	on_updated, watch_effect,
};
use grappelli_scheduler::flush_jobs;
use grappelli_testkit::MockDom;
use grappelli_vdom::{ComponentDef, text};
use serial_test::serial;

type Log = Rc<RefCell<Vec<&'static str>>>;

fn log_hook(log: &Log, entry: &'static str) -> impl Fn() -> Result<(), grappelli_vdom::BoxError> + use<> {
	let log = log.clone();
	move || {
		log.borrow_mut().push(entry);
		Ok(())
	}
}

fn lifecycle_component(log: Log, state: Signal<i64>) -> Rc<ComponentDef> {
	ComponentDef::with_setup(
		"tracked",
		{
			let log = log.clone();
			move |_| {
				log.borrow_mut().push("setup");
				on_before_mount(log_hook(&log, "before_mount"));
				on_mounted(log_hook(&log, "mounted"));
				on_before_update(log_hook(&log, "before_update"));
				on_updated(log_hook(&log, "updated"));
				on_before_unmount(log_hook(&log, "before_unmount"));
				on_unmounted(log_hook(&log, "unmounted"));
				Ok(())
			}
		},
		move |_, _| {
			log.borrow_mut().push("render");
			Ok(text(state.get().to_string()))
		},
	)
}

#[test]
#[serial]
fn test_mount_hook_order() {
	let log: Log = Rc::new(RefCell::new(Vec::new()));
	let state = Signal::new(0i64);
	let dom = MockDom::new();
	let root = dom.create_root();
	let app = create_app(dom.clone(), lifecycle_component(log.clone(), state));

	app.mount(root).unwrap();
	flush_jobs();

	assert_eq!(
		*log.borrow(),
		vec!["setup", "before_mount", "render", "mounted"]
	);
}

#[test]
#[serial]
fn test_update_hooks_fire_once_per_flush() {
	let log: Log = Rc::new(RefCell::new(Vec::new()));
	let state = Signal::new(0i64);
	let dom = MockDom::new();
	let root = dom.create_root();
	let app = create_app(dom.clone(), lifecycle_component(log.clone(), state.clone()));
	app.mount(root).unwrap();
	flush_jobs();
	log.borrow_mut().clear();

	state.set(1);
	state.set(2);
	flush_jobs();

	assert_eq!(*log.borrow(), vec!["before_update", "render", "updated"]);
}

#[test]
#[serial]
fn test_unmount_hook_order() {
	let log: Log = Rc::new(RefCell::new(Vec::new()));
	let state = Signal::new(0i64);
	let dom = MockDom::new();
	let root = dom.create_root();
	let app = create_app(dom.clone(), lifecycle_component(log.clone(), state));
	app.mount(root).unwrap();
	flush_jobs();
	log.borrow_mut().clear();

	app.unmount().unwrap();
	flush_jobs();

	assert_eq!(*log.borrow(), vec!["before_unmount", "unmounted"]);
}

#[test]
#[serial]
fn test_watcher_runs_before_renders_in_a_flush() {
	let log: Log = Rc::new(RefCell::new(Vec::new()));
	let state = Signal::new(0i64);

	let def = {
		let log = log.clone();
		let state = state.clone();
		ComponentDef::new("watched", move |_, _| {
			log.borrow_mut().push("render");
			Ok(text(state.get().to_string()))
		})
	};

	let dom = MockDom::new();
	let root = dom.create_root();
	let app = create_app(dom.clone(), def);
	app.mount(root).unwrap();

	let _watcher = {
		let log = log.clone();
		let state = state.clone();
		watch_effect(move || {
			let _ = state.get();
			log.borrow_mut().push("watch");
			Ok(())
		})
	};
	log.borrow_mut().clear();

	state.set(1);
	flush_jobs();

	assert_eq!(*log.borrow(), vec!["watch", "render"]);
}

#[test]
#[serial]
fn test_stopped_watcher_never_reruns() {
	let runs: Log = Rc::new(RefCell::new(Vec::new()));
	let state = Signal::new(0i64);

	let watcher = {
		let runs = runs.clone();
		let state = state.clone();
		watch_effect(move || {
			let _ = state.get();
			runs.borrow_mut().push("run");
			Ok(())
		})
	};
	assert_eq!(runs.borrow().len(), 1);

	watcher.stop();
	state.set(1);
	flush_jobs();

	assert_eq!(runs.borrow().len(), 1);
}

#[test]
#[serial]
fn test_dropping_the_handle_stops_the_watcher() {
	let runs: Log = Rc::new(RefCell::new(Vec::new()));
	let state = Signal::new(0i64);

	{
		let runs = runs.clone();
		let state = state.clone();
		let _watcher = watch_effect(move || {
			let _ = state.get();
			runs.borrow_mut().push("run");
			Ok(())
		});
	}

	state.set(1);
	flush_jobs();

	assert_eq!(runs.borrow().len(), 1);
}

#[test]
#[serial]
fn test_signal_reads_in_hooks_do_not_become_render_dependencies() {
	let renders = Rc::new(Cell::new(0u32));
	let tracked = Signal::new(0i64);
	let peeked = Signal::new(0i64);

	let def = {
		let renders = renders.clone();
		let tracked = tracked.clone();
		let peeked = peeked.clone();
		ComponentDef::with_setup(
			"peeker",
			move |_| {
				let peeked = peeked.clone();
				on_before_update(move || {
					let _ = peeked.get();
					Ok(())
				});
				Ok(())
			},
			move |_, _| {
				renders.set(renders.get() + 1);
				Ok(text(tracked.get().to_string()))
			},
		)
	};

	let dom = MockDom::new();
	let root = dom.create_root();
	let app = create_app(dom.clone(), def);
	app.mount(root).unwrap();
	flush_jobs();

	// The update runs the hook, which reads `peeked` untracked.
	tracked.set(1);
	flush_jobs();
	assert_eq!(renders.get(), 2);

	// A write to the peeked signal must not re-render.
	peeked.set(7);
	flush_jobs();
	assert_eq!(renders.get(), 2);
}
