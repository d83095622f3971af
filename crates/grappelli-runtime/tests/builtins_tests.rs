//! Structural components: teleport, keep-alive, suspense.

use core::cell::{Cell, RefCell};
use std::rc::Rc;

use grappelli_reactive::Signal;
use grappelli_runtime::{
	SuspenseDep, create_app, current_instance, on_activated, on_deactivated, register_async_dep,
};
use grappelli_scheduler::flush_jobs;
use grappelli_testkit::MockDom;
use grappelli_vdom::{ComponentDef, Props, VNode, element, text};
use serial_test::serial;

#[test]
#[serial]
fn test_teleport_renders_children_into_the_target() {
	let dom = MockDom::new();
	let root = dom.create_root();
	let modal_host = dom.create_root();
	dom.register_target("#modal", modal_host);

	let def = ComponentDef::new("portal", |_, _| {
		Ok(element("div")
			.child(VNode::teleport(
				"#modal",
				vec![element("p").text("popup").build()],
			))
			.build())
	});
	let app = create_app(dom.clone(), def);
	app.mount(root).unwrap();

	assert_eq!(dom.render_to_string(modal_host), "<p>popup</p>");
	// Only the placeholder stays where the teleport was declared.
	assert_eq!(dom.render_to_string(root), "<div><!--teleport--></div>");
}

#[test]
#[serial]
fn test_teleport_retarget_moves_children() {
	let dom = MockDom::new();
	let root = dom.create_root();
	let host_a = dom.create_root();
	let host_b = dom.create_root();
	dom.register_target("#a", host_a);
	dom.register_target("#b", host_b);

	let target = Signal::new(String::from("#a"));
	let def = {
		let target = target.clone();
		ComponentDef::new("portal", move |_, _| {
			Ok(VNode::teleport(target.get(), vec![text("payload")]))
		})
	};
	let app = create_app(dom.clone(), def);
	app.mount(root).unwrap();
	assert_eq!(dom.render_to_string(host_a), "payload");
	assert_eq!(dom.render_to_string(host_b), "");

	target.set(String::from("#b"));
	flush_jobs();

	assert_eq!(dom.render_to_string(host_a), "");
	assert_eq!(dom.render_to_string(host_b), "payload");
}

#[test]
#[serial]
fn test_teleport_unmount_removes_remote_children() {
	let dom = MockDom::new();
	let root = dom.create_root();
	let modal_host = dom.create_root();
	dom.register_target("#modal", modal_host);

	let def = ComponentDef::new("portal", |_, _| {
		Ok(VNode::teleport("#modal", vec![text("popup")]))
	});
	let app = create_app(dom.clone(), def);
	app.mount(root).unwrap();
	assert_eq!(dom.render_to_string(modal_host), "popup");

	app.unmount().unwrap();

	assert_eq!(dom.render_to_string(modal_host), "");
	assert_eq!(dom.render_to_string(root), "");
}

#[test]
#[serial]
fn test_keep_alive_preserves_the_cached_instance() {
	let setups = Rc::new(Cell::new(0u32));
	let uid = Rc::new(Cell::new(None));
	let log = Rc::new(RefCell::new(Vec::new()));

	let tab_a = {
		let setups = setups.clone();
		let uid = uid.clone();
		let log = log.clone();
		ComponentDef::with_setup(
			"tab-a",
			move |_| {
				setups.set(setups.get() + 1);
				uid.set(current_instance().map(|instance| instance.uid()));
				let log_on = log.clone();
				on_activated(move || {
					log_on.borrow_mut().push("activated");
					Ok(())
				});
				let log_off = log.clone();
				on_deactivated(move || {
					log_off.borrow_mut().push("deactivated");
					Ok(())
				});
				Ok(())
			},
			|_, _| Ok(element("section").text("tab a").build()),
		)
	};
	let tab_b = ComponentDef::new("tab-b", |_, _| Ok(element("aside").text("tab b").build()));

	let show_a = Signal::new(true);
	let switcher = {
		let show_a = show_a.clone();
		let tab_a = tab_a.clone();
		let tab_b = tab_b.clone();
		ComponentDef::new("switcher", move |_, _| {
			let active = if show_a.get() {
				VNode::component(tab_a.clone(), Props::new())
			} else {
				VNode::component(tab_b.clone(), Props::new())
			};
			Ok(VNode::keep_alive(active))
		})
	};

	let dom = MockDom::new();
	let root = dom.create_root();
	let app = create_app(dom.clone(), switcher);
	app.mount(root).unwrap();
	flush_jobs();
	assert_eq!(setups.get(), 1);
	let first_uid = uid.get();
	assert!(first_uid.is_some());
	assert_eq!(dom.render_to_string(root), "<section>tab a</section>");

	show_a.set(false);
	flush_jobs();
	assert_eq!(dom.render_to_string(root), "<aside>tab b</aside>");
	assert_eq!(*log.borrow(), vec!["deactivated"]);

	show_a.set(true);
	flush_jobs();
	assert_eq!(dom.render_to_string(root), "<section>tab a</section>");
	assert_eq!(*log.borrow(), vec!["deactivated", "activated"]);
	// Same instance came back from the cache, its setup never re-ran.
	assert_eq!(setups.get(), 1);
	assert_eq!(uid.get(), first_uid);
}

fn async_content(dep_slot: Rc<RefCell<Option<SuspenseDep>>>) -> Rc<ComponentDef> {
	ComponentDef::with_setup(
		"async-content",
		move |_| {
			*dep_slot.borrow_mut() = register_async_dep();
			Ok(())
		},
		|_, _| Ok(element("main").text("ready").build()),
	)
}

fn suspense_page(content: Rc<ComponentDef>) -> Rc<ComponentDef> {
	ComponentDef::new("page", move |_, _| {
		Ok(VNode::suspense(
			VNode::component(content.clone(), Props::new()),
			element("span").text("loading").build(),
		))
	})
}

#[test]
#[serial]
fn test_suspense_shows_fallback_until_the_dep_resolves() {
	let dep_slot = Rc::new(RefCell::new(None));
	let dom = MockDom::new();
	let root = dom.create_root();
	let app = create_app(dom.clone(), suspense_page(async_content(dep_slot.clone())));
	app.mount(root).unwrap();

	assert!(dep_slot.borrow().is_some());
	assert_eq!(
		dom.render_to_string(root),
		"<span>loading</span><!--suspense-->"
	);

	let dep = dep_slot.borrow_mut().take().unwrap();
	dep.resolve();

	assert_eq!(dom.render_to_string(root), "<main>ready</main><!--suspense-->");
}

#[test]
#[serial]
fn test_suspense_waits_for_every_dep() {
	let first = Rc::new(RefCell::new(None));
	let second = Rc::new(RefCell::new(None));

	let content = {
		let first = first.clone();
		let second = second.clone();
		ComponentDef::with_setup(
			"double-async",
			move |_| {
				*first.borrow_mut() = register_async_dep();
				*second.borrow_mut() = register_async_dep();
				Ok(())
			},
			|_, _| Ok(text("ready")),
		)
	};

	let dom = MockDom::new();
	let root = dom.create_root();
	let app = create_app(dom.clone(), suspense_page(content));
	app.mount(root).unwrap();

	first.borrow_mut().take().unwrap().resolve();
	assert_eq!(
		dom.render_to_string(root),
		"<span>loading</span><!--suspense-->"
	);

	second.borrow_mut().take().unwrap().resolve();
	assert_eq!(dom.render_to_string(root), "ready<!--suspense-->");
}

#[test]
#[serial]
fn test_dropping_an_unresolved_dep_counts_as_resolution() {
	let dep_slot = Rc::new(RefCell::new(None));
	let dom = MockDom::new();
	let root = dom.create_root();
	let app = create_app(dom.clone(), suspense_page(async_content(dep_slot.clone())));
	app.mount(root).unwrap();

	dep_slot.borrow_mut().take();

	assert_eq!(dom.render_to_string(root), "<main>ready</main><!--suspense-->");
}

#[test]
#[serial]
fn test_resolution_after_unmount_is_a_noop() {
	let dep_slot = Rc::new(RefCell::new(None));
	let dom = MockDom::new();
	let root = dom.create_root();
	let app = create_app(dom.clone(), suspense_page(async_content(dep_slot.clone())));
	app.mount(root).unwrap();

	app.unmount().unwrap();
	assert_eq!(dom.render_to_string(root), "");

	let dep = dep_slot.borrow_mut().take().unwrap();
	dep.resolve();

	assert_eq!(dom.render_to_string(root), "");
}
