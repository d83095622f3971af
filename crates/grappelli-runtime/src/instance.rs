//! Component instances.
//!
//! One `ComponentInstance` exists per mounted occurrence of a component
//! definition. It owns the reactive effect that re-runs the render function,
//! the registered lifecycle hooks, and the provided-context map its
//! descendants inject from. Ownership is top-down: the mounted virtual tree
//! keeps instances alive through the vnode state slot, and an instance only
//! holds a weak back-reference to its parent.

use core::cell::{Cell, RefCell};
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::any::Any;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use grappelli_reactive::Effect;
use grappelli_scheduler::JobId;
use grappelli_vdom::{BoxError, ComponentDef, HostId, Props, Slots, VNode};

use crate::errors::{CaptureOutcome, ErrorSource, RuntimeError, call_with_error_handling};

/// Lifecycle hook kinds, in the order they can first fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
	BeforeMount,
	Mounted,
	BeforeUpdate,
	Updated,
	BeforeUnmount,
	Unmounted,
	Activated,
	Deactivated,
}

impl fmt::Display for HookKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::BeforeMount => "before_mount",
			Self::Mounted => "mounted",
			Self::BeforeUpdate => "before_update",
			Self::Updated => "updated",
			Self::BeforeUnmount => "before_unmount",
			Self::Unmounted => "unmounted",
			Self::Activated => "activated",
			Self::Deactivated => "deactivated",
		};
		f.write_str(name)
	}
}

/// A registered lifecycle hook.
pub type HookFn = Rc<dyn Fn() -> Result<(), BoxError>>;

/// A registered `error_captured` hook.
pub type ErrorCaptureFn = Rc<dyn Fn(&RuntimeError) -> CaptureOutcome>;

fn next_uid() -> u64 {
	// Instance uids double as scheduler job ids: creation order is flush
	// order, so a parent always updates before any of its descendants.
	static COUNTER: AtomicU64 = AtomicU64::new(0);
	COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// One mounted occurrence of a component.
pub struct ComponentInstance {
	uid: u64,
	def: Rc<ComponentDef>,
	parent: Option<Weak<ComponentInstance>>,
	props: RefCell<Props>,
	slots: RefCell<Slots>,
	/// The currently mounted virtual tree produced by the last render.
	sub_tree: RefCell<Option<VNode>>,
	effect: RefCell<Option<Effect>>,
	mounted: Cell<bool>,
	/// Cleared at the start of unmount; a queued update job for an inactive
	/// instance is a no-op.
	active: Cell<bool>,
	hooks: RefCell<HashMap<HookKind, Vec<HookFn>>>,
	error_hooks: RefCell<Vec<ErrorCaptureFn>>,
	provides: RefCell<HashMap<String, Rc<dyn Any>>>,
	/// Where the first render mounts to; set just before the effect is
	/// created, read once by the mount branch of the update function.
	mount_container: Cell<Option<HostId>>,
	mount_anchor: Cell<Option<HostId>>,
	/// Stable id for this instance's post-flush `updated` hook job, so the
	/// hooks fire once per flush no matter how often the job is queued.
	updated_job_id: JobId,
}

impl ComponentInstance {
	pub(crate) fn new(
		def: Rc<ComponentDef>,
		props: Props,
		slots: Slots,
		parent: Option<&Rc<ComponentInstance>>,
	) -> Rc<Self> {
		Rc::new(Self {
			uid: next_uid(),
			def,
			parent: parent.map(Rc::downgrade),
			props: RefCell::new(props),
			slots: RefCell::new(slots),
			sub_tree: RefCell::new(None),
			effect: RefCell::new(None),
			mounted: Cell::new(false),
			active: Cell::new(true),
			hooks: RefCell::new(HashMap::new()),
			error_hooks: RefCell::new(Vec::new()),
			provides: RefCell::new(HashMap::new()),
			mount_container: Cell::new(None),
			mount_anchor: Cell::new(None),
			updated_job_id: JobId::next(),
		})
	}

	/// A context-only instance carrying app-level provides. It sits above
	/// the root component so `inject` finds app values through the normal
	/// chain walk; it never renders or updates.
	pub(crate) fn app_context(provides: HashMap<String, Rc<dyn Any>>) -> Rc<Self> {
		let def = ComponentDef::new("<app>", |_, _| Ok(VNode::comment(String::new())));
		let instance = Self::new(def, Props::new(), Slots::new(), None);
		*instance.provides.borrow_mut() = provides;
		instance
	}

	pub fn uid(&self) -> u64 {
		self.uid
	}

	pub fn name(&self) -> &str {
		self.def.name()
	}

	pub(crate) fn def(&self) -> &Rc<ComponentDef> {
		&self.def
	}

	pub fn parent(&self) -> Option<Rc<ComponentInstance>> {
		self.parent.as_ref().and_then(Weak::upgrade)
	}

	pub fn is_mounted(&self) -> bool {
		self.mounted.get()
	}

	pub fn is_active(&self) -> bool {
		self.active.get()
	}

	pub(crate) fn set_mounted(&self) {
		self.mounted.set(true);
	}

	pub(crate) fn deactivate(&self) {
		self.active.set(false);
	}

	pub(crate) fn props_snapshot(&self) -> Props {
		self.props.borrow().clone()
	}

	pub(crate) fn set_props(&self, props: Props) {
		*self.props.borrow_mut() = props;
	}

	pub(crate) fn props_changed(&self, next: &Props) -> bool {
		*self.props.borrow() != *next
	}

	pub(crate) fn slots_snapshot(&self) -> Slots {
		self.slots.borrow().clone()
	}

	pub(crate) fn set_slots(&self, slots: Slots) {
		*self.slots.borrow_mut() = slots;
	}

	pub(crate) fn take_sub_tree(&self) -> Option<VNode> {
		self.sub_tree.borrow_mut().take()
	}

	pub(crate) fn store_sub_tree(&self, tree: VNode) {
		*self.sub_tree.borrow_mut() = Some(tree);
	}

	pub(crate) fn with_sub_tree<R>(&self, f: impl FnOnce(Option<&VNode>) -> R) -> R {
		f(self.sub_tree.borrow().as_ref())
	}

	pub(crate) fn set_mount_position(&self, container: HostId, anchor: Option<HostId>) {
		self.mount_container.set(Some(container));
		self.mount_anchor.set(anchor);
	}

	pub(crate) fn mount_position(&self) -> Option<(HostId, Option<HostId>)> {
		self.mount_container
			.get()
			.map(|container| (container, self.mount_anchor.get()))
	}

	pub(crate) fn updated_job_id(&self) -> JobId {
		self.updated_job_id
	}

	pub(crate) fn set_effect(&self, effect: Effect) {
		*self.effect.borrow_mut() = Some(effect);
	}

	pub(crate) fn take_effect(&self) -> Option<Effect> {
		self.effect.borrow_mut().take()
	}

	/// Re-runs the render effect now. This is what the scheduled update job
	/// calls; it is a no-op once the instance has been deactivated.
	pub fn update(&self) {
		if !self.active.get() {
			return;
		}
		if let Some(effect) = &*self.effect.borrow() {
			effect.run();
		}
	}

	pub(crate) fn register_hook(&self, kind: HookKind, hook: HookFn) {
		self.hooks.borrow_mut().entry(kind).or_default().push(hook);
	}

	pub(crate) fn register_error_hook(&self, hook: ErrorCaptureFn) {
		self.error_hooks.borrow_mut().push(hook);
	}

	pub(crate) fn error_hooks(&self) -> Vec<ErrorCaptureFn> {
		self.error_hooks.borrow().clone()
	}

	/// Fires every hook of one kind in registration order. Hook failures
	/// are routed through the capture chain and do not stop later hooks.
	pub(crate) fn invoke_hooks(&self, kind: HookKind) {
		let hooks = self.hooks.borrow().get(&kind).cloned().unwrap_or_default();
		for hook in hooks {
			call_with_error_handling(|| hook(), Some(self), ErrorSource::Hook(kind));
		}
	}

	pub(crate) fn provide_value(&self, key: impl Into<String>, value: Rc<dyn Any>) {
		self.provides.borrow_mut().insert(key.into(), value);
	}

	/// Chain lookup: own provides first, then each ancestor in turn.
	pub(crate) fn inject_value(&self, key: &str) -> Option<Rc<dyn Any>> {
		if let Some(value) = self.provides.borrow().get(key) {
			return Some(value.clone());
		}
		let mut cursor = self.parent();
		while let Some(instance) = cursor {
			if let Some(value) = instance.provides.borrow().get(key) {
				return Some(value.clone());
			}
			cursor = instance.parent();
		}
		None
	}

	pub(crate) fn release_provides(&self) {
		self.provides.borrow_mut().clear();
	}
}

impl fmt::Debug for ComponentInstance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentInstance")
			.field("uid", &self.uid)
			.field("component", &self.name())
			.field("mounted", &self.mounted.get())
			.field("active", &self.active.get())
			.finish_non_exhaustive()
	}
}

thread_local! {
	static CURRENT: RefCell<Vec<Rc<ComponentInstance>>> = const { RefCell::new(Vec::new()) };
}

/// The instance whose setup or render is currently executing.
pub fn current_instance() -> Option<Rc<ComponentInstance>> {
	CURRENT.with(|stack| stack.borrow().last().cloned())
}

/// Runs `f` with the current instance, or returns `None` outside of a
/// setup/render call.
pub fn with_current_instance<F, R>(f: F) -> Option<R>
where
	F: FnOnce(&Rc<ComponentInstance>) -> R,
{
	current_instance().map(|instance| f(&instance))
}

/// RAII marker for "this instance is currently setting up / rendering".
pub(crate) struct InstanceScope;

impl InstanceScope {
	pub(crate) fn enter(instance: Rc<ComponentInstance>) -> Self {
		CURRENT.with(|stack| stack.borrow_mut().push(instance));
		Self
	}
}

impl Drop for InstanceScope {
	fn drop(&mut self) {
		CURRENT.with(|stack| {
			stack.borrow_mut().pop();
		});
	}
}
