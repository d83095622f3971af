//! The reconciler.
//!
//! `patch(old, new, container, anchor)` is the single entry point: given the
//! previously mounted virtual tree (or none) and the next one, it computes
//! and applies the minimal host-mutation sequence through the injected
//! [`Platform`]. Dispatch is an exhaustive match on the node kind; the
//! structural kinds (teleport, keep-alive, suspense) live in
//! [`crate::builtins`] as dedicated sub-procedures of the same dispatch.
//!
//! ## Child diffing
//!
//! A child sequence is classified once per patch as keyed (every child
//! carries a key) or unkeyed. Unkeyed lists patch pairwise by index; keyed
//! lists run the two-ended algorithm: trim matching prefix and suffix, map
//! keys to old indices for the unmatched middle, and move only the nodes
//! outside the longest increasing subsequence of matched old indices,
//! processing in reverse so anchors stay valid. Move count is the
//! theoretical minimum implied by the LIS.

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use grappelli_scheduler::{Job, JobId, invalidate_job, queue_job, queue_post_flush_cb};
use grappelli_reactive::{Effect, untracked};
use grappelli_vdom::{Children, HostId, Key, Props, VNode, VNodeKind};

use crate::errors::{
	ErrorSource, RuntimeError, call_with_error_handling, handle_error, report_unhandled,
};
use crate::instance::{ComponentInstance, HookKind, InstanceScope};
use crate::platform::Platform;

/// Applies virtual-tree diffs to a host platform.
///
/// Owned behind `Rc`: component update effects and suspense boundaries keep
/// weak handles back to the renderer that created them.
pub struct Renderer {
	pub(crate) platform: Rc<dyn Platform>,
	this: Weak<Renderer>,
}

impl Renderer {
	pub fn new(platform: Rc<dyn Platform>) -> Rc<Self> {
		// Overflow errors bypass capture hooks; bridge them straight into
		// the runtime's unhandled-error reporter.
		grappelli_scheduler::set_overflow_handler(|error| {
			report_unhandled(&RuntimeError::SchedulerOverflow(error.clone()));
		});
		Rc::new_cyclic(|this| Self {
			platform,
			this: this.clone(),
		})
	}

	pub fn platform(&self) -> &Rc<dyn Platform> {
		&self.platform
	}

	pub(crate) fn handle(&self) -> Rc<Self> {
		// Methods only run through the owning Rc.
		self.this.upgrade().expect("renderer alive while in use")
	}

	/// Reconciles `new` against `old` inside `container`, inserting any
	/// fresh host nodes before `anchor`.
	///
	/// A type or key mismatch is never patched in place: the old subtree is
	/// unmounted entirely and the new one mounted fresh in its position.
	pub fn patch(
		&self,
		mut old: Option<&VNode>,
		new: &VNode,
		container: HostId,
		mut anchor: Option<HostId>,
		parent: Option<&Rc<ComponentInstance>>,
	) -> Result<(), RuntimeError> {
		if let Some(prev) = old {
			if !prev.same_type(new) {
				anchor = self.next_host_position(prev)?;
				self.unmount(prev, true)?;
				old = None;
			}
		}
		match new.kind() {
			VNodeKind::Text(_) => self.process_text(old, new, container, anchor),
			VNodeKind::Comment(_) => self.process_comment(old, new, container, anchor),
			VNodeKind::Static => self.process_static(old, new, container, anchor, parent),
			VNodeKind::Fragment => self.process_fragment(old, new, container, anchor, parent),
			VNodeKind::Element(_) => self.process_element(old, new, container, anchor, parent),
			VNodeKind::Component(_) => self.process_component(old, new, container, anchor, parent),
			VNodeKind::Teleport => self.process_teleport(old, new, container, anchor, parent),
			VNodeKind::KeepAlive => self.process_keep_alive(old, new, container, anchor, parent),
			VNodeKind::Suspense => self.process_suspense(old, new, container, anchor, parent),
		}
	}

	fn process_text(
		&self,
		old: Option<&VNode>,
		new: &VNode,
		container: HostId,
		anchor: Option<HostId>,
	) -> Result<(), RuntimeError> {
		let VNodeKind::Text(text) = new.kind() else {
			return Ok(());
		};
		match old {
			None => {
				let node = self.platform.create_text(text)?;
				new.set_host(Some(node));
				self.platform.insert(node, container, anchor)?;
			}
			Some(prev) => {
				let node = prev.host().ok_or_else(|| missing_host(prev))?;
				new.set_host(Some(node));
				if let VNodeKind::Text(old_text) = prev.kind() {
					if old_text != text {
						self.platform.set_text(node, text)?;
					}
				}
			}
		}
		Ok(())
	}

	fn process_comment(
		&self,
		old: Option<&VNode>,
		new: &VNode,
		container: HostId,
		anchor: Option<HostId>,
	) -> Result<(), RuntimeError> {
		let VNodeKind::Comment(text) = new.kind() else {
			return Ok(());
		};
		match old {
			None => {
				let node = self.platform.create_comment(text)?;
				new.set_host(Some(node));
				self.platform.insert(node, container, anchor)?;
			}
			Some(prev) => {
				let node = prev.host().ok_or_else(|| missing_host(prev))?;
				new.set_host(Some(node));
				if let VNodeKind::Comment(old_text) = prev.kind() {
					if old_text != text {
						self.platform.set_text(node, text)?;
					}
				}
			}
		}
		Ok(())
	}

	/// Static blocks mount once and are skipped entirely on patch. Their
	/// children must be host nodes only (no components).
	fn process_static(
		&self,
		old: Option<&VNode>,
		new: &VNode,
		container: HostId,
		anchor: Option<HostId>,
		parent: Option<&Rc<ComponentInstance>>,
	) -> Result<(), RuntimeError> {
		match old {
			None => {
				let (_, end) = self.mount_fragment_anchors(new, container, anchor)?;
				self.mount_children(new.children().nodes(), container, Some(end), parent)?;
			}
			Some(prev) => {
				new.set_host(prev.host());
				new.set_anchor(prev.anchor());
			}
		}
		Ok(())
	}

	fn process_fragment(
		&self,
		old: Option<&VNode>,
		new: &VNode,
		container: HostId,
		anchor: Option<HostId>,
		parent: Option<&Rc<ComponentInstance>>,
	) -> Result<(), RuntimeError> {
		match old {
			None => {
				let (_, end) = self.mount_fragment_anchors(new, container, anchor)?;
				self.mount_children(new.children().nodes(), container, Some(end), parent)?;
			}
			Some(prev) => {
				let end = prev.anchor().ok_or_else(|| missing_host(prev))?;
				new.set_host(prev.host());
				new.set_anchor(Some(end));
				self.patch_children(prev, new, container, Some(end), parent)?;
			}
		}
		Ok(())
	}

	/// Fragments carry no wrapper host node, only a start and end comment
	/// anchoring their child range in the surrounding container.
	fn mount_fragment_anchors(
		&self,
		new: &VNode,
		container: HostId,
		anchor: Option<HostId>,
	) -> Result<(HostId, HostId), RuntimeError> {
		let start = self.platform.create_comment("[")?;
		let end = self.platform.create_comment("]")?;
		new.set_host(Some(start));
		new.set_anchor(Some(end));
		self.platform.insert(start, container, anchor)?;
		self.platform.insert(end, container, anchor)?;
		Ok((start, end))
	}

	fn process_element(
		&self,
		old: Option<&VNode>,
		new: &VNode,
		container: HostId,
		anchor: Option<HostId>,
		parent: Option<&Rc<ComponentInstance>>,
	) -> Result<(), RuntimeError> {
		let VNodeKind::Element(tag) = new.kind() else {
			return Ok(());
		};
		match old {
			None => {
				let el = self.platform.create_element(tag)?;
				new.set_host(Some(el));
				for (name, value) in new.props().iter() {
					self.platform.patch_prop(el, name, None, Some(value))?;
				}
				match new.children() {
					Children::Text(text) => self.platform.set_element_text(el, text)?,
					Children::Nodes(nodes) => self.mount_children(nodes, el, None, parent)?,
					Children::None => {}
				}
				self.platform.insert(el, container, anchor)?;
			}
			Some(prev) => {
				let el = prev.host().ok_or_else(|| missing_host(prev))?;
				new.set_host(Some(el));
				let flags = new.patch_flag();
				if flags.is_static() {
					return Ok(());
				}
				if !flags.skips_props() {
					self.patch_props(el, prev.props(), new.props())?;
				}
				self.patch_children(prev, new, el, None, parent)?;
			}
		}
		Ok(())
	}

	/// Sets and removes only changed keys. Handler values compare by
	/// identity, so an unchanged closure allocation is never re-attached.
	fn patch_props(&self, el: HostId, old: &Props, new: &Props) -> Result<(), RuntimeError> {
		for (name, new_value) in new.iter() {
			match old.get(name) {
				Some(old_value) if old_value == new_value => {}
				old_value => self.platform.patch_prop(el, name, old_value, Some(new_value))?,
			}
		}
		for (name, old_value) in old.iter() {
			if !new.contains(name) {
				self.platform.patch_prop(el, name, Some(old_value), None)?;
			}
		}
		Ok(())
	}

	pub(crate) fn mount_children(
		&self,
		children: &[VNode],
		container: HostId,
		anchor: Option<HostId>,
		parent: Option<&Rc<ComponentInstance>>,
	) -> Result<(), RuntimeError> {
		for child in children {
			self.patch(None, child, container, anchor, parent)?;
		}
		Ok(())
	}

	pub(crate) fn unmount_children(
		&self,
		children: &[VNode],
		do_remove: bool,
	) -> Result<(), RuntimeError> {
		for child in children {
			self.unmount(child, do_remove)?;
		}
		Ok(())
	}

	pub(crate) fn patch_children(
		&self,
		old: &VNode,
		new: &VNode,
		container: HostId,
		anchor: Option<HostId>,
		parent: Option<&Rc<ComponentInstance>>,
	) -> Result<(), RuntimeError> {
		match (old.children(), new.children()) {
			(Children::Nodes(old_nodes), Children::Nodes(new_nodes)) => {
				if old.children().is_keyed() && new.children().is_keyed() {
					self.patch_keyed_children(old_nodes, new_nodes, container, anchor, parent)
				} else {
					self.patch_unkeyed_children(old_nodes, new_nodes, container, anchor, parent)
				}
			}
			(Children::Nodes(old_nodes), Children::Text(text)) => {
				self.unmount_children(old_nodes, true)?;
				self.platform.set_element_text(container, text)?;
				Ok(())
			}
			(Children::Text(old_text), Children::Text(text)) => {
				if old_text != text {
					self.platform.set_element_text(container, text)?;
				}
				Ok(())
			}
			(Children::Text(_), Children::Nodes(new_nodes)) => {
				self.platform.set_element_text(container, "")?;
				self.mount_children(new_nodes, container, anchor, parent)
			}
			(Children::Text(_), Children::None) => {
				self.platform.set_element_text(container, "")?;
				Ok(())
			}
			(Children::None, Children::Nodes(new_nodes)) => {
				self.mount_children(new_nodes, container, anchor, parent)
			}
			(Children::None, Children::Text(text)) => {
				self.platform.set_element_text(container, text)?;
				Ok(())
			}
			(Children::Nodes(old_nodes), Children::None) => self.unmount_children(old_nodes, true),
			(Children::None, Children::None) => Ok(()),
		}
	}

	fn patch_unkeyed_children(
		&self,
		old_nodes: &[VNode],
		new_nodes: &[VNode],
		container: HostId,
		anchor: Option<HostId>,
		parent: Option<&Rc<ComponentInstance>>,
	) -> Result<(), RuntimeError> {
		let common = old_nodes.len().min(new_nodes.len());
		for index in 0..common {
			self.patch(Some(&old_nodes[index]), &new_nodes[index], container, anchor, parent)?;
		}
		if new_nodes.len() > common {
			self.mount_children(&new_nodes[common..], container, anchor, parent)
		} else {
			self.unmount_children(&old_nodes[common..], true)
		}
	}

	/// The two-ended keyed diff with LIS move minimization.
	fn patch_keyed_children(
		&self,
		old_nodes: &[VNode],
		new_nodes: &[VNode],
		container: HostId,
		anchor: Option<HostId>,
		parent: Option<&Rc<ComponentInstance>>,
	) -> Result<(), RuntimeError> {
		let mut i = 0usize;
		let mut e1 = old_nodes.len() as isize - 1;
		let mut e2 = new_nodes.len() as isize - 1;

		// 1. Matching prefix patches in place.
		while (i as isize) <= e1 && (i as isize) <= e2 {
			let (o, n) = (&old_nodes[i], &new_nodes[i]);
			if !o.same_type(n) {
				break;
			}
			self.patch(Some(o), n, container, anchor, parent)?;
			i += 1;
		}
		// 2. Matching suffix, symmetrically from the end.
		while e1 >= i as isize && e2 >= i as isize {
			let (o, n) = (&old_nodes[e1 as usize], &new_nodes[e2 as usize]);
			if !o.same_type(n) {
				break;
			}
			self.patch(Some(o), n, container, anchor, parent)?;
			e1 -= 1;
			e2 -= 1;
		}

		if i as isize > e1 {
			// 3. Old range exhausted: everything left in new is fresh.
			if i as isize <= e2 {
				let next_pos = (e2 + 1) as usize;
				let insert_anchor = if next_pos < new_nodes.len() {
					self.first_host(&new_nodes[next_pos])
				} else {
					anchor
				};
				for n in &new_nodes[i..=e2 as usize] {
					self.patch(None, n, container, insert_anchor, parent)?;
				}
			}
		} else if i as isize > e2 {
			// 4. New range exhausted: everything left in old goes away.
			for o in &old_nodes[i..=e1 as usize] {
				self.unmount(o, true)?;
			}
		} else {
			// 5. Unmatched middle: map keys to old indices, patch matches,
			// then move only nodes outside the LIS.
			let (s1, s2) = (i, i);
			let mut key_to_new: HashMap<&Key, usize> = HashMap::new();
			for (j, n) in new_nodes
				.iter()
				.enumerate()
				.skip(s2)
				.take(e2 as usize - s2 + 1)
			{
				if let Some(key) = n.key() {
					key_to_new.insert(key, j);
				}
			}

			let to_patch = e2 as usize - s2 + 1;
			// 0 marks "no old counterpart"; otherwise old index + 1.
			let mut new_to_old = vec![0usize; to_patch];
			let mut moved = false;
			let mut max_new_index = 0usize;
			let mut patched = 0usize;

			for (j, o) in old_nodes
				.iter()
				.enumerate()
				.skip(s1)
				.take(e1 as usize - s1 + 1)
			{
				if patched >= to_patch {
					self.unmount(o, true)?;
					continue;
				}
				match o.key().and_then(|key| key_to_new.get(key).copied()) {
					None => self.unmount(o, true)?,
					Some(ni) => {
						new_to_old[ni - s2] = j + 1;
						if ni >= max_new_index {
							max_new_index = ni;
						} else {
							moved = true;
						}
						self.patch(Some(o), &new_nodes[ni], container, anchor, parent)?;
						patched += 1;
					}
				}
			}

			let stable = if moved {
				longest_increasing_subsequence(&new_to_old)
			} else {
				Vec::new()
			};
			let mut stable_tail = stable.len();

			// Reverse order keeps each insertion anchor already settled.
			for idx in (0..to_patch).rev() {
				let ni = s2 + idx;
				let child = &new_nodes[ni];
				let insert_anchor = if ni + 1 < new_nodes.len() {
					self.first_host(&new_nodes[ni + 1])
				} else {
					anchor
				};
				if new_to_old[idx] == 0 {
					self.patch(None, child, container, insert_anchor, parent)?;
				} else if moved {
					if stable_tail == 0 || idx != stable[stable_tail - 1] {
						tracing::trace!(index = ni, "keyed diff moving child");
						self.move_node(child, container, insert_anchor)?;
					} else {
						stable_tail -= 1;
					}
				}
			}
		}
		Ok(())
	}

	fn process_component(
		&self,
		old: Option<&VNode>,
		new: &VNode,
		container: HostId,
		anchor: Option<HostId>,
		parent: Option<&Rc<ComponentInstance>>,
	) -> Result<(), RuntimeError> {
		match old {
			None => self.mount_component(new, container, anchor, parent),
			Some(prev) => {
				let Some(instance) = Self::instance_of(prev) else {
					return self.mount_component(new, container, anchor, parent);
				};
				new.set_state(prev.state());
				let needs_update =
					instance.props_changed(new.props()) || !new.slots().is_empty();
				if needs_update {
					instance.set_props(new.props().clone());
					instance.set_slots(new.slots().clone());
					// The parent drives this re-render right now; a stale
					// job queued by the child's own effect must not run
					// again afterwards.
					invalidate_job(JobId::from_raw(instance.uid()));
					instance.update();
				}
				Ok(())
			}
		}
	}

	fn mount_component(
		&self,
		vnode: &VNode,
		container: HostId,
		anchor: Option<HostId>,
		parent: Option<&Rc<ComponentInstance>>,
	) -> Result<(), RuntimeError> {
		let VNodeKind::Component(def) = vnode.kind() else {
			return Ok(());
		};
		let instance =
			ComponentInstance::new(def.clone(), vnode.props().clone(), vnode.slots().clone(), parent);
		tracing::debug!(component = instance.name(), uid = instance.uid(), "mounting component");
		vnode.set_state(Some(instance.clone()));

		if let Some(setup) = def.setup() {
			let setup = setup.clone();
			let props = instance.props_snapshot();
			let _scope = InstanceScope::enter(instance.clone());
			if call_with_error_handling(|| setup(&props), Some(&instance), ErrorSource::Setup)
				.is_none()
			{
				// Failed setup aborts the mount before any host mutation.
				instance.deactivate();
				return Ok(());
			}
		}

		instance.set_mount_position(container, anchor);

		let renderer = self.handle();
		let effect_instance = instance.clone();
		let update_fn = move || {
			if let Err(error) = renderer.run_component_update(&effect_instance) {
				handle_error(&error, Some(&effect_instance));
			}
		};
		let job_instance = instance.clone();
		let job = Job::new(JobId::from_raw(instance.uid()), move || job_instance.update())
			.allow_recurse();
		// The effect's first run performs the mount synchronously; every
		// later invalidation is redirected through the scheduler.
		let effect = Effect::with_scheduler(update_fn, move || queue_job(job.clone()));
		instance.set_effect(effect);
		Ok(())
	}

	/// Body of a component's render effect: mounts on the first run,
	/// re-renders and patches on every later one.
	pub(crate) fn run_component_update(
		&self,
		instance: &Rc<ComponentInstance>,
	) -> Result<(), RuntimeError> {
		if !instance.is_active() {
			return Ok(());
		}
		let render = instance.def().render().clone();
		let props = instance.props_snapshot();
		let slots = instance.slots_snapshot();

		if !instance.is_mounted() {
			let Some((container, anchor)) = instance.mount_position() else {
				return Ok(());
			};
			// Hooks run inside the render effect; suspend tracking so
			// their signal reads do not become render dependencies.
			untracked(|| instance.invoke_hooks(HookKind::BeforeMount));
			let tree = {
				let _scope = InstanceScope::enter(instance.clone());
				call_with_error_handling(|| render(&props, &slots), Some(instance), ErrorSource::Render)
			};
			let Some(tree) = tree else {
				return Ok(());
			};
			self.patch(None, &tree, container, anchor, Some(instance))?;
			instance.store_sub_tree(tree);
			instance.set_mounted();
			let mounted_instance = instance.clone();
			queue_post_flush_cb(Job::new(JobId::next(), move || {
				mounted_instance.invoke_hooks(HookKind::Mounted);
			}));
		} else {
			untracked(|| instance.invoke_hooks(HookKind::BeforeUpdate));
			let tree = {
				let _scope = InstanceScope::enter(instance.clone());
				call_with_error_handling(|| render(&props, &slots), Some(instance), ErrorSource::Render)
			};
			let Some(next) = tree else {
				return Ok(());
			};
			let Some(prev) = instance.take_sub_tree() else {
				return Ok(());
			};
			let patched = self.host_parent_of(&prev).and_then(|container| {
				let anchor = self.next_host_position(&prev)?;
				self.patch(Some(&prev), &next, container, anchor, Some(instance))
			});
			if let Err(error) = patched {
				// The instance must keep a tree: a later unmount walks it
				// to destroy descendants and fire their hooks.
				instance.store_sub_tree(prev);
				return Err(error);
			}
			instance.store_sub_tree(next);
			let updated_instance = instance.clone();
			// A stable per-instance id so chained re-flushes still fire
			// the hooks exactly once per settled update.
			queue_post_flush_cb(Job::new(instance.updated_job_id(), move || {
				updated_instance.invoke_hooks(HookKind::Updated);
			}));
		}
		Ok(())
	}

	/// Tears a subtree down. `do_remove` is false when an ancestor host
	/// node is being removed wholesale: instances still need their hooks
	/// and effects stopped, but individual host removals would be wasted.
	pub fn unmount(&self, vnode: &VNode, do_remove: bool) -> Result<(), RuntimeError> {
		match vnode.kind() {
			VNodeKind::Component(_) => self.unmount_component(vnode, do_remove),
			VNodeKind::Fragment => {
				self.unmount_children(vnode.children().nodes(), do_remove)?;
				if do_remove {
					if let Some(start) = vnode.host() {
						self.platform.remove(start)?;
					}
					if let Some(end) = vnode.anchor() {
						self.platform.remove(end)?;
					}
				}
				Ok(())
			}
			VNodeKind::Static => {
				if do_remove {
					if let (Some(start), Some(end)) = (vnode.host(), vnode.anchor()) {
						self.remove_range(start, end)?;
					}
				}
				Ok(())
			}
			VNodeKind::Teleport => {
				// Children live in the teleport target, not under the
				// ancestor being removed.
				self.unmount_children(vnode.children().nodes(), true)?;
				if do_remove {
					if let Some(placeholder) = vnode.host() {
						self.platform.remove(placeholder)?;
					}
				}
				Ok(())
			}
			VNodeKind::KeepAlive => self.unmount_keep_alive(vnode, do_remove),
			VNodeKind::Suspense => self.unmount_suspense(vnode, do_remove),
			VNodeKind::Element(_) => {
				if let Children::Nodes(nodes) = vnode.children() {
					self.unmount_children(nodes, false)?;
				}
				if do_remove {
					if let Some(host) = vnode.host() {
						self.platform.remove(host)?;
					}
				}
				Ok(())
			}
			VNodeKind::Text(_) | VNodeKind::Comment(_) => {
				if do_remove {
					if let Some(host) = vnode.host() {
						self.platform.remove(host)?;
					}
				}
				Ok(())
			}
		}
	}

	fn unmount_component(&self, vnode: &VNode, do_remove: bool) -> Result<(), RuntimeError> {
		let Some(instance) = Self::instance_of(vnode) else {
			return Ok(());
		};
		if !instance.is_active() {
			return Ok(());
		}
		tracing::debug!(component = instance.name(), uid = instance.uid(), "unmounting component");
		instance.invoke_hooks(HookKind::BeforeUnmount);
		instance.deactivate();
		invalidate_job(JobId::from_raw(instance.uid()));
		if let Some(effect) = instance.take_effect() {
			effect.stop();
		}
		// Children come down before this instance's own host nodes go.
		if let Some(sub_tree) = instance.take_sub_tree() {
			self.unmount(&sub_tree, do_remove)?;
		}
		instance.release_provides();
		let unmounted_instance = instance.clone();
		queue_post_flush_cb(Job::new(JobId::next(), move || {
			unmounted_instance.invoke_hooks(HookKind::Unmounted);
		}));
		Ok(())
	}

	/// Relocates an already-mounted subtree; host identity never changes.
	pub(crate) fn move_node(
		&self,
		vnode: &VNode,
		container: HostId,
		anchor: Option<HostId>,
	) -> Result<(), RuntimeError> {
		match vnode.kind() {
			VNodeKind::Component(_) => match Self::instance_of(vnode) {
				Some(instance) => instance.with_sub_tree(|tree| match tree {
					Some(tree) => self.move_node(tree, container, anchor),
					None => Ok(()),
				}),
				None => Ok(()),
			},
			VNodeKind::Fragment | VNodeKind::Static => {
				let start = vnode.host().ok_or_else(|| missing_host(vnode))?;
				let end = vnode.anchor().ok_or_else(|| missing_host(vnode))?;
				self.move_range(start, end, container, anchor)
			}
			VNodeKind::KeepAlive => match vnode.children().nodes().first() {
				Some(child) => self.move_node(child, container, anchor),
				None => Ok(()),
			},
			VNodeKind::Suspense => self.move_suspense(vnode, container, anchor),
			VNodeKind::Teleport => {
				// Only the placeholder lives in the main tree.
				let placeholder = vnode.host().ok_or_else(|| missing_host(vnode))?;
				self.platform.insert(placeholder, container, anchor)?;
				Ok(())
			}
			_ => {
				let host = vnode.host().ok_or_else(|| missing_host(vnode))?;
				self.platform.insert(host, container, anchor)?;
				Ok(())
			}
		}
	}

	fn move_range(
		&self,
		start: HostId,
		end: HostId,
		container: HostId,
		anchor: Option<HostId>,
	) -> Result<(), RuntimeError> {
		for node in self.collect_range(start, end)? {
			self.platform.insert(node, container, anchor)?;
		}
		Ok(())
	}

	fn remove_range(&self, start: HostId, end: HostId) -> Result<(), RuntimeError> {
		for node in self.collect_range(start, end)? {
			self.platform.remove(node)?;
		}
		Ok(())
	}

	fn collect_range(&self, start: HostId, end: HostId) -> Result<Vec<HostId>, RuntimeError> {
		let mut nodes = vec![start];
		let mut cursor = start;
		while cursor != end {
			match self.platform.next_sibling(cursor)? {
				Some(next) => {
					nodes.push(next);
					cursor = next;
				}
				None => break,
			}
		}
		Ok(nodes)
	}

	/// First host node materialized for a vnode, looking through components
	/// and structural wrappers. Used as the insertion anchor ahead of a
	/// sibling.
	pub(crate) fn first_host(&self, vnode: &VNode) -> Option<HostId> {
		match vnode.kind() {
			VNodeKind::Component(_) => Self::instance_of(vnode)
				.and_then(|instance| {
					instance.with_sub_tree(|tree| tree.and_then(|tree| self.first_host(tree)))
				}),
			VNodeKind::KeepAlive => vnode
				.children()
				.nodes()
				.first()
				.and_then(|child| self.first_host(child)),
			VNodeKind::Suspense => self.suspense_first_host(vnode),
			_ => vnode.host(),
		}
	}

	fn last_host(&self, vnode: &VNode) -> Option<HostId> {
		match vnode.kind() {
			VNodeKind::Component(_) => Self::instance_of(vnode)
				.and_then(|instance| {
					instance.with_sub_tree(|tree| tree.and_then(|tree| self.last_host(tree)))
				}),
			VNodeKind::KeepAlive => vnode
				.children()
				.nodes()
				.first()
				.and_then(|child| self.last_host(child)),
			VNodeKind::Fragment | VNodeKind::Static => vnode.anchor(),
			// Teleport and suspense both end on their placeholder comment.
			_ => vnode.host(),
		}
	}

	/// Host position immediately after `vnode`, used as the anchor when a
	/// replacement must land in the same spot.
	pub(crate) fn next_host_position(&self, vnode: &VNode) -> Result<Option<HostId>, RuntimeError> {
		match self.last_host(vnode) {
			Some(last) => Ok(self.platform.next_sibling(last)?),
			None => Ok(None),
		}
	}

	pub(crate) fn host_parent_of(&self, vnode: &VNode) -> Result<HostId, RuntimeError> {
		let first = self.first_host(vnode).ok_or_else(|| missing_host(vnode))?;
		self.platform
			.parent(first)?
			.ok_or_else(|| missing_host(vnode))
	}

	pub(crate) fn instance_of(vnode: &VNode) -> Option<Rc<ComponentInstance>> {
		vnode.state()?.downcast::<ComponentInstance>().ok()
	}
}

pub(crate) fn missing_host(vnode: &VNode) -> RuntimeError {
	RuntimeError::MissingHost {
		node: format!("{:?}", vnode.kind()),
	}
}

/// Indices (into `input`) of one longest strictly increasing subsequence,
/// skipping zero entries. `input` values are old child indices offset by
/// one, so zero means "no old counterpart".
fn longest_increasing_subsequence(input: &[usize]) -> Vec<usize> {
	let mut parents = vec![0usize; input.len()];
	// Indices of the smallest known tail for each subsequence length.
	let mut tails: Vec<usize> = Vec::new();

	for (index, &value) in input.iter().enumerate() {
		if value == 0 {
			continue;
		}
		let pos = tails.partition_point(|&tail| input[tail] < value);
		if pos > 0 {
			parents[index] = tails[pos - 1];
		}
		if pos == tails.len() {
			tails.push(index);
		} else {
			tails[pos] = index;
		}
	}

	let mut result = tails;
	if result.is_empty() {
		return result;
	}
	let mut cursor = result[result.len() - 1];
	for slot in result.iter_mut().rev() {
		*slot = cursor;
		cursor = parents[cursor];
	}
	result
}

#[cfg(test)]
mod tests {
	use super::longest_increasing_subsequence;

	#[test]
	fn test_lis_of_increasing_input_is_everything() {
		assert_eq!(longest_increasing_subsequence(&[1, 2, 3, 4]), vec![0, 1, 2, 3]);
	}

	#[test]
	fn test_lis_skips_zero_entries() {
		// Zeros mark freshly mounted children with no old index.
		assert_eq!(longest_increasing_subsequence(&[0, 2, 0, 4]), vec![1, 3]);
	}

	#[test]
	fn test_lis_of_rotated_sequence() {
		// Old order [3,1,2] as one-based indices: moving one node suffices.
		assert_eq!(longest_increasing_subsequence(&[3, 1, 2]), vec![1, 2]);
	}

	#[test]
	fn test_lis_of_reversed_input_is_single_element() {
		let result = longest_increasing_subsequence(&[4, 3, 2, 1]);
		assert_eq!(result.len(), 1);
	}

	#[test]
	fn test_lis_of_empty_and_all_zero_input() {
		assert!(longest_increasing_subsequence(&[]).is_empty());
		assert!(longest_increasing_subsequence(&[0, 0]).is_empty());
	}
}
