//! Keep-alive: removal becomes deactivation into an offstage cache.
//!
//! When the wrapped component's definition changes, the outgoing subtree is
//! moved into a detached storage container instead of being unmounted; its
//! instance, effect, and state all survive. Re-selecting a cached
//! definition moves the subtree back and fires `activated` instead of
//! re-running the mount path. The cache is keyed by component definition
//! identity.

use core::cell::RefCell;
use std::rc::Rc;

use grappelli_scheduler::{Job, JobId, queue_post_flush_cb};
use grappelli_vdom::{ComponentDef, HostId, VNode, VNodeKind};

use crate::errors::RuntimeError;
use crate::instance::{ComponentInstance, HookKind};
use crate::renderer::Renderer;

struct KeepAliveCache {
	storage: HostId,
	/// Deactivated subtrees by definition identity.
	cache: RefCell<Vec<(usize, VNode)>>,
}

impl KeepAliveCache {
	fn insert(&self, def: usize, vnode: VNode) {
		self.cache.borrow_mut().push((def, vnode));
	}

	fn take(&self, def: usize) -> Option<VNode> {
		let mut cache = self.cache.borrow_mut();
		let index = cache.iter().position(|(cached, _)| *cached == def)?;
		Some(cache.remove(index).1)
	}

	fn drain(&self) -> Vec<VNode> {
		self.cache.borrow_mut().drain(..).map(|(_, vnode)| vnode).collect()
	}
}

fn cache_of(vnode: &VNode) -> Option<Rc<KeepAliveCache>> {
	vnode.state()?.downcast::<KeepAliveCache>().ok()
}

fn def_identity(def: &Rc<ComponentDef>) -> usize {
	Rc::as_ptr(def) as *const () as usize
}

fn queue_hook(vnode: &VNode, kind: HookKind) {
	if let Some(instance) = Renderer::instance_of(vnode) {
		queue_post_flush_cb(Job::new(JobId::next(), move || instance.invoke_hooks(kind)));
	}
}

impl Renderer {
	pub(crate) fn process_keep_alive(
		&self,
		old: Option<&VNode>,
		new: &VNode,
		container: HostId,
		anchor: Option<HostId>,
		parent: Option<&Rc<ComponentInstance>>,
	) -> Result<(), RuntimeError> {
		let Some(new_child) = new.children().nodes().first() else {
			tracing::warn!("keep-alive without a child; nothing to do");
			return Ok(());
		};
		match old {
			None => {
				let storage = self.platform.create_container()?;
				new.set_state(Some(Rc::new(KeepAliveCache {
					storage,
					cache: RefCell::new(Vec::new()),
				})));
				self.patch(None, new_child, container, anchor, parent)
			}
			Some(prev) => {
				let Some(cache) = cache_of(prev) else {
					return Ok(());
				};
				new.set_state(prev.state());
				let Some(old_child) = prev.children().nodes().first() else {
					return Ok(());
				};

				if old_child.same_type(new_child) {
					let child_container = self.host_parent_of(old_child)?;
					return self.patch(Some(old_child), new_child, child_container, None, parent);
				}

				let child_container = self.host_parent_of(old_child)?;
				let position = self.next_host_position(old_child)?;

				// Deactivate the outgoing subtree instead of unmounting it.
				self.move_node(old_child, cache.storage, None)?;
				queue_hook(old_child, HookKind::Deactivated);
				if let VNodeKind::Component(old_def) = old_child.kind() {
					cache.insert(def_identity(old_def), old_child.clone());
				}

				let VNodeKind::Component(new_def) = new_child.kind() else {
					return Ok(());
				};
				match cache.take(def_identity(new_def)) {
					Some(cached) => {
						// Reactivate: move back, then patch for fresh props.
						self.move_node(&cached, child_container, position)?;
						self.patch(Some(&cached), new_child, child_container, position, parent)?;
						queue_hook(new_child, HookKind::Activated);
						Ok(())
					}
					None => self.patch(None, new_child, child_container, position, parent),
				}
			}
		}
	}

	pub(crate) fn unmount_keep_alive(
		&self,
		vnode: &VNode,
		do_remove: bool,
	) -> Result<(), RuntimeError> {
		if let Some(child) = vnode.children().nodes().first() {
			self.unmount(child, do_remove)?;
		}
		if let Some(cache) = cache_of(vnode) {
			// Cached instances were never unmounted; do it for real now.
			for cached in cache.drain() {
				self.unmount(&cached, false)?;
			}
			self.platform.remove(cache.storage)?;
		}
		Ok(())
	}
}
