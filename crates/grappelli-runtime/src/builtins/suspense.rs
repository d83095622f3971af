//! Suspense: fallback content until descendant async work settles.
//!
//! The real content mounts into a detached offstage container first. While
//! it mounts, descendants may register async dependencies on the boundary
//! (a plain counter). With zero outstanding deps the content moves onstage
//! immediately; otherwise the fallback tree mounts in its place and the
//! swap happens exactly once, when the last outstanding dependency
//! resolves. There is no ordering guarantee among the dependencies
//! themselves, and resolution after the boundary was unmounted is a no-op.

use core::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use grappelli_vdom::{HostId, VNode};

use crate::errors::{RuntimeError, handle_error};
use crate::instance::ComponentInstance;
use crate::renderer::Renderer;

pub(crate) struct SuspenseBoundary {
	/// Outstanding async dependencies registered during the content mount.
	deps: Cell<u32>,
	/// True once the content tree is onstage.
	settled: Cell<bool>,
	active: Cell<bool>,
	offstage: HostId,
	placeholder: HostId,
	container: Cell<HostId>,
	/// Live trees; the boundary owns them so host annotations survive the
	/// parent handing in fresh vnode structures on re-render.
	content: RefCell<VNode>,
	fallback: RefCell<VNode>,
	renderer: Weak<Renderer>,
}

impl SuspenseBoundary {
	fn register(&self) {
		if self.active.get() && !self.settled.get() {
			self.deps.set(self.deps.get() + 1);
		}
	}

	fn resolve_one(&self) {
		if !self.active.get() {
			tracing::trace!("async dep resolved after its suspense boundary unmounted");
			return;
		}
		let remaining = self.deps.get().saturating_sub(1);
		self.deps.set(remaining);
		if remaining == 0 && !self.settled.get() {
			self.swap();
		}
	}

	/// Tears the fallback down and moves the content onstage. Runs once.
	fn swap(&self) {
		let Some(renderer) = self.renderer.upgrade() else {
			return;
		};
		self.settled.set(true);
		let result = (|| -> Result<(), RuntimeError> {
			renderer.unmount(&self.fallback.borrow(), true)?;
			renderer.move_node(
				&self.content.borrow(),
				self.container.get(),
				Some(self.placeholder),
			)?;
			Ok(())
		})();
		if let Err(error) = result {
			handle_error(&error, None);
		}
	}
}

thread_local! {
	static BOUNDARIES: RefCell<Vec<Rc<SuspenseBoundary>>> = const { RefCell::new(Vec::new()) };
}

fn current_boundary() -> Option<Rc<SuspenseBoundary>> {
	BOUNDARIES.with(|stack| stack.borrow().last().cloned())
}

struct BoundaryScope;

impl BoundaryScope {
	fn enter(boundary: Rc<SuspenseBoundary>) -> Self {
		BOUNDARIES.with(|stack| stack.borrow_mut().push(boundary));
		Self
	}
}

impl Drop for BoundaryScope {
	fn drop(&mut self) {
		BOUNDARIES.with(|stack| {
			stack.borrow_mut().pop();
		});
	}
}

/// One outstanding async dependency on the enclosing suspense boundary.
///
/// Dropping the handle without calling [`resolve`](SuspenseDep::resolve)
/// counts as resolution, so an abandoned load can never wedge the boundary
/// on its fallback forever.
pub struct SuspenseDep {
	boundary: Rc<SuspenseBoundary>,
	resolved: Cell<bool>,
}

impl SuspenseDep {
	/// Marks the dependency complete. The boundary swaps its content in
	/// when the last outstanding dependency resolves.
	pub fn resolve(self) {
		self.resolved.set(true);
		self.boundary.resolve_one();
	}
}

impl Drop for SuspenseDep {
	fn drop(&mut self) {
		if !self.resolved.get() {
			self.boundary.resolve_one();
		}
	}
}

/// Registers an async dependency on the suspense boundary whose content is
/// currently mounting. `None` outside a suspense content mount.
pub fn register_async_dep() -> Option<SuspenseDep> {
	let boundary = current_boundary()?;
	boundary.register();
	Some(SuspenseDep {
		boundary,
		resolved: Cell::new(false),
	})
}

fn boundary_of(vnode: &VNode) -> Option<Rc<SuspenseBoundary>> {
	vnode.state()?.downcast::<SuspenseBoundary>().ok()
}

impl Renderer {
	pub(crate) fn process_suspense(
		&self,
		old: Option<&VNode>,
		new: &VNode,
		container: HostId,
		anchor: Option<HostId>,
		parent: Option<&Rc<ComponentInstance>>,
	) -> Result<(), RuntimeError> {
		let [content_src, fallback_src] = new.children().nodes() else {
			tracing::warn!("suspense node without content and fallback; nothing to do");
			return Ok(());
		};
		match old {
			None => {
				let placeholder = self.platform.create_comment("suspense")?;
				self.platform.insert(placeholder, container, anchor)?;
				new.set_host(Some(placeholder));

				let offstage = self.platform.create_container()?;
				// Clone first so the mount annotates the boundary's copies.
				let boundary = Rc::new(SuspenseBoundary {
					deps: Cell::new(0),
					settled: Cell::new(false),
					active: Cell::new(true),
					offstage,
					placeholder,
					container: Cell::new(container),
					content: RefCell::new(content_src.clone()),
					fallback: RefCell::new(fallback_src.clone()),
					renderer: Rc::downgrade(&self.handle()),
				});
				new.set_state(Some(boundary.clone()));

				{
					let _scope = BoundaryScope::enter(boundary.clone());
					self.patch(None, &boundary.content.borrow(), offstage, None, parent)?;
				}

				if boundary.deps.get() == 0 {
					boundary.settled.set(true);
					self.move_node(&boundary.content.borrow(), container, Some(placeholder))?;
				} else {
					tracing::debug!(deps = boundary.deps.get(), "suspense showing fallback");
					self.patch(
						None,
						&boundary.fallback.borrow(),
						container,
						Some(placeholder),
						parent,
					)?;
				}
				Ok(())
			}
			Some(prev) => {
				let Some(boundary) = boundary_of(prev) else {
					return Ok(());
				};
				new.set_state(prev.state());
				new.set_host(prev.host());

				let next_content = content_src.clone();
				let prev_content = boundary.content.borrow().clone();
				if boundary.settled.get() {
					let onstage = boundary.container.get();
					self.patch(
						Some(&prev_content),
						&next_content,
						onstage,
						Some(boundary.placeholder),
						parent,
					)?;
					boundary.content.replace(next_content);
				} else {
					self.patch(Some(&prev_content), &next_content, boundary.offstage, None, parent)?;
					boundary.content.replace(next_content);

					let next_fallback = fallback_src.clone();
					let prev_fallback = boundary.fallback.borrow().clone();
					self.patch(
						Some(&prev_fallback),
						&next_fallback,
						boundary.container.get(),
						Some(boundary.placeholder),
						parent,
					)?;
					boundary.fallback.replace(next_fallback);
				}
				Ok(())
			}
		}
	}

	pub(crate) fn unmount_suspense(
		&self,
		vnode: &VNode,
		do_remove: bool,
	) -> Result<(), RuntimeError> {
		let Some(boundary) = boundary_of(vnode) else {
			return Ok(());
		};
		boundary.active.set(false);
		if boundary.settled.get() {
			self.unmount(&boundary.content.borrow(), do_remove)?;
		} else {
			self.unmount(&boundary.fallback.borrow(), do_remove)?;
			// The content never left the offstage container.
			self.unmount(&boundary.content.borrow(), true)?;
		}
		self.platform.remove(boundary.offstage)?;
		if do_remove {
			self.platform.remove(boundary.placeholder)?;
		}
		Ok(())
	}

	pub(crate) fn suspense_first_host(&self, vnode: &VNode) -> Option<HostId> {
		let boundary = boundary_of(vnode)?;
		let tree = if boundary.settled.get() {
			boundary.content.borrow()
		} else {
			boundary.fallback.borrow()
		};
		self.first_host(&tree).or(vnode.host())
	}

	pub(crate) fn move_suspense(
		&self,
		vnode: &VNode,
		container: HostId,
		anchor: Option<HostId>,
	) -> Result<(), RuntimeError> {
		let Some(boundary) = boundary_of(vnode) else {
			return Ok(());
		};
		{
			let tree = if boundary.settled.get() {
				boundary.content.borrow()
			} else {
				boundary.fallback.borrow()
			};
			self.move_node(&tree, container, anchor)?;
		}
		self.platform.insert(boundary.placeholder, container, anchor)?;
		boundary.container.set(container);
		Ok(())
	}
}
