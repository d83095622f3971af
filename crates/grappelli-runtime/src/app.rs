//! Application roots.
//!
//! An `App` binds one root component definition to a renderer and a host
//! container. App-level provides sit above the root component in the
//! context chain, so every component in the tree can inject them.

use core::cell::RefCell;
use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use grappelli_vdom::{ComponentDef, HostId, Props, VNode};

use crate::errors::RuntimeError;
use crate::instance::ComponentInstance;
use crate::platform::Platform;
use crate::renderer::Renderer;

struct MountedRoot {
	vnode: VNode,
	/// Keeps app-level provides reachable through the instance chain.
	_context: Rc<ComponentInstance>,
}

/// One application instance: a root component plus its renderer.
pub struct App {
	renderer: Rc<Renderer>,
	root_def: Rc<ComponentDef>,
	provides: RefCell<HashMap<String, Rc<dyn Any>>>,
	mounted: RefCell<Option<MountedRoot>>,
}

/// Creates an application from a platform adapter and a root component.
pub fn create_app(platform: Rc<dyn Platform>, root: Rc<ComponentDef>) -> App {
	App {
		renderer: Renderer::new(platform),
		root_def: root,
		provides: RefCell::new(HashMap::new()),
		mounted: RefCell::new(None),
	}
}

impl App {
	pub fn renderer(&self) -> &Rc<Renderer> {
		&self.renderer
	}

	/// Registers an app-level provide, injectable from any component in
	/// the tree. Must be called before [`mount`](App::mount).
	pub fn provide<T: 'static>(&self, key: impl Into<String>, value: T) -> &Self {
		self.provides.borrow_mut().insert(key.into(), Rc::new(value));
		self
	}

	pub fn is_mounted(&self) -> bool {
		self.mounted.borrow().is_some()
	}

	/// Mounts the root component into `container`. Mounting an already
	/// mounted app is a logged no-op.
	pub fn mount(&self, container: HostId) -> Result<(), RuntimeError> {
		if self.is_mounted() {
			tracing::warn!("app is already mounted; ignoring");
			return Ok(());
		}
		let context = ComponentInstance::app_context(self.provides.borrow().clone());
		let vnode = VNode::component(self.root_def.clone(), Props::new());
		self.renderer.patch(None, &vnode, container, None, Some(&context))?;
		*self.mounted.borrow_mut() = Some(MountedRoot {
			vnode,
			_context: context,
		});
		Ok(())
	}

	/// Unmounts the root subtree, firing unmount hooks and removing its
	/// host nodes.
	pub fn unmount(&self) -> Result<(), RuntimeError> {
		if let Some(root) = self.mounted.borrow_mut().take() {
			self.renderer.unmount(&root.vnode, true)?;
		}
		Ok(())
	}
}
