//! Teleport: children render into a host container elsewhere in the tree.
//!
//! The teleport node leaves a comment placeholder at its logical position;
//! its children mount, patch, and move inside the target resolved from the
//! `to` selector prop.

use core::cell::Cell;
use std::rc::Rc;

use grappelli_vdom::{HostId, VNode};

use crate::errors::RuntimeError;
use crate::instance::ComponentInstance;
use crate::platform::PlatformError;
use crate::renderer::Renderer;

struct TeleportState {
	target: Cell<HostId>,
}

fn state_of(vnode: &VNode) -> Option<Rc<TeleportState>> {
	vnode.state()?.downcast::<TeleportState>().ok()
}

fn selector_of(vnode: &VNode) -> String {
	vnode.props().get_text("to").unwrap_or_default().to_string()
}

impl Renderer {
	pub(crate) fn process_teleport(
		&self,
		old: Option<&VNode>,
		new: &VNode,
		container: HostId,
		anchor: Option<HostId>,
		parent: Option<&Rc<ComponentInstance>>,
	) -> Result<(), RuntimeError> {
		match old {
			None => {
				let placeholder = self.platform.create_comment("teleport")?;
				self.platform.insert(placeholder, container, anchor)?;
				new.set_host(Some(placeholder));

				let target = self.resolve_target(&selector_of(new))?;
				new.set_state(Some(Rc::new(TeleportState {
					target: Cell::new(target),
				})));
				self.mount_children(new.children().nodes(), target, None, parent)?;
			}
			Some(prev) => {
				let Some(state) = state_of(prev) else {
					return Ok(());
				};
				new.set_state(prev.state());
				new.set_host(prev.host());

				let target = state.target.get();
				self.patch_children(prev, new, target, None, parent)?;

				let next_selector = selector_of(new);
				if next_selector != selector_of(prev) {
					let next_target = self.resolve_target(&next_selector)?;
					tracing::debug!(selector = %next_selector, "teleport target changed");
					for child in new.children().nodes() {
						self.move_node(child, next_target, None)?;
					}
					state.target.set(next_target);
				}
			}
		}
		Ok(())
	}

	fn resolve_target(&self, selector: &str) -> Result<HostId, RuntimeError> {
		self.platform
			.query_selector(selector)?
			.ok_or_else(|| PlatformError::NoSuchTarget(selector.to_string()).into())
	}
}
