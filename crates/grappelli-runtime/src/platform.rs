//! The host platform adapter.
//!
//! The reconciler never touches a concrete host API. Everything it needs
//! from the outside world is behind [`Platform`]: create a node, insert it
//! relative to a parent and anchor, patch a property, remove it. A DOM
//! binding, a terminal renderer, and the in-memory test platform all plug in
//! here.

use grappelli_vdom::{HostId, PropValue};

/// Failures raised by a host mutation primitive.
///
/// Adapter failures are propagated, never swallowed: a platform that cannot
/// apply a mutation leaves the reconciler unable to keep its picture of the
/// host tree truthful.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
	#[error("host node {0:?} is unknown to the platform")]
	UnknownNode(HostId),

	#[error("no host node matches selector `{0}`")]
	NoSuchTarget(String),

	#[error("host platform rejected the operation: {0}")]
	Backend(String),
}

/// Primitive host mutations, injected at renderer construction time.
///
/// All positions are expressed as `(parent, anchor)`: insert before
/// `anchor`, or append when `anchor` is `None`. Inserting a node that is
/// already attached moves it; host node identity never changes across a
/// move.
pub trait Platform {
	fn create_element(&self, tag: &str) -> Result<HostId, PlatformError>;

	fn create_text(&self, text: &str) -> Result<HostId, PlatformError>;

	fn create_comment(&self, text: &str) -> Result<HostId, PlatformError>;

	/// Creates a detached container, used as offstage storage by keep-alive
	/// and suspense. Never inserted into the visible tree.
	fn create_container(&self) -> Result<HostId, PlatformError>;

	fn insert(&self, node: HostId, parent: HostId, anchor: Option<HostId>)
	-> Result<(), PlatformError>;

	/// Detaches `node` (and its host subtree) from its parent.
	fn remove(&self, node: HostId) -> Result<(), PlatformError>;

	/// Replaces the payload of a text or comment node.
	fn set_text(&self, node: HostId, text: &str) -> Result<(), PlatformError>;

	/// Replaces an element's entire child content with a single text run.
	fn set_element_text(&self, element: HostId, text: &str) -> Result<(), PlatformError>;

	/// Applies one property change. `old`/`new` follow the diff outcome:
	/// `(None, Some)` set, `(Some, None)` remove, `(Some, Some)` update.
	/// Handler values are attached and detached, never value-diffed.
	fn patch_prop(
		&self,
		element: HostId,
		name: &str,
		old: Option<&PropValue>,
		new: Option<&PropValue>,
	) -> Result<(), PlatformError>;

	fn parent(&self, node: HostId) -> Result<Option<HostId>, PlatformError>;

	fn next_sibling(&self, node: HostId) -> Result<Option<HostId>, PlatformError>;

	/// Resolves a teleport target selector to a host container.
	fn query_selector(&self, selector: &str) -> Result<Option<HostId>, PlatformError>;
}
