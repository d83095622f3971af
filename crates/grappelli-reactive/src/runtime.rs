//! Thread-local reactive runtime: observer stack and dependency graph.
//!
//! The runtime is process-wide state with respect to the single logical
//! thread the UI runs on. Each thread gets its own instance via
//! `thread_local!`; on the rendering thread this is effectively a global.

use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicU64, Ordering};
use std::collections::BTreeMap;

/// Unique identifier for reactive nodes (signals and effects).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
	/// Allocates a fresh id. Ids are process-unique and monotonically
	/// increasing, which the runtime layer relies on for job ordering.
	pub fn new() -> Self {
		static COUNTER: AtomicU64 = AtomicU64::new(0);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}

	pub fn raw(self) -> u64 {
		self.0
	}
}

impl Default for NodeId {
	fn default() -> Self {
		Self::new()
	}
}

/// One node of the dependency graph.
#[derive(Debug, Default)]
struct DependencyNode {
	/// Effects that re-run when this node changes.
	subscribers: Vec<NodeId>,
	/// Signals this node read during its last run.
	dependencies: Vec<NodeId>,
}

/// The reactive runtime for the current thread.
pub struct Runtime {
	/// Stack of currently executing effects; the top is the tracking target.
	observer_stack: RefCell<Vec<NodeId>>,
	/// `signal ↔ effect` edges.
	graph: RefCell<BTreeMap<NodeId, DependencyNode>>,
	/// When non-zero, `track_dependency` is a no-op (see [`untracked`]).
	pause_depth: Cell<u32>,
}

impl Runtime {
	fn new() -> Self {
		Self {
			observer_stack: RefCell::new(Vec::new()),
			graph: RefCell::new(BTreeMap::new()),
			pause_depth: Cell::new(0),
		}
	}

	/// The effect currently being tracked, if any.
	pub fn current_observer(&self) -> Option<NodeId> {
		self.observer_stack.borrow().last().copied()
	}

	pub(crate) fn push_observer(&self, id: NodeId) {
		self.observer_stack.borrow_mut().push(id);
	}

	pub(crate) fn pop_observer(&self) -> Option<NodeId> {
		self.observer_stack.borrow_mut().pop()
	}

	/// Records `current observer depends on signal_id`. Called from
	/// `Signal::get`; a no-op outside effects or inside [`untracked`].
	pub fn track_dependency(&self, signal_id: NodeId) {
		if self.pause_depth.get() > 0 {
			return;
		}
		let Some(observer_id) = self.current_observer() else {
			return;
		};
		let mut graph = self.graph.borrow_mut();

		let signal_node = graph.entry(signal_id).or_default();
		if !signal_node.subscribers.contains(&observer_id) {
			signal_node.subscribers.push(observer_id);
		}

		let observer_node = graph.entry(observer_id).or_default();
		if !observer_node.dependencies.contains(&signal_id) {
			observer_node.dependencies.push(signal_id);
		}
	}

	/// Snapshot of the effects subscribed to a signal.
	pub fn subscribers_of(&self, signal_id: NodeId) -> Vec<NodeId> {
		self.graph
			.borrow()
			.get(&signal_id)
			.map(|node| node.subscribers.clone())
			.unwrap_or_default()
	}

	/// Drops every edge originating from `node_id`. Called before an effect
	/// re-runs so stale dependencies from the previous run don't linger.
	pub fn clear_dependencies(&self, node_id: NodeId) {
		let mut graph = self.graph.borrow_mut();

		let dependencies = match graph.get(&node_id) {
			Some(node) => node.dependencies.clone(),
			None => return,
		};
		for dep_id in dependencies {
			if let Some(dep_node) = graph.get_mut(&dep_id) {
				dep_node.subscribers.retain(|&id| id != node_id);
			}
		}
		if let Some(node) = graph.get_mut(&node_id) {
			node.dependencies.clear();
		}
	}

	/// Removes a node from the graph entirely (signal or effect dropped).
	pub fn remove_node(&self, node_id: NodeId) {
		self.clear_dependencies(node_id);
		let mut graph = self.graph.borrow_mut();
		if let Some(node) = graph.remove(&node_id) {
			for sub_id in node.subscribers {
				if let Some(sub_node) = graph.get_mut(&sub_id) {
					sub_node.dependencies.retain(|&id| id != node_id);
				}
			}
		}
	}

	/// Number of effects subscribed to a node. Exposed for tests.
	pub fn subscriber_count(&self, node_id: NodeId) -> usize {
		self.graph
			.borrow()
			.get(&node_id)
			.map(|node| node.subscribers.len())
			.unwrap_or(0)
	}

	fn pause_tracking(&self) {
		self.pause_depth.set(self.pause_depth.get() + 1);
	}

	fn resume_tracking(&self) {
		self.pause_depth.set(self.pause_depth.get().saturating_sub(1));
	}
}

thread_local! {
	static RUNTIME: Runtime = Runtime::new();
}

/// Runs `f` with the current thread's reactive runtime.
pub fn with_runtime<F, R>(f: F) -> R
where
	F: FnOnce(&Runtime) -> R,
{
	RUNTIME.with(f)
}

/// Safe accessor for `Drop` implementations; `None` once thread-local
/// storage has been torn down.
pub(crate) fn try_with_runtime<F, R>(f: F) -> Option<R>
where
	F: FnOnce(&Runtime) -> R,
{
	RUNTIME.try_with(f).ok()
}

/// Runs `f` with dependency tracking suspended: signal reads inside do not
/// subscribe the current effect.
pub fn untracked<F, R>(f: F) -> R
where
	F: FnOnce() -> R,
{
	with_runtime(|rt| rt.pause_tracking());
	let result = f();
	with_runtime(|rt| rt.resume_tracking());
	result
}
