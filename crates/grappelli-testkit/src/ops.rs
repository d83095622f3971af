//! The mutation-op log.

use grappelli_vdom::HostId;

/// One recorded host mutation.
///
/// An `Insert` of a node that already had a parent is classified as a
/// `Move`: host identity was preserved and only the position changed. The
/// keyed-diff minimality assertions hinge on this distinction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
	CreateElement { tag: String },
	CreateText,
	CreateComment,
	CreateContainer,
	Insert { node: HostId, parent: HostId },
	Move { node: HostId, parent: HostId },
	Remove { node: HostId },
	SetText { node: HostId },
	SetElementText { node: HostId },
	PatchProp { node: HostId, name: String },
}

impl Op {
	pub fn is_move(&self) -> bool {
		matches!(self, Self::Move { .. })
	}

	pub fn is_remove(&self) -> bool {
		matches!(self, Self::Remove { .. })
	}

	pub fn is_create(&self) -> bool {
		matches!(
			self,
			Self::CreateElement { .. } | Self::CreateText | Self::CreateComment | Self::CreateContainer
		)
	}
}
