//! Patch flags: compiler-shaped hints about what is dynamic in a node.
//!
//! An empty flag set means "no information, diff everything". Flags are an
//! optimization contract only; the reconciler must stay correct if it
//! ignores them entirely.

use bitflags::bitflags;

bitflags! {
	/// Bitset hinting which parts of a node can change between renders.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub struct PatchFlag: u32 {
		/// Only the text payload is dynamic.
		const TEXT = 1;
		/// Only the `class` prop is dynamic.
		const CLASS = 1 << 1;
		/// Only the `style` prop is dynamic.
		const STYLE = 1 << 2;
		/// A known subset of props is dynamic.
		const PROPS = 1 << 3;
		/// Props must be fully diffed (dynamic names).
		const FULL_PROPS = 1 << 4;
		/// Fragment whose children keep order; pairwise patch suffices.
		const STABLE_FRAGMENT = 1 << 5;
		/// Fragment with keyed children.
		const KEYED_CHILDREN = 1 << 6;
		/// Fragment with unkeyed children.
		const UNKEYED_CHILDREN = 1 << 7;
		/// Hoisted static subtree; skip on patch.
		const HOISTED = 1 << 8;
		/// Optimization bail-out; fall back to a full diff.
		const BAIL = 1 << 9;
	}
}

impl PatchFlag {
	/// Whether the diff may skip this node entirely on patch.
	pub fn is_static(self) -> bool {
		self.contains(Self::HOISTED)
	}

	/// Whether prop diffing can be skipped for this node.
	pub fn skips_props(self) -> bool {
		!self.is_empty() && !self.intersects(Self::PROPS | Self::FULL_PROPS | Self::CLASS | Self::STYLE | Self::BAIL)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_flags_mean_full_diff() {
		let flag = PatchFlag::empty();
		assert!(!flag.is_static());
		assert!(!flag.skips_props());
	}

	#[test]
	fn test_text_only_flag_skips_props() {
		assert!(PatchFlag::TEXT.skips_props());
		assert!(!(PatchFlag::TEXT | PatchFlag::FULL_PROPS).skips_props());
		assert!(!PatchFlag::BAIL.skips_props());
	}

	#[test]
	fn test_hoisted_is_static() {
		assert!(PatchFlag::HOISTED.is_static());
	}
}
