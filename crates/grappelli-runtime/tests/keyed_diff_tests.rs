//! Keyed list reconciliation: host identity preservation and move
//! minimality under reordering.

use std::rc::Rc;

use grappelli_runtime::Renderer;
use grappelli_testkit::MockDom;
use grappelli_vdom::{HostId, VNode, element};
use proptest::prelude::*;
use rstest::rstest;

fn keyed_list(keys: &[i64]) -> VNode {
	let items = keys
		.iter()
		.map(|&key| element("li").key(key).text("item").build())
		.collect::<Vec<_>>();
	element("ul").children(items).build()
}

fn child_host(list: &VNode, index: usize) -> HostId {
	list.children().nodes()[index].host().unwrap()
}

fn fixture() -> (Rc<MockDom>, Rc<Renderer>, HostId) {
	let dom = MockDom::new();
	let root = dom.create_root();
	let renderer = Renderer::new(dom.clone());
	(dom, renderer, root)
}

/// Longest strictly increasing subsequence length, quadratic reference.
fn lis_len(seq: &[usize]) -> usize {
	if seq.is_empty() {
		return 0;
	}
	let mut best = vec![1usize; seq.len()];
	for i in 1..seq.len() {
		for j in 0..i {
			if seq[j] < seq[i] && best[j] + 1 > best[i] {
				best[i] = best[j] + 1;
			}
		}
	}
	best.into_iter().max().unwrap_or(0)
}

#[test]
fn test_rotation_moves_one_node() {
	let (dom, renderer, root) = fixture();
	let old = keyed_list(&[1, 2, 3]);
	renderer.patch(None, &old, root, None, None).unwrap();
	let hosts = [
		child_host(&old, 0),
		child_host(&old, 1),
		child_host(&old, 2),
	];
	dom.clear_ops();

	let new = keyed_list(&[3, 1, 2]);
	renderer.patch(Some(&old), &new, root, None, None).unwrap();

	assert_eq!(dom.move_count(), 1);
	assert_eq!(dom.remove_count(), 0);
	assert_eq!(dom.create_count(), 0);
	// Same hosts, new order.
	assert_eq!(child_host(&new, 0), hosts[2]);
	assert_eq!(child_host(&new, 1), hosts[0]);
	assert_eq!(child_host(&new, 2), hosts[1]);
}

#[test]
fn test_append_touches_nothing_else() {
	let (dom, renderer, root) = fixture();
	let old = keyed_list(&[1, 2, 3]);
	renderer.patch(None, &old, root, None, None).unwrap();
	dom.clear_ops();

	let new = keyed_list(&[1, 2, 3, 4]);
	renderer.patch(Some(&old), &new, root, None, None).unwrap();

	assert_eq!(dom.move_count(), 0);
	assert_eq!(dom.remove_count(), 0);
	// One li element and its text node.
	assert_eq!(dom.create_count(), 2);
}

#[test]
fn test_prepend_mounts_before_the_old_head() {
	let (dom, renderer, root) = fixture();
	let old = keyed_list(&[2, 3]);
	renderer.patch(None, &old, root, None, None).unwrap();
	let old_head = child_host(&old, 0);
	dom.clear_ops();

	let new = keyed_list(&[1, 2, 3]);
	renderer.patch(Some(&old), &new, root, None, None).unwrap();

	assert_eq!(dom.move_count(), 0);
	assert_eq!(child_host(&new, 1), old_head);
	assert_eq!(
		dom.render_to_string(root),
		"<ul><li>item</li><li>item</li><li>item</li></ul>"
	);
}

#[test]
fn test_middle_removal_moves_nothing() {
	let (dom, renderer, root) = fixture();
	let old = keyed_list(&[1, 2, 3]);
	renderer.patch(None, &old, root, None, None).unwrap();
	let removed = child_host(&old, 1);
	dom.clear_ops();

	let new = keyed_list(&[1, 3]);
	renderer.patch(Some(&old), &new, root, None, None).unwrap();

	assert_eq!(dom.move_count(), 0);
	assert_eq!(dom.remove_count(), 1);
	assert!(!dom.contains(removed));
}

#[test]
fn test_swap_of_ends_keeps_the_middle_still() {
	let (dom, renderer, root) = fixture();
	let old = keyed_list(&[1, 2, 3, 4, 5]);
	renderer.patch(None, &old, root, None, None).unwrap();
	dom.clear_ops();

	// Old indices in new order are [4,1,2,3,0]; the stable run 1,2,3
	// must not move, so only the two swapped ends do.
	let new = keyed_list(&[5, 2, 3, 4, 1]);
	renderer.patch(Some(&old), &new, root, None, None).unwrap();

	assert_eq!(dom.move_count(), 2);
	assert_eq!(dom.remove_count(), 0);
	assert_eq!(dom.create_count(), 0);
}

#[rstest]
#[case(&[1, 2, 3, 4], &[4, 3, 2, 1], 3)]
#[case(&[1, 2, 3, 4], &[2, 1, 4, 3], 2)]
#[case(&[1, 2, 3, 4, 5], &[1, 3, 5, 2, 4], 2)]
#[case(&[1, 2, 3], &[1, 2, 3], 0)]
fn test_permutation_move_counts(
	#[case] before: &[i64],
	#[case] after: &[i64],
	#[case] expected_moves: usize,
) {
	let (dom, renderer, root) = fixture();
	let old = keyed_list(before);
	renderer.patch(None, &old, root, None, None).unwrap();
	dom.clear_ops();

	let new = keyed_list(after);
	renderer.patch(Some(&old), &new, root, None, None).unwrap();

	assert_eq!(dom.move_count(), expected_moves);
	assert_eq!(dom.remove_count(), 0);
	assert_eq!(dom.create_count(), 0);
}

#[test]
fn test_mixed_insert_remove_and_move() {
	let (dom, renderer, root) = fixture();
	let old = keyed_list(&[1, 2, 3, 4]);
	renderer.patch(None, &old, root, None, None).unwrap();
	let kept = [child_host(&old, 1), child_host(&old, 3)];
	dom.clear_ops();

	let new = keyed_list(&[4, 5, 2]);
	renderer.patch(Some(&old), &new, root, None, None).unwrap();

	// Keys 1 and 3 leave, key 5 arrives, keys 2 and 4 survive reordered.
	assert_eq!(dom.remove_count(), 2);
	assert_eq!(child_host(&new, 0), kept[1]);
	assert_eq!(child_host(&new, 2), kept[0]);
	assert_eq!(
		dom.render_to_string(root),
		"<ul><li>item</li><li>item</li><li>item</li></ul>"
	);
}

proptest! {
	/// Reordering a keyed list performs exactly `len - LIS` host moves
	/// and never recreates or removes a surviving node.
	#[test]
	fn test_permutation_moves_are_minimal(perm in Just(8usize).prop_flat_map(|n| {
		proptest::sample::subsequence((0..n as i64).collect::<Vec<_>>(), 2..=n)
			.prop_shuffle()
	})) {
		let (dom, renderer, root) = fixture();
		let mut before = perm.clone();
		before.sort_unstable();
		let old = keyed_list(&before);
		renderer.patch(None, &old, root, None, None).unwrap();
		dom.clear_ops();

		let new = keyed_list(&perm);
		renderer.patch(Some(&old), &new, root, None, None).unwrap();

		// Old positions of the surviving keys in their new order.
		let old_positions: Vec<usize> = perm
			.iter()
			.map(|key| before.iter().position(|k| k == key).unwrap())
			.collect();
		let expected_moves = perm.len() - lis_len(&old_positions);
		prop_assert_eq!(dom.move_count(), expected_moves);
		prop_assert_eq!(dom.remove_count(), 0);
		prop_assert_eq!(dom.create_count(), 0);
	}
}
