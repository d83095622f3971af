//! Reconciler behavior against the mock host: mounting, prop patching,
//! text updates, type-change replacement, and fragments.

use std::rc::Rc;

use grappelli_runtime::Renderer;
use grappelli_testkit::{MockDom, Op};
use grappelli_vdom::{PropValue, element, fragment, text};

fn fixture() -> (Rc<MockDom>, Rc<Renderer>, grappelli_vdom::HostId) {
	let dom = MockDom::new();
	let root = dom.create_root();
	let renderer = Renderer::new(dom.clone());
	(dom, renderer, root)
}

#[test]
fn test_mount_element_with_text_and_props() {
	let (dom, renderer, root) = fixture();
	let vnode = element("a")
		.prop("href", "/home")
		.prop("disabled", true)
		.text("home")
		.build();

	renderer.patch(None, &vnode, root, None, None).unwrap();

	assert_eq!(
		dom.render_to_string(root),
		"<a href=\"/home\" disabled>home</a>"
	);
	assert!(vnode.host().is_some());
}

#[test]
fn test_patch_rewrites_only_changed_props() {
	let (dom, renderer, root) = fixture();
	let old = element("input")
		.prop("type", "text")
		.prop("value", "a")
		.build();
	renderer.patch(None, &old, root, None, None).unwrap();
	dom.clear_ops();

	let new = element("input")
		.prop("type", "text")
		.prop("value", "b")
		.prop("placeholder", "name")
		.build();
	renderer.patch(Some(&old), &new, root, None, None).unwrap();

	let prop_ops: Vec<String> = dom
		.ops()
		.iter()
		.filter_map(|op| match op {
			Op::PatchProp { name, .. } => Some(name.clone()),
			_ => None,
		})
		.collect();
	assert_eq!(prop_ops, vec!["value", "placeholder"]);
	assert_eq!(
		dom.render_to_string(root),
		"<input type=\"text\" value=\"b\" placeholder=\"name\"></input>"
	);
}

#[test]
fn test_removed_prop_is_cleared() {
	let (dom, renderer, root) = fixture();
	let old = element("div").prop("class", "open").build();
	renderer.patch(None, &old, root, None, None).unwrap();

	let new = element("div").build();
	renderer.patch(Some(&old), &new, root, None, None).unwrap();

	assert_eq!(dom.render_to_string(root), "<div></div>");
}

#[test]
fn test_text_patch_updates_payload_in_place() {
	let (dom, renderer, root) = fixture();
	let old = text("one");
	renderer.patch(None, &old, root, None, None).unwrap();
	let host = old.host();
	dom.clear_ops();

	let new = text("two");
	renderer.patch(Some(&old), &new, root, None, None).unwrap();

	assert_eq!(new.host(), host);
	assert_eq!(dom.render_to_string(root), "two");
	assert_eq!(dom.create_count(), 0);
}

#[test]
fn test_identical_text_is_a_noop() {
	let (dom, renderer, root) = fixture();
	let old = text("same");
	renderer.patch(None, &old, root, None, None).unwrap();
	dom.clear_ops();

	let new = text("same");
	renderer.patch(Some(&old), &new, root, None, None).unwrap();

	assert!(dom.ops().is_empty());
}

#[test]
fn test_tag_change_replaces_the_node() {
	let (dom, renderer, root) = fixture();
	let old = element("div").text("x").build();
	renderer.patch(None, &old, root, None, None).unwrap();
	let old_host = old.host().unwrap();
	dom.clear_ops();

	let new = element("span").text("x").build();
	renderer.patch(Some(&old), &new, root, None, None).unwrap();

	assert_ne!(new.host(), Some(old_host));
	assert!(!dom.contains(old_host));
	assert_eq!(dom.remove_count(), 1);
	assert_eq!(dom.render_to_string(root), "<span>x</span>");
}

#[test]
fn test_replacement_lands_in_the_old_position() {
	let (dom, renderer, root) = fixture();
	let old_list = element("ul")
		.child(element("div").text("a").build())
		.child(element("i").text("z").build())
		.build();
	renderer.patch(None, &old_list, root, None, None).unwrap();

	// Type change on the first child must keep it before its sibling.
	let new_list = element("ul")
		.child(element("span").text("a").build())
		.child(element("i").text("z").build())
		.build();
	renderer
		.patch(Some(&old_list), &new_list, root, None, None)
		.unwrap();

	assert_eq!(
		dom.render_to_string(root),
		"<ul><span>a</span><i>z</i></ul>"
	);
}

#[test]
fn test_fragment_mounts_between_anchor_comments() {
	let (dom, renderer, root) = fixture();
	let frag = fragment(vec![text("a"), text("b")]);

	renderer.patch(None, &frag, root, None, None).unwrap();

	assert_eq!(dom.render_to_string(root), "<!--[-->ab<!--]-->");
}

#[test]
fn test_unkeyed_children_grow_and_shrink() {
	let (dom, renderer, root) = fixture();
	let two = element("ul")
		.children(vec![text("a"), text("b")])
		.build();
	renderer.patch(None, &two, root, None, None).unwrap();

	let three = element("ul")
		.children(vec![text("a"), text("b"), text("c")])
		.build();
	renderer.patch(Some(&two), &three, root, None, None).unwrap();
	assert_eq!(dom.render_to_string(root), "<ul>abc</ul>");

	let one = element("ul").children(vec![text("a")]).build();
	renderer.patch(Some(&three), &one, root, None, None).unwrap();
	assert_eq!(dom.render_to_string(root), "<ul>a</ul>");
}

#[test]
fn test_unmount_removes_the_whole_subtree() {
	let (dom, renderer, root) = fixture();
	let tree = element("div")
		.child(element("p").text("inner").build())
		.build();
	renderer.patch(None, &tree, root, None, None).unwrap();
	let host = tree.host().unwrap();

	renderer.unmount(&tree, true).unwrap();

	assert!(!dom.contains(host));
	assert_eq!(dom.render_to_string(root), "");
}

#[test]
fn test_child_text_to_nodes_and_back() {
	let (dom, renderer, root) = fixture();
	let with_text = element("div").text("plain").build();
	renderer.patch(None, &with_text, root, None, None).unwrap();

	let with_nodes = element("div")
		.child(element("b").text("bold").build())
		.build();
	renderer
		.patch(Some(&with_text), &with_nodes, root, None, None)
		.unwrap();
	assert_eq!(dom.render_to_string(root), "<div><b>bold</b></div>");

	let back_to_text = element("div").text("plain").build();
	renderer
		.patch(Some(&with_nodes), &back_to_text, root, None, None)
		.unwrap();
	assert_eq!(dom.render_to_string(root), "<div>plain</div>");
}

#[test]
fn test_handler_identity_skips_repatch() {
	let (dom, renderer, root) = fixture();
	let handler = grappelli_vdom::EventHandler::new(|| {});
	let old = element("button")
		.prop("onclick", PropValue::Handler(handler.clone()))
		.build();
	renderer.patch(None, &old, root, None, None).unwrap();
	dom.clear_ops();

	let new = element("button")
		.prop("onclick", PropValue::Handler(handler))
		.build();
	renderer.patch(Some(&old), &new, root, None, None).unwrap();

	assert!(
		dom.ops()
			.iter()
			.all(|op| !matches!(op, Op::PatchProp { .. }))
	);
}
