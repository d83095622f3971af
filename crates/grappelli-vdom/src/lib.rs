//! Virtual node model for Grappelli
//!
//! A `VNode` is an immutable-per-version description of one node in the
//! desired output tree. The reconciler in `grappelli-runtime` consumes pairs
//! of virtual trees and computes host mutations; this crate only describes
//! trees, it never touches a host platform.
//!
//! ## Key Types
//!
//! - **`VNode`**: one node; a closed tagged union over element, text,
//!   comment, fragment, static block, component, and the structural kinds
//!   (teleport, keep-alive, suspense).
//! - **`Props`**: an ordered `name → PropValue` mapping. Event handlers are
//!   values too, compared by identity rather than structure.
//! - **`Children`**: normalized child content (`None | Text | Nodes`).
//! - **`Key`**: optional stable identity used by keyed list diffing.
//! - **`PatchFlag`**: a bitset hinting which parts of a node are dynamic so
//!   the diff can skip static work.
//! - **`HostId`**: a non-owning handle to a materialized host node. The host
//!   tree owns its nodes; virtual nodes only carry back-references.
//!
//! ## Example
//!
//! ```
//! use grappelli_vdom::{element, text};
//!
//! let tree = element("ul")
//! 	.class("menu")
//! 	.child(element("li").key(1).text("Home").build())
//! 	.child(element("li").key(2).text("About").build())
//! 	.build();
//! assert_eq!(tree.children().len(), 2);
//! ```

mod builder;
mod children;
mod node;
mod patch_flag;
mod props;
mod slots;

pub use builder::{ElementBuilder, comment, element, fragment, static_block, text};
pub use children::Children;
pub use node::{BoxError, ComponentDef, HostId, Key, RenderFn, SetupFn, VNode, VNodeKind};
pub use patch_flag::PatchFlag;
pub use props::{EventHandler, PropValue, Props};
pub use slots::{DEFAULT_SLOT, SlotFn, Slots};
