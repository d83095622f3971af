//! In-memory host platform for Grappelli tests
//!
//! `MockDom` is an arena of host nodes addressed by `HostId`, implementing
//! the runtime's `Platform` trait. Every mutation is appended to an op log
//! so tests can assert not just the final tree shape but *how* it was
//! reached: how many nodes moved, what was removed, which props were
//! patched. `render_to_string` gives an HTML-ish view for readable
//! assertions.

mod mock_dom;
mod ops;

pub use mock_dom::MockDom;
pub use ops::Op;
