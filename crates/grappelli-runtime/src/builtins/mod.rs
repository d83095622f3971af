//! Structural components: teleport, keep-alive, suspense.
//!
//! These are variants of the reconciler's dispatch, not components in the
//! user sense: each gets a dedicated sub-procedure with reconciliation
//! behavior beyond plain mount/patch/unmount.

mod keep_alive;
mod suspense;
mod teleport;

pub use suspense::{SuspenseDep, register_async_dep};
