//! Dependency-tracking primitives for Grappelli
//!
//! This crate is the reactivity collaborator consumed by
//! `grappelli-runtime`: it decides *which* effects need to re-run, and the
//! runtime decides *when* (by installing a scheduler override that routes
//! re-runs through the job queue instead of running them inline).
//!
//! ## Model
//!
//! 1. **Observer stack**: the currently executing effect, tracked in a
//!    thread-local runtime.
//! 2. **Dependency tracking**: `Signal::get()` inside an effect records a
//!    signal → effect edge automatically.
//! 3. **Notification**: `Signal::set()` re-runs every subscribed effect,
//!    synchronously by default, or through the effect's scheduler override
//!    when one is installed.
//!
//! ## Example
//!
//! ```
//! use grappelli_reactive::{Effect, Signal};
//!
//! let count = Signal::new(0);
//! let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
//!
//! let seen_in_effect = seen.clone();
//! let count_in_effect = count.clone();
//! let _effect = Effect::new(move || {
//! 	seen_in_effect.borrow_mut().push(count_in_effect.get());
//! });
//!
//! count.set(1);
//! assert_eq!(*seen.borrow(), vec![0, 1]);
//! ```

mod effect;
mod runtime;
mod signal;

pub use effect::Effect;
pub use runtime::{NodeId, Runtime, untracked, with_runtime};
pub use signal::Signal;
