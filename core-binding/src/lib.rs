//! Cancellable asynchronous computation primitive for the browser file bridge.
//!
//! Browser file APIs are callback-based: an operation registers a listener,
//! returns control immediately, and delivers its result later through the
//! event loop. This crate bridges that shape into a [`Future`]: a [`Binding`]
//! is built from a start function that receives an at-most-once settle
//! callback and may hand back a cancel hook. Dropping a pending binding
//! invokes the hook, which is how mid-flight native work gets aborted.
//!
//! The crate is pure Rust and single-threaded by design (`Rc`/`RefCell`, no
//! `Send` bounds), matching the cooperative event-driven host it targets.
//!
//! [`Future`]: std::future::Future

pub mod binding;

pub use binding::{Binding, Cancel, Settle};
