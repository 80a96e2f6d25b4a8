//! Browser File Effect-Bridge
//!
//! This crate exposes the browser's native file-selection, file-reading, and
//! file-download primitives as a small set of cancellable asynchronous
//! operations built on [`core_binding::Binding`]. The callback/event shape of
//! the underlying web APIs (file-picker dialogs, `FileReader`, anchor-click
//! downloads) is converted into futures that settle at most once and abort
//! their native work when dropped mid-flight.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown`
//! target. It will not compile to anything for native targets.
//!
//! # Operations
//!
//! - [`validate`]: recognize an opaque runtime value as a native file handle
//! - [`handle`]: pure metadata projections over a validated handle
//! - [`download_string`] / [`download_bytes`] / [`download_url`]: save-to-disk
//!   triggers through a reused hidden anchor node
//! - [`pick_file`] / [`pick_files`]: native file-open dialogs
//! - [`read_as_text`] / [`read_as_bytes`] / [`read_as_data_url`]: blob
//!   content readers with mid-flight cancellation
//!
//! # Failure model
//!
//! [`DecodeError`] is the only typed failure, produced by the validator. All
//! other native failures — a dismissed picker dialog, a failed read, a
//! missing DOM — surface as a binding that never settles, mirroring the
//! platform's own lack of a cancel event for its dialogs. Internal failures
//! are logged through `tracing` so they remain observable.

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

mod capability;
pub mod download;
pub mod error;
pub mod handle;
pub mod reader;
pub mod upload;

// Re-export commonly used types
pub use download::{download_bytes, download_string, download_url};
pub use error::DecodeError;
pub use handle::validate;
pub use reader::{read_as_bytes, read_as_data_url, read_as_text};
pub use upload::{pick_file, pick_files, FileSelection};
pub use web_sys::{Blob, File};
