//! Error types for the file bridge.

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// The sole typed failure in this crate, produced by the handle validator
/// when an opaque runtime value is not a native file handle.
#[derive(Error, Debug)]
#[error("expecting {expected}, got {got:?}")]
pub struct DecodeError {
    /// The kind of value the validator was looking for.
    pub expected: &'static str,
    /// The offending value, passed through untouched for the caller.
    pub got: JsValue,
}

impl DecodeError {
    pub(crate) fn not_a_file(got: &JsValue) -> Self {
        Self {
            expected: "FILE",
            got: got.clone(),
        }
    }
}

/// Render a caught JS value as a loggable message.
pub(crate) fn describe_js(err: &JsValue) -> String {
    if err.is_string() {
        err.as_string().unwrap_or_default()
    } else if let Some(js_err) = err.dyn_ref::<js_sys::Error>() {
        js_err.message().into()
    } else {
        format!("{err:?}")
    }
}
