//! Asynchronous blob content readers.
//!
//! Each read allocates a fresh, request-scoped `FileReader`; readers are
//! never shared across requests and are discarded after their terminal
//! state. A request moves `Idle -> Reading -> {Settled | Aborted}` with no
//! re-entry. Cancellation detaches the `loadend` listener before issuing the
//! abort, because the abort itself fires `loadend`: after cancel, no settle
//! event reaches the binding.

use core_binding::{Binding, Cancel};
use js_sys::Uint8Array;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, FileReader};

use crate::error::describe_js;

/// Read a blob's content as text.
pub fn read_as_text(blob: &Blob) -> Binding<String> {
    start_read(blob, FileReader::read_as_text, JsValue::as_string)
}

/// Read a blob's content as raw bytes.
///
/// The result is an offset-aware view over the reader's underlying
/// `ArrayBuffer` rather than a copy, so large payloads are not duplicated.
pub fn read_as_bytes(blob: &Blob) -> Binding<Uint8Array> {
    start_read(blob, FileReader::read_as_array_buffer, |value| {
        value
            .dyn_ref::<js_sys::ArrayBuffer>()
            .map(|buffer| Uint8Array::new(buffer))
    })
}

/// Read a blob's content as a `data:` URL.
pub fn read_as_data_url(blob: &Blob) -> Binding<String> {
    start_read(blob, FileReader::read_as_data_url, JsValue::as_string)
}

fn start_read<T, S, C>(blob: &Blob, start: S, convert: C) -> Binding<T>
where
    T: 'static,
    S: FnOnce(&FileReader, &Blob) -> Result<(), JsValue>,
    C: Fn(&JsValue) -> Option<T> + 'static,
{
    Binding::new(|settle| {
        let reader = match FileReader::new() {
            Ok(reader) => reader,
            Err(err) => {
                tracing::warn!(error = %describe_js(&err), "could not allocate file reader");
                return None;
            }
        };

        let pending = reader.clone();
        let on_loadend = Closure::once(move |_event: web_sys::Event| match pending.result() {
            Ok(value) => match convert(&value) {
                Some(value) => settle.resolve(value),
                None => tracing::warn!("file read produced an unexpected result type"),
            },
            Err(err) => tracing::warn!(error = %describe_js(&err), "file read failed"),
        });
        reader.set_onloadend(Some(on_loadend.as_ref().unchecked_ref()));

        if let Err(err) = start(&reader, blob) {
            tracing::warn!(error = %describe_js(&err), "could not start file read");
            reader.set_onloadend(None);
            return None;
        }

        Some(Box::new(move || {
            // Detach first: abort fires `loadend` on the reader.
            reader.set_onloadend(None);
            reader.abort();
            drop(on_loadend);
        }) as Cancel)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use js_sys::Array;
    use wasm_bindgen_test::*;
    use web_sys::BlobPropertyBag;

    wasm_bindgen_test_configure!(run_in_browser);

    fn text_blob(content: &str) -> Blob {
        let parts = Array::of1(&JsValue::from_str(content));
        let options = BlobPropertyBag::new();
        options.set_type("text/plain");
        Blob::new_with_str_sequence_and_options(parts.as_ref(), &options).unwrap()
    }

    #[wasm_bindgen_test]
    async fn text_round_trip() {
        let blob = text_blob("hello, bridge");
        assert_eq!(read_as_text(&blob).await, "hello, bridge");
    }

    #[wasm_bindgen_test]
    async fn bytes_view_has_exact_length() {
        let content = "exactly 17 bytes!";
        let blob = text_blob(content);
        let bytes = read_as_bytes(&blob).await;
        assert_eq!(bytes.length() as usize, content.len());
        assert_eq!(bytes.to_vec(), content.as_bytes());
    }

    #[wasm_bindgen_test]
    async fn data_url_has_recognizable_prefix() {
        let blob = text_blob("hi");
        let url = read_as_data_url(&blob).await;
        assert!(url.starts_with("data:"));
    }

    #[wasm_bindgen_test]
    async fn cancelled_read_leaves_later_reads_untouched() {
        let blob = text_blob("doomed");
        let binding = read_as_text(&blob);
        assert!(!binding.is_settled());
        drop(binding);

        // Give the aborted reader's events time to (not) arrive.
        gloo_timers::future::TimeoutFuture::new(50).await;

        // Every request gets a fresh reader; the aborted one is inert.
        assert_eq!(read_as_text(&blob).await, "doomed");
    }

    #[wasm_bindgen_test]
    async fn reselecting_downloaded_content_preserves_size() {
        // Simulates re-selecting a file produced by a download: a handle
        // built over the same content reports the original length.
        let content = "download me";
        let parts = Array::of1(&JsValue::from_str(content));
        let file =
            web_sys::File::new_with_str_sequence(parts.as_ref(), "a.txt").unwrap();
        assert_eq!(crate::handle::size(&file), content.len() as u64);
        assert_eq!(read_as_text(file.as_ref()).await, content);
    }
}
