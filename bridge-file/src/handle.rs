//! File handle validation and metadata projections.
//!
//! A handle is an opaque, platform-owned `File`: the bridge validates it,
//! reads its snapshot metadata, and otherwise passes it through by reference
//! identity. Nothing here performs I/O.

use chrono::{DateTime, Utc};
use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::File;

use crate::error::DecodeError;

/// Recognize an opaque runtime value as a native file handle.
///
/// Succeeds iff the host recognizes `value` as a `File` instance; the
/// returned handle is the same underlying object, not a copy. Hosts without
/// a `File` constructor at all (workers with a trimmed surface, non-browser
/// shells) produce the typed failure instead of throwing.
pub fn validate(value: &JsValue) -> Result<File, DecodeError> {
    let file_type_present = Reflect::get(&js_sys::global(), &JsValue::from_str("File"))
        .map(|ctor| ctor.is_function())
        .unwrap_or(false);

    if file_type_present {
        if let Some(file) = value.dyn_ref::<File>() {
            return Ok(file.clone());
        }
    }
    Err(DecodeError::not_a_file(value))
}

/// The file's name as reported at selection time.
pub fn name(file: &File) -> String {
    file.name()
}

/// The file's mime type; empty when the platform could not determine one.
pub fn mime(file: &File) -> String {
    file.type_()
}

/// The file's size in bytes.
pub fn size(file: &File) -> u64 {
    file.size() as u64
}

/// The file's last-modified instant, derived from the platform's raw
/// epoch-millisecond value.
pub fn last_modified(file: &File) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(file.last_modified() as i64)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use js_sys::Array;
    use wasm_bindgen_test::*;
    use web_sys::FilePropertyBag;

    wasm_bindgen_test_configure!(run_in_browser);

    const LAST_MODIFIED_MS: f64 = 1_700_000_000_000.0;

    fn sample_file(file_name: &str, content: &str) -> File {
        let parts = Array::of1(&JsValue::from_str(content));
        let options = FilePropertyBag::new();
        options.set_type("text/plain");
        options.set_last_modified(LAST_MODIFIED_MS);
        File::new_with_str_sequence_and_options(&parts, file_name, &options).unwrap()
    }

    #[wasm_bindgen_test]
    fn validate_accepts_a_genuine_file_by_identity() {
        let file = sample_file("notes.txt", "hello");
        let validated = validate(file.as_ref()).unwrap();
        assert!(js_sys::Object::is(validated.as_ref(), file.as_ref()));
    }

    #[wasm_bindgen_test]
    fn validate_rejects_non_file_values() {
        for value in [
            JsValue::from_str("not a file"),
            JsValue::from_f64(42.0),
            JsValue::NULL,
            JsValue::UNDEFINED,
        ] {
            let err = validate(&value).unwrap_err();
            assert_eq!(err.expected, "FILE");
            assert!(js_sys::Object::is(&err.got, &value));
        }
    }

    #[wasm_bindgen_test]
    fn validate_rejects_a_plain_blob() {
        let parts = Array::of1(&JsValue::from_str("hello"));
        let blob = web_sys::Blob::new_with_str_sequence(&parts).unwrap();
        let err = validate(blob.as_ref()).unwrap_err();
        assert_eq!(err.expected, "FILE");
    }

    #[wasm_bindgen_test]
    fn metadata_projections_are_pure() {
        let file = sample_file("photo.png", "pixels");
        assert_eq!(name(&file), "photo.png");
        assert_eq!(name(&file), name(&file));
        assert_eq!(mime(&file), "text/plain");
        assert_eq!(size(&file), "pixels".len() as u64);
        assert_eq!(size(&file), size(&file));
        assert_eq!(
            last_modified(&file),
            DateTime::from_timestamp_millis(LAST_MODIFIED_MS as i64).unwrap()
        );
        assert_eq!(last_modified(&file), last_modified(&file));
    }
}
