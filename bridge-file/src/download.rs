//! Save-to-disk triggers.
//!
//! Downloads run through a single hidden anchor node, created on first use
//! and reused for the process lifetime. Every invocation overwrites every
//! attribute it relies on (`href`, `download`, `target`), so no value leaks
//! from one call into the next. Configure-then-dispatch happens within one
//! scheduling turn; the single-threaded host needs no locking around it.

use std::cell::RefCell;

use core_binding::Binding;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use crate::capability::{self, BlobStrategy, SaveStrategy};
use crate::error::describe_js;

thread_local! {
    static DOWNLOAD_NODE: RefCell<Option<HtmlAnchorElement>> = const { RefCell::new(None) };
}

fn create_anchor() -> Option<HtmlAnchorElement> {
    let document = web_sys::window()?.document()?;
    document
        .create_element("a")
        .ok()?
        .dyn_into::<HtmlAnchorElement>()
        .ok()
}

/// The singleton trigger node, lazily created on first use.
fn download_node() -> Option<HtmlAnchorElement> {
    DOWNLOAD_NODE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_none() {
            *slot = create_anchor();
        }
        slot.clone()
    })
}

/// Trigger a save-to-disk action for in-memory text content.
///
/// Settles immediately after the triggering click is dispatched; it does not
/// wait on the browser's own save dialog.
pub fn download_string(file_name: &str, mime: &str, content: &str) -> Binding<()> {
    download_part(file_name, mime, &JsValue::from_str(content))
}

/// Trigger a save-to-disk action for in-memory bytes.
pub fn download_bytes(file_name: &str, mime: &str, content: &[u8]) -> Binding<()> {
    let bytes = js_sys::Uint8Array::from(content);
    download_part(file_name, mime, bytes.as_ref())
}

fn download_part(file_name: &str, mime: &str, part: &JsValue) -> Binding<()> {
    Binding::new(|settle| {
        let blob = match make_blob(mime, part) {
            Ok(blob) => blob,
            Err(err) => {
                tracing::warn!(error = %describe_js(&err), "could not construct download blob");
                return None;
            }
        };

        let direct_save = capability::with(|caps| match &caps.save {
            SaveStrategy::Navigator(save) => Some(save.clone()),
            SaveStrategy::Anchor => None,
        });
        if let Some(save) = direct_save {
            // Legacy host save path; the DOM is bypassed entirely.
            if let Some(window) = web_sys::window() {
                match save.call2(
                    window.navigator().as_ref(),
                    blob.as_ref(),
                    &JsValue::from_str(file_name),
                ) {
                    Ok(_) => settle.resolve(()),
                    Err(err) => {
                        tracing::warn!(error = %describe_js(&err), "legacy blob save failed");
                    }
                }
            }
            return None;
        }

        let Some(node) = download_node() else {
            tracing::warn!("download trigger unavailable: no document");
            return None;
        };
        let object_url = match Url::create_object_url_with_blob(&blob) {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!(error = %describe_js(&err), "could not create object URL");
                return None;
            }
        };
        node.set_href(&object_url);
        node.set_download(file_name);
        node.set_target("");
        if let Err(err) = capability::dispatch_click(node.as_ref()) {
            tracing::warn!(error = %describe_js(&err), "download click dispatch failed");
        }
        // The click has fired; the transient reference must not outlive it.
        if let Err(err) = Url::revoke_object_url(&object_url) {
            tracing::warn!(error = %describe_js(&err), "could not revoke object URL");
        }
        settle.resolve(());
        None
    })
}

/// Trigger a download of a remote URL.
///
/// No object URL is created or revoked; the anchor's `href` is set to `url`
/// directly with an empty suggested filename. Cross-origin URLs on hosts
/// without `download`-attribute support are retargeted to open out-of-page.
pub fn download_url(url: &str) -> Binding<()> {
    Binding::new(|settle| {
        let Some(node) = download_node() else {
            tracing::warn!("download trigger unavailable: no document");
            return None;
        };
        node.set_href(url);
        node.set_download("");
        let retarget = !capability::with(|caps| caps.download_attr) && is_cross_origin(url);
        node.set_target(if retarget { "_blank" } else { "" });
        if let Err(err) = capability::dispatch_click(node.as_ref()) {
            tracing::warn!(error = %describe_js(&err), "download click dispatch failed");
        }
        settle.resolve(());
        None
    })
}

fn make_blob(mime: &str, part: &JsValue) -> Result<Blob, JsValue> {
    let parts = Array::of1(part);
    match capability::with(|caps| caps.blob) {
        BlobStrategy::Constructor => {
            let options = BlobPropertyBag::new();
            options.set_type(mime);
            Blob::new_with_u8_array_sequence_and_options(parts.as_ref(), &options)
        }
        BlobStrategy::Builder => legacy_blob(mime, part),
    }
}

/// Incremental-builder fallback for hosts without a `Blob` constructor:
/// append the content, then finalize with the mime type.
fn legacy_blob(mime: &str, part: &JsValue) -> Result<Blob, JsValue> {
    let global = js_sys::global();
    let ctor = ["WebKitBlobBuilder", "MozBlobBuilder", "MSBlobBuilder"]
        .iter()
        .find_map(|name| {
            Reflect::get(&global, &JsValue::from_str(name))
                .ok()
                .and_then(|value| value.dyn_into::<Function>().ok())
        })
        .ok_or_else(|| JsValue::from_str("no blob constructor or builder available"))?;

    let builder = Reflect::construct(&ctor, &Array::new())?;
    let append = Reflect::get(&builder, &JsValue::from_str("append"))?.dyn_into::<Function>()?;
    append.call1(&builder, part)?;
    let get_blob = Reflect::get(&builder, &JsValue::from_str("getBlob"))?.dyn_into::<Function>()?;
    get_blob
        .call1(&builder, &JsValue::from_str(mime))?
        .dyn_into::<Blob>()
        .map_err(JsValue::from)
}

fn is_cross_origin(url: &str) -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let location = window.location();
    let (Ok(origin), Ok(href)) = (location.origin(), location.href()) else {
        return false;
    };
    match Url::new_with_base(url, &href) {
        Ok(parsed) => parsed.origin() != origin,
        // Unparseable URLs go through the default path.
        Err(_) => false,
    }
}
