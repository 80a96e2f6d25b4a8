//! One-time capability probes for legacy hosts.
//!
//! Feature availability is checked once, on first use, and stored as tagged
//! strategies rather than re-probed on every call. WASM is single-threaded,
//! so thread-local state is process-wide state here.

use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

/// How "save this blob under a suggested name" is delivered to the host.
#[derive(Debug)]
pub(crate) enum SaveStrategy {
    /// Legacy `navigator.msSaveOrOpenBlob(blob, name)`; bypasses the DOM.
    Navigator(Function),
    /// Standard path: object URL on a hidden anchor plus a synthetic click.
    Anchor,
}

/// How a mime-tagged byte buffer is constructed.
#[derive(Debug, Clone, Copy)]
pub(crate) enum BlobStrategy {
    /// `new Blob(parts, {type})`.
    Constructor,
    /// Legacy incremental builder: append parts, finalize with a mime type.
    Builder,
}

/// How a synthetic user activation is constructed.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ClickStrategy {
    /// `new MouseEvent("click")`.
    Constructor,
    /// Legacy `document.createEvent` + `initEvent`.
    CreateEvent,
}

pub(crate) struct Capabilities {
    pub save: SaveStrategy,
    pub blob: BlobStrategy,
    pub click: ClickStrategy,
    /// Whether anchors honor the `download` attribute; drives the
    /// cross-origin `_blank` fallback in `download_url`.
    pub download_attr: bool,
}

thread_local! {
    static CAPABILITIES: Capabilities = probe();
}

pub(crate) fn with<R>(f: impl FnOnce(&Capabilities) -> R) -> R {
    CAPABILITIES.with(f)
}

fn global_constructor(name: &str) -> Option<Function> {
    Reflect::get(&js_sys::global(), &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
}

fn probe() -> Capabilities {
    let save = web_sys::window()
        .and_then(|window| {
            Reflect::get(window.navigator().as_ref(), &JsValue::from_str("msSaveOrOpenBlob")).ok()
        })
        .and_then(|value| value.dyn_into::<Function>().ok())
        .map_or(SaveStrategy::Anchor, SaveStrategy::Navigator);

    let blob = if global_constructor("Blob").is_some() {
        BlobStrategy::Constructor
    } else {
        BlobStrategy::Builder
    };

    let click = if global_constructor("MouseEvent").is_some() {
        ClickStrategy::Constructor
    } else {
        ClickStrategy::CreateEvent
    };

    let download_attr = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.create_element("a").ok())
        .map(|anchor| {
            Reflect::has(anchor.as_ref(), &JsValue::from_str("download")).unwrap_or(false)
        })
        .unwrap_or(false);

    let capabilities = Capabilities {
        save,
        blob,
        click,
        download_attr,
    };
    tracing::debug!(
        save = ?capabilities.save,
        blob = ?capabilities.blob,
        click = ?capabilities.click,
        download_attr,
        "probed file bridge capabilities"
    );
    capabilities
}

/// Dispatch a synthetic user activation to `target` using the probed
/// event-construction strategy.
pub(crate) fn dispatch_click(target: &web_sys::EventTarget) -> Result<bool, JsValue> {
    let event: web_sys::Event = match with(|caps| caps.click) {
        ClickStrategy::Constructor => web_sys::MouseEvent::new("click")?.into(),
        ClickStrategy::CreateEvent => {
            let document = web_sys::window()
                .and_then(|window| window.document())
                .ok_or_else(|| JsValue::from_str("no document for event construction"))?;
            let event = document.create_event("MouseEvents")?;
            event.init_event_with_bubbles_and_cancelable("click", true, true);
            event
        }
    };
    target.dispatch_event(&event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn browser_probe_selects_modern_strategies() {
        with(|caps| {
            assert!(matches!(caps.save, SaveStrategy::Anchor));
            assert!(matches!(caps.blob, BlobStrategy::Constructor));
            assert!(matches!(caps.click, ClickStrategy::Constructor));
            assert!(caps.download_attr);
        });
    }

    #[wasm_bindgen_test]
    fn synthetic_click_reaches_detached_nodes() {
        let document = web_sys::window().unwrap().document().unwrap();
        let node = document.create_element("a").unwrap();
        // Detached nodes are still valid event targets.
        assert!(dispatch_click(node.as_ref()).is_ok());
    }
}
