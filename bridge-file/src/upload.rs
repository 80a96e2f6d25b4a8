//! Native file-open dialog triggers.
//!
//! Picker nodes are recreated per call rather than reused: a dismissed
//! dialog leaves its `change` listener armed forever, and a fresh node per
//! request keeps stale listeners from ever observing a later selection. The
//! node and its listener live exactly as long as the returned binding.
//!
//! A dismissed dialog fires no event at all, so the binding simply never
//! settles. That mirrors the platform: there is no cancel event to observe.

use core_binding::{Binding, Cancel};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{File, FileList, HtmlInputElement};

use crate::capability;
use crate::error::describe_js;

/// A non-empty, platform-ordered file selection.
///
/// Non-emptiness is structural: the `change` listener only fires when at
/// least one file was selected, and the first file is stored apart from the
/// rest.
#[derive(Debug, Clone)]
pub struct FileSelection {
    first: File,
    rest: Vec<File>,
}

impl FileSelection {
    fn from_list(files: &FileList) -> Option<Self> {
        let first = files.get(0)?;
        let rest = (1..files.length()).filter_map(|i| files.get(i)).collect();
        Some(Self { first, rest })
    }

    /// The first file in platform order.
    pub fn first(&self) -> &File {
        &self.first
    }

    /// Every file after the first, in platform order.
    pub fn rest(&self) -> &[File] {
        &self.rest
    }

    /// Total number of selected files; always at least 1.
    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    /// A selection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The full selection as a vector, platform order preserved.
    pub fn into_vec(self) -> Vec<File> {
        let mut files = Vec::with_capacity(1 + self.rest.len());
        files.push(self.first);
        files.extend(self.rest);
        files
    }
}

/// Open the native file picker for a single file.
///
/// `accept` holds mime patterns (`"image/png"`, `"image/*"`, `".pdf"`)
/// joined into the node's accepted-type filter. Settles with the selected
/// handle; never settles if the user dismisses the dialog.
pub fn pick_file(accept: &[&str]) -> Binding<File> {
    open_picker(accept, false, |files| files.get(0))
}

/// Open the native file picker with multi-select enabled.
///
/// Settles with the full selection in platform-reported order, guaranteed
/// non-empty; never settles if the user dismisses the dialog.
pub fn pick_files(accept: &[&str]) -> Binding<FileSelection> {
    open_picker(accept, true, |files| FileSelection::from_list(&files))
}

fn open_picker<T, F>(accept: &[&str], multiple: bool, select: F) -> Binding<T>
where
    T: 'static,
    F: FnOnce(FileList) -> Option<T> + 'static,
{
    Binding::new(|settle| {
        let Some(node) = picker_node(accept, multiple) else {
            tracing::warn!("file picker unavailable: no document");
            return None;
        };

        let on_change = Closure::once(move |event: web_sys::Event| {
            let files = event
                .target()
                .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
                .and_then(|input| input.files());
            match files.and_then(|files| select(files)) {
                Some(selection) => settle.resolve(selection),
                // `change` without a selection; leave the binding pending.
                None => tracing::warn!("file picker change event carried no files"),
            }
        });
        node.set_onchange(Some(on_change.as_ref().unchecked_ref()));

        if let Err(err) = capability::dispatch_click(node.as_ref()) {
            tracing::warn!(error = %describe_js(&err), "picker click dispatch failed");
        }

        // The cancel hook owns the node and listener, releasing both when
        // the binding is dropped.
        Some(Box::new(move || {
            node.set_onchange(None);
            drop(on_change);
        }) as Cancel)
    })
}

fn picker_node(accept: &[&str], multiple: bool) -> Option<HtmlInputElement> {
    let document = web_sys::window()?.document()?;
    let node = document
        .create_element("input")
        .ok()?
        .dyn_into::<HtmlInputElement>()
        .ok()?;
    node.set_type("file");
    node.set_accept(&accept.join(","));
    node.set_multiple(multiple);
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use js_sys::Array;
    use wasm_bindgen::JsValue;
    use wasm_bindgen_test::*;
    use web_sys::{DataTransfer, FilePropertyBag};

    wasm_bindgen_test_configure!(run_in_browser);

    fn sample_file(file_name: &str) -> File {
        let parts = Array::of1(&JsValue::from_str("content"));
        let options = FilePropertyBag::new();
        options.set_type("image/png");
        File::new_with_str_sequence_and_options(&parts, file_name, &options).unwrap()
    }

    fn file_list(names: &[&str]) -> FileList {
        let transfer = DataTransfer::new().unwrap();
        for name in names {
            transfer.items().add_with_file(&sample_file(name)).unwrap();
        }
        transfer.files().unwrap()
    }

    #[wasm_bindgen_test]
    fn selection_preserves_platform_order() {
        let files = file_list(&["a.png", "b.png", "c.png"]);
        let selection = FileSelection::from_list(&files).unwrap();
        assert_eq!(selection.len(), 3);
        assert!(!selection.is_empty());

        let names: Vec<String> = selection.into_vec().iter().map(File::name).collect();
        assert_eq!(names, ["a.png", "b.png", "c.png"]);
    }

    #[wasm_bindgen_test]
    fn selection_requires_at_least_one_file() {
        let files = file_list(&[]);
        assert!(FileSelection::from_list(&files).is_none());
    }

    #[wasm_bindgen_test]
    fn picker_node_is_fully_configured() {
        let node = picker_node(&["image/png", "image/jpeg"], true).unwrap();
        assert_eq!(node.type_(), "file");
        assert_eq!(node.accept(), "image/png,image/jpeg");
        assert!(node.multiple());

        let single = picker_node(&[], false).unwrap();
        assert_eq!(single.accept(), "");
        assert!(!single.multiple());
        // A fresh node per call: no listener survives from other requests.
        assert!(!js_sys::Object::is(node.as_ref(), single.as_ref()));
    }

    #[wasm_bindgen_test]
    fn dropping_a_pending_pick_releases_the_node() {
        // A synthetic (untrusted) click cannot open a real dialog, so the
        // binding stays pending until dropped.
        let binding = pick_file(&["image/png"]);
        assert!(!binding.is_settled());
        drop(binding);
    }
}
