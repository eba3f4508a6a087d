//! `navigator.clipboard` binding for the rank overlay's copy action.

use roulette_core::ui::ClipboardSink;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

/// Clipboard backed by the async Clipboard API.
#[derive(Debug, Default, Clone, Copy)]
pub struct NavigatorClipboard;

impl ClipboardSink for NavigatorClipboard {
    fn is_available(&self) -> bool {
        // Insecure contexts expose a navigator without `clipboard`.
        web_sys::window().is_some_and(|window| {
            js_sys::Reflect::has(&window.navigator(), &JsValue::from_str("clipboard"))
                .unwrap_or(false)
        })
    }

    fn write_text(&self, text: String, on_success: Box<dyn FnOnce()>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let clipboard = window.navigator().clipboard();
        wasm_bindgen_futures::spawn_local(async move {
            match JsFuture::from(clipboard.write_text(&text)).await {
                Ok(_) => on_success(),
                Err(err) => tracing::warn!(?err, "Clipboard write rejected"),
            }
        });
    }
}
