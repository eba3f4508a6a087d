//! `ResizeObserver` wiring for the canvas.

use std::cell::RefCell;
use std::rc::Rc;

use roulette_core::resize::{BackingStore, Measurement};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlCanvasElement, ResizeObserver, ResizeObserverEntry};

use crate::host::RenderHost;

fn apply_backing(canvas: &HtmlCanvasElement, backing: &BackingStore) {
    canvas.set_width(backing.width);
    canvas.set_height(backing.height);
    let style = canvas.style();
    for (property, value) in [("width", backing.css_width), ("height", backing.css_height)] {
        if let Err(err) = style.set_property(property, &format!("{value}px")) {
            tracing::warn!(?err, property, "Failed to set canvas CSS size");
        }
    }
}

/// Observes the canvas' container and keeps the backing store matched to
/// its layout size and the device pixel ratio. Disconnects on drop.
pub struct ResizeBinding {
    observer: ResizeObserver,
    _callback: Closure<dyn FnMut(js_sys::Array)>,
}

impl ResizeBinding {
    pub fn observe(
        container: &Element,
        canvas: &HtmlCanvasElement,
        host: Rc<RefCell<RenderHost>>,
    ) -> Result<Self, JsValue> {
        let canvas = canvas.clone();
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            // Only the last entry matters; earlier ones are stale.
            let Ok(entry) = entries.pop().dyn_into::<ResizeObserverEntry>() else {
                return;
            };
            let rect = entry.content_rect();
            let measurement = Measurement {
                css_width: rect.width(),
                css_height: rect.height(),
                dpr: web_sys::window().map_or(1.0, |w| w.device_pixel_ratio()),
            };
            let Some(backing) = host.borrow_mut().resize(measurement) else {
                return;
            };
            apply_backing(&canvas, &backing);
        });

        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        observer.observe(container);
        tracing::debug!("Resize observer attached");

        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for ResizeBinding {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use roulette_core::resize::ResizeAdapter;
    use wasm_bindgen_test::wasm_bindgen_test;

    fn canvas() -> HtmlCanvasElement {
        web_sys::window()
            .and_then(|w| w.document())
            .unwrap()
            .create_element("canvas")
            .unwrap()
            .dyn_into()
            .unwrap()
    }

    #[wasm_bindgen_test]
    fn test_apply_backing_scales_canvas_by_dpr() {
        let canvas = canvas();
        let backing = ResizeAdapter::default()
            .apply(Measurement {
                css_width: 320.0,
                css_height: 200.0,
                dpr: 2.0,
            })
            .unwrap();
        apply_backing(&canvas, &backing);

        assert_eq!((canvas.width(), canvas.height()), (640, 400));
        let style = canvas.style();
        assert_eq!(style.get_property_value("width").unwrap(), "320px");
        assert_eq!(style.get_property_value("height").unwrap(), "200px");
    }

    #[wasm_bindgen_test]
    fn test_repeated_backing_is_idempotent() {
        let canvas = canvas();
        let mut adapter = ResizeAdapter::default();
        let measurement = Measurement {
            css_width: 150.5,
            css_height: 90.0,
            dpr: 1.5,
        };
        let first = adapter.apply(measurement).unwrap();
        for _ in 0..3 {
            let backing = adapter.apply(measurement).unwrap();
            assert_eq!(backing, first);
            apply_backing(&canvas, &backing);
        }
        assert_eq!((canvas.width(), canvas.height()), (first.width, first.height));
        assert_eq!(canvas.style().get_property_value("width").unwrap(), "150.5px");
    }
}
