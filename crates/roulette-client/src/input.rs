//! Pointer input routed into the UI objects.

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use roulette_core::geometry::Vec2;
use roulette_core::ui::UiEvent;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent};

use crate::host::RenderHost;

/// Canvas-relative position in CSS pixels.
fn local_position(canvas: &HtmlCanvasElement, event: &MouseEvent) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    Vec2::new(
        f64::from(event.client_x()) - rect.left(),
        f64::from(event.client_y()) - rect.top(),
    )
}

/// Wheel and double-click listeners on the canvas. Removed on drop.
pub struct InputBindings {
    _wheel: EventListener,
    _double_click: EventListener,
}

impl InputBindings {
    pub fn attach(canvas: &HtmlCanvasElement, host: &Rc<RefCell<RenderHost>>) -> Self {
        let wheel = {
            let host = host.clone();
            let target = canvas.clone();
            EventListener::new_with_options(
                canvas,
                "wheel",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    let Some(event) = event.dyn_ref::<WheelEvent>() else {
                        return;
                    };
                    let ui_event = UiEvent::Wheel {
                        position: local_position(&target, event),
                        delta_y: event.delta_y(),
                    };
                    // Keep the page from scrolling while the ranking does.
                    if host.borrow_mut().dispatch(&ui_event) > 0 {
                        event.prevent_default();
                    }
                },
            )
        };

        let double_click = {
            let host = host.clone();
            let target = canvas.clone();
            EventListener::new(canvas, "dblclick", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let ui_event = UiEvent::DoubleClick {
                    position: local_position(&target, event),
                };
                host.borrow_mut().dispatch(&ui_event);
            })
        };

        Self {
            _wheel: wheel,
            _double_click: double_click,
        }
    }
}
