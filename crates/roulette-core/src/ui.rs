//! Screen-space UI objects and input routing.
//!
//! Pointer events are captured by the host and handed to [`dispatch`]; the
//! renderer never polls input itself.

use crate::geometry::{Rect, Vec2};
use crate::params::RenderParameters;
use crate::surface::Surface;

/// An overlay drawn after the world passes, in CSS pixels.
pub trait UiObject {
    /// Advances animations. Called once per frame, before `render`.
    fn update(&mut self, dt_ms: f64);

    fn render(
        &mut self,
        surface: &mut dyn Surface,
        params: &RenderParameters<'_>,
        width: f64,
        height: f64,
    );

    /// Hit area for pointer routing. `None` receives every event.
    fn bounding_box(&self) -> Option<Rect> {
        None
    }

    fn on_wheel(&mut self, _delta_y: f64) {}

    fn on_double_click(&mut self, _position: Vec2) {}
}

/// Pointer input in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    Wheel { position: Vec2, delta_y: f64 },
    DoubleClick { position: Vec2 },
}

impl UiEvent {
    pub fn position(&self) -> Vec2 {
        match self {
            Self::Wheel { position, .. } | Self::DoubleClick { position } => *position,
        }
    }
}

/// Routes `event` to every object whose hit area contains it. Returns the
/// number of objects that received it.
pub fn dispatch(objects: &mut [Box<dyn UiObject>], event: &UiEvent) -> usize {
    let position = event.position();
    let mut delivered = 0;
    for object in objects.iter_mut() {
        if object.bounding_box().is_some_and(|b| !b.contains(position)) {
            continue;
        }
        match *event {
            UiEvent::Wheel { delta_y, .. } => object.on_wheel(delta_y),
            UiEvent::DoubleClick { position } => object.on_double_click(position),
        }
        delivered += 1;
    }
    delivered
}

/// System clipboard. Writes are asynchronous; `on_success` runs only once
/// the text has been accepted.
pub trait ClipboardSink {
    fn is_available(&self) -> bool;

    fn write_text(&self, text: String, on_success: Box<dyn FnOnce()>);
}

/// Clipboard that is never available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClipboard;

impl ClipboardSink for NoClipboard {
    fn is_available(&self) -> bool {
        false
    }

    fn write_text(&self, _text: String, _on_success: Box<dyn FnOnce()>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        area: Option<Rect>,
        wheel: f64,
        clicks: usize,
    }

    impl UiObject for Probe {
        fn update(&mut self, _dt_ms: f64) {}

        fn render(
            &mut self,
            _surface: &mut dyn Surface,
            _params: &RenderParameters<'_>,
            _width: f64,
            _height: f64,
        ) {
        }

        fn bounding_box(&self) -> Option<Rect> {
            self.area
        }

        fn on_wheel(&mut self, delta_y: f64) {
            self.wheel += delta_y;
        }

        fn on_double_click(&mut self, _position: Vec2) {
            self.clicks += 1;
        }
    }

    #[test]
    fn test_dispatch_respects_hit_areas() {
        let mut objects: Vec<Box<dyn UiObject>> = vec![
            Box::new(Probe::default()),
            Box::new(Probe {
                area: Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
                ..Probe::default()
            }),
        ];
        let inside = UiEvent::Wheel {
            position: Vec2::new(5.0, 5.0),
            delta_y: 3.0,
        };
        let outside = UiEvent::DoubleClick {
            position: Vec2::new(50.0, 50.0),
        };
        assert_eq!(dispatch(&mut objects, &inside), 2);
        assert_eq!(dispatch(&mut objects, &outside), 1);
    }

    #[test]
    fn test_no_clipboard_never_calls_back() {
        let clipboard = NoClipboard;
        assert!(!clipboard.is_available());
        clipboard.write_text("x".into(), Box::new(|| panic!("must not be called")));
    }
}
