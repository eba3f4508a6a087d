//! Resize / pixel-density adapter.
//!
//! The host reports the canvas' layout size and the current device pixel
//! ratio; the adapter derives backing-store dimensions and the device
//! transform from those measurements alone, so repeated or stale calls
//! converge on the same state.

use crate::geometry::Transform2D;
use crate::viewport::Viewport;

/// A layout measurement reported by the host's resize observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub css_width: f64,
    pub css_height: f64,
    pub dpr: f64,
}

/// Canvas sizing the host must apply after a resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackingStore {
    /// `canvas.width` (device pixels).
    pub width: u32,
    /// `canvas.height` (device pixels).
    pub height: u32,
    /// `style.width` (CSS pixels).
    pub css_width: f64,
    /// `style.height` (CSS pixels).
    pub css_height: f64,
    pub dpr: f64,
}

impl BackingStore {
    /// Base transform for the context after the resize (`scale(dpr, dpr)`
    /// from identity).
    pub fn transform(&self) -> Transform2D {
        Transform2D::scaling(self.dpr, self.dpr)
    }
}

/// Keeps the viewport in sync with the canvas element.
#[derive(Debug, Clone, Default)]
pub struct ResizeAdapter {
    viewport: Viewport,
    backing: Option<BackingStore>,
}

impl ResizeAdapter {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            backing: None,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn backing_store(&self) -> Option<&BackingStore> {
        self.backing.as_ref()
    }

    /// Recomputes sizing from a measurement.
    ///
    /// Returns `None` (leaving the current state untouched) for zero-area or
    /// non-finite measurements. A non-positive DPR is treated as 1.
    pub fn apply(&mut self, measurement: Measurement) -> Option<BackingStore> {
        let Measurement {
            css_width,
            css_height,
            dpr,
        } = measurement;

        let finite = css_width.is_finite() && css_height.is_finite();
        if !finite || css_width <= 0.0 || css_height <= 0.0 {
            tracing::debug!(css_width, css_height, "Ignoring zero-area resize");
            return None;
        }
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };

        let backing = BackingStore {
            width: to_device_pixels(css_width * dpr),
            height: to_device_pixels(css_height * dpr),
            css_width,
            css_height,
            dpr,
        };

        self.viewport.css_width = css_width;
        self.viewport.css_height = css_height;
        self.viewport.dpr = dpr;
        if self.backing != Some(backing) {
            tracing::debug!(
                width = backing.width,
                height = backing.height,
                dpr,
                "Canvas backing store resized"
            );
        }
        self.backing = Some(backing);
        Some(backing)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_device_pixels(v: f64) -> u32 {
    v.round().clamp(1.0, f64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use approx::assert_abs_diff_eq;

    fn measure(w: f64, h: f64, dpr: f64) -> Measurement {
        Measurement {
            css_width: w,
            css_height: h,
            dpr,
        }
    }

    #[test]
    fn test_backing_store_tracks_density() {
        let mut adapter = ResizeAdapter::default();
        let backing = adapter.apply(measure(800.0, 450.0, 2.0)).unwrap();
        assert_eq!((backing.width, backing.height), (1600, 900));
        assert_eq!((backing.css_width, backing.css_height), (800.0, 450.0));
        assert_eq!(backing.transform(), Transform2D::scaling(2.0, 2.0));
    }

    #[test]
    fn test_resize_is_idempotent() {
        let camera = Camera {
            x: 5.0,
            y: 7.0,
            zoom: 1.3,
        };
        let mut once = ResizeAdapter::default();
        let first = once.apply(measure(1280.0, 720.0, 1.5));

        let mut twice = ResizeAdapter::default();
        twice.apply(measure(1280.0, 720.0, 1.5));
        let second = twice.apply(measure(1280.0, 720.0, 1.5));

        assert_eq!(first, second);
        let a = once.viewport().world_transform(&camera);
        let b = twice.viewport().world_transform(&camera);
        assert_abs_diff_eq!(a.a, b.a, epsilon = 1e-12);
        assert_abs_diff_eq!(a.d, b.d, epsilon = 1e-12);
        assert_abs_diff_eq!(a.e, b.e, epsilon = 1e-12);
        assert_abs_diff_eq!(a.f, b.f, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_area_resize_is_a_no_op() {
        let mut adapter = ResizeAdapter::default();
        let before = adapter.apply(measure(640.0, 480.0, 1.0));
        assert_eq!(adapter.apply(measure(0.0, 480.0, 1.0)), None);
        assert_eq!(adapter.apply(measure(640.0, 0.0, 2.0)), None);
        assert_eq!(adapter.backing_store().copied(), before);
        assert_eq!(adapter.viewport().css_width, 640.0);
    }

    #[test]
    fn test_invalid_dpr_falls_back_to_one() {
        let mut adapter = ResizeAdapter::default();
        let backing = adapter.apply(measure(300.0, 200.0, 0.0)).unwrap();
        assert_eq!(backing.dpr, 1.0);
        assert_eq!((backing.width, backing.height), (300, 200));
    }
}
