//! Camera snapshot read by the renderer.
//!
//! The simulation owns and moves the camera; the renderer only reads it.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::geometry::Vec2;

/// Smallest zoom the renderer will accept. Zoom 0 collapses the world
/// transform to a point, so callers clamp to this.
pub const MIN_ZOOM: f64 = 0.01;

/// Camera state: world-space center plus a zoom multiplier on top of the
/// renderer's base scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Camera {
    /// Creates a camera, rejecting degenerate zoom values.
    pub fn try_new(x: f64, y: f64, zoom: f64) -> Result<Self, RenderError> {
        if !zoom.is_finite() || zoom < MIN_ZOOM {
            return Err(RenderError::InvalidZoom(zoom));
        }
        Ok(Self { x, y, zoom })
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Copy with zoom clamped to `MIN_ZOOM` (non-finite zoom becomes 1).
    #[must_use]
    pub fn guarded(&self) -> Self {
        let zoom = if self.zoom.is_finite() {
            self.zoom.max(MIN_ZOOM)
        } else {
            1.0
        };
        Self { zoom, ..*self }
    }

    pub fn is_degenerate(&self) -> bool {
        !self.zoom.is_finite() || self.zoom < MIN_ZOOM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_rejects_zero_and_nan_zoom() {
        assert!(matches!(
            Camera::try_new(0.0, 0.0, 0.0),
            Err(RenderError::InvalidZoom(_))
        ));
        assert!(Camera::try_new(0.0, 0.0, f64::NAN).is_err());
        assert!(Camera::try_new(1.0, 2.0, 1.5).is_ok());
    }

    #[test]
    fn test_guarded_clamps_zoom() {
        let camera = Camera {
            x: 4.0,
            y: 5.0,
            zoom: 0.0,
        };
        assert!(camera.is_degenerate());
        let guarded = camera.guarded();
        assert_eq!(guarded.zoom, MIN_ZOOM);
        assert_eq!(guarded.position(), camera.position());
    }
}
