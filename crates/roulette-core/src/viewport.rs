//! Viewport and camera transform.
//!
//! Three coordinate spaces are in play:
//! - **device**: backing-store pixels of the canvas,
//! - **css**: layout pixels (`device / dpr`), where UI overlays draw,
//! - **world**: stage units, scaled by `base_zoom * camera.zoom`.
//!
//! Every transform here is recomputed from scratch; nothing is accumulated
//! across frames.

use crate::camera::Camera;
use crate::config::DEFAULT_BASE_ZOOM;
use crate::geometry::{Rect, Transform2D, Vec2};

/// Current display metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Layout width in CSS pixels.
    pub css_width: f64,
    /// Layout height in CSS pixels.
    pub css_height: f64,
    /// Device pixel ratio (backing-store pixels per CSS pixel).
    pub dpr: f64,
    /// World units are scaled by `base_zoom * camera.zoom` CSS pixels.
    pub base_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1600.0, 900.0, 1.0)
    }
}

impl Viewport {
    pub fn new(css_width: f64, css_height: f64, dpr: f64) -> Self {
        Self {
            css_width,
            css_height,
            dpr,
            base_zoom: DEFAULT_BASE_ZOOM,
        }
    }

    #[must_use]
    pub fn with_base_zoom(mut self, base_zoom: f64) -> Self {
        self.base_zoom = base_zoom;
        self
    }

    pub fn css_center(&self) -> Vec2 {
        Vec2::new(self.css_width / 2.0, self.css_height / 2.0)
    }

    /// Maps CSS pixels to device pixels.
    pub fn device_transform(&self) -> Transform2D {
        Transform2D::scaling(self.dpr, self.dpr)
    }

    /// CSS pixels per world unit for the given camera.
    pub fn world_scale(&self, camera: &Camera) -> f64 {
        self.base_zoom * camera.guarded().zoom
    }

    /// World-to-CSS transform: the camera position lands on the viewport
    /// center.
    pub fn camera_transform(&self, camera: &Camera) -> Transform2D {
        let camera = camera.guarded();
        let scale = self.world_scale(&camera);
        let center = self.css_center();
        Transform2D::translation(center.x, center.y)
            .then(&Transform2D::scaling(scale, scale))
            .then(&Transform2D::translation(-camera.x, -camera.y))
    }

    /// World-to-device transform.
    pub fn world_transform(&self, camera: &Camera) -> Transform2D {
        self.device_transform().then(&self.camera_transform(camera))
    }

    pub fn world_to_device(&self, camera: &Camera, p: Vec2) -> Vec2 {
        self.world_transform(camera).apply(p)
    }

    pub fn world_to_css(&self, camera: &Camera, p: Vec2) -> Vec2 {
        self.camera_transform(camera).apply(p)
    }

    /// Inverse of [`Self::world_to_css`].
    pub fn css_to_world(&self, camera: &Camera, p: Vec2) -> Vec2 {
        let camera = camera.guarded();
        let scale = self.world_scale(&camera);
        let center = self.css_center();
        Vec2::new(
            (p.x - center.x) / scale + camera.x,
            (p.y - center.y) / scale + camera.y,
        )
    }

    /// World-space rectangle covered by the viewport, used for culling.
    pub fn visible_world_rect(&self, camera: &Camera) -> Rect {
        let top_left = self.css_to_world(camera, Vec2::ZERO);
        let bottom_right = self.css_to_world(camera, Vec2::new(self.css_width, self.css_height));
        Rect::new(
            top_left.x,
            top_left.y,
            bottom_right.x - top_left.x,
            bottom_right.y - top_left.y,
        )
    }
}
