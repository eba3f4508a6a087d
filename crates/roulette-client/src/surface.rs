//! Canvas 2D backend for the core drawing surface.

#![allow(deprecated)] // web-sys Canvas API deprecation warnings

use std::collections::HashMap;

use roulette_core::geometry::Transform2D;
use roulette_core::surface::{LineCap, LineJoin, Paint, Surface, TextAlign, TextBaseline};
use roulette_core::{Color, RenderError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// [`Surface`] over a `CanvasRenderingContext2d`.
///
/// The current transform is mirrored on the Rust side so `transform()` never
/// has to read a `DOMMatrix` back from the context.
pub struct CanvasSurface {
    context: CanvasRenderingContext2d,
    transform: Transform2D,
    stack: Vec<Transform2D>,
    images: HashMap<String, HtmlImageElement>,
}

impl CanvasSurface {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("Failed to get 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        Ok(Self {
            context,
            transform: Transform2D::IDENTITY,
            stack: Vec::new(),
            images: HashMap::new(),
        })
    }

    /// Registers a loaded portrait under the marble name it decorates.
    pub fn insert_image(&mut self, name: String, image: HtmlImageElement) {
        self.images.insert(name, image);
    }

    /// Resizing the backing store resets the context state, so the mirrored
    /// transform is reset with it.
    pub fn reset_state(&mut self) {
        self.transform = Transform2D::IDENTITY;
        self.stack.clear();
    }

    fn paint_value(&self, paint: &Paint) -> JsValue {
        match paint {
            Paint::Solid(color) => JsValue::from_str(&color.to_css()),
            Paint::Linear(gradient) => {
                let g = self.context.create_linear_gradient(
                    gradient.start.x,
                    gradient.start.y,
                    gradient.end.x,
                    gradient.end.y,
                );
                for (offset, color) in &gradient.stops {
                    #[allow(clippy::cast_possible_truncation)]
                    let offset = *offset as f32;
                    if let Err(err) = g.add_color_stop(offset, &color.to_css()) {
                        tracing::debug!(?err, "Rejected gradient stop");
                    }
                }
                g.into()
            }
        }
    }
}

impl Surface for CanvasSurface {
    fn save(&mut self) {
        self.stack.push(self.transform);
        self.context.save();
    }

    fn restore(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.transform = t;
        }
        self.context.restore();
    }

    fn transform(&self) -> Transform2D {
        self.transform
    }

    fn set_transform(&mut self, t: Transform2D) {
        self.transform = t;
        let _ = self.context.set_transform(t.a, t.b, t.c, t.d, t.e, t.f);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.transform = self.transform.then(&Transform2D::translation(x, y));
        let _ = self.context.translate(x, y);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.transform = self.transform.then(&Transform2D::scaling(sx, sy));
        let _ = self.context.scale(sx, sy);
    }

    fn rotate(&mut self, angle: f64) {
        self.transform = self.transform.then(&Transform2D::rotation(angle));
        let _ = self.context.rotate(angle);
    }

    fn begin_path(&mut self) {
        self.context.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.context.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.context.line_to(x, y);
    }

    fn close_path(&mut self) {
        self.context.close_path();
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) {
        // Negative radii throw IndexSizeError.
        let _ = self.context.arc(x, y, radius.max(0.0), start, end);
    }

    fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) {
        let _ = self.context.arc_to(x1, y1, x2, y2, radius.max(0.0));
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.context.rect(x, y, width, height);
    }

    fn fill(&mut self) {
        self.context.fill();
    }

    fn stroke(&mut self) {
        self.context.stroke();
    }

    fn clip(&mut self) {
        self.context.clip();
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.context.fill_rect(x, y, width, height);
    }

    fn set_fill(&mut self, paint: &Paint) {
        let value = self.paint_value(paint);
        self.context.set_fill_style(&value);
    }

    fn set_stroke(&mut self, paint: &Paint) {
        let value = self.paint_value(paint);
        self.context.set_stroke_style(&value);
    }

    fn set_line_width(&mut self, width: f64) {
        self.context.set_line_width(width);
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.context.set_line_cap(cap.as_str());
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.context.set_line_join(join.as_str());
    }

    fn set_shadow(&mut self, blur: f64, color: Color) {
        self.context.set_shadow_blur(blur);
        self.context.set_shadow_color(&color.to_css());
    }

    fn set_font(&mut self, font: &str) {
        self.context.set_font(font);
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.context.set_text_align(align.as_str());
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.context.set_text_baseline(baseline.as_str());
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let _ = self.context.fill_text(text, x, y);
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) {
        let _ = self.context.stroke_text(text, x, y);
    }

    fn has_image(&self, key: &str) -> bool {
        self.images.contains_key(key)
    }

    fn draw_image(&mut self, key: &str, x: f64, y: f64, width: f64, height: f64) {
        let Some(image) = self.images.get(key) else {
            return;
        };
        let _ = self
            .context
            .draw_image_with_html_image_element_and_dw_and_dh(image, x, y, width, height);
    }
}

/// Converts a JS failure into the core's asset error.
pub fn asset_error(name: &str, err: &JsValue) -> RenderError {
    RenderError::AssetLoad {
        name: name.to_string(),
        reason: err.as_string().unwrap_or_else(|| format!("{err:?}")),
    }
}
