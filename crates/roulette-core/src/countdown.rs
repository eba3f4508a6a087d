//! Pre-race countdown overlay, drawn in screen space.

use crate::color::Color;
use crate::geometry::Vec2;
use crate::surface::{LinearGradient, Paint, Surface, TextAlign, TextBaseline};

const FONT: &str = "bold 150px sans-serif";
const GLOW: f64 = 50.0;
/// Half-height of the vertical gradient around the center.
const GRADIENT_HALF_SPAN: f64 = 100.0;
const OUTLINE_WIDTH: f64 = 4.0;

/// Draws `count` centered in a `width` × `height` CSS-pixel viewport.
pub fn render_countdown(surface: &mut dyn Surface, count: u32, width: f64, height: f64) {
    let center = Vec2::new(width / 2.0, height / 2.0);
    let text = count.to_string();
    let gradient = LinearGradient::new(
        Vec2::new(center.x, center.y - GRADIENT_HALF_SPAN),
        Vec2::new(center.x, center.y + GRADIENT_HALF_SPAN),
    )
    .stop(0.0, Color::WHITE)
    .stop(1.0, Color::rgb(0xcc, 0xcc, 0xcc));

    surface.scoped(|s| {
        s.set_text_align(TextAlign::Center);
        s.set_text_baseline(TextBaseline::Middle);
        s.set_shadow(GLOW, Color::rgba_f(255, 255, 255, 0.8));
        s.set_font(FONT);
        s.set_fill(&Paint::Linear(gradient));
        s.fill_text(&text, center.x, center.y);

        s.set_stroke_color(Color::BLACK);
        s.set_line_width(OUTLINE_WIDTH);
        s.stroke_text(&text, center.x, center.y);
    });
}
