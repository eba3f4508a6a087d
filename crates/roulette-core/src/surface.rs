//! Drawing-surface contract.
//!
//! Every render pass draws through [`Surface`], an immediate-mode API shaped
//! after the Canvas 2D context. State changes (transform, shadow, styles)
//! are shared across passes, so each pass wraps its changes in
//! `save`/`restore` (see [`scoped`](trait.Surface.html#method.scoped)) and
//! resets shadows explicitly.

pub mod recording;

use crate::color::Color;
use crate::geometry::{Transform2D, Vec2};

/// Fill or stroke paint.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Linear(LinearGradient),
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Self::Solid(color)
    }
}

/// Linear gradient in the coordinate space current at draw time.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    /// `(offset in 0..=1, color)` pairs.
    pub stops: Vec<(f64, Color)>,
}

impl LinearGradient {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self {
            start,
            end,
            stops: Vec::new(),
        }
    }

    #[must_use]
    pub fn stop(mut self, offset: f64, color: Color) -> Self {
        self.stops.push((offset, color));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Miter => "miter",
            Self::Round => "round",
            Self::Bevel => "bevel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    Top,
    Middle,
    #[default]
    Alphabetic,
}

impl TextBaseline {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Alphabetic => "alphabetic",
        }
    }
}

/// Per-corner radii for rounded rectangles (clockwise from top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CornerRadii {
    pub top_left: f64,
    pub top_right: f64,
    pub bottom_right: f64,
    pub bottom_left: f64,
}

impl CornerRadii {
    pub const fn uniform(r: f64) -> Self {
        Self {
            top_left: r,
            top_right: r,
            bottom_right: r,
            bottom_left: r,
        }
    }

    /// Rounds only the left-hand corners.
    pub const fn left(r: f64) -> Self {
        Self {
            top_left: r,
            top_right: 0.0,
            bottom_right: 0.0,
            bottom_left: r,
        }
    }

    #[must_use]
    fn clamped(self, width: f64, height: f64) -> Self {
        let max = (width.abs().min(height.abs()) / 2.0).max(0.0);
        Self {
            top_left: self.top_left.clamp(0.0, max),
            top_right: self.top_right.clamp(0.0, max),
            bottom_right: self.bottom_right.clamp(0.0, max),
            bottom_left: self.bottom_left.clamp(0.0, max),
        }
    }
}

/// Immediate-mode 2D drawing surface.
///
/// Transform helpers have default implementations in terms of
/// [`transform`](Self::transform)/[`set_transform`](Self::set_transform);
/// backends with native equivalents override them.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);

    fn transform(&self) -> Transform2D;
    fn set_transform(&mut self, transform: Transform2D);

    fn translate(&mut self, x: f64, y: f64) {
        let t = self.transform().then(&Transform2D::translation(x, y));
        self.set_transform(t);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        let t = self.transform().then(&Transform2D::scaling(sx, sy));
        self.set_transform(t);
    }

    fn rotate(&mut self, angle: f64) {
        let t = self.transform().then(&Transform2D::rotation(angle));
        self.set_transform(t);
    }

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    /// Clockwise arc around `(x, y)`.
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64);
    fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64);
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Adds a rounded rectangle sub-path. Radii are clamped to half the
    /// shorter side.
    fn round_rect(&mut self, x: f64, y: f64, width: f64, height: f64, radii: CornerRadii) {
        let r = radii.clamped(width, height);
        let (right, bottom) = (x + width, y + height);
        self.move_to(x + r.top_left, y);
        self.line_to(right - r.top_right, y);
        self.arc_to(right, y, right, y + r.top_right, r.top_right);
        self.line_to(right, bottom - r.bottom_right);
        self.arc_to(right, bottom, right - r.bottom_right, bottom, r.bottom_right);
        self.line_to(x + r.bottom_left, bottom);
        self.arc_to(x, bottom, x, bottom - r.bottom_left, r.bottom_left);
        self.line_to(x, y + r.top_left);
        self.arc_to(x, y, x + r.top_left, y, r.top_left);
        self.close_path();
    }

    fn fill(&mut self);
    fn stroke(&mut self);
    fn clip(&mut self);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn set_fill(&mut self, paint: &Paint);
    fn set_stroke(&mut self, paint: &Paint);
    fn set_line_width(&mut self, width: f64);
    fn set_line_cap(&mut self, cap: LineCap);
    fn set_line_join(&mut self, join: LineJoin);

    /// Sets shadow blur (CSS pixels, unaffected by the transform) and color.
    fn set_shadow(&mut self, blur: f64, color: Color);

    fn clear_shadow(&mut self) {
        self.set_shadow(0.0, Color::TRANSPARENT);
    }

    /// CSS font shorthand, e.g. `"bold 14pt sans-serif"`.
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_text_baseline(&mut self, baseline: TextBaseline);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
    fn stroke_text(&mut self, text: &str, x: f64, y: f64);

    /// Whether an image is loaded under `key`.
    fn has_image(&self, key: &str) -> bool;

    /// Draws the image stored under `key`; a missing image draws nothing.
    fn draw_image(&mut self, key: &str, x: f64, y: f64, width: f64, height: f64);

    fn set_fill_color(&mut self, color: Color) {
        self.set_fill(&Paint::Solid(color));
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.set_stroke(&Paint::Solid(color));
    }
}

impl dyn Surface + '_ {
    /// Runs `f` between `save` and `restore`, so state changes made inside
    /// never leak into later passes.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut dyn Surface) -> R) -> R {
        self.save();
        let result = f(self);
        self.restore();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::recording::{DrawCmd, RecordingSurface};
    use super::*;

    #[test]
    fn test_scoped_restores_transform_and_shadow() {
        let mut recorder = RecordingSurface::new();
        let surface: &mut dyn Surface = &mut recorder;
        surface.scoped(|s| {
            s.translate(5.0, 5.0);
            s.set_shadow(10.0, Color::WHITE);
            assert_eq!(s.transform(), Transform2D::translation(5.0, 5.0));
        });
        assert_eq!(recorder.transform(), Transform2D::IDENTITY);
        assert_eq!(recorder.shadow_blur(), 0.0);
        assert_eq!(recorder.depth(), 0);
    }

    #[test]
    fn test_round_rect_clamps_radii() {
        let mut recorder = RecordingSurface::new();
        recorder.begin_path();
        recorder.round_rect(0.0, 0.0, 4.0, 2.0, CornerRadii::uniform(10.0));
        recorder.fill();
        let DrawCmd::Fill { path, .. } = &recorder.commands()[0] else {
            panic!("expected fill");
        };
        assert!(path.iter().all(|op| op.max_radius() <= 1.0));
    }
}
