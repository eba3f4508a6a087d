//! Headless [`Surface`] that records draw commands.
//!
//! Paths are flattened into device space at construction time, the same way
//! a canvas bakes the current transform into path points, and every draw
//! command captures the shadow state it was issued with. Used by the tests
//! and for headless frame capture.

use std::collections::HashSet;

use crate::color::Color;
use crate::geometry::{Rect, Transform2D, Vec2};
use crate::surface::{LineCap, LineJoin, Paint, Surface, TextAlign, TextBaseline};

/// A path segment in device space.
#[derive(Debug, Clone, PartialEq)]
pub enum PathOp {
    MoveTo(Vec2),
    LineTo(Vec2),
    Arc {
        center: Vec2,
        radius: f64,
        start: f64,
        end: f64,
    },
    ArcTo {
        corner: Vec2,
        to: Vec2,
        radius: f64,
    },
    /// Four device-space corners (a rotated rectangle stays exact).
    Rect([Vec2; 4]),
    Close,
}

impl PathOp {
    pub fn max_radius(&self) -> f64 {
        match self {
            Self::Arc { radius, .. } | Self::ArcTo { radius, .. } => *radius,
            _ => 0.0,
        }
    }
}

/// Shadow settings at the time a command was issued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub blur: f64,
    pub color: Color,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            blur: 0.0,
            color: Color::TRANSPARENT,
        }
    }
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Fill {
        path: Vec<PathOp>,
        paint: Paint,
        shadow: Shadow,
    },
    Stroke {
        path: Vec<PathOp>,
        paint: Paint,
        line_width: f64,
        shadow: Shadow,
    },
    FillRect {
        corners: [Vec2; 4],
        paint: Paint,
        shadow: Shadow,
    },
    Clip {
        path: Vec<PathOp>,
    },
    Text {
        text: String,
        position: Vec2,
        font: String,
        paint: Paint,
        stroked: bool,
        shadow: Shadow,
    },
    Image {
        key: String,
        corners: [Vec2; 4],
    },
}

impl DrawCmd {
    pub fn shadow(&self) -> Option<Shadow> {
        match self {
            Self::Fill { shadow, .. }
            | Self::Stroke { shadow, .. }
            | Self::FillRect { shadow, .. }
            | Self::Text { shadow, .. } => Some(*shadow),
            Self::Clip { .. } | Self::Image { .. } => None,
        }
    }

    pub fn paint(&self) -> Option<&Paint> {
        match self {
            Self::Fill { paint, .. }
            | Self::Stroke { paint, .. }
            | Self::FillRect { paint, .. }
            | Self::Text { paint, .. } => Some(paint),
            Self::Clip { .. } | Self::Image { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
struct State {
    transform: Transform2D,
    fill: Paint,
    stroke: Paint,
    line_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    shadow: Shadow,
    font: String,
    text_align: TextAlign,
    text_baseline: TextBaseline,
}

impl Default for State {
    fn default() -> Self {
        Self {
            transform: Transform2D::IDENTITY,
            fill: Paint::Solid(Color::BLACK),
            stroke: Paint::Solid(Color::BLACK),
            line_width: 1.0,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            shadow: Shadow::default(),
            font: "10px sans-serif".to_string(),
            text_align: TextAlign::default(),
            text_baseline: TextBaseline::default(),
        }
    }
}

/// Recording surface.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    state: State,
    stack: Vec<State>,
    path: Vec<PathOp>,
    commands: Vec<DrawCmd>,
    images: HashSet<String>,
    max_depth: usize,
    unbalanced_restores: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an image key so `has_image` reports it as loaded.
    #[must_use]
    pub fn with_image(mut self, key: impl Into<String>) -> Self {
        self.images.insert(key.into());
        self
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCmd> {
        std::mem::take(&mut self.commands)
    }

    /// Current save/restore nesting.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of `restore` calls issued with an empty stack.
    pub fn unbalanced_restores(&self) -> usize {
        self.unbalanced_restores
    }

    pub fn shadow_blur(&self) -> f64 {
        self.state.shadow.blur
    }

    pub fn line_width(&self) -> f64 {
        self.state.line_width
    }

    pub fn line_cap(&self) -> LineCap {
        self.state.line_cap
    }

    pub fn text_align(&self) -> TextAlign {
        self.state.text_align
    }

    pub fn text_baseline(&self) -> TextBaseline {
        self.state.text_baseline
    }

    /// All text drawn so far, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCmd::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn device(&self, x: f64, y: f64) -> Vec2 {
        self.state.transform.apply(Vec2::new(x, y))
    }

    fn device_radius(&self, r: f64) -> f64 {
        r * self.state.transform.determinant().abs().sqrt()
    }

    fn device_rect(&self, x: f64, y: f64, w: f64, h: f64) -> [Vec2; 4] {
        [
            self.device(x, y),
            self.device(x + w, y),
            self.device(x + w, y + h),
            self.device(x, y + h),
        ]
    }

    fn push_text(&mut self, text: &str, x: f64, y: f64, stroked: bool) {
        let paint = if stroked {
            self.state.stroke.clone()
        } else {
            self.state.fill.clone()
        };
        self.commands.push(DrawCmd::Text {
            text: text.to_string(),
            position: self.device(x, y),
            font: self.state.font.clone(),
            paint,
            stroked,
            shadow: self.state.shadow,
        });
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
        self.max_depth = self.max_depth.max(self.stack.len());
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => self.unbalanced_restores += 1,
        }
    }

    fn transform(&self) -> Transform2D {
        self.state.transform
    }

    fn set_transform(&mut self, transform: Transform2D) {
        self.state.transform = transform;
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let p = self.device(x, y);
        self.path.push(PathOp::MoveTo(p));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let p = self.device(x, y);
        self.path.push(PathOp::LineTo(p));
    }

    fn close_path(&mut self) {
        self.path.push(PathOp::Close);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) {
        let op = PathOp::Arc {
            center: self.device(x, y),
            radius: self.device_radius(radius),
            start,
            end,
        };
        self.path.push(op);
    }

    fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) {
        let op = PathOp::ArcTo {
            corner: self.device(x1, y1),
            to: self.device(x2, y2),
            radius: self.device_radius(radius),
        };
        self.path.push(op);
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let corners = self.device_rect(x, y, width, height);
        self.path.push(PathOp::Rect(corners));
    }

    fn fill(&mut self) {
        self.commands.push(DrawCmd::Fill {
            path: self.path.clone(),
            paint: self.state.fill.clone(),
            shadow: self.state.shadow,
        });
    }

    fn stroke(&mut self) {
        let line_width = self.device_radius(self.state.line_width);
        self.commands.push(DrawCmd::Stroke {
            path: self.path.clone(),
            paint: self.state.stroke.clone(),
            line_width,
            shadow: self.state.shadow,
        });
    }

    fn clip(&mut self) {
        self.commands.push(DrawCmd::Clip {
            path: self.path.clone(),
        });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let corners = self.device_rect(x, y, width, height);
        self.commands.push(DrawCmd::FillRect {
            corners,
            paint: self.state.fill.clone(),
            shadow: self.state.shadow,
        });
    }

    fn set_fill(&mut self, paint: &Paint) {
        self.state.fill = paint.clone();
    }

    fn set_stroke(&mut self, paint: &Paint) {
        self.state.stroke = paint.clone();
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    fn set_shadow(&mut self, blur: f64, color: Color) {
        self.state.shadow = Shadow { blur, color };
    }

    fn set_font(&mut self, font: &str) {
        self.state.font = font.to_string();
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.state.text_align = align;
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state.text_baseline = baseline;
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.push_text(text, x, y, false);
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) {
        self.push_text(text, x, y, true);
    }

    fn has_image(&self, key: &str) -> bool {
        self.images.contains(key)
    }

    fn draw_image(&mut self, key: &str, x: f64, y: f64, width: f64, height: f64) {
        if !self.has_image(key) {
            return;
        }
        let corners = self.device_rect(x, y, width, height);
        self.commands.push(DrawCmd::Image {
            key: key.to_string(),
            corners,
        });
    }
}

/// Device-space bounding box of a command, if it has geometry.
pub fn command_bounds(cmd: &DrawCmd) -> Option<Rect> {
    let mut points: Vec<Vec2> = Vec::new();
    let mut push_path = |path: &[PathOp]| {
        for op in path {
            match op {
                PathOp::MoveTo(p) | PathOp::LineTo(p) => points.push(*p),
                PathOp::Arc { center, radius, .. } => {
                    points.push(*center - Vec2::new(*radius, *radius));
                    points.push(*center + Vec2::new(*radius, *radius));
                }
                PathOp::ArcTo { corner, to, .. } => {
                    points.push(*corner);
                    points.push(*to);
                }
                PathOp::Rect(corners) => points.extend_from_slice(corners),
                PathOp::Close => {}
            }
        }
    };
    match cmd {
        DrawCmd::Fill { path, .. } | DrawCmd::Stroke { path, .. } | DrawCmd::Clip { path } => {
            push_path(path);
        }
        DrawCmd::FillRect { corners, .. } | DrawCmd::Image { corners, .. } => {
            points.extend_from_slice(corners);
        }
        DrawCmd::Text { position, .. } => points.push(*position),
    }
    let first = *points.first()?;
    let (mut min, mut max) = (first, first);
    for p in &points {
        min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
        max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
    }
    Some(Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
}
