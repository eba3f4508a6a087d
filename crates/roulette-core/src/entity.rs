//! Map entity shapes and their themed rendering.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::color::Color;
use crate::geometry::Vec2;
use crate::surface::{CornerRadii, LineCap, LineJoin, Surface};
use crate::theme::{ColorTheme, ShapeKind};

/// Fill of the pivot marker drawn on top of boxes.
const AXIS_FILL: Color = Color::WHITE;
const AXIS_OUTLINE: Color = Color::BLACK;

/// Shape geometry, tagged by `type` in stage files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeGeometry {
    /// `width`/`height` are half-extents.
    Box {
        width: f64,
        height: f64,
        /// Extra rotation layered on top of the entity angle.
        #[serde(default)]
        rotation: f64,
    },
    Circle { radius: f64 },
    Polyline { points: Vec<Vec2> },
}

impl ShapeGeometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Box { .. } => ShapeKind::Box,
            Self::Circle { .. } => ShapeKind::Circle,
            Self::Polyline { .. } => ShapeKind::Polyline,
        }
    }
}

/// Shape plus optional per-instance colors that override the theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityShape {
    #[serde(flatten)]
    pub geometry: ShapeGeometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bloom_color: Option<Color>,
}

impl EntityShape {
    pub fn new(geometry: ShapeGeometry) -> Self {
        Self {
            geometry,
            color: None,
            bloom_color: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_bloom(mut self, color: Color) -> Self {
        self.bloom_color = Some(color);
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }
}

/// Per-frame placement of a map entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntityState {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub shape: EntityShape,
}

/// Colors and glow after applying per-entity overrides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStyle {
    pub fill: Color,
    pub outline: Color,
    pub bloom: Color,
    /// Shadow blur, already scaled by `camera.zoom / base_zoom`.
    pub bloom_radius: f64,
}

impl ResolvedStyle {
    /// Override color wins over the theme for fill and outline; bloom takes
    /// the bloom override, then the override color, then the theme.
    pub fn resolve(shape: &EntityShape, theme: &ColorTheme, zoom: f64, base_zoom: f64) -> Self {
        let style = theme.style(shape.kind());
        Self {
            fill: shape.color.unwrap_or(style.fill),
            outline: shape.color.unwrap_or(style.outline),
            bloom: shape.bloom_color.or(shape.color).unwrap_or(style.bloom),
            bloom_radius: style.bloom_radius * (zoom / base_zoom),
        }
    }
}

/// Draws all entities in world space.
pub fn render_entities(
    surface: &mut dyn Surface,
    entities: &[MapEntityState],
    theme: &ColorTheme,
    camera: &Camera,
    base_zoom: f64,
) {
    for entity in entities {
        let style = ResolvedStyle::resolve(&entity.shape, theme, camera.zoom, base_zoom);
        surface.scoped(|s| {
            s.translate(entity.x, entity.y);
            s.rotate(entity.angle);
            s.set_fill_color(style.fill);
            s.set_stroke_color(style.outline);
            s.set_shadow(style.bloom_radius, style.bloom);
            render_shape(s, &entity.shape.geometry);
            s.clear_shadow();
        });
    }
}

/// Draws one shape at the current origin with the current styles.
pub fn render_shape(surface: &mut dyn Surface, geometry: &ShapeGeometry) {
    match geometry {
        ShapeGeometry::Polyline { points } => render_polyline(surface, points),
        ShapeGeometry::Box {
            width,
            height,
            rotation,
        } => render_box(surface, *width, *height, *rotation),
        ShapeGeometry::Circle { radius } => {
            surface.begin_path();
            surface.arc(0.0, 0.0, *radius, 0.0, TAU);
            surface.fill();
            surface.stroke();
        }
    }
}

fn render_polyline(surface: &mut dyn Surface, points: &[Vec2]) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    surface.set_line_cap(LineCap::Round);
    surface.set_line_join(LineJoin::Round);
    surface.begin_path();
    surface.move_to(first.x, first.y);
    for p in rest {
        surface.line_to(p.x, p.y);
    }
    surface.stroke();
}

fn render_box(surface: &mut dyn Surface, half_width: f64, half_height: f64, rotation: f64) {
    let w = half_width * 2.0;
    let h = half_height * 2.0;
    let radius = w.min(h) * 0.5;
    surface.rotate(rotation);

    surface.begin_path();
    surface.round_rect(-w / 2.0, -h / 2.0, w, h, CornerRadii::uniform(radius));
    surface.fill();
    surface.stroke();

    // Pivot marker; drawn without glow.
    let axis_radius = half_height * 2.0;
    surface.clear_shadow();
    surface.set_fill_color(AXIS_FILL);
    surface.begin_path();
    surface.arc(0.0, 0.0, axis_radius, 0.0, TAU);
    surface.fill();
    surface.set_stroke_color(AXIS_OUTLINE);
    surface.set_line_width(axis_radius * 0.1);
    surface.stroke();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Paint;
    use crate::surface::recording::{DrawCmd, PathOp, RecordingSurface};
    use approx::assert_abs_diff_eq;

    fn entity(geometry: ShapeGeometry) -> MapEntityState {
        MapEntityState {
            x: 1.0,
            y: 2.0,
            angle: 0.0,
            shape: EntityShape::new(geometry),
        }
    }

    fn camera(zoom: f64) -> Camera {
        Camera { x: 0.0, y: 0.0, zoom }
    }

    #[test]
    fn test_shape_deserializes_from_tagged_json() {
        let shape: EntityShape = serde_json::from_str(
            r##"{"type": "box", "width": 1, "height": 0.1, "color": "#ff0000"}"##,
        )
        .unwrap();
        assert_eq!(shape.kind(), ShapeKind::Box);
        assert_eq!(shape.color, Some(Color::rgb(255, 0, 0)));
        assert!(matches!(shape.geometry, ShapeGeometry::Box { rotation, .. } if rotation == 0.0));

        let line: EntityShape =
            serde_json::from_str(r#"{"type": "polyline", "points": [[0, 0], [1, 2]]}"#).unwrap();
        let ShapeGeometry::Polyline { points } = &line.geometry else {
            panic!("expected polyline");
        };
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_override_color_wins_over_theme() {
        let theme = ColorTheme::dark();
        let red = Color::rgb(255, 0, 0);
        let shape = EntityShape::new(ShapeGeometry::Circle { radius: 1.0 }).with_color(red);
        let style = ResolvedStyle::resolve(&shape, &theme, 1.0, 30.0);
        assert_eq!(style.fill, red);
        assert_eq!(style.outline, red);
        assert_eq!(style.bloom, red);

        let blue = Color::rgb(0, 0, 255);
        let style = ResolvedStyle::resolve(&shape.clone().with_bloom(blue), &theme, 1.0, 30.0);
        assert_eq!(style.bloom, blue);
    }

    #[test]
    fn test_theme_style_used_without_override() {
        let theme = ColorTheme::light();
        let shape = EntityShape::new(ShapeGeometry::Circle { radius: 1.0 });
        let style = ResolvedStyle::resolve(&shape, &theme, 1.0, 30.0);
        assert_eq!(style.fill, theme.entity.circle.fill);
        assert_eq!(style.outline, theme.entity.circle.outline);
    }

    #[test]
    fn test_bloom_radius_scales_with_zoom() {
        let theme = ColorTheme::dark();
        let shape = EntityShape::new(ShapeGeometry::Circle { radius: 1.0 });
        let at_base = ResolvedStyle::resolve(&shape, &theme, 30.0, 30.0);
        let doubled = ResolvedStyle::resolve(&shape, &theme, 60.0, 30.0);
        assert_abs_diff_eq!(at_base.bloom_radius, 15.0);
        assert_abs_diff_eq!(doubled.bloom_radius, 30.0);
    }

    #[test]
    fn test_shadow_does_not_leak_between_entities() {
        let theme = ColorTheme::dark();
        let mut surface = RecordingSurface::new();
        let entities = vec![
            entity(ShapeGeometry::Circle { radius: 1.0 }),
            entity(ShapeGeometry::Box {
                width: 2.0,
                height: 0.25,
                rotation: 0.5,
            }),
        ];
        render_entities(&mut surface, &entities, &theme, &camera(30.0), 30.0);
        assert_eq!(surface.shadow_blur(), 0.0);
        assert_eq!(surface.depth(), 0);

        // Circle body glows; the box pivot marker (last fill) does not.
        let fills: Vec<_> = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCmd::Fill { .. }))
            .collect();
        assert!(fills[0].shadow().unwrap().blur > 0.0);
        let marker = fills.last().unwrap();
        assert_eq!(marker.shadow().unwrap().blur, 0.0);
        assert_eq!(marker.paint(), Some(&Paint::Solid(AXIS_FILL)));
    }

    #[test]
    fn test_box_marker_is_sized_from_height() {
        let mut surface = RecordingSurface::new();
        let entities = vec![entity(ShapeGeometry::Box {
            width: 2.0,
            height: 0.25,
            rotation: 0.0,
        })];
        render_entities(&mut surface, &entities, &ColorTheme::light(), &camera(1.0), 30.0);
        let radius = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Fill { path, .. } => path.iter().find_map(|op| match op {
                    PathOp::Arc { radius, .. } => Some(*radius),
                    _ => None,
                }),
                _ => None,
            })
            .last()
            .unwrap();
        assert_abs_diff_eq!(radius, 0.5);
    }

    #[test]
    fn test_empty_polyline_draws_nothing() {
        let mut surface = RecordingSurface::new();
        let entities = vec![entity(ShapeGeometry::Polyline { points: vec![] })];
        render_entities(&mut surface, &entities, &ColorTheme::dark(), &camera(1.0), 30.0);
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_polyline_uses_round_caps() {
        let mut surface = RecordingSurface::new();
        surface.begin_path();
        render_shape(
            &mut surface,
            &ShapeGeometry::Polyline {
                points: vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0)],
            },
        );
        assert_eq!(surface.line_cap(), LineCap::Round);
        let DrawCmd::Stroke { path, .. } = &surface.commands()[0] else {
            panic!("expected stroke");
        };
        assert_eq!(path.len(), 3);
    }
}
