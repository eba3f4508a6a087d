//! Marble snapshots and their rendering.

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::geometry::{Rect, Vec2};
use crate::surface::{Surface, TextAlign, TextBaseline};
use crate::theme::ColorTheme;

/// Unique identifier for a marble.
pub type MarbleId = u32;

/// Default marble radius in world units.
pub const DEFAULT_MARBLE_RADIUS: f64 = 0.25;

/// Label font size and outline widths, in CSS pixels.
const LABEL_PX: f64 = 12.0;
const WINNER_BORDER_PX: f64 = 2.0;
const COOLDOWN_PX: f64 = 2.0;

/// Per-frame view of one marble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarbleSnapshot {
    pub id: MarbleId,
    pub name: String,
    /// Hue in degrees.
    pub hue: f64,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub angle: f64,
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Remaining skill cooldown as a fraction of the full cooldown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<f64>,
}

fn default_radius() -> f64 {
    DEFAULT_MARBLE_RADIUS
}

impl MarbleSnapshot {
    pub fn new(id: MarbleId, name: impl Into<String>, hue: f64, position: Vec2) -> Self {
        Self {
            id,
            name: name.into(),
            hue,
            x: position.x,
            y: position.y,
            angle: 0.0,
            radius: DEFAULT_MARBLE_RADIUS,
            cooldown: None,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn body_color(&self, theme: &ColorTheme) -> Color {
        Color::hsl(self.hue, 100.0, theme.marble_lightness)
    }
}

/// Everything a marble needs from the frame to draw itself.
#[derive(Debug, Clone, Copy)]
pub struct MarbleRenderContext<'a> {
    pub theme: &'a ColorTheme,
    /// CSS pixels per world unit (`base_zoom * camera.zoom`).
    pub zoom: f64,
    /// Visible world rectangle; marbles outside it are skipped.
    pub visible: Rect,
    /// Outlined as the marble about to take the winning rank.
    pub is_winner_target: bool,
}

/// Draws a marble in world space. Returns `false` when culled.
pub fn render_marble(
    surface: &mut dyn Surface,
    marble: &MarbleSnapshot,
    ctx: &MarbleRenderContext<'_>,
) -> bool {
    let px = 1.0 / ctx.zoom;
    let margin = marble.radius + LABEL_PX * 2.0 * px;
    if !ctx.visible.inflate(margin).contains(marble.position()) {
        return false;
    }

    let body = marble.body_color(ctx.theme);
    let r = marble.radius;
    surface.scoped(|s| {
        s.translate(marble.x, marble.y);

        if s.has_image(&marble.name) {
            s.scoped(|s| {
                s.begin_path();
                s.arc(0.0, 0.0, r, 0.0, TAU);
                s.clip();
                s.rotate(marble.angle);
                s.draw_image(&marble.name, -r, -r, r * 2.0, r * 2.0);
            });
        } else {
            s.set_fill_color(body);
            s.begin_path();
            s.arc(0.0, 0.0, r, 0.0, TAU);
            s.fill();
        }

        if ctx.is_winner_target {
            s.set_stroke_color(ctx.theme.marble_winning_border);
            s.set_line_width(WINNER_BORDER_PX * px);
            s.begin_path();
            s.arc(0.0, 0.0, r, 0.0, TAU);
            s.stroke();
        }

        if let Some(remaining) = marble.cooldown.filter(|c| *c > 0.0) {
            s.set_stroke_color(ctx.theme.cool_time_indicator);
            s.set_line_width(COOLDOWN_PX * px);
            s.begin_path();
            s.arc(
                0.0,
                0.0,
                r + COOLDOWN_PX * px,
                -FRAC_PI_2,
                -FRAC_PI_2 + TAU * remaining.min(1.0),
            );
            s.stroke();
        }

        s.set_font(&format!("{:.4}px sans-serif", LABEL_PX * px));
        s.set_text_align(TextAlign::Center);
        s.set_text_baseline(TextBaseline::Top);
        s.set_fill_color(body);
        s.fill_text(&marble.name, 0.0, r + 2.0 * px);
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::{DrawCmd, RecordingSurface};

    fn ctx(theme: &ColorTheme, winner: bool) -> MarbleRenderContext<'_> {
        MarbleRenderContext {
            theme,
            zoom: 30.0,
            visible: Rect::new(-10.0, -10.0, 20.0, 20.0),
            is_winner_target: winner,
        }
    }

    #[test]
    fn test_marble_outside_view_is_culled() {
        let theme = ColorTheme::dark();
        let mut surface = RecordingSurface::new();
        let marble = MarbleSnapshot::new(1, "far", 0.0, Vec2::new(500.0, 0.0));
        assert!(!render_marble(&mut surface, &marble, &ctx(&theme, false)));
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_body_uses_hue_and_theme_lightness() {
        let theme = ColorTheme::dark();
        let mut surface = RecordingSurface::new();
        let marble = MarbleSnapshot::new(1, "amy", 120.0, Vec2::ZERO);
        assert!(render_marble(&mut surface, &marble, &ctx(&theme, false)));
        let body = Color::hsl(120.0, 100.0, theme.marble_lightness);
        assert_eq!(surface.commands()[0].paint(), Some(&body.into()));
        assert_eq!(surface.texts(), vec!["amy"]);
        assert_eq!(surface.depth(), 0);
    }

    #[test]
    fn test_portrait_replaces_body_fill() {
        let theme = ColorTheme::dark();
        let mut surface = RecordingSurface::new().with_image("amy");
        let marble = MarbleSnapshot::new(1, "amy", 120.0, Vec2::ZERO);
        render_marble(&mut surface, &marble, &ctx(&theme, false));
        assert!(matches!(surface.commands()[0], DrawCmd::Clip { .. }));
        assert!(matches!(&surface.commands()[1], DrawCmd::Image { key, .. } if key == "amy"));
    }

    #[test]
    fn test_winner_target_gets_border() {
        let theme = ColorTheme::light();
        let mut surface = RecordingSurface::new();
        let marble = MarbleSnapshot::new(1, "amy", 0.0, Vec2::ZERO);
        render_marble(&mut surface, &marble, &ctx(&theme, true));
        let border = surface
            .commands()
            .iter()
            .find(|c| matches!(c, DrawCmd::Stroke { .. }))
            .expect("border stroke");
        assert_eq!(border.paint(), Some(&theme.marble_winning_border.into()));
    }

    #[test]
    fn test_cooldown_arc_only_while_cooling_down() {
        let theme = ColorTheme::dark();
        let strokes = |cooldown| {
            let mut surface = RecordingSurface::new();
            let mut marble = MarbleSnapshot::new(1, "amy", 0.0, Vec2::ZERO);
            marble.cooldown = cooldown;
            render_marble(&mut surface, &marble, &ctx(&theme, false));
            surface
                .commands()
                .iter()
                .filter(|c| matches!(c, DrawCmd::Stroke { .. }))
                .count()
        };
        assert_eq!(strokes(None), 0);
        assert_eq!(strokes(Some(0.0)), 0);
        assert_eq!(strokes(Some(0.5)), 1);
    }
}
