//! Finish ribbon, start line and the waving start flag.
//!
//! All three draw in world space. The flag is a pure function of wall-clock
//! time: the same `now_ms` always yields the same mesh.

use crate::color::Color;
use crate::config::{FlagConfig, TrackConfig};
use crate::geometry::Vec2;
use crate::stage::StageDef;
use crate::surface::{Surface, TextAlign};

const POLE_COLOR: Color = Color::rgb(0x88, 0x88, 0x88);
const POLE_HALF_WIDTH: f64 = 0.1;
const LABEL_SHADOW: f64 = 5.0;

/// One cell of the flag mesh, in flag-local coordinates (origin at the top
/// of the pole).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlagQuad {
    /// Clockwise from the top-left corner.
    pub corners: [Vec2; 4],
    pub color: Color,
}

/// Checkerboard colour for cell `(column, row)`.
fn checker(column: u32, row: u32) -> Color {
    if (column + row) % 2 == 0 {
        Color::WHITE
    } else {
        Color::BLACK
    }
}

/// Builds the rippling flag mesh at `now_ms`.
pub fn flag_quads(now_ms: f64, cfg: &FlagConfig) -> Vec<FlagQuad> {
    let phase = now_ms / cfg.phase_period_ms.max(f64::EPSILON);
    let segments = f64::from(cfg.segments.max(1));
    let rows = f64::from(cfg.rows.max(1));
    let cell_h = cfg.height / rows;
    let wave = |i: u32| (phase + f64::from(i) * cfg.segment_phase).sin() * cfg.amplitude;

    let mut quads = Vec::with_capacity(cfg.segments.saturating_mul(cfg.rows) as usize);
    for i in 0..cfg.segments {
        let x0 = f64::from(i) / segments * cfg.width;
        let x1 = f64::from(i + 1) / segments * cfg.width;
        let (w0, w1) = (wave(i), wave(i + 1));
        for j in 0..cfg.rows {
            let y = f64::from(j) / rows * cfg.height;
            quads.push(FlagQuad {
                corners: [
                    Vec2::new(x0, y + w0),
                    Vec2::new(x1, y + w1),
                    Vec2::new(x1, y + w1 + cell_h),
                    Vec2::new(x0, y + w0 + cell_h),
                ],
                color: checker(i, j),
            });
        }
    }
    quads
}

/// Draws the pole with its foot at `(x, y)` and the flag at its top.
pub fn render_flag(surface: &mut dyn Surface, x: f64, y: f64, now_ms: f64, cfg: &FlagConfig) {
    let top = cfg.height + cfg.pole_extra;
    surface.scoped(|s| {
        s.translate(x, y);
        s.set_fill_color(POLE_COLOR);
        s.fill_rect(-POLE_HALF_WIDTH, -top, POLE_HALF_WIDTH * 2.0, top);

        s.translate(0.0, -top);
        for quad in flag_quads(now_ms, cfg) {
            let [a, b, c, d] = quad.corners;
            s.set_fill_color(quad.color);
            s.begin_path();
            s.move_to(a.x, a.y);
            s.line_to(b.x, b.y);
            s.line_to(c.x, c.y);
            s.line_to(d.x, d.y);
            s.close_path();
            s.fill();
        }
    });
}

/// Checkered ribbon across the track at the stage goal line.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_finish_line(surface: &mut dyn Surface, stage: &StageDef, cfg: &TrackConfig) {
    let y = stage.goal_y;
    let (min_x, max_x) = stage.line_extent(y, cfg.finish_tolerance, cfg.fallback_span);
    let width = max_x - min_x;
    let cell = cfg.finish_cell;
    if cell <= 0.0 {
        return;
    }
    let cols = (width / cell).ceil().max(0.0) as u32;
    let rows = (cfg.finish_height / cell).ceil().max(0.0) as u32;

    surface.scoped(|s| {
        s.translate(min_x, y);
        for r in 0..rows {
            for c in 0..cols {
                s.set_fill_color(checker(c, r));
                s.fill_rect(f64::from(c) * cell, f64::from(r) * cell, cell, cell);
            }
        }
    });

    surface.scoped(|s| {
        s.set_fill_color(Color::WHITE);
        s.set_font("bold 3pt sans-serif");
        s.set_text_align(TextAlign::Center);
        s.set_shadow(LABEL_SHADOW, Color::rgba_f(0, 0, 0, 0.5));
        s.fill_text("FINISH", min_x + width / 2.0, y + cfg.finish_height + 0.5);
    });
}

/// Start line with its label. The flag is only raised while a countdown
/// is running.
pub fn render_start_line(
    surface: &mut dyn Surface,
    stage: &StageDef,
    countdown_active: bool,
    now_ms: f64,
    track: &TrackConfig,
    flag: &FlagConfig,
) {
    let y = track.start_y;
    let (min_x, max_x) = stage.line_extent(y, track.start_tolerance, track.fallback_span);

    surface.scoped(|s| {
        if countdown_active {
            render_flag(s, max_x + 0.5, y, now_ms, flag);
        }

        s.set_stroke_color(Color::WHITE);
        s.set_line_width(track.start_line_width);
        s.begin_path();
        s.move_to(min_x, y);
        s.line_to(max_x, y);
        s.stroke();

        s.set_fill_color(Color::WHITE);
        s.set_font("bold 1.6pt sans-serif");
        s.set_text_align(TextAlign::Center);
        s.fill_text("START", (min_x + max_x) / 2.0, y + 0.9);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::{DrawCmd, RecordingSurface};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_flag_is_deterministic_in_time() {
        let cfg = FlagConfig::default();
        assert_eq!(flag_quads(12_345.0, &cfg), flag_quads(12_345.0, &cfg));
        assert_ne!(flag_quads(12_345.0, &cfg), flag_quads(12_445.0, &cfg));
    }

    #[test]
    fn test_zero_phase_period_keeps_flag_finite() {
        let cfg = FlagConfig {
            phase_period_ms: 0.0,
            ..FlagConfig::default()
        };
        for now in [0.0, 500.0] {
            for quad in flag_quads(now, &cfg) {
                assert!(quad.corners.iter().all(|c| c.x.is_finite() && c.y.is_finite()));
            }
        }
    }

    #[test]
    fn test_flag_mesh_is_checkered() {
        let cfg = FlagConfig::default();
        let quads = flag_quads(0.0, &cfg);
        assert_eq!(quads.len(), 40);
        assert_eq!(quads[0].color, Color::WHITE);
        assert_eq!(quads[1].color, Color::BLACK);
        // Next segment, first row.
        assert_eq!(quads[4].color, Color::BLACK);
    }

    #[test]
    fn test_flag_wave_follows_sine() {
        let cfg = FlagConfig::default();
        let quads = flag_quads(0.0, &cfg);
        // Segment 0 at phase 0 has no offset; segment 1 is shifted by sin(0.5).
        assert_abs_diff_eq!(quads[0].corners[0].y, 0.0);
        assert_abs_diff_eq!(quads[4].corners[0].y, 0.5_f64.sin() * 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(quads[39].corners[2].x, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_finish_ribbon_covers_fallback_span() {
        let stage = StageDef {
            goal_y: 100.0,
            ..StageDef::default()
        };
        let cfg = TrackConfig::default();
        let mut surface = RecordingSurface::new();
        render_finish_line(&mut surface, &stage, &cfg);

        let cells = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCmd::FillRect { .. }))
            .count();
        // 26 / 0.5 columns by 2 / 0.5 rows.
        assert_eq!(cells, 52 * 4);
        assert_eq!(surface.texts(), vec!["FINISH"]);
        assert_eq!(surface.shadow_blur(), 0.0);
        assert_eq!(surface.depth(), 0);
    }

    #[test]
    fn test_flag_only_during_countdown() {
        let stage = StageDef::default();
        let mut idle = RecordingSurface::new();
        render_start_line(
            &mut idle,
            &stage,
            false,
            0.0,
            &TrackConfig::default(),
            &FlagConfig::default(),
        );
        assert_eq!(idle.commands().len(), 2);
        assert_eq!(idle.texts(), vec!["START"]);

        let mut counting = RecordingSurface::new();
        render_start_line(
            &mut counting,
            &stage,
            true,
            0.0,
            &TrackConfig::default(),
            &FlagConfig::default(),
        );
        // Pole, 40 flag cells, line, label.
        assert_eq!(counting.commands().len(), 43);
    }
}
