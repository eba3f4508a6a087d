//! Winner celebration overlay.
//!
//! There is no particle list. Every confetti piece is recomputed from its
//! index and the wall clock, so the burst loops forever without spawning or
//! freeing anything and any frame can be reproduced from `now_ms` alone.
//! Only the gold pieces' hue carries random jitter.

use std::f64::consts::TAU;

use rand::Rng;

use crate::color::Color;
use crate::config::CelebrationConfig;
use crate::geometry::Vec2;
use crate::marble::MarbleSnapshot;
use crate::surface::{LinearGradient, Paint, Surface, TextAlign, TextBaseline};

/// Golden-angle step between consecutive pieces, in degrees.
const GOLDEN_ANGLE: f64 = 137.5;
const GOLD_HUE: f64 = 45.0;

/// Position and look of one confetti piece, relative to the screen center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confetti {
    pub offset: Vec2,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub alpha: f64,
    /// Gold pieces take a jittered gold hue; the others follow the winner.
    pub gold: bool,
    pub glow: bool,
}

/// Computes piece `i` at `now_ms`.
pub fn confetti(i: u32, now_ms: f64, cfg: &CelebrationConfig) -> Confetti {
    let fi = f64::from(i);
    let angle = (fi * GOLDEN_ANGLE) % 360.0;
    let speed = 0.8 + f64::from(i % 20) * 0.2;
    let period = cfg.period.max(f64::EPSILON);
    let life = (now_ms * cfg.time_scale + fi * cfg.index_offset).rem_euclid(period);
    let radius = life * speed;
    let width = 2.0 + f64::from(i % 10);
    Confetti {
        offset: Vec2::new(
            angle.to_radians().cos() * radius,
            angle.to_radians().sin() * radius,
        ),
        width,
        height: 1.0 + f64::from(i % 6),
        rotation: (now_ms / 100.0 + fi) % TAU,
        alpha: (1.0 - life / period).max(0.0),
        gold: i % 2 == 0,
        glow: cfg.glow_every > 0 && i % cfg.glow_every == 0,
    }
}

fn gold_gradient(center: Vec2, half_width: f64) -> Paint {
    Paint::Linear(
        LinearGradient::new(
            Vec2::new(center.x - half_width, center.y),
            Vec2::new(center.x + half_width, center.y),
        )
        .stop(0.0, Color::GOLD)
        .stop(0.5, Color::WHITE)
        .stop(1.0, Color::GOLD),
    )
}

/// Darkened backdrop, confetti burst and the layered winner titles.
pub fn render_winner(
    surface: &mut dyn Surface,
    winner: &MarbleSnapshot,
    now_ms: f64,
    width: f64,
    height: f64,
    cfg: &CelebrationConfig,
    rng: &mut impl Rng,
) {
    let center = Vec2::new(width / 2.0, height / 2.0);
    surface.scoped(|s| {
        s.set_fill_color(cfg.backdrop);
        s.fill_rect(0.0, 0.0, width, height);

        for i in 0..cfg.particle_count {
            let piece = confetti(i, now_ms, cfg);
            let hue = if piece.gold {
                GOLD_HUE + rng.random::<f64>() * cfg.gold_jitter
            } else {
                (winner.hue + f64::from(i) * 0.5) % 360.0
            };
            s.scoped(|s| {
                s.translate(center.x + piece.offset.x, center.y + piece.offset.y);
                s.rotate(piece.rotation);
                s.set_fill_color(Color::hsla(hue, 100.0, 70.0, piece.alpha));
                let (w, h) = (piece.width, piece.height);
                s.fill_rect(-w / 2.0, -h / 2.0, w, h);
                if piece.glow {
                    s.set_shadow(w, Color::hsl(50.0, 100.0, 50.0));
                    s.fill_rect(-w / 2.0, -h / 2.0, w, h);
                }
            });
        }

        s.set_text_align(TextAlign::Center);
        s.set_text_baseline(TextBaseline::Middle);

        let title = "🏆 WINNER 🏆";
        let title_y = center.y - 80.0;
        s.set_font("bold 60px sans-serif");
        s.set_shadow(35.0, Color::GOLD);
        for i in 0..3 {
            let fi = f64::from(i);
            s.set_stroke_color(Color::hsl(50.0, 100.0, 50.0 - fi * 10.0));
            s.set_line_width(8.0 - fi * 2.0);
            s.stroke_text(title, center.x, title_y);
        }
        s.set_fill(&gold_gradient(Vec2::new(center.x, title_y), 200.0));
        s.fill_text(title, center.x, title_y);

        let name_y = center.y + 20.0;
        s.set_font("bold 100px sans-serif");
        s.set_shadow(60.0, Color::ORANGE);
        for i in 0..5 {
            let fi = f64::from(i);
            s.set_stroke_color(Color::hsl(45.0, 100.0, 50.0 - fi * 5.0));
            s.set_line_width(12.0 - fi * 2.0);
            s.stroke_text(&winner.name, center.x, name_y);
        }
        s.set_fill(&gold_gradient(center, 300.0));
        s.fill_text(&winner.name, center.x, name_y);

        s.set_font("bold 40px sans-serif");
        s.set_shadow(20.0, Color::ORANGE);
        s.set_fill_color(Color::GOLD);
        s.fill_text("✨ CONGRATULATIONS ✨", center.x, center.y + 100.0);
    });
}
