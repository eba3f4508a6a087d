//! Transient effects: world-space skill rings and screen-space sparks.

use std::f64::consts::TAU;

use rand::Rng;

use crate::color::Color;
use crate::geometry::Vec2;
use crate::surface::Surface;
use crate::theme::ColorTheme;

/// Ring stroke width in CSS pixels.
const IMPACT_LINE_PX: f64 = 3.0;

/// A short-lived world-space effect.
#[derive(Debug, Clone, PartialEq)]
pub enum VisualEffect {
    /// Expanding, fading ring left behind by a skill.
    Impact {
        position: Vec2,
        elapsed_ms: f64,
        duration_ms: f64,
        max_radius: f64,
    },
}

impl VisualEffect {
    pub fn impact(position: Vec2, max_radius: f64, duration_ms: f64) -> Self {
        Self::Impact {
            position,
            elapsed_ms: 0.0,
            duration_ms,
            max_radius,
        }
    }

    /// Fraction of the lifetime already spent, in `0..=1`.
    pub fn progress(&self) -> f64 {
        match self {
            Self::Impact {
                elapsed_ms,
                duration_ms,
                ..
            } => {
                if *duration_ms <= 0.0 {
                    1.0
                } else {
                    (elapsed_ms / duration_ms).clamp(0.0, 1.0)
                }
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn advance(&mut self, dt_ms: f64) {
        match self {
            Self::Impact { elapsed_ms, .. } => *elapsed_ms += dt_ms.max(0.0),
        }
    }

    /// Draws in world space. `zoom` is CSS pixels per world unit.
    pub fn render(&self, surface: &mut dyn Surface, theme: &ColorTheme, zoom: f64) {
        let t = self.progress();
        match self {
            Self::Impact {
                position,
                max_radius,
                ..
            } => {
                surface.scoped(|s| {
                    s.set_stroke_color(theme.skill_color.with_alpha(1.0 - t));
                    s.set_line_width(IMPACT_LINE_PX / zoom);
                    s.begin_path();
                    s.arc(position.x, position.y, max_radius * t, 0.0, TAU);
                    s.stroke();
                });
            }
        }
    }
}

/// Draws every effect that is still alive.
pub fn render_effects(
    surface: &mut dyn Surface,
    effects: &[VisualEffect],
    theme: &ColorTheme,
    zoom: f64,
) {
    for effect in effects.iter().filter(|e| !e.is_finished()) {
        effect.render(surface, theme, zoom);
    }
}

/// Downward acceleration of sparks, CSS px per ms².
const GRAVITY: f64 = 0.0008;
const SPARK_SIZE: f64 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Spark {
    pub position: Vec2,
    /// CSS px per ms.
    pub velocity: Vec2,
    pub life_ms: f64,
    pub max_life_ms: f64,
    pub color: Color,
}

impl Spark {
    pub fn alpha(&self) -> f64 {
        if self.max_life_ms <= 0.0 {
            0.0
        } else {
            (self.life_ms / self.max_life_ms).clamp(0.0, 1.0)
        }
    }
}

/// Screen-space spark bursts, fired when a marble crosses the finish line.
#[derive(Debug, Default)]
pub struct ParticleManager {
    sparks: Vec<Spark>,
}

impl ParticleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sparks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sparks.is_empty()
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }

    /// Adds `count` sparks radiating from `center` (CSS pixels).
    pub fn spawn_burst(&mut self, rng: &mut impl Rng, center: Vec2, count: usize, hue: f64) {
        self.sparks.reserve(count);
        for _ in 0..count {
            let angle = rng.random_range(0.0..TAU);
            let speed = rng.random_range(0.05..0.35);
            let life = rng.random_range(600.0..1200.0);
            self.sparks.push(Spark {
                position: center,
                velocity: Vec2::new(angle.cos() * speed, angle.sin() * speed),
                life_ms: life,
                max_life_ms: life,
                color: Color::hsl(hue + rng.random_range(-20.0..20.0), 100.0, 60.0),
            });
        }
        tracing::debug!(count, total = self.sparks.len(), "Spark burst spawned");
    }

    /// Integrates motion and drops expired sparks.
    pub fn update(&mut self, dt_ms: f64) {
        let dt = dt_ms.max(0.0);
        for spark in &mut self.sparks {
            spark.velocity.y += GRAVITY * dt;
            spark.position = spark.position + spark.velocity * dt;
            spark.life_ms -= dt;
        }
        self.sparks.retain(|s| s.life_ms > 0.0);
    }

    /// Draws in screen (CSS) space.
    pub fn render(&self, surface: &mut dyn Surface) {
        if self.sparks.is_empty() {
            return;
        }
        surface.scoped(|s| {
            for spark in &self.sparks {
                s.set_fill_color(spark.color.with_alpha(spark.alpha()));
                s.fill_rect(
                    spark.position.x - SPARK_SIZE / 2.0,
                    spark.position.y - SPARK_SIZE / 2.0,
                    SPARK_SIZE,
                    SPARK_SIZE,
                );
            }
        });
    }
}
