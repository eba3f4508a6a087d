//! Scene compositor: draws one frame, world first, then screen overlays.
//!
//! Pass order:
//! 1. background fill (device transform only)
//! 2. world passes under the camera transform: dot field, finish ribbon,
//!    start line and flag, entities, effects, marbles
//! 3. UI objects, in CSS pixels
//! 4. screen-space sparks
//! 5. countdown
//! 6. winner celebration, always last
//!
//! Every pass runs inside its own save/restore scope, and the world
//! transform is rebuilt from the camera each frame.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::celebration::render_winner;
use crate::config::{DotFieldConfig, RenderConfig};
use crate::countdown::render_countdown;
use crate::effects::render_effects;
use crate::entity::render_entities;
use crate::geometry::Rect;
use crate::marble::{MarbleRenderContext, render_marble};
use crate::params::RenderParameters;
use crate::resize::{BackingStore, Measurement, ResizeAdapter};
use crate::surface::{Surface, TextAlign, TextBaseline};
use crate::track::{render_finish_line, render_start_line};
use crate::ui::UiObject;
use crate::viewport::Viewport;

/// Beyond this many dots the field is too dense to read and is skipped.
const MAX_DOTS: f64 = 40_000.0;

/// Default world font, matching the world scale.
const WORLD_FONT: &str = "0.4pt sans-serif";

/// Draws frames onto a [`Surface`].
pub struct SceneCompositor {
    config: RenderConfig,
    resize: ResizeAdapter,
    rng: StdRng,
    zoom_clamped: bool,
}

impl SceneCompositor {
    pub fn new(config: RenderConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Uses a fixed random source, so shake and confetti jitter repeat.
    pub fn with_rng(config: RenderConfig, rng: StdRng) -> Self {
        let viewport = Viewport::default().with_base_zoom(config.base_zoom);
        tracing::info!(base_zoom = config.base_zoom, "Scene compositor created");
        Self {
            config,
            resize: ResizeAdapter::new(viewport),
            rng,
            zoom_clamped: false,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        self.resize.viewport()
    }

    /// Applies a canvas measurement; see [`ResizeAdapter::apply`].
    pub fn resize(&mut self, measurement: Measurement) -> Option<BackingStore> {
        self.resize.apply(measurement)
    }

    /// Renders one frame. `now_ms` is the wall clock driving the flag and
    /// the celebration.
    pub fn render(
        &mut self,
        surface: &mut dyn Surface,
        params: &RenderParameters<'_>,
        ui: &mut [Box<dyn UiObject>],
        now_ms: f64,
    ) {
        let viewport = *self.resize.viewport();
        let (width, height) = (viewport.css_width, viewport.css_height);
        let theme = params.theme;

        self.check_zoom(params);

        surface.set_transform(viewport.device_transform());
        surface.scoped(|s| {
            s.set_fill_color(theme.background);
            s.fill_rect(0.0, 0.0, width, height);
        });

        self.render_world(surface, params, &viewport, now_ms);

        for object in ui.iter_mut() {
            surface.scoped(|s| object.render(s, params, width, height));
        }

        if let Some(particles) = params.particles {
            particles.render(surface);
        }

        if let Some(count) = params.countdown {
            render_countdown(surface, count, width, height);
        }

        if let Some(winner) = params.winner {
            render_winner(
                surface,
                winner,
                now_ms,
                width,
                height,
                &self.config.celebration,
                &mut self.rng,
            );
        }
    }

    fn check_zoom(&mut self, params: &RenderParameters<'_>) {
        let degenerate = params.camera.is_degenerate();
        if degenerate && !self.zoom_clamped {
            tracing::warn!(zoom = params.camera.zoom, "Degenerate camera zoom clamped");
        }
        self.zoom_clamped = degenerate;
    }

    fn render_world(
        &mut self,
        surface: &mut dyn Surface,
        params: &RenderParameters<'_>,
        viewport: &Viewport,
        now_ms: f64,
    ) {
        let camera = params.camera.guarded();
        let base = self.config.base_zoom;
        let zoom = viewport.world_scale(&camera);
        let visible = viewport.visible_world_rect(&camera);
        let config = &self.config;
        let rng = &mut self.rng;

        surface.scoped(|s| {
            s.set_transform(viewport.world_transform(&camera));
            s.set_text_align(TextAlign::Left);
            s.set_text_baseline(TextBaseline::Top);
            s.set_font(WORLD_FONT);
            s.set_line_width(config.line_width_factor / (camera.zoom + base));

            render_dots(s, visible, &config.dots);
            render_finish_line(s, params.stage, &config.track);
            if params.show_start_line {
                render_start_line(
                    s,
                    params.stage,
                    params.countdown.is_some(),
                    now_ms,
                    &config.track,
                    &config.flag,
                );
            }
            render_entities(s, params.entities, params.theme, &camera, base);
            render_effects(s, params.effects, params.theme, zoom);

            let winner_index = params.winner_target_index();
            let shake = config.countdown_shake;
            for (i, marble) in params.marbles.iter().enumerate() {
                let ctx = MarbleRenderContext {
                    theme: params.theme,
                    zoom,
                    visible,
                    is_winner_target: winner_index == Some(i),
                };
                s.scoped(|s| {
                    if params.countdown.is_some() {
                        let dx = (rng.random::<f64>() - 0.5) * shake;
                        let dy = (rng.random::<f64>() - 0.5) * shake;
                        s.translate(dx, dy);
                    }
                    render_marble(s, marble, &ctx);
                });
            }
        });
    }
}

/// Dot grid covering `visible`, snapped to the grid spacing.
fn render_dots(surface: &mut dyn Surface, visible: Rect, cfg: &DotFieldConfig) {
    let spacing = cfg.spacing;
    if spacing <= 0.0 || cfg.color.is_transparent() {
        return;
    }
    let x0 = (visible.x / spacing).floor();
    let x1 = (visible.right() / spacing).ceil();
    let y0 = (visible.y / spacing).floor();
    let y1 = (visible.bottom() / spacing).ceil();
    if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) {
        return;
    }
    if (x1 - x0 + 1.0) * (y1 - y0 + 1.0) > MAX_DOTS {
        return;
    }

    surface.scoped(|s| {
        s.set_fill_color(cfg.color);
        let mut gx = x0;
        while gx <= x1 {
            let mut gy = y0;
            while gy <= y1 {
                s.begin_path();
                s.arc(gx * spacing, gy * spacing, cfg.radius, 0.0, TAU);
                s.fill();
                gy += 1.0;
            }
            gx += 1.0;
        }
    });
}

impl Default for SceneCompositor {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::color::Color;
    use crate::effects::{ParticleManager, VisualEffect};
    use crate::entity::{EntityShape, MapEntityState, ShapeGeometry};
    use crate::geometry::Vec2;
    use crate::marble::MarbleSnapshot;
    use crate::stage::StageDef;
    use crate::surface::Paint;
    use crate::theme::ColorTheme;
    use crate::surface::recording::{DrawCmd, PathOp, RecordingSurface, command_bounds};
    use approx::assert_abs_diff_eq;

    fn compositor() -> SceneCompositor {
        let mut c = SceneCompositor::with_rng(RenderConfig::default(), StdRng::seed_from_u64(42));
        c.resize(Measurement {
            css_width: 800.0,
            css_height: 600.0,
            dpr: 2.0,
        });
        c
    }

    struct Marker(&'static str);

    impl UiObject for Marker {
        fn update(&mut self, _dt_ms: f64) {}

        fn render(
            &mut self,
            surface: &mut dyn Surface,
            _params: &RenderParameters<'_>,
            _width: f64,
            _height: f64,
        ) {
            surface.set_shadow(9.0, Color::WHITE);
            surface.fill_text(self.0, 0.0, 0.0);
        }
    }

    fn marbles() -> Vec<MarbleSnapshot> {
        (0..3)
            .map(|i| MarbleSnapshot::new(i, format!("m{i}"), f64::from(i) * 90.0, Vec2::ZERO))
            .collect()
    }

    #[test]
    fn test_background_covers_whole_device_canvas() {
        let mut compositor = compositor();
        let stage = StageDef::default();
        let theme = ColorTheme::light();
        let params = RenderParameters::new(&stage, &theme, (800.0, 600.0));
        let mut surface = RecordingSurface::new();
        compositor.render(&mut surface, &params, &mut [], 0.0);

        let first = &surface.commands()[0];
        assert_eq!(first.paint(), Some(&Paint::Solid(theme.background)));
        assert_eq!(
            command_bounds(first),
            Some(Rect::new(0.0, 0.0, 1600.0, 1200.0))
        );
    }

    #[test]
    fn test_full_frame_leaves_surface_balanced() {
        let mut compositor = compositor();
        let stage = StageDef::default();
        let theme = ColorTheme::dark();
        let all = marbles();
        let (winners, racing) = all.split_at(1);
        let entities = vec![MapEntityState {
            x: 0.0,
            y: 0.0,
            angle: 0.3,
            shape: EntityShape::new(ShapeGeometry::Box {
                width: 1.0,
                height: 0.2,
                rotation: 0.0,
            }),
        }];
        let effects = vec![VisualEffect::impact(Vec2::ZERO, 2.0, 100.0)];
        let particles = ParticleManager::new();
        let mut params = RenderParameters::new(&stage, &theme, (800.0, 600.0));
        params.winners = winners;
        params.marbles = racing;
        params.winner = Some(&winners[0]);
        params.entities = &entities;
        params.effects = &effects;
        params.particles = Some(&particles);
        params.countdown = Some(2);
        params.show_start_line = true;

        let mut ui: Vec<Box<dyn UiObject>> = vec![Box::new(Marker("ui"))];
        let mut surface = RecordingSurface::new();
        compositor.render(&mut surface, &params, &mut ui, 1234.0);

        assert_eq!(surface.depth(), 0);
        assert_eq!(surface.unbalanced_restores(), 0);
        assert_eq!(surface.shadow_blur(), 0.0);
        assert_eq!(surface.transform(), compositor.viewport().device_transform());
    }

    #[test]
    fn test_overlays_drawn_in_order() {
        let mut compositor = compositor();
        let stage = StageDef::default();
        let theme = ColorTheme::dark();
        let all = marbles();
        let mut params = RenderParameters::new(&stage, &theme, (800.0, 600.0));
        params.winners = &all;
        params.winner = Some(&all[0]);
        params.countdown = Some(1);

        let mut ui: Vec<Box<dyn UiObject>> =
            vec![Box::new(Marker("first")), Box::new(Marker("second"))];
        let mut surface = RecordingSurface::new();
        compositor.render(&mut surface, &params, &mut ui, 0.0);

        let texts = surface.texts();
        let pos = |needle: &str| texts.iter().position(|t| *t == needle).unwrap();
        assert!(pos("FINISH") < pos("first"));
        assert!(pos("first") < pos("second"));
        assert!(pos("second") < pos("1"));
        assert!(pos("1") < pos("🏆 WINNER 🏆"));
        assert_eq!(texts.last(), Some(&"✨ CONGRATULATIONS ✨"));

        // UI state changes do not leak into the countdown.
        let countdown = surface
            .commands()
            .iter()
            .find(|c| matches!(c, DrawCmd::Text { text, .. } if text == "1"))
            .unwrap();
        assert_eq!(countdown.shadow().unwrap().blur, 50.0);
    }

    #[test]
    fn test_marble_at_camera_lands_on_device_center() {
        let mut compositor = compositor();
        let stage = StageDef::default();
        let theme = ColorTheme::dark();
        let racing = vec![MarbleSnapshot::new(1, "solo", 0.0, Vec2::new(12.0, 40.0))];
        let mut params = RenderParameters::new(&stage, &theme, (800.0, 600.0));
        params.camera = Camera {
            x: 12.0,
            y: 40.0,
            zoom: 1.5,
        };
        params.marbles = &racing;
        let mut surface = RecordingSurface::new();
        compositor.render(&mut surface, &params, &mut [], 0.0);

        let body = surface
            .commands()
            .iter()
            .find(|c| c.paint() == Some(&racing[0].body_color(&theme).into()))
            .unwrap();
        let DrawCmd::Fill { path, .. } = body else {
            panic!("expected marble fill");
        };
        let PathOp::Arc { center, radius, .. } = path[0] else {
            panic!("expected arc");
        };
        assert_abs_diff_eq!(center.x, 800.0, epsilon = 1e-9);
        assert_abs_diff_eq!(center.y, 600.0, epsilon = 1e-9);
        // 0.25 world units * 30 * 1.5 * dpr 2.
        assert_abs_diff_eq!(radius, 22.5, epsilon = 1e-9);
    }

    #[test]
    fn test_default_world_stroke_width_tracks_zoom() {
        let stage = StageDef::default();
        let theme = ColorTheme::dark();
        let entities = vec![MapEntityState {
            x: 0.0,
            y: 0.0,
            angle: 0.0,
            shape: EntityShape::new(ShapeGeometry::Polyline {
                points: vec![Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0)],
            }),
        }];

        for zoom in [1.0, 4.0] {
            let mut compositor = compositor();
            let mut params = RenderParameters::new(&stage, &theme, (800.0, 600.0));
            params.camera = Camera { x: 0.0, y: 0.0, zoom };
            params.entities = &entities;
            let mut surface = RecordingSurface::new();
            compositor.render(&mut surface, &params, &mut [], 0.0);

            let device_width = surface
                .commands()
                .iter()
                .find_map(|c| match c {
                    DrawCmd::Stroke { line_width, .. } => Some(*line_width),
                    _ => None,
                })
                .unwrap();
            // World units map to dpr 2 * base 30 * zoom device pixels.
            let world_width = device_width / (2.0 * 30.0 * zoom);
            assert_abs_diff_eq!(world_width, 4.5 / (zoom + 30.0), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_degenerate_zoom_renders_finite_geometry() {
        let mut compositor = compositor();
        let stage = StageDef::default();
        let theme = ColorTheme::dark();
        let racing = marbles();
        let mut params = RenderParameters::new(&stage, &theme, (800.0, 600.0));
        params.camera = Camera {
            x: 0.0,
            y: 0.0,
            zoom: 0.0,
        };
        params.marbles = &racing;
        let mut surface = RecordingSurface::new();
        compositor.render(&mut surface, &params, &mut [], 0.0);

        for cmd in surface.commands() {
            if let Some(bounds) = command_bounds(cmd) {
                assert!(bounds.width.is_finite() && bounds.height.is_finite());
            }
        }
    }

    #[test]
    fn test_dot_field_is_culled_to_view() {
        let mut surface = RecordingSurface::new();
        let cfg = DotFieldConfig::default();
        render_dots(&mut surface, Rect::new(0.0, 0.0, 3.5, 3.5), &cfg);
        // Grid lines at 0, 1.75, 3.5 in both axes.
        assert_eq!(surface.commands().len(), 9);

        let mut far = RecordingSurface::new();
        render_dots(&mut far, Rect::new(0.0, 0.0, 10_000.0, 10_000.0), &cfg);
        assert!(far.commands().is_empty());
    }
}
