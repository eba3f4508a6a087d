//! Per-frame driver and the `requestAnimationFrame` loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use roulette_core::effects::ParticleManager;
use roulette_core::frame::FrameClock;
use roulette_core::resize::{BackingStore, Measurement};
use roulette_core::ui::{UiEvent, UiObject, dispatch};
use roulette_core::{ColorTheme, RenderConfig, SceneCompositor};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

use crate::demo::DemoRace;
use crate::surface::CanvasSurface;

/// Sparks spawned when a marble crosses the goal.
const BURST_SPARKS: usize = 40;

/// Everything a frame needs, owned in one place so the loop, the resize
/// observer and the input listeners can share it behind an `Rc<RefCell<_>>`.
pub struct RenderHost {
    surface: CanvasSurface,
    compositor: SceneCompositor,
    theme: ColorTheme,
    clock: FrameClock,
    ui: Vec<Box<dyn UiObject>>,
    race: DemoRace,
    particles: ParticleManager,
    rng: StdRng,
}

impl RenderHost {
    pub fn new(
        surface: CanvasSurface,
        config: RenderConfig,
        theme: ColorTheme,
        race: DemoRace,
        ui: Vec<Box<dyn UiObject>>,
    ) -> Self {
        Self {
            surface,
            compositor: SceneCompositor::new(config),
            theme,
            clock: FrameClock::new(),
            ui,
            race,
            particles: ParticleManager::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Takes effect on the next frame.
    pub fn set_theme(&mut self, theme: ColorTheme) {
        self.theme = theme;
    }

    /// Applies a layout measurement. The caller resizes the canvas to the
    /// returned backing store, which also resets the context state.
    pub fn resize(&mut self, measurement: Measurement) -> Option<BackingStore> {
        let backing = self.compositor.resize(measurement)?;
        self.surface.reset_state();
        tracing::debug!(
            width = backing.width,
            height = backing.height,
            dpr = backing.dpr,
            "Canvas resized"
        );
        Some(backing)
    }

    pub fn insert_portrait(&mut self, name: String, image: HtmlImageElement) {
        self.surface.insert_image(name, image);
    }

    pub fn dispatch(&mut self, event: &UiEvent) -> usize {
        dispatch(&mut self.ui, event)
    }

    /// Advances and draws one frame at host time `now_ms`.
    pub fn frame(&mut self, now_ms: f64) {
        let time = self.clock.tick(now_ms);
        for object in &mut self.ui {
            object.update(time.dt_ms);
        }

        let finished = self.race.advance(time.dt_ms);
        let viewport = *self.compositor.viewport();
        let camera = self.race.camera();
        for marble in &finished {
            let at = viewport.world_to_css(&camera, marble.position());
            self.particles
                .spawn_burst(&mut self.rng, at, BURST_SPARKS, marble.hue);
        }
        self.particles.update(time.dt_ms);

        let params = self.race.params(
            &self.theme,
            (viewport.css_width, viewport.css_height),
            &self.particles,
            time.fps,
        );
        self.compositor
            .render(&mut self.surface, &params, &mut self.ui, now_ms);
    }
}

type FrameCallback = Closure<dyn FnMut(f64)>;

fn request_frame(callback: &RefCell<Option<FrameCallback>>) -> Option<i32> {
    let window = web_sys::window()?;
    let callback = callback.borrow();
    window
        .request_animation_frame(callback.as_ref()?.as_ref().unchecked_ref())
        .ok()
}

/// Runs [`RenderHost::frame`] on every animation frame until dropped.
pub struct AnimationLoop {
    running: Rc<Cell<bool>>,
    frame_id: Rc<Cell<Option<i32>>>,
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl AnimationLoop {
    pub fn start(host: Rc<RefCell<RenderHost>>) -> Self {
        let running = Rc::new(Cell::new(true));
        let frame_id = Rc::new(Cell::new(None));
        let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));

        {
            let running = running.clone();
            let frame_id = frame_id.clone();
            let next = callback.clone();
            *callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
                if !running.get() {
                    return;
                }
                host.borrow_mut().frame(timestamp);
                frame_id.set(request_frame(&next));
            }));
        }
        frame_id.set(request_frame(&callback));
        tracing::info!("Animation loop started");

        Self {
            running,
            frame_id,
            callback,
        }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.running.set(false);
        if let (Some(id), Some(window)) = (self.frame_id.take(), web_sys::window()) {
            if let Err(err) = window.cancel_animation_frame(id) {
                tracing::warn!(?err, "Failed to cancel animation frame");
            }
        }
        // The closure holds a handle to itself; dropping it here breaks the
        // cycle.
        self.callback.borrow_mut().take();
        tracing::info!("Animation loop stopped");
    }
}
