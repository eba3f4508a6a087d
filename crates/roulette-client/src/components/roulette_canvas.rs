//! Canvas component hosting the renderer.

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use roulette_core::rank::RankOverlay;
use roulette_core::{RenderConfig, ThemeKey, ThemeRegistry};
use wasm_bindgen::JsValue;
use web_sys::{Element, HtmlCanvasElement};
use yew::prelude::*;

use crate::assets::load_portraits;
use crate::clipboard::NavigatorClipboard;
use crate::demo::{DemoRace, Roster};
use crate::host::{AnimationLoop, RenderHost};
use crate::input::InputBindings;
use crate::resize::ResizeBinding;
use crate::surface::CanvasSurface;

#[derive(Properties, PartialEq)]
pub struct RouletteCanvasProps {
    pub theme: ThemeKey,
    /// Status messages from the overlays (e.g. "copied").
    #[prop_or_default]
    pub on_message: Callback<String>,
}

/// Live bindings for a mounted canvas. Dropping this stops the loop and
/// detaches every listener.
struct Mounted {
    host: Rc<RefCell<RenderHost>>,
    _animation: AnimationLoop,
    _resize: ResizeBinding,
    _input: InputBindings,
}

fn mount(
    container: &NodeRef,
    canvas: &NodeRef,
    theme: ThemeKey,
    on_message: Callback<String>,
) -> Result<Mounted, JsValue> {
    let container = container
        .cast::<Element>()
        .ok_or_else(|| JsValue::from_str("Canvas container not mounted"))?;
    let canvas = canvas
        .cast::<HtmlCanvasElement>()
        .ok_or_else(|| JsValue::from_str("Canvas not mounted"))?;
    let roster = Roster::builtin().map_err(|e| JsValue::from_str(&e.to_string()))?;

    let config = RenderConfig::default();
    let mut rank = RankOverlay::new(config.rank.clone(), Rc::new(NavigatorClipboard));
    rank.on_message(move |text| on_message.emit(text.to_string()));

    let host = Rc::new(RefCell::new(RenderHost::new(
        CanvasSurface::new(&canvas)?,
        config,
        ThemeRegistry::builtin().theme(theme).clone(),
        DemoRace::new(&roster, StdRng::from_os_rng()),
        vec![Box::new(rank)],
    )));

    let resize = ResizeBinding::observe(&container, &canvas, host.clone())?;
    let input = InputBindings::attach(&canvas, &host);

    {
        // Portraits arrive after the race has started; marbles without one
        // keep their plain disc.
        let host = Rc::downgrade(&host);
        let manifest = roster.portraits;
        wasm_bindgen_futures::spawn_local(async move {
            let report = load_portraits(&manifest).await;
            let Some(host) = host.upgrade() else {
                return;
            };
            let mut host = host.borrow_mut();
            for (name, image) in report.loaded {
                host.insert_portrait(name, image);
            }
        });
    }

    let animation = AnimationLoop::start(host.clone());
    Ok(Mounted {
        host,
        _animation: animation,
        _resize: resize,
        _input: input,
    })
}

#[function_component(RouletteCanvas)]
pub fn roulette_canvas(props: &RouletteCanvasProps) -> Html {
    let container_ref = use_node_ref();
    let canvas_ref = use_node_ref();
    let mounted = use_mut_ref(|| None::<Mounted>);

    {
        let container_ref = container_ref.clone();
        let canvas_ref = canvas_ref.clone();
        let mounted = mounted.clone();
        let theme = props.theme;
        let on_message = props.on_message.clone();
        use_effect_with((), move |_| {
            match mount(&container_ref, &canvas_ref, theme, on_message) {
                Ok(bindings) => *mounted.borrow_mut() = Some(bindings),
                Err(err) => tracing::error!(?err, "Failed to mount renderer"),
            }
            move || {
                mounted.borrow_mut().take();
            }
        });
    }

    {
        let mounted = mounted.clone();
        use_effect_with(props.theme, move |key| {
            if let Some(m) = mounted.borrow().as_ref() {
                m.host
                    .borrow_mut()
                    .set_theme(ThemeRegistry::builtin().theme(*key).clone());
                tracing::info!(theme = %key, "Theme switched");
            }
        });
    }

    html! {
        <div class="roulette-stage" ref={container_ref}>
            <canvas ref={canvas_ref} />
        </div>
    }
}
