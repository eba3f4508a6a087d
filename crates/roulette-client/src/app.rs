//! Main application component.

use gloo::timers::callback::Timeout;
use roulette_core::ThemeKey;
use yew::prelude::*;

use crate::components::RouletteCanvas;

/// How long a status toast stays up.
const TOAST_MS: u32 = 2000;

#[function_component(App)]
pub fn app() -> Html {
    let theme = use_state(ThemeKey::default);
    let toast = use_state(|| None::<String>);
    let toast_timer = use_mut_ref(|| None::<Timeout>);

    let on_toggle_theme = {
        let theme = theme.clone();
        Callback::from(move |_: MouseEvent| {
            theme.set(match *theme {
                ThemeKey::Dark => ThemeKey::Light,
                ThemeKey::Light => ThemeKey::Dark,
            });
        })
    };

    let on_message = {
        let toast = toast.clone();
        Callback::from(move |text: String| {
            toast.set(Some(text));
            let toast = toast.clone();
            // Replacing the timer cancels the previous one.
            *toast_timer.borrow_mut() = Some(Timeout::new(TOAST_MS, move || toast.set(None)));
        })
    };

    let next = match *theme {
        ThemeKey::Dark => "Light",
        ThemeKey::Light => "Dark",
    };

    html! {
        <main class={classes!("app", theme.as_str())}>
            <RouletteCanvas theme={*theme} {on_message} />
            <button class="theme-toggle" onclick={on_toggle_theme}>
                { format!("{next} theme") }
            </button>
            if let Some(text) = &*toast {
                <div class="toast">{ text }</div>
            }
        </main>
    }
}
