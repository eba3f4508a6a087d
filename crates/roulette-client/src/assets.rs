//! Portrait loading through `HtmlImageElement`.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use gloo::events::EventListener;
use gloo::timers::future::TimeoutFuture;
use roulette_core::RenderError;
use roulette_core::assets::{LoadReport, PortraitManifest, load_all};
use web_sys::HtmlImageElement;

use crate::surface::asset_error;

/// Overall budget for the startup portrait join.
pub const LOAD_TIMEOUT_MS: u32 = 10_000;

/// Resolves once the image has decoded, or fails on its `error` event.
async fn load_image(name: String, url: String) -> Result<HtmlImageElement, RenderError> {
    let image = HtmlImageElement::new().map_err(|err| asset_error(&name, &err))?;
    let (tx, rx) = oneshot::channel::<Result<(), String>>();
    let tx = Rc::new(RefCell::new(Some(tx)));

    let _on_load = {
        let tx = tx.clone();
        EventListener::once(&image, "load", move |_| {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Ok(()));
            }
        })
    };
    let _on_error = EventListener::once(&image, "error", move |_| {
        if let Some(tx) = tx.borrow_mut().take() {
            let _ = tx.send(Err("image failed to load".to_string()));
        }
    });
    image.set_src(&url);

    match rx.await {
        Ok(Ok(())) => Ok(image),
        Ok(Err(reason)) => Err(RenderError::AssetLoad { name, reason }),
        Err(_) => Err(RenderError::AssetLoad {
            name,
            reason: "listener dropped".to_string(),
        }),
    }
}

/// Loads every portrait in the manifest, giving up on stragglers after
/// [`LOAD_TIMEOUT_MS`].
pub async fn load_portraits(manifest: &PortraitManifest) -> LoadReport<HtmlImageElement> {
    tracing::info!(count = manifest.len(), "Loading portraits");
    load_all(
        &manifest.entries,
        |entry| load_image(entry.name.clone(), entry.url.clone()),
        TimeoutFuture::new(LOAD_TIMEOUT_MS),
    )
    .await
}
