//! UI components.

mod roulette_canvas;

pub use roulette_canvas::RouletteCanvas;
