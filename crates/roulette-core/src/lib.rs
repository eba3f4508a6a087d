//! Roulette Core
//!
//! Platform-independent rendering pipeline for the marble roulette: camera
//! and viewport transforms, themed entity drawing, the live ranking
//! overlay, countdown and winner celebration. Everything draws through the
//! [`surface::Surface`] trait, so the whole pipeline runs headless against
//! [`surface::recording::RecordingSurface`].

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod assets;
pub mod camera;
pub mod celebration;
pub mod color;
pub mod compositor;
pub mod config;
pub mod countdown;
pub mod effects;
pub mod entity;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod marble;
pub mod params;
pub mod rank;
pub mod resize;
pub mod stage;
pub mod surface;
pub mod theme;
pub mod track;
pub mod ui;
pub mod viewport;

pub use camera::Camera;
pub use color::Color;
pub use compositor::SceneCompositor;
pub use config::RenderConfig;
pub use error::RenderError;
pub use params::RenderParameters;
pub use surface::Surface;
pub use theme::{ColorTheme, ThemeKey, ThemeRegistry};
