//! Error types for the renderer's construction, config and asset paths.
//!
//! Steady-state rendering never fails; these only surface while building
//! the renderer or loading its inputs.

/// Errors produced outside the per-frame render path.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Camera zoom must be positive and finite, got {0}")]
    InvalidZoom(f64),

    #[error("Invalid render configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("Unknown theme: '{0}'")]
    UnknownTheme(String),

    #[error("Failed to load asset '{name}': {reason}")]
    AssetLoad { name: String, reason: String },

    #[error("Asset loading timed out with {pending} asset(s) still pending")]
    AssetTimeout { pending: usize },
}
