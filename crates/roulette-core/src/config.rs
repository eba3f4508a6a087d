//! Tunable constants for every render pass.
//!
//! All values are visual tuning, not contract. Every field has a serde
//! default so a config file only needs to name what it overrides.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::RenderError;

/// CSS pixels per world unit at camera zoom 1.
pub const DEFAULT_BASE_ZOOM: f64 = 30.0;

/// Top-level renderer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// Fixed base scale applied before the camera zoom.
    pub base_zoom: f64,
    /// Default world stroke width is `line_width_factor / (zoom + base_zoom)`.
    pub line_width_factor: f64,
    /// Random per-marble jitter (world units) while the countdown runs.
    pub countdown_shake: f64,
    pub dots: DotFieldConfig,
    pub track: TrackConfig,
    pub flag: FlagConfig,
    pub rank: RankScrollConfig,
    pub celebration: CelebrationConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_zoom: DEFAULT_BASE_ZOOM,
            line_width_factor: 4.5,
            countdown_shake: 0.08,
            dots: DotFieldConfig::default(),
            track: TrackConfig::default(),
            flag: FlagConfig::default(),
            rank: RankScrollConfig::default(),
            celebration: CelebrationConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Parses a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        let config: Self = serde_json::from_str(json)?;
        tracing::debug!(base_zoom = config.base_zoom, "Render config loaded");
        Ok(config)
    }
}

/// Background dot grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DotFieldConfig {
    pub spacing: f64,
    pub radius: f64,
    pub color: Color,
}

impl Default for DotFieldConfig {
    fn default() -> Self {
        Self {
            spacing: 1.75,
            radius: 0.08,
            color: Color::rgba_f(255, 255, 255, 0.09),
        }
    }
}

/// Start/finish line extraction and styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackConfig {
    /// Vertical tolerance when matching polyline points to the goal line.
    pub finish_tolerance: f64,
    pub finish_height: f64,
    pub finish_cell: f64,
    /// World y of the start line.
    pub start_y: f64,
    pub start_tolerance: f64,
    pub start_line_width: f64,
    /// Horizontal span used when fewer than two points qualify.
    pub fallback_span: (f64, f64),
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            finish_tolerance: 5.0,
            finish_height: 2.0,
            finish_cell: 0.5,
            start_y: 2.5,
            start_tolerance: 10.0,
            start_line_width: 0.3,
            fallback_span: (0.0, 26.0),
        }
    }
}

/// Waving start flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlagConfig {
    /// Milliseconds of wall-clock time per radian of wave phase.
    pub phase_period_ms: f64,
    pub segments: u32,
    pub rows: u32,
    pub width: f64,
    pub height: f64,
    pub pole_extra: f64,
    pub amplitude: f64,
    /// Phase offset between neighbouring segments.
    pub segment_phase: f64,
}

impl Default for FlagConfig {
    fn default() -> Self {
        Self {
            phase_period_ms: 200.0,
            segments: 10,
            rows: 4,
            width: 3.0,
            height: 2.0,
            pole_extra: 0.5,
            amplitude: 0.25,
            segment_phase: 0.5,
        }
    }
}

/// Rank overlay scroll behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RankScrollConfig {
    pub row_height: f64,
    /// Rows kept above the most recently finished rank in auto-follow.
    pub lookahead: u32,
    /// How long a wheel scroll holds the view, in milliseconds.
    pub hold_ms: f64,
    /// Time constant of the exponential ease toward the target.
    pub ease_ms: f64,
    /// Distance under which the scroll snaps onto its target.
    pub snap_threshold: f64,
    pub panel_width: f64,
    pub panel_top: f64,
}

impl Default for RankScrollConfig {
    fn default() -> Self {
        Self {
            row_height: 28.0,
            lookahead: 5,
            hold_ms: 2000.0,
            ease_ms: 250.0,
            snap_threshold: 1.0,
            panel_width: 300.0,
            panel_top: 43.0,
        }
    }
}

/// Winner confetti field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CelebrationConfig {
    pub particle_count: u32,
    /// Life loops in `[0, period)`.
    pub period: f64,
    /// Life units per millisecond of wall-clock time.
    pub time_scale: f64,
    /// Life offset between consecutive particles.
    pub index_offset: f64,
    /// Every n-th particle gets a glow pass.
    pub glow_every: u32,
    /// Random hue jitter (degrees) on the gold particles.
    pub gold_jitter: f64,
    pub backdrop: Color,
}

impl Default for CelebrationConfig {
    fn default() -> Self {
        Self {
            particle_count: 1200,
            period: 1500.0,
            time_scale: 1.0 / 3.0,
            index_offset: 30.0,
            glow_every: 20,
            gold_jitter: 15.0,
            backdrop: Color::rgba_f(0, 0, 0, 0.7),
        }
    }
}
