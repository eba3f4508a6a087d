//! Per-frame render snapshot.

use crate::camera::Camera;
use crate::effects::{ParticleManager, VisualEffect};
use crate::entity::MapEntityState;
use crate::marble::MarbleSnapshot;
use crate::stage::StageDef;
use crate::theme::ColorTheme;

/// Everything the compositor reads for one frame. Borrowed from the
/// producer and never mutated by the renderer.
#[derive(Debug, Clone, Copy)]
pub struct RenderParameters<'a> {
    pub camera: Camera,
    pub stage: &'a StageDef,
    pub entities: &'a [MapEntityState],
    /// Marbles still racing, in current order.
    pub marbles: &'a [MarbleSnapshot],
    /// Finished marbles in finish order.
    pub winners: &'a [MarbleSnapshot],
    /// Zero-based rank that wins the race.
    pub winner_rank: usize,
    /// Set once the winning rank has been taken.
    pub winner: Option<&'a MarbleSnapshot>,
    pub effects: &'a [VisualEffect],
    /// Screen-space sparks, owned and advanced by the host.
    pub particles: Option<&'a ParticleManager>,
    /// Viewport size in CSS pixels.
    pub size: (f64, f64),
    pub theme: &'a ColorTheme,
    pub countdown: Option<u32>,
    pub show_start_line: bool,
    pub fps: f64,
}

impl<'a> RenderParameters<'a> {
    /// An empty frame: no marbles, default camera.
    pub fn new(stage: &'a StageDef, theme: &'a ColorTheme, size: (f64, f64)) -> Self {
        Self {
            camera: Camera::default(),
            stage,
            entities: &[],
            marbles: &[],
            winners: &[],
            winner_rank: 0,
            winner: None,
            effects: &[],
            particles: None,
            size,
            theme,
            countdown: None,
            show_start_line: false,
            fps: 0.0,
        }
    }

    /// Total number of participants.
    pub fn total(&self) -> usize {
        self.winners.len() + self.marbles.len()
    }

    /// Index into `marbles` of the marble that will take the winning rank,
    /// if it is still racing.
    pub fn winner_target_index(&self) -> Option<usize> {
        self.winner_rank.checked_sub(self.winners.len())
    }

    /// Winners first, then active marbles.
    pub fn ranking(&self) -> impl Iterator<Item = &'a MarbleSnapshot> + 'a {
        self.winners.iter().chain(self.marbles.iter())
    }
}
