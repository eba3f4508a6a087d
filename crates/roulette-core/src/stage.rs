//! Stage definitions as seen by the renderer.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityShape, ShapeGeometry};
use crate::geometry::Vec2;

/// Static description of a race track.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDef {
    pub title: String,
    /// World y of the finish line.
    pub goal_y: f64,
    #[serde(default)]
    pub entities: Vec<StageEntity>,
}

/// A stage entity in its authored (initial) placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEntity {
    #[serde(default)]
    pub position: Vec2,
    pub shape: EntityShape,
}

impl StageDef {
    /// All polyline vertices of the stage, in authored coordinates.
    pub fn polyline_points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.entities
            .iter()
            .filter_map(|e| match &e.shape.geometry {
                ShapeGeometry::Polyline { points } => Some(points.iter().copied()),
                _ => None,
            })
            .flatten()
    }

    /// Horizontal extent of the track around `y`; see [`line_extent`].
    pub fn line_extent(&self, y: f64, tolerance: f64, fallback: (f64, f64)) -> (f64, f64) {
        line_extent(self.polyline_points(), y, tolerance, fallback)
    }
}

/// Min/max x of the points lying within `tolerance` of `y`.
///
/// This is a heuristic: the walls of the track are polylines, so the
/// vertices near a horizontal line bracket the track width there. With fewer
/// than two qualifying points `fallback` is returned.
pub fn line_extent(
    points: impl IntoIterator<Item = Vec2>,
    y: f64,
    tolerance: f64,
    fallback: (f64, f64),
) -> (f64, f64) {
    let mut count = 0usize;
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for p in points {
        if (p.y - y).abs() < tolerance {
            count += 1;
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
        }
    }
    if count >= 2 { (min_x, max_x) } else { fallback }
}
