//! Magnetic snapping and alignment guide detection.

mod index;

pub use index::SpatialSnapIndex;

use crate::geometry::nearest_grid_point;
use crate::shape::ShapeId;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default magnetic snap radius in world units.
pub const DEFAULT_SNAP_RADIUS: f64 = 10.0;

/// Default grid cell size.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;

/// Fraction of a grid cell used as the effective radius in adaptive mode.
const ADAPTIVE_RADIUS_FRACTION: f64 = 0.25;

/// Distance within which two coordinates are considered aligned.
pub const ALIGNMENT_THRESHOLD: f64 = 1.0;

/// Kind of snap candidate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SnapKind {
    Grid,
    Endpoint,
    Midpoint,
    Center,
    Edge,
    Intersection,
}

/// A candidate anchor position a moving shape can magnetically align to.
/// Produced transiently per query; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapPoint {
    pub position: Point,
    pub kind: SnapKind,
    pub source_shape: Option<ShapeId>,
}

impl SnapPoint {
    pub fn new(position: Point, kind: SnapKind, source_shape: Option<ShapeId>) -> Self {
        Self {
            position,
            kind,
            source_shape,
        }
    }
}

/// How the effective snap radius is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapRadiusMode {
    /// Use the configured radius as-is.
    #[default]
    Fixed,
    /// Scale the radius with the grid cell size.
    Adaptive,
}

/// Snap configuration surface. Read-only to the detector; mutated only by
/// tool-mode transitions or explicit user settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapConfig {
    pub enabled: bool,
    pub radius: f64,
    pub mode: SnapRadiusMode,
    /// Enabled candidate kinds. Serializes as an array.
    pub active_kinds: BTreeSet<SnapKind>,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: DEFAULT_SNAP_RADIUS,
            mode: SnapRadiusMode::Fixed,
            active_kinds: [
                SnapKind::Grid,
                SnapKind::Endpoint,
                SnapKind::Midpoint,
                SnapKind::Center,
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl SnapConfig {
    /// Effective radius for the current mode.
    pub fn effective_radius(&self, grid_size: f64) -> f64 {
        match self.mode {
            SnapRadiusMode::Fixed => self.radius,
            SnapRadiusMode::Adaptive => grid_size * ADAPTIVE_RADIUS_FRACTION,
        }
    }
}

/// The winning candidate/target pair of a snap query.
#[derive(Debug, Clone)]
pub struct SnapMatch {
    /// The moving shape's feature point that matched.
    pub moving: Point,
    /// The indexed target it matched against.
    pub target: SnapPoint,
    pub distance: f64,
}

impl SnapMatch {
    /// The magnetic correction that moves `moving` onto `target`.
    pub fn correction(&self) -> Vec2 {
        self.target.position - self.moving
    }
}

/// Find the minimum-distance pair between the moving shape's feature points
/// and the indexed candidates (plus the grid, which is synthesized
/// analytically rather than indexed). Pair-wise minimum distance is what
/// enables corner-to-corner and edge-to-edge snapping rather than
/// centroid-only snapping.
pub fn best_snap(
    features: &[Point],
    index: &SpatialSnapIndex,
    config: &SnapConfig,
    grid_size: f64,
) -> Option<SnapMatch> {
    if !config.enabled || features.is_empty() {
        return None;
    }
    let radius = config.effective_radius(grid_size);
    let mut best: Option<SnapMatch> = None;

    for &feature in features {
        if let Some((target, distance)) = index.nearest(feature, radius, &config.active_kinds) {
            if best.as_ref().is_none_or(|b| distance < b.distance) {
                best = Some(SnapMatch {
                    moving: feature,
                    target,
                    distance,
                });
            }
        }
        if config.active_kinds.contains(&SnapKind::Grid) && grid_size > 0.0 {
            let grid = nearest_grid_point(feature, grid_size);
            let distance = (grid - feature).hypot();
            if distance <= radius && best.as_ref().is_none_or(|b| distance < b.distance) {
                best = Some(SnapMatch {
                    moving: feature,
                    target: SnapPoint::new(grid, SnapKind::Grid, None),
                    distance,
                });
            }
        }
    }

    best
}

/// Guide orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A transient visual line indicating two shapes share an edge or center
/// coordinate. Never moves geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentGuide {
    pub orientation: Orientation,
    /// The shared coordinate (x for vertical guides, y for horizontal).
    pub position: f64,
    /// Span of the guide along its own direction.
    pub extent: (f64, f64),
}

/// Distance between two evenly-gapped neighbors.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacingMeasurement {
    pub distance: f64,
    pub between: (ShapeId, ShapeId),
}

/// Everything the alignment pass produces for one interaction frame.
#[derive(Debug, Clone, Default)]
pub struct AlignmentReport {
    pub guides: Vec<AlignmentGuide>,
    pub spacing: Vec<SpacingMeasurement>,
}

impl AlignmentReport {
    pub fn is_empty(&self) -> bool {
        self.guides.is_empty() && self.spacing.is_empty()
    }
}

fn key_xs(rect: Rect) -> [f64; 3] {
    [rect.x0, rect.center().x, rect.x1]
}

fn key_ys(rect: Rect) -> [f64; 3] {
    [rect.y0, rect.center().y, rect.y1]
}

/// Compare the moving shape's bounding-box edges and centers against every
/// other visible shape and report matches within the alignment threshold,
/// plus spacing measurements between evenly-gapped row/column neighbors.
/// Purely visual feedback; the caller must not use it to correct position.
pub fn detect_alignment(
    moving: (ShapeId, Rect),
    others: &[(ShapeId, Rect)],
    threshold: f64,
) -> AlignmentReport {
    let (moving_id, moving_bounds) = moving;
    let mut report = AlignmentReport::default();

    for &(_, other) in others {
        for mx in key_xs(moving_bounds) {
            for ox in key_xs(other) {
                if (mx - ox).abs() <= threshold {
                    report.guides.push(AlignmentGuide {
                        orientation: Orientation::Vertical,
                        position: ox,
                        extent: (
                            moving_bounds.y0.min(other.y0),
                            moving_bounds.y1.max(other.y1),
                        ),
                    });
                }
            }
        }
        for my in key_ys(moving_bounds) {
            for oy in key_ys(other) {
                if (my - oy).abs() <= threshold {
                    report.guides.push(AlignmentGuide {
                        orientation: Orientation::Horizontal,
                        position: oy,
                        extent: (
                            moving_bounds.x0.min(other.x0),
                            moving_bounds.x1.max(other.x1),
                        ),
                    });
                }
            }
        }
    }

    report.spacing = detect_spacing(moving_id, moving_bounds, others, threshold);
    report
}

/// Find evenly-gapped horizontal neighbors in the row the moving shape
/// occupies (shapes whose vertical ranges overlap the moving bounds).
fn detect_spacing(
    moving_id: ShapeId,
    moving_bounds: Rect,
    others: &[(ShapeId, Rect)],
    threshold: f64,
) -> Vec<SpacingMeasurement> {
    let mut row: Vec<(ShapeId, Rect)> = others
        .iter()
        .filter(|(_, r)| r.y0 < moving_bounds.y1 && r.y1 > moving_bounds.y0)
        .copied()
        .collect();
    row.push((moving_id, moving_bounds));
    if row.len() < 3 {
        return Vec::new();
    }
    row.sort_by(|a, b| a.1.x0.total_cmp(&b.1.x0));

    let mut spacing = Vec::new();
    for w in row.windows(3) {
        let gap_ab = w[1].1.x0 - w[0].1.x1;
        let gap_bc = w[2].1.x0 - w[1].1.x1;
        if gap_ab > 0.0 && (gap_ab - gap_bc).abs() <= threshold {
            spacing.push(SpacingMeasurement {
                distance: gap_ab,
                between: (w[0].0, w[1].0),
            });
            spacing.push(SpacingMeasurement {
                distance: gap_bc,
                between: (w[1].0, w[2].0),
            });
        }
    }
    spacing
}
