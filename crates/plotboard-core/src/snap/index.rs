//! Spatial index over candidate snap points.
//!
//! Feature points are bucketed into coarse grid cells so a nearest-neighbor
//! query only scans the cells overlapping the query radius. Edge segments are
//! kept separately; an edge snap projects the query point onto them.

use super::{SnapKind, SnapPoint};
use crate::geometry::{project_onto_segment, segment_intersection};
use crate::shape::{Shape, ShapeId};
use kurbo::Point;
use std::collections::{BTreeSet, HashMap};

/// Bucket edge length in world units.
const CELL_SIZE: f64 = 64.0;

/// Index of snap candidates harvested from a set of shapes.
/// Rebuilt per gesture; queried once per frame.
#[derive(Debug, Default)]
pub struct SpatialSnapIndex {
    buckets: HashMap<(i64, i64), Vec<SnapPoint>>,
    segments: Vec<(Option<ShapeId>, Point, Point)>,
}

impl SpatialSnapIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from the given shapes. Intersection candidates are
    /// pairwise across shapes and only computed when requested, since the
    /// line/measure tools are the only consumers.
    pub fn build<'a>(
        shapes: impl IntoIterator<Item = &'a Shape> + Clone,
        include_intersections: bool,
    ) -> Self {
        let mut index = Self::new();
        for shape in shapes.clone() {
            for corner in shape.corners() {
                index.insert(SnapPoint::new(corner, SnapKind::Endpoint, Some(shape.id)));
            }
            for (a, b) in shape.edges() {
                let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
                index.insert(SnapPoint::new(mid, SnapKind::Midpoint, Some(shape.id)));
                index.segments.push((Some(shape.id), a, b));
            }
            index.insert(SnapPoint::new(shape.centroid(), SnapKind::Center, Some(shape.id)));
        }

        if include_intersections {
            let all: Vec<&Shape> = shapes.into_iter().collect();
            for (i, a) in all.iter().enumerate() {
                for b in &all[i + 1..] {
                    for &(a0, a1) in &a.edges() {
                        for &(b0, b1) in &b.edges() {
                            if let Some(hit) = segment_intersection(a0, a1, b0, b1) {
                                index.insert(SnapPoint::new(
                                    hit,
                                    SnapKind::Intersection,
                                    None,
                                ));
                            }
                        }
                    }
                }
            }
        }

        index
    }

    /// Insert a single candidate.
    pub fn insert(&mut self, point: SnapPoint) {
        self.buckets
            .entry(cell_of(point.position))
            .or_default()
            .push(point);
    }

    /// Number of indexed candidates.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Nearest indexed candidate of an enabled kind within `radius` of
    /// `query`, along with its distance.
    pub fn nearest(
        &self,
        query: Point,
        radius: f64,
        kinds: &BTreeSet<SnapKind>,
    ) -> Option<(SnapPoint, f64)> {
        let mut best: Option<(SnapPoint, f64)> = None;

        let (cx0, cy0) = cell_of(Point::new(query.x - radius, query.y - radius));
        let (cx1, cy1) = cell_of(Point::new(query.x + radius, query.y + radius));
        for cx in cx0..=cx1 {
            for cy in cy0..=cy1 {
                let Some(bucket) = self.buckets.get(&(cx, cy)) else {
                    continue;
                };
                for candidate in bucket {
                    if !kinds.contains(&candidate.kind) {
                        continue;
                    }
                    let dist = (candidate.position - query).hypot();
                    if dist <= radius && best.as_ref().is_none_or(|(_, d)| dist < *d) {
                        best = Some((candidate.clone(), dist));
                    }
                }
            }
        }

        if kinds.contains(&SnapKind::Edge) {
            for &(source, a, b) in &self.segments {
                let projected = project_onto_segment(query, a, b);
                let dist = (projected - query).hypot();
                if dist <= radius && best.as_ref().is_none_or(|(_, d)| dist < *d) {
                    best = Some((SnapPoint::new(projected, SnapKind::Edge, source), dist));
                }
            }
        }

        best
    }
}

fn cell_of(point: Point) -> (i64, i64) {
    (
        (point.x / CELL_SIZE).floor() as i64,
        (point.y / CELL_SIZE).floor() as i64,
    )
}
