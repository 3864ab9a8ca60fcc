//! Shape definitions for the editor document.

use crate::geometry::{self, bounds_of};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Unique identifier for layers.
pub type LayerId = Uuid;

/// Kind of shape, determining how `points` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Two opposite corners (simple case) or four explicit corners
    /// (after a multi-selection transform). The two encodings carry
    /// different coordinate-space contracts and are never converted
    /// into each other outside a resize/rotate commit.
    Rectangle,
    /// `[center, radius_handle]`.
    Circle,
    /// Three or more vertices, implicitly closed.
    Polygon,
    /// Two or more vertices, open. A polyline whose last point repeats
    /// its first is treated as closed by feature extraction.
    Polyline,
    /// Exactly two endpoints.
    Line,
}

/// Rotation metadata layered on top of unrotated points.
/// Geometry consumers apply it; the engines never bake it into `points`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Angle in radians.
    pub angle: f64,
    /// Pivot in world coordinates.
    pub center: Point,
}

/// A shape on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    /// Ordered vertex list; interpretation depends on `kind`.
    pub points: Vec<Point>,
    /// Rotation metadata, if the shape is rotated.
    #[serde(default)]
    pub rotation: Option<Rotation>,
    /// Locked shapes are excluded from every transform.
    #[serde(default)]
    pub locked: bool,
    /// Group membership tag; shapes sharing a group id move as one.
    #[serde(default)]
    pub group_id: Option<Uuid>,
    /// Layer this shape lives on.
    pub layer_id: LayerId,
    /// Last-modified timestamp, epoch milliseconds.
    #[serde(default)]
    pub modified: u64,
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl Shape {
    /// Create a new shape on the given layer.
    pub fn new(kind: ShapeKind, points: Vec<Point>, layer_id: LayerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            points,
            rotation: None,
            locked: false,
            group_id: None,
            layer_id,
            modified: now_millis(),
        }
    }

    /// Rectangle from two opposite corners (2-point encoding).
    pub fn rectangle(p1: Point, p2: Point, layer_id: LayerId) -> Self {
        Self::new(ShapeKind::Rectangle, vec![p1, p2], layer_id)
    }

    /// Circle from a center and radius.
    pub fn circle(center: Point, radius: f64, layer_id: LayerId) -> Self {
        Self::new(
            ShapeKind::Circle,
            vec![center, Point::new(center.x + radius, center.y)],
            layer_id,
        )
    }

    /// Line between two endpoints.
    pub fn line(start: Point, end: Point, layer_id: LayerId) -> Self {
        Self::new(ShapeKind::Line, vec![start, end], layer_id)
    }

    /// Axis-aligned bounding box of the unrotated point list.
    pub fn bounds(&self) -> Rect {
        match self.kind {
            ShapeKind::Circle => {
                let Some(&center) = self.points.first() else {
                    return Rect::ZERO;
                };
                let r = self.radius();
                Rect::new(center.x - r, center.y - r, center.x + r, center.y + r)
            }
            _ => bounds_of(&self.points),
        }
    }

    /// Circle radius; 0 for non-circles or malformed point lists.
    pub fn radius(&self) -> f64 {
        if self.kind != ShapeKind::Circle || self.points.len() < 2 {
            return 0.0;
        }
        (self.points[1] - self.points[0]).hypot()
    }

    /// Geometric center of the shape.
    pub fn centroid(&self) -> Point {
        match self.kind {
            ShapeKind::Circle => self.points.first().copied().unwrap_or(Point::ZERO),
            ShapeKind::Rectangle => self.bounds().center(),
            _ => geometry::centroid(&self.points),
        }
    }

    /// Explicit corner list, regardless of encoding.
    /// A 2-point rectangle expands to its four bounds corners.
    pub fn corners(&self) -> Vec<Point> {
        match self.kind {
            ShapeKind::Rectangle if self.points.len() == 2 => {
                let b = self.bounds();
                vec![
                    Point::new(b.x0, b.y0),
                    Point::new(b.x1, b.y0),
                    Point::new(b.x1, b.y1),
                    Point::new(b.x0, b.y1),
                ]
            }
            ShapeKind::Circle => Vec::new(),
            _ => self.points.clone(),
        }
    }

    /// Edge list as point pairs, honoring closure for polygons,
    /// closed polylines, and rectangles.
    pub fn edges(&self) -> Vec<(Point, Point)> {
        let pts = self.corners();
        if pts.len() < 2 {
            return Vec::new();
        }
        let mut edges: Vec<(Point, Point)> =
            pts.windows(2).map(|w| (w[0], w[1])).collect();
        if self.is_closed() && pts.len() > 2 {
            edges.push((pts[pts.len() - 1], pts[0]));
        }
        edges
    }

    /// Whether the outline closes back on itself.
    pub fn is_closed(&self) -> bool {
        match self.kind {
            ShapeKind::Rectangle | ShapeKind::Polygon | ShapeKind::Circle => true,
            ShapeKind::Line => false,
            ShapeKind::Polyline => {
                self.points.len() > 3
                    && self
                        .points
                        .first()
                        .zip(self.points.last())
                        .map(|(a, b)| (*a - *b).hypot() < 1e-9)
                        .unwrap_or(false)
            }
        }
    }

    /// Candidate feature points used for snapping and alignment:
    /// corners, edge midpoints, and the centroid.
    pub fn feature_points(&self) -> Vec<Point> {
        let mut features = self.corners();
        for (a, b) in self.edges() {
            features.push(Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0));
        }
        features.push(self.centroid());
        features
    }

    /// Translate the unrotated points and the rotation center together.
    pub fn translate(&mut self, offset: Vec2) {
        for p in &mut self.points {
            *p += offset;
        }
        if let Some(rotation) = &mut self.rotation {
            rotation.center += offset;
        }
    }

    /// Point-in-shape test against the unrotated outline, with tolerance.
    /// Rotated shapes test the query point un-rotated into shape space.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let local = match self.rotation {
            Some(r) => geometry::rotate_point(point, r.center, -r.angle),
            None => point,
        };
        match self.kind {
            ShapeKind::Circle => {
                let center = self.points.first().copied().unwrap_or(Point::ZERO);
                (local - center).hypot() <= self.radius() + tolerance
            }
            ShapeKind::Line | ShapeKind::Polyline => self
                .edges()
                .iter()
                .any(|&(a, b)| (geometry::project_onto_segment(local, a, b) - local).hypot() <= tolerance),
            _ => self.bounds().inflate(tolerance, tolerance).contains(local),
        }
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = now_millis();
    }

    /// Point-count check for the kind. Rectangles admit both the 2-point
    /// and 4-point encodings; 3 or more than 4 points is structurally
    /// impossible.
    pub fn structurally_valid(&self) -> bool {
        if !geometry::points_finite(&self.points) {
            return false;
        }
        match self.kind {
            ShapeKind::Rectangle => matches!(self.points.len(), 2 | 4),
            ShapeKind::Circle | ShapeKind::Line => self.points.len() == 2,
            ShapeKind::Polygon => self.points.len() >= 3,
            ShapeKind::Polyline => self.points.len() >= 2,
        }
    }
}
