//! Pure geometry helpers shared by the transform engines.

use kurbo::{Point, Rect, Vec2};

/// Minimum edge length a resize is allowed to produce.
pub const MIN_EXTENT: f64 = 1e-3;

/// Aspect ratios outside [1/MAX_ASPECT, MAX_ASPECT] are rejected as degenerate.
pub const MAX_ASPECT: f64 = 1000.0;

/// Rotate a point around a center by `angle` radians.
pub fn rotate_point(point: Point, center: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

/// Axis-aligned bounding box of a point list.
/// Returns `Rect::ZERO` for an empty list.
pub fn bounds_of(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    let mut rect = Rect::new(first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        rect.x0 = rect.x0.min(p.x);
        rect.y0 = rect.y0.min(p.y);
        rect.x1 = rect.x1.max(p.x);
        rect.y1 = rect.y1.max(p.y);
    }
    rect
}

/// Arithmetic mean of a point list.
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ZERO;
    }
    let sum = points
        .iter()
        .fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
    (sum / points.len() as f64).to_point()
}

/// Map a point from one box to another, interpolating each axis independently.
/// Degenerate source extents keep the point pinned to the target origin edge.
pub fn map_point_between_boxes(point: Point, from: Rect, to: Rect) -> Point {
    let tx = if from.width().abs() > f64::EPSILON {
        (point.x - from.x0) / from.width()
    } else {
        0.0
    };
    let ty = if from.height().abs() > f64::EPSILON {
        (point.y - from.y0) / from.height()
    } else {
        0.0
    };
    Point::new(to.x0 + tx * to.width(), to.y0 + ty * to.height())
}

/// Map a point preserving its normalized position under a uniform scale about
/// the source box origin. Used for multi-selection uniform resize, where
/// inter-shape spacing must scale with the shapes themselves.
pub fn map_point_uniform(point: Point, from: Rect, to: Rect, scale: f64) -> Point {
    Point::new(
        to.x0 + (point.x - from.x0) * scale,
        to.y0 + (point.y - from.y0) * scale,
    )
}

/// True when two scale factors are equal within a small tolerance.
pub fn scales_uniform(sx: f64, sy: f64) -> bool {
    (sx - sy).abs() < 1e-6
}

/// The cardinal axis a locked drag is constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Pick the dominant axis of an offset.
    pub fn dominant(offset: Vec2) -> Self {
        if offset.x.abs() >= offset.y.abs() {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }

    /// Project an offset onto this axis, zeroing the other component.
    pub fn project(self, offset: Vec2) -> Vec2 {
        match self {
            Axis::Horizontal => Vec2::new(offset.x, 0.0),
            Axis::Vertical => Vec2::new(0.0, offset.y),
        }
    }
}

/// True when every coordinate is finite.
pub fn points_finite(points: &[Point]) -> bool {
    points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
}

/// True when a box is too small or too lopsided to commit.
pub fn bounds_degenerate(rect: Rect) -> bool {
    let w = rect.width().abs();
    let h = rect.height().abs();
    if w < MIN_EXTENT || h < MIN_EXTENT {
        return true;
    }
    let aspect = w / h;
    !(aspect.is_finite() && aspect > 1.0 / MAX_ASPECT && aspect < MAX_ASPECT)
}

/// Nearest grid intersection to a point.
pub fn nearest_grid_point(point: Point, grid_size: f64) -> Point {
    Point::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    )
}

/// Intersection of two line segments (a-b) and (c-d), if any.
pub fn segment_intersection(a: Point, b: Point, c: Point, d: Point) -> Option<Point> {
    let r = b - a;
    let s = d - c;
    let denom = r.cross(s);
    if denom.abs() < 1e-12 {
        return None;
    }
    let qp = c - a;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a + r * t)
    } else {
        None
    }
}

/// Closest point to `p` on the segment a-b.
pub fn project_onto_segment(p: Point, a: Point, b: Point) -> Point {
    let seg = b - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return a;
    }
    let t = ((p - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    a + seg * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_point_quarter_turn() {
        let p = rotate_point(
            Point::new(1.0, 0.0),
            Point::ZERO,
            std::f64::consts::FRAC_PI_2,
        );
        assert!((p.x - 0.0).abs() < 1e-9);
        assert!((p.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_point_around_offset_center() {
        let p = rotate_point(
            Point::new(2.0, 1.0),
            Point::new(1.0, 1.0),
            std::f64::consts::PI,
        );
        assert!((p.x - 0.0).abs() < 1e-9);
        assert!((p.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_of() {
        let pts = [
            Point::new(10.0, -5.0),
            Point::new(-2.0, 7.0),
            Point::new(3.0, 3.0),
        ];
        let b = bounds_of(&pts);
        assert_eq!(b, Rect::new(-2.0, -5.0, 10.0, 7.0));
    }

    #[test]
    fn test_bounds_of_empty() {
        assert_eq!(bounds_of(&[]), Rect::ZERO);
    }

    #[test]
    fn test_centroid() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(5.0, 9.0)];
        let c = centroid(&pts);
        assert!((c.x - 5.0).abs() < 1e-9);
        assert!((c.y - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_map_point_between_boxes() {
        let from = Rect::new(0.0, 0.0, 10.0, 10.0);
        let to = Rect::new(0.0, 0.0, 20.0, 10.0);
        let mapped = map_point_between_boxes(Point::new(5.0, 5.0), from, to);
        assert!((mapped.x - 10.0).abs() < 1e-9);
        assert!((mapped.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_axis_lock_projection() {
        let offset = Vec2::new(8.0, 3.0);
        assert_eq!(Axis::dominant(offset), Axis::Horizontal);
        let projected = Axis::Horizontal.project(offset);
        assert!((projected.x - 8.0).abs() < f64::EPSILON);
        assert!((projected.y - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_degenerate_bounds() {
        assert!(bounds_degenerate(Rect::new(0.0, 0.0, 1e-5, 10.0)));
        assert!(bounds_degenerate(Rect::new(0.0, 0.0, 10000.0, 1.0)));
        assert!(!bounds_degenerate(Rect::new(0.0, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn test_segment_intersection() {
        let p = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        );
        let p = p.expect("segments cross");
        assert!((p.x - 5.0).abs() < 1e-9);
        assert!((p.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_segment_intersection_parallel() {
        assert!(segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(10.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn test_project_onto_segment() {
        let p = project_onto_segment(
            Point::new(5.0, 5.0),
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert!((p.x - 5.0).abs() < 1e-9);
        assert!((p.y - 0.0).abs() < 1e-9);
    }
}
