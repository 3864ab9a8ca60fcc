//! Resize engines: handle-based single-shape resize and bounding-box
//! multi-selection resize.

use crate::document::Document;
use crate::geometry::{
    self, bounds_of, map_point_between_boxes, map_point_uniform, points_finite, scales_uniform,
};
use crate::session::{ResizeHandle, ResizeSession};
use crate::shape::{Shape, ShapeId, ShapeKind};
use kurbo::{Point, Rect};

/// Begin a handle resize on one shape.
pub fn begin(shape: &Shape, handle: ResizeHandle) -> ResizeSession {
    ResizeSession {
        shape_id: shape.id,
        kind: shape.kind,
        handle,
        original_points: shape.points.clone(),
        live_points: shape.points.clone(),
    }
}

fn original_bounds(session: &ResizeSession) -> Rect {
    match session.kind {
        ShapeKind::Circle => {
            let center = session.original_points.first().copied().unwrap_or(Point::ZERO);
            let r = session
                .original_points
                .get(1)
                .map(|h| (*h - center).hypot())
                .unwrap_or(0.0);
            Rect::new(center.x - r, center.y - r, center.x + r, center.y + r)
        }
        _ => bounds_of(&session.original_points),
    }
}

/// Target box produced by dragging the session's handle to `pointer`,
/// normalized so the dragged corner may cross over the opposite one.
fn target_bounds(original: Rect, handle: ResizeHandle, pointer: Point) -> Rect {
    let (x0, y0, x1, y1) = match handle {
        // Corners: 0 = top-left, clockwise.
        ResizeHandle::Corner(0) => (pointer.x, pointer.y, original.x1, original.y1),
        ResizeHandle::Corner(1) => (original.x0, pointer.y, pointer.x, original.y1),
        ResizeHandle::Corner(2) => (original.x0, original.y0, pointer.x, pointer.y),
        ResizeHandle::Corner(_) => (pointer.x, original.y0, original.x1, pointer.y),
        // Edges: 0 = top, clockwise.
        ResizeHandle::Edge(0) => (original.x0, pointer.y, original.x1, original.y1),
        ResizeHandle::Edge(1) => (original.x0, original.y0, pointer.x, original.y1),
        ResizeHandle::Edge(2) => (original.x0, original.y0, original.x1, pointer.y),
        ResizeHandle::Edge(_) => (pointer.x, original.y0, original.x1, original.y1),
    };
    Rect::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
}

/// Live update: recompute the preview buffer for the pointer position.
/// Degenerate or non-finite results drop the frame; the previous valid
/// preview persists.
pub fn update(session: &mut ResizeSession, pointer: Point) {
    if !pointer.x.is_finite() || !pointer.y.is_finite() {
        return;
    }
    let from = original_bounds(session);
    let to = target_bounds(from, session.handle, pointer);
    if geometry::bounds_degenerate(to) {
        return;
    }

    let mapped: Vec<Point> = match session.kind {
        ShapeKind::Circle => {
            let center = to.center();
            let r = to.width().min(to.height()) / 2.0;
            vec![center, Point::new(center.x + r, center.y)]
        }
        _ => session
            .original_points
            .iter()
            .map(|p| map_point_between_boxes(*p, from, to))
            .collect(),
    };
    if !points_finite(&mapped) {
        return;
    }
    session.live_points = mapped;
}

/// Merge the preview buffer into the shape. Rectangles re-normalize to the
/// canonical 2-point form (a 4-point rectangle keeps its point count); a
/// rotated shape gets its rotation center recomputed from the new geometry
/// so it keeps pivoting correctly. Returns `false` when the preview is
/// structurally unusable and nothing was committed.
pub fn commit(session: &ResizeSession, doc: &mut Document) -> bool {
    let Some(shape) = doc.get_mut(session.shape_id) else {
        return false;
    };
    if !points_finite(&session.live_points) {
        return false;
    }

    let new_points = match session.kind {
        ShapeKind::Rectangle if session.live_points.len() == 2 => {
            let b = bounds_of(&session.live_points);
            vec![Point::new(b.x0, b.y0), Point::new(b.x1, b.y1)]
        }
        _ => session.live_points.clone(),
    };

    shape.points = new_points;
    if !shape.structurally_valid() {
        shape.points = session.original_points.clone();
        return false;
    }
    if let Some(rotation) = &mut shape.rotation {
        rotation.center = match session.kind {
            ShapeKind::Circle => shape.points.first().copied().unwrap_or(rotation.center),
            _ => bounds_of(&shape.points).center(),
        };
    }
    shape.touch();
    true
}

/// Multi-selection resize: map every unlocked selected shape from the
/// selection's original bounding box into `target`. Equal scale factors
/// preserve each point's normalized box position under one uniform scale,
/// keeping inter-shape spacing proportional; unequal factors interpolate
/// per axis and allow distortion. Rectangles come out in the explicit
/// 4-corner encoding. Returns the mutated ids.
pub fn resize_selection(doc: &mut Document, target: Rect) -> Vec<ShapeId> {
    let ids = doc.unlocked_selection();
    if ids.is_empty() || geometry::bounds_degenerate(target) {
        return Vec::new();
    }
    let mut from: Option<Rect> = None;
    for &id in &ids {
        if let Some(shape) = doc.get(id) {
            let b = shape.bounds();
            from = Some(match from {
                Some(acc) => acc.union(b),
                None => b,
            });
        }
    }
    let Some(from) = from else {
        return Vec::new();
    };
    if from.width() < f64::EPSILON || from.height() < f64::EPSILON {
        return Vec::new();
    }

    let sx = target.width() / from.width();
    let sy = target.height() / from.height();
    let uniform = scales_uniform(sx, sy);

    let mut resized = Vec::new();
    for &id in &ids {
        let Some(shape) = doc.get_mut(id) else {
            continue;
        };
        // Multi-selection transforms commit rectangles as explicit corners.
        let source: Vec<Point> = match shape.kind {
            ShapeKind::Rectangle => shape.corners(),
            _ => shape.points.clone(),
        };
        let mapped: Vec<Point> = source
            .iter()
            .map(|p| {
                if uniform {
                    map_point_uniform(*p, from, target, sx)
                } else {
                    map_point_between_boxes(*p, from, target)
                }
            })
            .collect();
        if !points_finite(&mapped) {
            continue;
        }
        shape.points = mapped;
        if let Some(rotation) = &mut shape.rotation {
            rotation.center = bounds_of(&shape.points).center();
        }
        shape.touch();
        resized.push(id);
    }
    resized
}
