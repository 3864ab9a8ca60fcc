//! Drag engine for single shapes and multi-selections.

use crate::document::Document;
use crate::geometry::Axis;
use crate::session::{DragSession, AXIS_LOCK_THRESHOLD};
use crate::shape::{Shape, ShapeId};
use crate::snap::{self, AlignmentReport, SnapConfig, SnapKind, SpatialSnapIndex};
use kurbo::{Point, Vec2};
use std::collections::HashMap;

/// Begin a drag at `pointer`. Every currently-selected shape moves (or just
/// `shape_id` when it is not part of the selection); locked shapes are not
/// recorded and therefore never move. Returns `None` when nothing movable
/// remains.
pub fn begin(
    doc: &Document,
    shape_id: ShapeId,
    pointer: Point,
    axis_lock: bool,
) -> Option<DragSession> {
    let targets: Vec<ShapeId> = if doc.is_selected(shape_id) {
        doc.unlocked_selection()
    } else {
        doc.get(shape_id)
            .filter(|s| !s.locked)
            .map(|s| vec![s.id])
            .unwrap_or_default()
    };
    if targets.is_empty() {
        return None;
    }

    let mut original_points = HashMap::new();
    let mut original_rotations = HashMap::new();
    for &id in &targets {
        let shape = doc.get(id)?;
        original_points.insert(id, shape.points.clone());
        original_rotations.insert(id, shape.rotation);
    }

    Some(DragSession {
        shape_ids: targets,
        start: pointer,
        current: pointer,
        original_points,
        original_rotations,
        axis_lock_requested: axis_lock,
        locked_axis: None,
        magnet: Vec2::ZERO,
        alignment: AlignmentReport::default(),
    })
}

/// Immediate phase: echo the pointer into the session and decide the locked
/// axis once the cumulative offset clears the threshold. The decision is
/// held for the rest of the gesture even if the dominant direction later
/// changes.
pub fn update(session: &mut DragSession, pointer: Point) {
    session.current = pointer;
    if session.axis_lock_requested && session.locked_axis.is_none() {
        let raw = session.current - session.start;
        if raw.hypot() > AXIS_LOCK_THRESHOLD {
            session.locked_axis = Some(Axis::dominant(raw));
        }
    }
}

/// Deferred phase, run at most once per rendered frame: recompute the moving
/// shapes' feature points at their current offset, find the best snap match
/// among all *other* visible shapes plus the grid, and refresh the alignment
/// guides. The magnetic correction lands in `session.magnet`.
pub fn refresh_snap(
    session: &mut DragSession,
    doc: &Document,
    config: &SnapConfig,
    grid_size: f64,
) {
    let offset = session.offset();

    let others: Vec<&Shape> = doc
        .visible_shapes()
        .filter(|s| !session.shape_ids.contains(&s.id))
        .collect();
    let include_intersections = config.active_kinds.contains(&SnapKind::Intersection);
    let index = SpatialSnapIndex::build(others.clone(), include_intersections);

    let mut features = Vec::new();
    let mut moving_bounds: Option<kurbo::Rect> = None;
    for &id in &session.shape_ids {
        let Some(shape) = doc.get(id) else {
            continue;
        };
        let Some(original) = session.original_points.get(&id) else {
            continue;
        };
        let mut moved = shape.clone();
        moved.points = original.iter().map(|p| *p + offset).collect();
        features.extend(moved.feature_points());
        let b = moved.bounds();
        moving_bounds = Some(match moving_bounds {
            Some(acc) => acc.union(b),
            None => b,
        });
    }

    session.magnet = snap::best_snap(&features, &index, config, grid_size)
        .map(|m| m.correction())
        .unwrap_or(Vec2::ZERO);

    session.alignment = match (session.shape_ids.first(), moving_bounds) {
        (Some(&id), Some(bounds)) => {
            let other_bounds: Vec<(ShapeId, kurbo::Rect)> =
                others.iter().map(|s| (s.id, s.bounds())).collect();
            snap::detect_alignment((id, bounds), &other_bounds, snap::ALIGNMENT_THRESHOLD)
        }
        _ => AlignmentReport::default(),
    };
}

/// Live point list for one shape, for preview rendering.
pub fn preview_points(session: &DragSession, id: ShapeId) -> Option<Vec<Point>> {
    let offset = session.total_offset();
    session
        .original_points
        .get(&id)
        .map(|pts| pts.iter().map(|p| *p + offset).collect())
}

/// Apply the final offset (including the magnetic correction) to every
/// shape's original point set and rotation center. Returns the mutated ids.
pub fn commit(session: &DragSession, doc: &mut Document) -> Vec<ShapeId> {
    let offset = session.total_offset();
    let mut moved = Vec::new();
    for &id in &session.shape_ids {
        let Some(shape) = doc.get_mut(id) else {
            continue;
        };
        let Some(original) = session.original_points.get(&id) else {
            continue;
        };
        shape.points = original.iter().map(|p| *p + offset).collect();
        if let Some(mut rotation) = session.original_rotations.get(&id).copied().flatten() {
            rotation.center += offset;
            shape.rotation = Some(rotation);
        }
        shape.touch();
        moved.push(id);
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Rotation;

    fn doc_with_rect() -> (Document, ShapeId) {
        let mut doc = Document::new();
        let layer = doc.active_layer;
        let id = doc.add(Shape::rectangle(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            layer,
        ));
        (doc, id)
    }

    #[test]
    fn test_locked_shape_never_moves() {
        let (mut doc, id) = doc_with_rect();
        doc.set_locked(id, true);
        assert!(begin(&doc, id, Point::ZERO, false).is_none());
    }

    #[test]
    fn test_drag_commit_applies_offset() {
        let (mut doc, id) = doc_with_rect();
        let mut session = begin(&doc, id, Point::ZERO, false).expect("session");
        update(&mut session, Point::new(5.0, 7.0));
        commit(&session, &mut doc);

        let shape = doc.get(id).expect("shape");
        assert!((shape.points[0] - Point::new(5.0, 7.0)).hypot() < 1e-9);
        assert!((shape.points[1] - Point::new(15.0, 17.0)).hypot() < 1e-9);
    }

    #[test]
    fn test_drag_moves_rotation_center() {
        let (mut doc, id) = doc_with_rect();
        doc.get_mut(id).expect("shape").rotation = Some(Rotation {
            angle: 1.0,
            center: Point::new(5.0, 5.0),
        });
        let mut session = begin(&doc, id, Point::ZERO, false).expect("session");
        update(&mut session, Point::new(10.0, 0.0));
        commit(&session, &mut doc);

        let rotation = doc.get(id).expect("shape").rotation.expect("kept");
        assert!((rotation.center - Point::new(15.0, 5.0)).hypot() < 1e-9);
        assert!((rotation.angle - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_axis_lock_decided_once() {
        let (doc, id) = doc_with_rect();
        let mut session = begin(&doc, id, Point::ZERO, true).expect("session");

        // Below threshold: no decision yet.
        update(&mut session, Point::new(3.0, 1.0));
        assert!(session.locked_axis.is_none());

        // Crosses threshold horizontally.
        update(&mut session, Point::new(6.0, 1.0));
        assert_eq!(session.locked_axis, Some(Axis::Horizontal));

        // Later movement more vertical than horizontal: axis is held.
        update(&mut session, Point::new(7.0, 40.0));
        assert_eq!(session.locked_axis, Some(Axis::Horizontal));
        let offset = session.offset();
        assert!((offset.y - 0.0).abs() < f64::EPSILON);
        assert!((offset.x - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_axis_lock_zeroes_y_on_commit() {
        let (mut doc, id) = doc_with_rect();
        let mut session = begin(&doc, id, Point::ZERO, true).expect("session");
        update(&mut session, Point::new(20.0, 2.0));
        update(&mut session, Point::new(30.0, 12.0));
        commit(&session, &mut doc);

        let shape = doc.get(id).expect("shape");
        assert!((shape.points[0].y - 0.0).abs() < f64::EPSILON);
        assert!((shape.points[0].x - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_magnetic_correction_applied() {
        let (mut doc, id) = doc_with_rect();
        let layer = doc.active_layer;
        // Target rectangle whose left edge sits at x = 52.
        doc.add(Shape::rectangle(
            Point::new(52.0, 0.0),
            Point::new(80.0, 10.0),
            layer,
        ));

        let config = SnapConfig {
            active_kinds: [SnapKind::Endpoint].into_iter().collect(),
            ..SnapConfig::default()
        };
        let mut session = begin(&doc, id, Point::ZERO, false).expect("session");
        // Drag right so our right edge (x=10 originally) lands at x=49,
        // 3 units short of the target corner at x=52.
        update(&mut session, Point::new(39.0, 0.0));
        refresh_snap(&mut session, &doc, &config, snap::DEFAULT_GRID_SIZE);
        assert!((session.magnet - Vec2::new(3.0, 0.0)).hypot() < 1e-9);

        commit(&session, &mut doc);
        let shape = doc.get(id).expect("shape");
        assert!((shape.points[1].x - 52.0).abs() < 1e-9);
    }

    #[test]
    fn test_group_drag_moves_all_members() {
        let mut doc = Document::new();
        let layer = doc.active_layer;
        let a = doc.add(Shape::rectangle(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            layer,
        ));
        let b = doc.add(Shape::rectangle(
            Point::new(20.0, 0.0),
            Point::new(30.0, 10.0),
            layer,
        ));
        doc.set_selection(vec![a, b]);
        doc.group_selected().expect("grouped");
        doc.select(a);

        let mut session = begin(&doc, a, Point::ZERO, false).expect("session");
        assert_eq!(session.shape_ids.len(), 2);
        update(&mut session, Point::new(5.0, 5.0));
        commit(&session, &mut doc);

        assert!((doc.get(b).expect("b").points[0] - Point::new(25.0, 5.0)).hypot() < 1e-9);
    }

    #[test]
    fn test_cancel_leaves_shapes_untouched() {
        let (mut doc, id) = doc_with_rect();
        let mut session = begin(&doc, id, Point::ZERO, false).expect("session");
        update(&mut session, Point::new(50.0, 50.0));
        drop(session);

        let shape = doc.get_mut(id).expect("shape");
        assert!((shape.points[0] - Point::new(0.0, 0.0)).hypot() < 1e-9);
    }
}
