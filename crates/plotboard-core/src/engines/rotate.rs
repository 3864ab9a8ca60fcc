//! Rotate engine for single shapes and multi-selections/groups.
//!
//! Rotation lives in the shape's metadata; point lists stay unrotated.

use crate::document::Document;
use crate::geometry::rotate_point;
use crate::session::RotateSession;
use crate::shape::{Rotation, Shape, ShapeId};
use kurbo::Point;
use std::collections::HashMap;

/// Begin a rotate gesture around `pivot`. Captures every target's current
/// rotation before any mutation so a cancel restores it exactly. Locked
/// shapes are filtered out; returns `None` when nothing rotatable remains.
pub fn begin(
    doc: &Document,
    ids: &[ShapeId],
    pivot: Point,
    start_angle: f64,
) -> Option<RotateSession> {
    let targets: Vec<ShapeId> = ids
        .iter()
        .filter(|id| doc.get(**id).map(|s| !s.locked).unwrap_or(false))
        .copied()
        .collect();
    if targets.is_empty() {
        return None;
    }
    let mut original_rotations = HashMap::new();
    for &id in &targets {
        original_rotations.insert(id, doc.get(id).and_then(|s| s.rotation));
    }
    Some(RotateSession {
        shape_ids: targets,
        pivot,
        start_angle,
        live_delta: 0.0,
        original_rotations,
    })
}

/// Live update: store the delta relative to the gesture's start angle.
/// Mutates only session-visible state; the document is untouched until
/// commit.
pub fn update_live(session: &mut RotateSession, pointer_angle: f64) {
    if pointer_angle.is_finite() {
        session.live_delta = pointer_angle - session.start_angle;
    }
}

/// Rotation a preview renderer should apply to `shape` for the current
/// frame.
pub fn live_rotation(session: &RotateSession, shape: &Shape) -> Rotation {
    let original = session
        .original_rotations
        .get(&shape.id)
        .copied()
        .flatten();
    match original {
        Some(r) => Rotation {
            angle: r.angle + session.live_delta,
            center: r.center,
        },
        None => Rotation {
            angle: session.live_delta,
            center: shape.centroid(),
        },
    }
}

/// Authoritative commit, called once on gesture end.
///
/// Single shape: the rotation angle advances by the delta around the
/// existing center (or the centroid if the shape was unrotated). Multiple
/// shapes rotate as a rigid body: each member's centroid is rotated around
/// the group pivot, the member translated by the resulting offset, and its
/// own rotation metadata updated by the same delta with the rotated
/// centroid as its new center. Returns the mutated ids.
pub fn commit(session: &RotateSession, doc: &mut Document) -> Vec<ShapeId> {
    let delta = session.live_delta;
    let mut rotated = Vec::new();

    if session.shape_ids.len() == 1 {
        let id = session.shape_ids[0];
        if let Some(shape) = doc.get_mut(id) {
            let original = session.original_rotations.get(&id).copied().flatten();
            let (angle, center) = match original {
                Some(r) => (r.angle + delta, r.center),
                None => (delta, shape.centroid()),
            };
            shape.rotation = Some(Rotation { angle, center });
            shape.touch();
            rotated.push(id);
        }
        return rotated;
    }

    for &id in &session.shape_ids {
        let Some(shape) = doc.get_mut(id) else {
            continue;
        };
        let centroid = shape.centroid();
        let moved_centroid = rotate_point(centroid, session.pivot, delta);
        shape.translate(moved_centroid - centroid);

        let original = session.original_rotations.get(&id).copied().flatten();
        let angle = original.map(|r| r.angle).unwrap_or(0.0) + delta;
        shape.rotation = Some(Rotation {
            angle,
            center: moved_centroid,
        });
        shape.touch();
        rotated.push(id);
    }
    rotated
}

/// Restore every target's rotation to what it was at gesture entry.
pub fn cancel(session: &RotateSession, doc: &mut Document) {
    for (&id, &original) in &session.original_rotations {
        if let Some(shape) = doc.get_mut(id) {
            shape.rotation = original;
        }
    }
}
