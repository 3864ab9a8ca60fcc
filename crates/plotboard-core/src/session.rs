//! Active transform session state.
//!
//! One session at a time, tagged by kind. The session holds the live
//! coordinate overlay; the committed shape is only touched on explicit
//! commit.

use crate::geometry::Axis;
use crate::shape::{Rotation, ShapeId, ShapeKind};
use crate::snap::AlignmentReport;
use kurbo::{Point, Vec2};
use std::collections::HashMap;

/// Offset magnitude at which an axis-locked drag decides its axis.
pub const AXIS_LOCK_THRESHOLD: f64 = 5.0;

/// Which resize handle is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    /// Corner index into the shape's bounds corners
    /// (0 = top-left, 1 = top-right, 2 = bottom-right, 3 = bottom-left).
    Corner(usize),
    /// Edge index (0 = top, 1 = right, 2 = bottom, 3 = left).
    Edge(usize),
}

/// State of an active drag gesture.
#[derive(Debug, Clone)]
pub struct DragSession {
    /// Shapes being moved; locked shapes are never recorded here.
    pub shape_ids: Vec<ShapeId>,
    pub start: Point,
    pub current: Point,
    /// Original point list per shape, captured at gesture start.
    pub original_points: HashMap<ShapeId, Vec<Point>>,
    /// Original rotation metadata per shape.
    pub original_rotations: HashMap<ShapeId, Option<Rotation>>,
    /// Whether the constraint key is held for this gesture.
    pub axis_lock_requested: bool,
    /// Decided once per gesture, then held (rubber-band behavior).
    pub locked_axis: Option<Axis>,
    /// Magnetic correction from the deferred snap phase.
    pub magnet: Vec2,
    /// Guides/spacing recomputed by the deferred phase, display only.
    pub alignment: AlignmentReport,
}

impl DragSession {
    /// Raw offset with the axis-lock constraint applied.
    pub fn offset(&self) -> Vec2 {
        let raw = self.current - self.start;
        match self.locked_axis {
            Some(axis) => axis.project(raw),
            None => raw,
        }
    }

    /// Final offset including the magnetic correction.
    pub fn total_offset(&self) -> Vec2 {
        self.offset() + self.magnet
    }
}

/// State of an active handle resize.
#[derive(Debug, Clone)]
pub struct ResizeSession {
    pub shape_id: ShapeId,
    pub kind: ShapeKind,
    pub handle: ResizeHandle,
    /// Points at gesture start; never mutated.
    pub original_points: Vec<Point>,
    /// Live preview buffer, merged into the shape only on commit.
    pub live_points: Vec<Point>,
}

/// State of an active rotate gesture.
#[derive(Debug, Clone)]
pub struct RotateSession {
    /// Unlocked targets, captured at entry.
    pub shape_ids: Vec<ShapeId>,
    pub pivot: Point,
    /// Pointer angle at gesture start.
    pub start_angle: f64,
    /// Live delta relative to `start_angle`; session-visible only.
    pub live_delta: f64,
    /// Rotation metadata per shape as it was before the gesture,
    /// so a cancel restores it exactly.
    pub original_rotations: HashMap<ShapeId, Option<Rotation>>,
}

/// The one active session, tagged by kind.
#[derive(Debug, Clone)]
pub enum TransformSession {
    Drag(DragSession),
    Resize(ResizeSession),
    Rotate(RotateSession),
    /// Vertex-edit placeholder; exists so mode teardown covers it.
    Edit { shape_id: ShapeId },
}

impl TransformSession {
    /// Shapes whose cached geometry a teardown must invalidate.
    pub fn affected_shapes(&self) -> Vec<ShapeId> {
        match self {
            TransformSession::Drag(s) => s.shape_ids.clone(),
            TransformSession::Resize(s) => vec![s.shape_id],
            TransformSession::Rotate(s) => s.shape_ids.clone(),
            TransformSession::Edit { shape_id } => vec![*shape_id],
        }
    }
}
