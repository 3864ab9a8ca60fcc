//! Snapshot-based undo/redo with post-restore integrity repair.

use crate::config::ToolConfig;
use crate::document::Layer;
use crate::shape::{LayerId, Shape, ShapeId};
use serde::{Deserialize, Serialize};

/// Maximum number of undo entries kept.
const MAX_HISTORY: usize = 50;

/// A full structural copy of editable state: shapes (in z-order),
/// selection, layers, and tool configuration. Transient session, hover,
/// and drag state is never captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub shapes: Vec<Shape>,
    pub selection: Vec<ShapeId>,
    pub layers: Vec<Layer>,
    pub active_layer: LayerId,
    pub tool_config: ToolConfig,
}

/// Undo/redo stack. `past` and `future` hold serialized snapshots;
/// `present` is the live one. Undo and redo only move the pointer, never
/// mutate shape state beyond what the snapshot encodes.
#[derive(Debug)]
pub struct HistoryStack {
    past: Vec<String>,
    present: Snapshot,
    present_repr: String,
    future: Vec<String>,
}

impl HistoryStack {
    /// Create the stack with its initial snapshot. Done once at editor
    /// start.
    pub fn new(initial: Snapshot) -> Result<Self, crate::error::EditorError> {
        let present_repr = serde_json::to_string(&initial)?;
        Ok(Self {
            past: Vec::new(),
            present: initial,
            present_repr,
            future: Vec::new(),
        })
    }

    pub fn present(&self) -> &Snapshot {
        &self.present
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.past.len()
    }

    /// Record `current` as the new present. Idempotent: when the serialized
    /// form matches the present snapshot, no entry is pushed and `false` is
    /// returned.
    pub fn save(&mut self, current: Snapshot) -> Result<bool, crate::error::EditorError> {
        let repr = serde_json::to_string(&current)?;
        if repr == self.present_repr {
            return Ok(false);
        }
        self.past
            .push(std::mem::replace(&mut self.present_repr, repr));
        self.present = current;
        self.future.clear();
        if self.past.len() > MAX_HISTORY {
            self.past.remove(0);
        }
        Ok(true)
    }

    /// Step back one snapshot. Restored shapes go through the integrity
    /// repair pass, and UI-preference fields keep their pre-undo values so
    /// undo affects shape/selection state but not transient UI toggles.
    /// A snapshot that fails to parse aborts the call, stack unchanged.
    pub fn undo(&mut self) -> Option<Snapshot> {
        let encoded = self.past.last()?;
        let mut restored: Snapshot = match serde_json::from_str(encoded) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::warn!("undo aborted: snapshot failed to parse: {err}");
                return None;
            }
        };
        repair_integrity(&mut restored.shapes);
        restored.tool_config = self.present.tool_config.clone();
        let repr = match serde_json::to_string(&restored) {
            Ok(repr) => repr,
            Err(err) => {
                log::warn!("undo aborted: repaired snapshot failed to serialize: {err}");
                return None;
            }
        };

        self.past.pop();
        self.future
            .push(std::mem::replace(&mut self.present_repr, repr));
        self.present = restored.clone();
        Some(restored)
    }

    /// Step forward one snapshot. Mirror image of [`HistoryStack::undo`].
    pub fn redo(&mut self) -> Option<Snapshot> {
        let encoded = self.future.last()?;
        let mut restored: Snapshot = match serde_json::from_str(encoded) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::warn!("redo aborted: snapshot failed to parse: {err}");
                return None;
            }
        };
        repair_integrity(&mut restored.shapes);
        restored.tool_config = self.present.tool_config.clone();
        let repr = match serde_json::to_string(&restored) {
            Ok(repr) => repr,
            Err(err) => {
                log::warn!("redo aborted: repaired snapshot failed to serialize: {err}");
                return None;
            }
        };

        self.future.pop();
        self.past
            .push(std::mem::replace(&mut self.present_repr, repr));
        self.present = restored.clone();
        Some(restored)
    }

    #[cfg(test)]
    fn corrupt_top_of_past(&mut self) {
        if let Some(top) = self.past.last_mut() {
            *top = "{not json".to_string();
        }
    }
}

/// Structural repair over restored shapes. Rectangles stay in whichever
/// 2-point or 4-point encoding they were serialized in (the encodings are
/// never interchanged post hoc); polygons and polylines pass through
/// unmodified. Shapes whose point count is impossible for their kind are
/// dropped.
pub fn repair_integrity(shapes: &mut Vec<Shape>) {
    shapes.retain(|shape| {
        let valid = shape.structurally_valid();
        if !valid {
            log::warn!(
                "dropping shape {} after restore: {:?} with {} points",
                shape.id,
                shape.kind,
                shape.points.len()
            );
        }
        valid
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::EditorMode;
    use crate::shape::ShapeKind;
    use kurbo::Point;
    use uuid::Uuid;

    fn snapshot_with(shapes: Vec<Shape>) -> Snapshot {
        let layer = Layer::new("Layer 1");
        Snapshot {
            shapes,
            selection: Vec::new(),
            active_layer: layer.id,
            layers: vec![layer],
            tool_config: ToolConfig::default(),
        }
    }

    fn rect(layer: LayerId) -> Shape {
        Shape::rectangle(Point::new(0.0, 0.0), Point::new(10.0, 10.0), layer)
    }

    #[test]
    fn test_save_is_idempotent() {
        let initial = snapshot_with(Vec::new());
        let mut history = HistoryStack::new(initial.clone()).expect("stack");

        assert!(!history.save(initial.clone()).expect("no-op save"));
        assert!(!history.save(initial).expect("still a no-op"));
        assert_eq!(history.depth(), 0);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_save_pushes_on_change() {
        let initial = snapshot_with(Vec::new());
        let mut history = HistoryStack::new(initial.clone()).expect("stack");

        let mut changed = initial;
        changed.shapes.push(rect(changed.active_layer));
        assert!(history.save(changed).expect("pushed"));
        assert_eq!(history.depth(), 1);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let initial = snapshot_with(Vec::new());
        let mut history = HistoryStack::new(initial.clone()).expect("stack");

        let mut changed = initial.clone();
        changed.shapes.push(rect(changed.active_layer));
        history.save(changed.clone()).expect("pushed");

        let undone = history.undo().expect("undo");
        assert!(undone.shapes.is_empty());
        assert!(history.can_redo());

        let redone = history.redo().expect("redo");
        assert_eq!(redone.shapes, changed.shapes);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_save_clears_future() {
        let initial = snapshot_with(Vec::new());
        let mut history = HistoryStack::new(initial.clone()).expect("stack");

        let mut first = initial.clone();
        first.shapes.push(rect(first.active_layer));
        history.save(first).expect("pushed");
        history.undo().expect("undo");
        assert!(history.can_redo());

        let mut second = initial;
        second.shapes.push(rect(second.active_layer));
        history.save(second).expect("pushed");
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut history = HistoryStack::new(snapshot_with(Vec::new())).expect("stack");
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_undo_preserves_ui_preferences() {
        let initial = snapshot_with(Vec::new());
        let mut history = HistoryStack::new(initial.clone()).expect("stack");

        // A commit that also changed the active tool and grid size.
        let mut changed = initial;
        changed.shapes.push(rect(changed.active_layer));
        changed.tool_config.active_tool = EditorMode::LineDraw;
        changed.tool_config.grid_size = 40.0;
        history.save(changed.clone()).expect("pushed");

        let undone = history.undo().expect("undo");
        // Shapes roll back; the current UI preferences do not.
        assert!(undone.shapes.is_empty());
        assert_eq!(undone.tool_config.active_tool, EditorMode::LineDraw);
        assert!((undone.tool_config.grid_size - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_corrupt_snapshot_aborts_undo() {
        let initial = snapshot_with(Vec::new());
        let mut history = HistoryStack::new(initial.clone()).expect("stack");
        let mut changed = initial;
        changed.shapes.push(rect(changed.active_layer));
        history.save(changed.clone()).expect("pushed");

        history.corrupt_top_of_past();
        assert!(history.undo().is_none());
        // Stack unchanged: still one (corrupt) entry, present untouched.
        assert_eq!(history.depth(), 1);
        assert_eq!(history.present().shapes, changed.shapes);
    }

    #[test]
    fn test_repair_keeps_both_rectangle_encodings() {
        let layer = Uuid::new_v4();
        let two_point = rect(layer);
        let mut four_point = rect(layer);
        four_point.points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let mut shapes = vec![two_point.clone(), four_point.clone()];
        repair_integrity(&mut shapes);

        assert_eq!(shapes[0].points.len(), 2);
        assert_eq!(shapes[1].points.len(), 4);
        assert_eq!(shapes[0].points, two_point.points);
        assert_eq!(shapes[1].points, four_point.points);
    }

    #[test]
    fn test_repair_drops_impossible_shapes() {
        let layer = Uuid::new_v4();
        let mut three_point_rect = rect(layer);
        three_point_rect.points.push(Point::new(5.0, 5.0));
        let mut one_point_line = Shape::line(Point::ZERO, Point::new(1.0, 1.0), layer);
        one_point_line.points.pop();

        let mut shapes = vec![rect(layer), three_point_rect, one_point_line];
        repair_integrity(&mut shapes);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].kind, ShapeKind::Rectangle);
    }

    #[test]
    fn test_history_depth_capped() {
        let initial = snapshot_with(Vec::new());
        let mut history = HistoryStack::new(initial.clone()).expect("stack");

        for i in 0..(MAX_HISTORY + 10) {
            let mut changed = initial.clone();
            let mut shape = rect(changed.active_layer);
            shape.points[1] = Point::new(10.0 + i as f64, 10.0);
            changed.shapes.push(shape);
            history.save(changed).expect("pushed");
        }
        assert_eq!(history.depth(), MAX_HISTORY);
    }
}
