//! Interaction mode state machine.
//!
//! Owns the current mode and the one active transform session, and enforces
//! legal transitions. Illegal entries are routine UI races and degrade to
//! silent no-ops.

use crate::session::TransformSession;
use serde::{Deserialize, Serialize};

/// The editor's interaction modes. `Select` is the steady state reached
/// after every gesture commits or cancels; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EditorMode {
    #[default]
    Select,
    Edit,
    Resize,
    Rotate,
    Measure,
    LineDraw,
}

impl EditorMode {
    /// Whether this mode hosts a drawing/measuring tool rather than
    /// selection-based manipulation.
    pub fn is_tool(self) -> bool {
        matches!(self, EditorMode::Measure | EditorMode::LineDraw)
    }
}

/// Facts the machine needs to guard an entry. Collected by the caller,
/// which owns the document.
#[derive(Debug, Clone, Copy)]
pub struct TransitionFacts {
    /// True if the gesture target (or any of them) is locked.
    pub target_locked: bool,
    /// Number of shapes in the current selection.
    pub selection_size: usize,
}

/// Mode machine plus the single active session.
#[derive(Debug, Default)]
pub struct ModeMachine {
    mode: EditorMode,
    session: Option<TransformSession>,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn session(&self) -> Option<&TransformSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut TransformSession> {
        self.session.as_mut()
    }

    /// Try to begin a gesture. Returns `false` (and changes nothing) when
    /// the transition is illegal: a session is already active, the machine
    /// is not in `Select`, the target is locked, or a per-shape resize is
    /// attempted on a multi-selection (multi-resize goes through the
    /// bounding-box engine instead).
    pub fn try_begin(&mut self, session: TransformSession, facts: TransitionFacts) -> bool {
        if self.session.is_some() || self.mode != EditorMode::Select {
            log::debug!("gesture rejected: machine busy in {:?}", self.mode);
            return false;
        }
        let next_mode = match &session {
            TransformSession::Drag(_) => EditorMode::Select,
            TransformSession::Resize(_) => {
                if facts.target_locked || facts.selection_size > 1 {
                    log::debug!("resize rejected: locked or multi-selection");
                    return false;
                }
                EditorMode::Resize
            }
            TransformSession::Rotate(_) => {
                if facts.target_locked {
                    log::debug!("rotate rejected: locked target");
                    return false;
                }
                EditorMode::Rotate
            }
            TransformSession::Edit { .. } => EditorMode::Edit,
        };
        self.mode = next_mode;
        self.session = Some(session);
        true
    }

    /// End the active gesture and return to `Select`. Returns the session
    /// for the caller to commit or drop.
    pub fn end_gesture(&mut self) -> Option<TransformSession> {
        self.mode = EditorMode::Select;
        self.session.take()
    }

    /// Switch to a tool mode (or back to `Select`). Any live session is
    /// torn down and returned so the caller can invalidate cached geometry
    /// for the shapes it touched; leaving a mid-resize buffer behind would
    /// produce a ghost shape.
    pub fn set_tool(&mut self, mode: EditorMode) -> Option<TransformSession> {
        let torn_down = self.session.take();
        if torn_down.is_some() {
            log::debug!("tool change to {:?} tears down live session", mode);
        }
        self.mode = mode;
        torn_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{DragSession, ResizeHandle, ResizeSession};
    use crate::snap::AlignmentReport;
    use kurbo::{Point, Vec2};
    use std::collections::HashMap;
    use uuid::Uuid;

    fn drag() -> TransformSession {
        TransformSession::Drag(DragSession {
            shape_ids: vec![Uuid::new_v4()],
            start: Point::ZERO,
            current: Point::ZERO,
            original_points: HashMap::new(),
            original_rotations: HashMap::new(),
            axis_lock_requested: false,
            locked_axis: None,
            magnet: Vec2::ZERO,
            alignment: AlignmentReport::default(),
        })
    }

    fn resize(id: Uuid) -> TransformSession {
        TransformSession::Resize(ResizeSession {
            shape_id: id,
            kind: crate::shape::ShapeKind::Rectangle,
            handle: ResizeHandle::Corner(2),
            original_points: vec![Point::ZERO, Point::new(10.0, 10.0)],
            live_points: vec![Point::ZERO, Point::new(10.0, 10.0)],
        })
    }

    fn facts() -> TransitionFacts {
        TransitionFacts {
            target_locked: false,
            selection_size: 1,
        }
    }

    #[test]
    fn test_resize_entry_from_select() {
        let mut machine = ModeMachine::new();
        assert!(machine.try_begin(resize(Uuid::new_v4()), facts()));
        assert_eq!(machine.mode(), EditorMode::Resize);
        assert!(machine.session().is_some());
    }

    #[test]
    fn test_resize_rejected_on_locked_target() {
        let mut machine = ModeMachine::new();
        let rejected = machine.try_begin(
            resize(Uuid::new_v4()),
            TransitionFacts {
                target_locked: true,
                selection_size: 1,
            },
        );
        assert!(!rejected);
        assert_eq!(machine.mode(), EditorMode::Select);
        assert!(machine.session().is_none());
    }

    #[test]
    fn test_resize_rejected_on_multi_selection() {
        let mut machine = ModeMachine::new();
        let rejected = machine.try_begin(
            resize(Uuid::new_v4()),
            TransitionFacts {
                target_locked: false,
                selection_size: 3,
            },
        );
        assert!(!rejected);
        assert_eq!(machine.mode(), EditorMode::Select);
    }

    #[test]
    fn test_drag_keeps_select_mode() {
        let mut machine = ModeMachine::new();
        assert!(machine.try_begin(drag(), facts()));
        assert_eq!(machine.mode(), EditorMode::Select);
    }

    #[test]
    fn test_second_gesture_rejected() {
        let mut machine = ModeMachine::new();
        assert!(machine.try_begin(drag(), facts()));
        assert!(!machine.try_begin(drag(), facts()));
    }

    #[test]
    fn test_end_gesture_returns_to_select() {
        let mut machine = ModeMachine::new();
        machine.try_begin(resize(Uuid::new_v4()), facts());
        let session = machine.end_gesture();
        assert!(session.is_some());
        assert_eq!(machine.mode(), EditorMode::Select);
        assert!(machine.session().is_none());
    }

    #[test]
    fn test_tool_change_tears_down_session() {
        let mut machine = ModeMachine::new();
        let id = Uuid::new_v4();
        machine.try_begin(resize(id), facts());

        let torn_down = machine.set_tool(EditorMode::LineDraw);
        assert_eq!(machine.mode(), EditorMode::LineDraw);
        let torn_down = torn_down.expect("live session returned");
        assert_eq!(torn_down.affected_shapes(), vec![id]);
        assert!(machine.session().is_none());
    }

    #[test]
    fn test_no_gesture_from_tool_mode() {
        let mut machine = ModeMachine::new();
        machine.set_tool(EditorMode::Measure);
        assert!(!machine.try_begin(drag(), facts()));
    }
}
