//! Editor facade: wires input to the mode machine, engines, detector,
//! document, and history.
//!
//! Control flow per gesture: input arrives, the mode machine dispatches to
//! an engine, the engine queries the snap detector, the mutation commits
//! through the document, and the history manager snapshots the result.

use crate::boolean::{BooleanOpKind, BooleanOps};
use crate::cache::{GeometryCache, NullCache};
use crate::config::{active_kinds_for, ToolConfig};
use crate::document::Document;
use crate::engines::{drag, resize, rotate};
use crate::error::EditorError;
use crate::history::{HistoryStack, Snapshot};
use crate::mode::{EditorMode, ModeMachine, TransitionFacts};
use crate::scheduler::FrameScheduler;
use crate::session::{ResizeHandle, TransformSession};
use crate::shape::{Rotation, Shape, ShapeId};
use crate::snap::AlignmentReport;
use kurbo::{Point, Rect};

pub struct Editor {
    pub document: Document,
    pub config: ToolConfig,
    machine: ModeMachine,
    history: HistoryStack,
    scheduler: FrameScheduler,
    cache: Box<dyn GeometryCache>,
}

impl Editor {
    /// Create an editor with an empty document and its initial history
    /// snapshot.
    pub fn new() -> Result<Self, EditorError> {
        Self::with_cache(Box::new(NullCache))
    }

    /// Create an editor wired to an external geometry cache.
    pub fn with_cache(cache: Box<dyn GeometryCache>) -> Result<Self, EditorError> {
        let document = Document::new();
        let config = ToolConfig::default();
        let history = HistoryStack::new(make_snapshot(&document, &config))?;
        Ok(Self {
            document,
            config,
            machine: ModeMachine::new(),
            history,
            scheduler: FrameScheduler::new(),
            cache,
        })
    }

    pub fn mode(&self) -> EditorMode {
        self.machine.mode()
    }

    // --- tool/mode transitions -----------------------------------------

    /// Switch tools. Any live gesture is torn down and its shapes'
    /// cached geometry invalidated so no ghost preview survives the
    /// transition. Snap kinds follow the tool.
    pub fn set_mode(&mut self, mode: EditorMode) {
        if let Some(session) = self.machine.set_tool(mode) {
            if let TransformSession::Rotate(rotate_session) = &session {
                rotate::cancel(rotate_session, &mut self.document);
            }
            for id in session.affected_shapes() {
                self.cache.invalidate(id);
            }
        }
        self.config.active_tool = mode;
        self.config.snap.active_kinds = active_kinds_for(mode);
    }

    // --- drag -----------------------------------------------------------

    /// Begin dragging. Moves the whole selection when `shape_id` is part
    /// of it, otherwise just the shape. Returns `false` on an illegal
    /// entry (busy machine, locked target).
    pub fn begin_drag(&mut self, shape_id: ShapeId, pointer: Point, axis_lock: bool) -> bool {
        let Some(session) = drag::begin(&self.document, shape_id, pointer, axis_lock) else {
            return false;
        };
        let facts = TransitionFacts {
            target_locked: false,
            selection_size: self.document.selection().len(),
        };
        self.machine
            .try_begin(TransformSession::Drag(session), facts)
    }

    /// Alt-drag: duplicate the selection (fresh ids, re-mapped group tags)
    /// and start dragging the copies, leaving the originals in place.
    pub fn begin_drag_duplicate(&mut self, pointer: Point, axis_lock: bool) -> bool {
        if self.machine.mode() != EditorMode::Select || self.machine.session().is_some() {
            return false;
        }
        let copies = self.document.duplicate_selection();
        let Some(&first) = copies.first() else {
            return false;
        };
        self.document.set_selection(copies.clone());
        for id in &copies {
            self.cache.invalidate(*id);
        }
        self.begin_drag(first, pointer, axis_lock)
    }

    /// Immediate phase of a pointer-move: unconstrained-feel position
    /// update plus a deferred-work request for the next frame.
    pub fn update_drag(&mut self, pointer: Point) {
        let Some(TransformSession::Drag(session)) = self.machine.session_mut() else {
            return;
        };
        drag::update(session, pointer);
        if let Some(&token) = session.shape_ids.first() {
            self.scheduler.request(token);
        }
    }

    /// Frame tick: run the deferred snap/alignment recomputation at most
    /// once, and only if the request still belongs to the active gesture.
    pub fn run_frame(&mut self) {
        let active = match self.machine.session() {
            Some(TransformSession::Drag(session)) => session.shape_ids.first().copied(),
            _ => None,
        };
        if !self.scheduler.take_if_current(active) {
            return;
        }
        let Some(TransformSession::Drag(session)) = self.machine.session_mut() else {
            return;
        };
        drag::refresh_snap(
            session,
            &self.document,
            &self.config.snap,
            self.config.grid_size,
        );
        let moving = session.shape_ids.clone();
        for id in moving {
            self.cache.invalidate(id);
        }
    }

    /// Commit the drag: apply the final offset (with magnetic correction)
    /// and record exactly one history entry.
    pub fn finish_drag(&mut self) -> Result<bool, EditorError> {
        if !matches!(self.machine.session(), Some(TransformSession::Drag(_))) {
            return Ok(false);
        }
        let Some(TransformSession::Drag(session)) = self.machine.end_gesture() else {
            return Ok(false);
        };
        let moved = drag::commit(&session, &mut self.document);
        for id in &moved {
            self.cache.invalidate(*id);
        }
        self.save_history()?;
        Ok(!moved.is_empty())
    }

    /// Discard the drag without touching any shape. Guides and previews
    /// disappear with the session; an in-flight deferred request is not
    /// killed, the frame guard discards it.
    pub fn cancel_drag(&mut self) {
        if !matches!(self.machine.session(), Some(TransformSession::Drag(_))) {
            return;
        }
        if let Some(session) = self.machine.end_gesture() {
            for id in session.affected_shapes() {
                self.cache.invalidate(id);
            }
        }
    }

    /// Live preview point list for a dragged shape.
    pub fn drag_preview(&self, id: ShapeId) -> Option<Vec<Point>> {
        match self.machine.session() {
            Some(TransformSession::Drag(session)) => drag::preview_points(session, id),
            _ => None,
        }
    }

    /// Alignment guides/spacing of the current drag frame, display only.
    pub fn alignment(&self) -> Option<&AlignmentReport> {
        match self.machine.session() {
            Some(TransformSession::Drag(session)) => Some(&session.alignment),
            _ => None,
        }
    }

    // --- resize ---------------------------------------------------------

    /// Begin a handle resize. Rejected (silently, as a routine UI race)
    /// for locked shapes and for multi-selections, which resize through
    /// [`Editor::scale_selection`] instead.
    pub fn begin_resize(&mut self, shape_id: ShapeId, handle: ResizeHandle) -> bool {
        let Some(shape) = self.document.get(shape_id) else {
            return false;
        };
        let facts = TransitionFacts {
            target_locked: shape.locked,
            selection_size: self.document.selection().len(),
        };
        let session = resize::begin(shape, handle);
        self.machine
            .try_begin(TransformSession::Resize(session), facts)
    }

    /// Live resize update; the document shape stays untouched.
    pub fn update_resize(&mut self, pointer: Point) {
        let Some(TransformSession::Resize(session)) = self.machine.session_mut() else {
            return;
        };
        resize::update(session, pointer);
        let id = session.shape_id;
        self.cache.invalidate(id);
    }

    /// Live preview of the resize in progress.
    pub fn resize_preview(&self) -> Option<&[Point]> {
        match self.machine.session() {
            Some(TransformSession::Resize(session)) => Some(&session.live_points),
            _ => None,
        }
    }

    /// Merge the live buffer into the shape and snapshot history once.
    pub fn finish_resize(&mut self) -> Result<bool, EditorError> {
        if !matches!(self.machine.session(), Some(TransformSession::Resize(_))) {
            return Ok(false);
        }
        let Some(TransformSession::Resize(session)) = self.machine.end_gesture() else {
            return Ok(false);
        };
        let committed = resize::commit(&session, &mut self.document);
        self.cache.invalidate(session.shape_id);
        if committed {
            self.save_history()?;
        }
        Ok(committed)
    }

    /// Drop the live buffer; the authoritative shape was never touched.
    pub fn cancel_resize(&mut self) {
        if !matches!(self.machine.session(), Some(TransformSession::Resize(_))) {
            return;
        }
        if let Some(session) = self.machine.end_gesture() {
            for id in session.affected_shapes() {
                self.cache.invalidate(id);
            }
        }
    }

    /// Multi-selection resize through the bounding-box engine.
    pub fn scale_selection(&mut self, target: Rect) -> Result<Vec<ShapeId>, EditorError> {
        let resized = resize::resize_selection(&mut self.document, target);
        for id in &resized {
            self.cache.invalidate(*id);
        }
        if !resized.is_empty() {
            self.save_history()?;
        }
        Ok(resized)
    }

    // --- rotate ---------------------------------------------------------

    /// Begin rotating the selection around `pivot` (default: the
    /// selection's combined center). Captures every member's current
    /// rotation for the cancel path.
    pub fn begin_rotate(&mut self, pivot: Option<Point>, start_angle: f64) -> bool {
        let ids = self.document.selection().to_vec();
        if ids.is_empty() {
            return false;
        }
        let pivot = pivot.or_else(|| self.document.selection_bounds().map(|b| b.center()));
        let Some(pivot) = pivot else {
            return false;
        };
        let Some(session) = rotate::begin(&self.document, &ids, pivot, start_angle) else {
            return false;
        };
        let facts = TransitionFacts {
            target_locked: false,
            selection_size: ids.len(),
        };
        self.machine
            .try_begin(TransformSession::Rotate(session), facts)
    }

    /// Live rotate: session-visible state only.
    pub fn rotate_live(&mut self, pointer_angle: f64) {
        let Some(TransformSession::Rotate(session)) = self.machine.session_mut() else {
            return;
        };
        rotate::update_live(session, pointer_angle);
        for id in session.shape_ids.clone() {
            self.cache.invalidate(id);
        }
    }

    /// Rotation a renderer should apply to `id` this frame.
    pub fn live_rotation(&self, id: ShapeId) -> Option<Rotation> {
        match (self.machine.session(), self.document.get(id)) {
            (Some(TransformSession::Rotate(session)), Some(shape))
                if session.shape_ids.contains(&id) =>
            {
                Some(rotate::live_rotation(session, shape))
            }
            _ => None,
        }
    }

    /// Authoritative rotate commit; the only rotate call that snapshots
    /// history.
    pub fn finish_rotate(&mut self) -> Result<bool, EditorError> {
        if !matches!(self.machine.session(), Some(TransformSession::Rotate(_))) {
            return Ok(false);
        }
        let Some(TransformSession::Rotate(session)) = self.machine.end_gesture() else {
            return Ok(false);
        };
        let rotated = rotate::commit(&session, &mut self.document);
        for id in &rotated {
            self.cache.invalidate(*id);
        }
        self.save_history()?;
        Ok(!rotated.is_empty())
    }

    /// Restore every member's captured rotation and drop the session.
    pub fn cancel_rotate(&mut self) {
        if !matches!(self.machine.session(), Some(TransformSession::Rotate(_))) {
            return;
        }
        if let Some(TransformSession::Rotate(session)) = self.machine.end_gesture() {
            rotate::cancel(&session, &mut self.document);
            for id in &session.shape_ids {
                self.cache.invalidate(*id);
            }
        }
    }

    /// Gesture-less cursor rotation: snapshots history immediately, so its
    /// cancel path is plain undo.
    pub fn cursor_rotate(&mut self, shape_id: ShapeId, delta: f64) -> Result<bool, EditorError> {
        if self.machine.mode() != EditorMode::Select || self.machine.session().is_some() {
            return Ok(false);
        }
        if !delta.is_finite() {
            return Err(EditorError::InvalidGeometry("non-finite rotation delta"));
        }
        let Some(shape) = self.document.get_mut(shape_id) else {
            return Ok(false);
        };
        if shape.locked {
            return Ok(false);
        }
        let center = shape
            .rotation
            .map(|r| r.center)
            .unwrap_or_else(|| shape.centroid());
        let angle = shape.rotation.map(|r| r.angle).unwrap_or(0.0) + delta;
        shape.rotation = Some(Rotation { angle, center });
        shape.touch();
        self.cache.invalidate(shape_id);
        self.save_history()?;
        Ok(true)
    }

    // --- document commits ----------------------------------------------

    /// Add a shape on the active layer and snapshot history.
    pub fn add_shape(&mut self, shape: Shape) -> Result<ShapeId, EditorError> {
        let id = self.document.add(shape);
        self.cache.invalidate(id);
        self.save_history()?;
        Ok(id)
    }

    /// Delete the selection and snapshot history.
    pub fn delete_selection(&mut self) -> Result<Vec<ShapeId>, EditorError> {
        let ids = self.document.selection().to_vec();
        for id in &ids {
            self.document.remove(*id);
            self.cache.invalidate(*id);
        }
        if !ids.is_empty() {
            self.save_history()?;
        }
        Ok(ids)
    }

    /// Group the selection under a fresh group tag.
    pub fn group_selection(&mut self) -> Result<Option<uuid::Uuid>, EditorError> {
        let group = self.document.group_selected();
        if group.is_some() {
            self.save_history()?;
        }
        Ok(group)
    }

    /// Clear group tags on the selection.
    pub fn ungroup_selection(&mut self) -> Result<Vec<ShapeId>, EditorError> {
        let ungrouped = self.document.ungroup_selected();
        if !ungrouped.is_empty() {
            self.save_history()?;
        }
        Ok(ungrouped)
    }

    /// Mirror the selection horizontally and snapshot history.
    pub fn flip_selection_horizontal(&mut self) -> Result<(), EditorError> {
        self.document.flip_selected_horizontal();
        for id in self.document.selection().to_vec() {
            self.cache.invalidate(id);
        }
        self.save_history()?;
        Ok(())
    }

    /// Mirror the selection vertically and snapshot history.
    pub fn flip_selection_vertical(&mut self) -> Result<(), EditorError> {
        self.document.flip_selected_vertical();
        for id in self.document.selection().to_vec() {
            self.cache.invalidate(id);
        }
        self.save_history()?;
        Ok(())
    }

    /// Forward immutable snapshots of the given shapes to the external
    /// boolean engine; merge a successful result set into the document.
    /// A failure leaves the document untouched.
    pub fn apply_boolean(
        &mut self,
        op: BooleanOpKind,
        ids: &[ShapeId],
        engine: &dyn BooleanOps,
    ) -> Result<Vec<ShapeId>, EditorError> {
        let inputs: Vec<Shape> = ids
            .iter()
            .filter_map(|id| self.document.get(*id).cloned())
            .collect();
        if inputs.len() != ids.len() {
            return Err(EditorError::UnknownShape);
        }
        let results = engine.apply(op, &inputs)?;

        for id in ids {
            self.document.remove(*id);
            self.cache.invalidate(*id);
        }
        let mut merged = Vec::with_capacity(results.len());
        for shape in results {
            let id = self.document.add(shape);
            self.cache.invalidate(id);
            merged.push(id);
        }
        self.document.set_selection(merged.clone());
        self.save_history()?;
        Ok(merged)
    }

    // --- history --------------------------------------------------------

    /// Snapshot the current structural state. Idempotent: no entry is
    /// pushed when nothing changed since the last snapshot.
    pub fn save_history(&mut self) -> Result<bool, EditorError> {
        self.history.save(make_snapshot(&self.document, &self.config))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo one committed mutation. Any live gesture is cancelled first;
    /// restored shapes go through the integrity repair pass and current UI
    /// preferences survive.
    pub fn undo(&mut self) -> bool {
        self.abort_gesture();
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.apply_snapshot(snapshot);
        true
    }

    /// Redo one undone mutation.
    pub fn redo(&mut self) -> bool {
        self.abort_gesture();
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.apply_snapshot(snapshot);
        true
    }

    fn abort_gesture(&mut self) {
        if let Some(session) = self.machine.end_gesture() {
            if let TransformSession::Rotate(rotate_session) = &session {
                rotate::cancel(rotate_session, &mut self.document);
            }
            for id in session.affected_shapes() {
                self.cache.invalidate(id);
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.document.replace_shapes(snapshot.shapes);
        self.document.layers = snapshot.layers;
        self.document.active_layer = snapshot.active_layer;
        self.document.set_selection(snapshot.selection);
        self.config = snapshot.tool_config;
        self.cache.invalidate_all();
    }
}

/// Build a structural snapshot of the document plus tool configuration.
/// Session, hover, and scheduler state never enter the snapshot.
fn make_snapshot(document: &Document, config: &ToolConfig) -> Snapshot {
    Snapshot {
        shapes: document.shapes_snapshot(),
        selection: document.selection().to_vec(),
        layers: document.layers.clone(),
        active_layer: document.active_layer,
        tool_config: config.clone(),
    }
}
