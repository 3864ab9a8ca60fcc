//! Document: the single authority over shapes, layers, and selection.

use crate::shape::{LayerId, Shape, ShapeId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A named layer. Shapes on hidden layers are excluded from snapping,
/// alignment, and hit-driven selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            visible: true,
        }
    }
}

/// The shape collection and its bookkeeping. All engines mutate shapes
/// through this type; nothing closes over ambient state.
#[derive(Debug, Clone)]
pub struct Document {
    shapes: HashMap<ShapeId, Shape>,
    /// Z-order, back to front.
    z_order: Vec<ShapeId>,
    pub layers: Vec<Layer>,
    pub active_layer: LayerId,
    /// Currently selected shape ids.
    selection: Vec<ShapeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with one default layer.
    pub fn new() -> Self {
        let base = Layer::new("Layer 1");
        let active = base.id;
        Self {
            shapes: HashMap::new(),
            z_order: Vec::new(),
            layers: vec![base],
            active_layer: active,
            selection: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(&id)
    }

    /// Add a shape on top of the z-order.
    pub fn add(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id;
        self.z_order.push(id);
        self.shapes.insert(id, shape);
        id
    }

    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        self.z_order.retain(|&sid| sid != id);
        self.selection.retain(|&sid| sid != id);
        self.shapes.remove(&id)
    }

    /// Shapes in z-order, back to front.
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Shapes on visible layers, in z-order.
    pub fn visible_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes_ordered()
            .filter(|s| self.layer_visible(s.layer_id))
    }

    fn layer_visible(&self, id: LayerId) -> bool {
        self.layers
            .iter()
            .find(|l| l.id == id)
            .map(|l| l.visible)
            .unwrap_or(false)
    }

    /// Replace the whole collection (history restore path).
    /// Z-order follows the given order.
    pub fn replace_shapes(&mut self, shapes: Vec<Shape>) {
        self.z_order = shapes.iter().map(|s| s.id).collect();
        self.shapes = shapes.into_iter().map(|s| (s.id, s)).collect();
        let shapes = &self.shapes;
        self.selection.retain(|id| shapes.contains_key(id));
    }

    /// Shapes in z-order as an owned list (snapshot path).
    pub fn shapes_snapshot(&self) -> Vec<Shape> {
        self.shapes_ordered().cloned().collect()
    }

    // --- z-order -------------------------------------------------------

    pub fn bring_to_front(&mut self, id: ShapeId) {
        if self.shapes.contains_key(&id) {
            self.z_order.retain(|&sid| sid != id);
            self.z_order.push(id);
        }
    }

    pub fn send_to_back(&mut self, id: ShapeId) {
        if self.shapes.contains_key(&id) {
            self.z_order.retain(|&sid| sid != id);
            self.z_order.insert(0, id);
        }
    }

    pub fn bring_forward(&mut self, id: ShapeId) -> bool {
        if let Some(pos) = self.z_order.iter().position(|&sid| sid == id) {
            if pos < self.z_order.len() - 1 {
                self.z_order.swap(pos, pos + 1);
                return true;
            }
        }
        false
    }

    pub fn send_backward(&mut self, id: ShapeId) -> bool {
        if let Some(pos) = self.z_order.iter().position(|&sid| sid == id) {
            if pos > 0 {
                self.z_order.swap(pos, pos - 1);
                return true;
            }
        }
        false
    }

    // --- selection -----------------------------------------------------

    pub fn selection(&self) -> &[ShapeId] {
        &self.selection
    }

    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.selection.contains(&id)
    }

    /// Select one shape, expanding to its whole group. Clears the previous
    /// selection.
    pub fn select(&mut self, id: ShapeId) {
        self.selection.clear();
        self.extend_selection(id);
    }

    /// Add a shape (and its group members) to the selection.
    pub fn extend_selection(&mut self, id: ShapeId) {
        let Some(shape) = self.shapes.get(&id) else {
            return;
        };
        match shape.group_id {
            Some(group) => {
                let members: Vec<ShapeId> = self
                    .z_order
                    .iter()
                    .filter(|sid| {
                        self.shapes
                            .get(sid)
                            .map(|s| s.group_id == Some(group))
                            .unwrap_or(false)
                    })
                    .copied()
                    .collect();
                for member in members {
                    if !self.selection.contains(&member) {
                        self.selection.push(member);
                    }
                }
            }
            None => {
                if !self.selection.contains(&id) {
                    self.selection.push(id);
                }
            }
        }
    }

    pub fn set_selection(&mut self, ids: Vec<ShapeId>) {
        self.selection = ids
            .into_iter()
            .filter(|id| self.shapes.contains_key(id))
            .collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn select_all(&mut self) {
        self.selection = self.z_order.clone();
    }

    /// Selected shapes that are not locked; the set every transform
    /// actually operates on.
    pub fn unlocked_selection(&self) -> Vec<ShapeId> {
        self.selection
            .iter()
            .filter(|id| {
                self.shapes
                    .get(id)
                    .map(|s| !s.locked)
                    .unwrap_or(false)
            })
            .copied()
            .collect()
    }

    /// Combined bounds of the selection.
    pub fn selection_bounds(&self) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        for id in &self.selection {
            if let Some(shape) = self.shapes.get(id) {
                let b = shape.bounds();
                bounds = Some(match bounds {
                    Some(acc) => acc.union(b),
                    None => b,
                });
            }
        }
        bounds
    }

    // --- hit testing ---------------------------------------------------

    /// Topmost visible shape at a point, front to back.
    pub fn shape_at_point(&self, point: Point, tolerance: f64) -> Option<ShapeId> {
        self.z_order
            .iter()
            .rev()
            .filter(|id| {
                self.shapes
                    .get(id)
                    .map(|s| self.layer_visible(s.layer_id) && s.hit_test(point, tolerance))
                    .unwrap_or(false)
            })
            .copied()
            .next()
    }

    /// Visible shapes whose bounds intersect a rubber-band rectangle.
    pub fn shapes_in_rect(&self, rect: Rect) -> Vec<ShapeId> {
        self.z_order
            .iter()
            .filter(|id| {
                self.shapes
                    .get(id)
                    .map(|s| {
                        self.layer_visible(s.layer_id)
                            && rect.intersect(s.bounds()).area() > 0.0
                    })
                    .unwrap_or(false)
            })
            .copied()
            .collect()
    }

    // --- grouping ------------------------------------------------------

    /// Tag the selected shapes with a fresh group id.
    /// Returns the group id, or `None` for selections smaller than two.
    pub fn group_selected(&mut self) -> Option<Uuid> {
        if self.selection.len() < 2 {
            return None;
        }
        let group = Uuid::new_v4();
        for id in self.selection.clone() {
            if let Some(shape) = self.shapes.get_mut(&id) {
                shape.group_id = Some(group);
                shape.touch();
            }
        }
        Some(group)
    }

    /// Clear group tags on the selected shapes.
    /// Returns the ids that were ungrouped.
    pub fn ungroup_selected(&mut self) -> Vec<ShapeId> {
        let mut ungrouped = Vec::new();
        for id in self.selection.clone() {
            if let Some(shape) = self.shapes.get_mut(&id) {
                if shape.group_id.take().is_some() {
                    shape.touch();
                    ungrouped.push(id);
                }
            }
        }
        ungrouped
    }

    // --- editing helpers -----------------------------------------------

    /// Duplicate the selection with fresh ids (alt-drag path). Group tags
    /// are re-mapped so duplicates form their own groups. Returns the new
    /// ids, in z-order.
    pub fn duplicate_selection(&mut self) -> Vec<ShapeId> {
        let mut group_map: HashMap<Uuid, Uuid> = HashMap::new();
        let sources: Vec<ShapeId> = self
            .z_order
            .iter()
            .filter(|id| self.selection.contains(id))
            .copied()
            .collect();
        let mut fresh = Vec::new();
        for id in sources {
            if let Some(source) = self.shapes.get(&id) {
                let mut copy = source.clone();
                copy.id = Uuid::new_v4();
                copy.group_id = copy
                    .group_id
                    .map(|g| *group_map.entry(g).or_insert_with(Uuid::new_v4));
                copy.touch();
                fresh.push(self.add(copy));
            }
        }
        fresh
    }

    /// Mirror the selection horizontally around its combined center.
    pub fn flip_selected_horizontal(&mut self) {
        let Some(bounds) = self.selection_bounds() else {
            return;
        };
        let cx = bounds.center().x;
        for id in self.selection.clone() {
            if let Some(shape) = self.shapes.get_mut(&id) {
                for p in &mut shape.points {
                    p.x = 2.0 * cx - p.x;
                }
                if let Some(rotation) = &mut shape.rotation {
                    rotation.angle = -rotation.angle;
                    rotation.center.x = 2.0 * cx - rotation.center.x;
                }
                shape.touch();
            }
        }
    }

    /// Mirror the selection vertically around its combined center.
    pub fn flip_selected_vertical(&mut self) {
        let Some(bounds) = self.selection_bounds() else {
            return;
        };
        let cy = bounds.center().y;
        for id in self.selection.clone() {
            if let Some(shape) = self.shapes.get_mut(&id) {
                for p in &mut shape.points {
                    p.y = 2.0 * cy - p.y;
                }
                if let Some(rotation) = &mut shape.rotation {
                    rotation.angle = -rotation.angle;
                    rotation.center.y = 2.0 * cy - rotation.center.y;
                }
                shape.touch();
            }
        }
    }

    pub fn set_locked(&mut self, id: ShapeId, locked: bool) {
        if let Some(shape) = self.shapes.get_mut(&id) {
            shape.locked = locked;
            shape.touch();
        }
    }

    // --- layers --------------------------------------------------------

    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerId {
        let layer = Layer::new(name);
        let id = layer.id;
        self.layers.push(layer);
        id
    }

    /// Returns false when the layer does not exist.
    pub fn set_active_layer(&mut self, id: LayerId) -> bool {
        if self.layers.iter().any(|l| l.id == id) {
            self.active_layer = id;
            true
        } else {
            false
        }
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) {
        if let Some(layer) = self.layers.iter_mut().find(|l| l.id == id) {
            layer.visible = visible;
        }
    }
}
