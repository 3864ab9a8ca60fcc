//! Boolean-operation engine seam.
//!
//! The polygon engine itself is an external collaborator. The core hands it
//! immutable shape snapshots by id and merges successful results back into
//! the collection; a failure leaves the document untouched.

use crate::error::EditorError;
use crate::shape::Shape;

/// Operation kinds the external engine supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOpKind {
    Union,
    Intersection,
    Difference,
    Subdivide,
}

/// External polygon engine contract.
pub trait BooleanOps {
    /// Apply `op` to the input shapes, returning the result shape set.
    fn apply(&self, op: BooleanOpKind, inputs: &[Shape]) -> Result<Vec<Shape>, EditorError>;
}
