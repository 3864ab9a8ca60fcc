//! Error taxonomy for the editor core.
//!
//! Nothing here surfaces as a fatal condition to the user: invalid geometry
//! drops the offending live frame, illegal mode transitions are silent
//! no-ops, and history corruption aborts the restore leaving the stack
//! unchanged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    /// A snapshot failed to serialize or re-serialize.
    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// A shape referenced by id no longer exists.
    #[error("unknown shape id")]
    UnknownShape,

    /// The external boolean-operation engine reported a failure.
    #[error("boolean operation failed: {0}")]
    BooleanOp(String),

    /// Geometry that cannot be committed (non-finite or degenerate).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(&'static str),
}
