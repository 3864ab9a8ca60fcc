//! Plotboard Core Library
//!
//! Interaction core for a 2D vector-shape editor: mode state machine,
//! drag/resize/rotate engines, snap and alignment detection, and a
//! snapshot-based undo/redo manager. Rendering, boolean polygon
//! operations, and persistence are external collaborators reached
//! through the seams in [`cache`] and [`boolean`].

pub mod boolean;
pub mod cache;
pub mod config;
pub mod document;
pub mod editor;
pub mod engines;
pub mod error;
pub mod geometry;
pub mod history;
pub mod mode;
pub mod scheduler;
pub mod session;
pub mod shape;
pub mod snap;

pub use boolean::{BooleanOpKind, BooleanOps};
pub use cache::{GeometryCache, NullCache, RecordingCache};
pub use config::ToolConfig;
pub use document::{Document, Layer};
pub use editor::Editor;
pub use error::EditorError;
pub use geometry::Axis;
pub use history::{HistoryStack, Snapshot};
pub use mode::{EditorMode, ModeMachine};
pub use scheduler::FrameScheduler;
pub use session::{DragSession, ResizeHandle, ResizeSession, RotateSession, TransformSession};
pub use shape::{LayerId, Rotation, Shape, ShapeId, ShapeKind};
pub use snap::{
    AlignmentGuide, AlignmentReport, Orientation, SnapConfig, SnapKind, SnapMatch,
    SnapPoint, SnapRadiusMode, SpacingMeasurement, SpatialSnapIndex,
};
