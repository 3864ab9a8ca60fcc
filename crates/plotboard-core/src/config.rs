//! Tool configuration: the UI-preference surface captured in snapshots but
//! deliberately not rolled back by undo.

use crate::mode::EditorMode;
use crate::snap::{SnapConfig, SnapKind, DEFAULT_GRID_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Current tool configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub active_tool: EditorMode,
    pub snap: SnapConfig,
    /// Whether dimension labels are drawn next to shapes.
    pub show_dimensions: bool,
    /// Grid cell size in world units.
    pub grid_size: f64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            active_tool: EditorMode::Select,
            snap: SnapConfig::default(),
            show_dimensions: false,
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}

/// Snap kinds a tool mode enables. The line and measure tools additionally
/// snap to intersections; the manipulation modes use the feature kinds
/// only.
pub fn active_kinds_for(mode: EditorMode) -> BTreeSet<SnapKind> {
    let mut kinds: BTreeSet<SnapKind> = [
        SnapKind::Grid,
        SnapKind::Endpoint,
        SnapKind::Midpoint,
        SnapKind::Center,
    ]
    .into_iter()
    .collect();
    if matches!(mode, EditorMode::LineDraw | EditorMode::Measure) {
        kinds.insert(SnapKind::Intersection);
    }
    kinds
}
