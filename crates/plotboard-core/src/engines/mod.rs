//! Transform engines. Each engine is a set of free functions operating on
//! an explicit session plus the document; nothing closes over ambient
//! state.

pub mod drag;
pub mod resize;
pub mod rotate;
