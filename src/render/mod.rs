// ============================================================================
// ripple-signals - Render Binding
// Incremental application of collection diffs to views
// ============================================================================

mod mirror;
mod target;

pub use mirror::{MirrorTarget, RenderOp};
pub use target::{RenderTarget, RowSource, apply_event};
