// ============================================================================
// ripple-signals - Core Module
// Fundamental types, traits and flags for the reactive core
// ============================================================================

pub mod constants;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use types::{AnyDisposable, Disposable, Event, Job, Observer};
