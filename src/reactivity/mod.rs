// ============================================================================
// ripple-signals - Reactivity Module
// Operators over signals and the contexts they deliver on
// ============================================================================

pub mod operators;
pub mod scheduling;
pub mod throttle;

// Re-export execution contexts
pub use scheduling::{ExecutionContext, ImmediateContext, MainQueue, TokioContext};
