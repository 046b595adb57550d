// ============================================================================
// ripple-signals - Constants
// Lifecycle flags shared by disposables and subjects
// ============================================================================

// =============================================================================
// LIFECYCLE FLAGS
// =============================================================================

/// Handle or source is live
pub const ACTIVE: u8 = 0;

/// Handle has been disposed (terminal)
pub const DISPOSED: u8 = 1 << 0;

/// Source has delivered its completion event (terminal)
pub const COMPLETED: u8 = 1 << 1;

/// Bag owner has been torn down (terminal)
pub const CLOSED: u8 = 1 << 2;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_distinct() {
        assert_eq!(DISPOSED & COMPLETED, 0);
        assert_eq!(COMPLETED & CLOSED, 0);
        assert_eq!(DISPOSED & CLOSED, 0);
        assert_eq!(ACTIVE & (DISPOSED | COMPLETED | CLOSED), 0);
    }
}
