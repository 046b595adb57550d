// ============================================================================
// ripple-signals - Disposable Primitives
// Idempotent cancellation handles
// ============================================================================
//
// Four leaf handles:
// - NonDisposable    - can never be disposed (nothing to release)
// - SimpleDisposable - just a disposed flag
// - BlockDisposable  - runs a closure once, on first dispose
// - DeinitDisposable - RAII guard that disposes its inner handle on drop
//
// All of them are Send + Sync and safe to dispose concurrently.
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::core::constants::*;
use crate::core::types::{AnyDisposable, Disposable};

// =============================================================================
// NON DISPOSABLE
// =============================================================================

static NON_DISPOSABLE: Lazy<AnyDisposable> = Lazy::new(|| Arc::new(NonDisposable));

/// A disposable that cannot be disposed.
///
/// Returned by subscriptions that hold nothing worth releasing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonDisposable;

impl NonDisposable {
    /// The shared instance.
    pub fn instance() -> AnyDisposable {
        NON_DISPOSABLE.clone()
    }
}

impl Disposable for NonDisposable {
    fn dispose(&self) {}

    fn is_disposed(&self) -> bool {
        false
    }
}

// =============================================================================
// SIMPLE DISPOSABLE
// =============================================================================

/// A disposable that only tracks its disposed state.
#[derive(Debug, Default)]
pub struct SimpleDisposable {
    state: AtomicU8,
}

impl SimpleDisposable {
    /// Create a live handle.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ACTIVE),
        }
    }

    /// Create a handle that is already disposed.
    ///
    /// Handed out when subscribing to a source that has already completed.
    pub fn disposed() -> Self {
        Self {
            state: AtomicU8::new(DISPOSED),
        }
    }
}

impl Disposable for SimpleDisposable {
    fn dispose(&self) {
        self.state.fetch_or(DISPOSED, Ordering::AcqRel);
    }

    fn is_disposed(&self) -> bool {
        self.state.load(Ordering::Acquire) & DISPOSED != 0
    }
}

// =============================================================================
// BLOCK DISPOSABLE
// =============================================================================

type DisposeFn = Box<dyn FnOnce() + Send>;

/// A disposable that runs a closure on first dispose.
///
/// The closure is dropped once it has run, so anything it captured is
/// released together with the subscription.
pub struct BlockDisposable {
    handler: Mutex<Option<DisposeFn>>,
}

impl BlockDisposable {
    /// Create a handle that runs `handler` when disposed.
    pub fn new(handler: impl FnOnce() + Send + 'static) -> Self {
        Self {
            handler: Mutex::new(Some(Box::new(handler))),
        }
    }

    /// Create a shared, type-erased handle.
    pub fn boxed(handler: impl FnOnce() + Send + 'static) -> AnyDisposable {
        Arc::new(Self::new(handler))
    }
}

impl Disposable for BlockDisposable {
    fn dispose(&self) {
        // Take under the lock, run outside it: the handler may dispose
        // other handles that lead back here.
        let handler = self.handler.lock().take();
        if let Some(handler) = handler {
            handler();
        }
    }

    fn is_disposed(&self) -> bool {
        self.handler.lock().is_none()
    }
}

impl std::fmt::Debug for BlockDisposable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockDisposable")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// =============================================================================
// DEINIT DISPOSABLE
// =============================================================================

/// A disposable that disposes its inner handle when dropped.
///
/// # Example
///
/// ```
/// use ripple_signals::{DeinitDisposable, Disposable, SimpleDisposable};
/// use std::sync::Arc;
///
/// let inner = Arc::new(SimpleDisposable::new());
/// {
///     let _guard = DeinitDisposable::new(inner.clone());
/// }
/// assert!(inner.is_disposed());
/// ```
pub struct DeinitDisposable {
    inner: Mutex<Option<AnyDisposable>>,
}

impl DeinitDisposable {
    /// Guard `inner`.
    pub fn new(inner: AnyDisposable) -> Self {
        Self {
            inner: Mutex::new(Some(inner)),
        }
    }

    /// Give up the guarded handle without disposing it.
    pub fn release(&self) -> Option<AnyDisposable> {
        self.inner.lock().take()
    }
}

impl Disposable for DeinitDisposable {
    fn dispose(&self) {
        let inner = self.inner.lock().take();
        if let Some(inner) = inner {
            inner.dispose();
        }
    }

    fn is_disposed(&self) -> bool {
        self.inner.lock().is_none()
    }
}

impl Drop for DeinitDisposable {
    fn drop(&mut self) {
        self.dispose();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn non_disposable_never_disposes() {
        let handle = NonDisposable::instance();
        handle.dispose();
        handle.dispose();
        assert!(!handle.is_disposed());
    }

    #[test]
    fn simple_disposable_is_idempotent() {
        let handle = SimpleDisposable::new();
        assert!(!handle.is_disposed());

        handle.dispose();
        assert!(handle.is_disposed());

        handle.dispose();
        assert!(handle.is_disposed());
    }

    #[test]
    fn simple_disposable_can_start_disposed() {
        assert!(SimpleDisposable::disposed().is_disposed());
    }

    #[test]
    fn block_disposable_runs_handler_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_clone = runs.clone();

        let handle = BlockDisposable::new(move || {
            runs_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!handle.is_disposed());
        handle.dispose();
        handle.dispose();
        handle.dispose();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(handle.is_disposed());
    }

    #[test]
    fn block_disposable_drops_captures_after_dispose() {
        let captured = Arc::new(());
        let captured_clone = captured.clone();

        let handle = BlockDisposable::new(move || {
            let _keep = &captured_clone;
        });
        assert_eq!(Arc::strong_count(&captured), 2);

        handle.dispose();
        assert_eq!(Arc::strong_count(&captured), 1);
    }

    #[test]
    fn block_disposable_concurrent_dispose_runs_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_clone = runs.clone();
        let handle = Arc::new(BlockDisposable::new(move || {
            runs_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let handle = handle.clone();
                std::thread::spawn(move || handle.dispose())
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn deinit_disposable_disposes_on_drop() {
        let inner = Arc::new(SimpleDisposable::new());
        {
            let _guard = DeinitDisposable::new(inner.clone());
            assert!(!inner.is_disposed());
        }
        assert!(inner.is_disposed());
    }

    #[test]
    fn deinit_disposable_release_skips_disposal() {
        let inner = Arc::new(SimpleDisposable::new());
        {
            let guard = DeinitDisposable::new(inner.clone());
            assert!(guard.release().is_some());
            assert!(guard.is_disposed());
        }
        assert!(!inner.is_disposed());
    }
}
