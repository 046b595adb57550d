// ============================================================================
// ripple-signals - Ergonomic Macros
// ============================================================================

/// Helper macro to clone variables into a move closure.
///
/// This reduces the boilerplate of manually cloning `Arc`, `Observable` or
/// `Subject` handles before moving them into a closure.
///
/// # Usage
///
/// ```rust
/// use ripple_signals::{cloned, Observable};
///
/// let source = Observable::new(1);
/// let mirror = Observable::new(0);
///
/// // Instead of: let mirror_clone = mirror.clone(); move |v| mirror_clone.set(*v)
/// let _h = source.observe(cloned!(mirror => move |v: &i32| mirror.set(*v)));
///
/// source.set(5);
/// assert_eq!(mirror.get(), 5);
/// ```
#[macro_export]
macro_rules! cloned {
    ($($n:ident),+ => $e:expr) => {
        {
            $( let $n = $n.clone(); )+
            $e
        }
    };
}

/// Observe the values of any signal source with automatic variable capturing.
///
/// Wraps `source.to_signal().observe_next(cloned!(... => move |value| ...))`.
///
/// # Usage
///
/// ```rust
/// use ripple_signals::{observe, Subject};
/// use std::sync::Arc;
/// use parking_lot::Mutex;
///
/// let clicks: Subject<u32> = Subject::new();
/// let log = Arc::new(Mutex::new(Vec::new()));
///
/// // Clean syntax: source, deps => |value| body
/// let _h = observe!(clicks, log => |n| log.lock().push(*n));
///
/// clicks.next(3);
/// assert_eq!(*log.lock(), vec![3]);
/// ```
#[macro_export]
macro_rules! observe {
    // Case 1: With dependencies
    ($source:expr, $($deps:ident),+ => |$value:pat_param| $body:expr) => {
        $crate::AsSignal::to_signal(&$source)
            .observe_next($crate::cloned!($($deps),+ => move |$value| $body))
    };
    // Case 2: No dependencies
    ($source:expr => |$value:pat_param| $body:expr) => {
        $crate::AsSignal::to_signal(&$source).observe_next(move |$value| $body)
    };
}
