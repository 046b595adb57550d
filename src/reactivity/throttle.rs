// ============================================================================
// ripple-signals - Throttle
// Trailing-edge time coalescing
// ============================================================================
//
// The first value to arrive opens a window of `interval`. Every value that
// arrives while the window is open replaces the retained one. When the window
// closes, the retained value is delivered once on the execution context and
// the next arrival opens a fresh window.
//
//     input:   0   10  20          90  95 |
//     window:  [------------- 100 ms -----]
//     output:                             95  (at t=100)
//
// Nothing is delivered on the leading edge, and a lone value still waits out
// its window.
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;

use crate::core::types::{AnyDisposable, Disposable, Event, Observer};
use crate::primitives::composite::composite;
use crate::primitives::disposable::SimpleDisposable;
use crate::primitives::signal::Signal;
use crate::reactivity::scheduling::ExecutionContext;

// =============================================================================
// WINDOW STATE
// =============================================================================

struct Window<T> {
    latest: Option<T>,
    open: bool,
    completed: bool,
}

struct ThrottleState<T> {
    window: Mutex<Window<T>>,
    cancelled: Arc<SimpleDisposable>,
    observer: Observer<T>,
    interval: Duration,
    context: Arc<dyn ExecutionContext>,
}

impl<T: Clone + Send + Sync + 'static> ThrottleState<T> {
    fn on(self: &Arc<Self>, event: &Event<T>) {
        match event {
            Event::Next(value) => {
                let opened = {
                    let mut window = self.window.lock();
                    if window.completed {
                        return;
                    }
                    window.latest = Some(value.clone());
                    !std::mem::replace(&mut window.open, true)
                };
                if opened {
                    trace!(interval = ?self.interval, "throttle window opened");
                    let state = self.clone();
                    self.context
                        .execute_after(self.interval, Box::new(move || state.flush()));
                }
            }
            Event::Completed => {
                let deliver_now = {
                    let mut window = self.window.lock();
                    window.completed = true;
                    !window.open
                };
                // An open window forwards completion after its value.
                if deliver_now && !self.cancelled.is_disposed() {
                    (self.observer)(&Event::Completed);
                }
            }
        }
    }

    fn flush(&self) {
        let (latest, completed) = {
            let mut window = self.window.lock();
            window.open = false;
            (window.latest.take(), window.completed)
        };
        if self.cancelled.is_disposed() {
            trace!("throttle flush after dispose, dropped");
            return;
        }
        trace!(has_value = latest.is_some(), "throttle window closed");
        if let Some(value) = latest {
            (self.observer)(&Event::Next(value));
        }
        if completed {
            (self.observer)(&Event::Completed);
        }
    }
}

// =============================================================================
// OPERATOR
// =============================================================================

impl<T: Clone + Send + Sync + 'static> Signal<T> {
    /// Coalesce values so at most one is delivered per `interval`, always the
    /// most recent one, on `context`.
    ///
    /// Disposing the returned subscription detaches from upstream and drops
    /// any delivery still pending.
    ///
    /// # Example
    ///
    /// ```
    /// use ripple_signals::{AsSignal, MainQueue, Subject};
    /// use std::sync::Arc;
    /// use std::time::Duration;
    /// use parking_lot::Mutex;
    ///
    /// # let runtime = tokio::runtime::Builder::new_current_thread()
    /// #     .enable_time()
    /// #     .start_paused(true)
    /// #     .build()
    /// #     .unwrap();
    /// # runtime.block_on(async {
    /// let queue = MainQueue::new(tokio::runtime::Handle::current());
    /// let text: Subject<String> = Subject::new();
    /// let delivered = Arc::new(Mutex::new(Vec::new()));
    ///
    /// let delivered_clone = delivered.clone();
    /// let _h = text
    ///     .throttle(Duration::from_millis(500), Arc::new(queue.clone()))
    ///     .observe_next(move |t| delivered_clone.lock().push(t.clone()));
    ///
    /// text.next("sun".into());
    /// text.next("sunset".into());
    /// tokio::time::sleep(Duration::from_millis(501)).await;
    /// queue.run_pending();
    ///
    /// assert_eq!(*delivered.lock(), vec!["sunset".to_string()]);
    /// # });
    /// ```
    pub fn throttle(&self, interval: Duration, context: Arc<dyn ExecutionContext>) -> Signal<T> {
        let upstream = self.clone();
        Signal::new(move |observer| {
            let state = Arc::new(ThrottleState {
                window: Mutex::new(Window {
                    latest: None,
                    open: false,
                    completed: false,
                }),
                cancelled: Arc::new(SimpleDisposable::new()),
                observer,
                interval,
                context: context.clone(),
            });
            let cancelled: AnyDisposable = state.cancelled.clone();
            let upstream_handle = upstream.observe(move |event| state.on(event));
            composite([upstream_handle, cancelled])
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
