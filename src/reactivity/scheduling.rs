// ============================================================================
// ripple-signals - Execution Contexts
// Where delayed and cross-thread work ends up running
// ============================================================================
//
// The subject core delivers synchronously on the emitting thread and never
// hops threads by itself. Anything that must run somewhere else (a throttle
// flush, a search result coming back from the network) is handed to an
// ExecutionContext:
//
// - ImmediateContext: run inline on the calling thread
// - TokioContext: spawn onto a tokio runtime
// - MainQueue: a serial queue the owning (render) thread drains itself
//
// Delays are timed by tokio; ImmediateContext falls back to a timer thread
// when no runtime is around.
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::core::types::Job;

// =============================================================================
// EXECUTION CONTEXT
// =============================================================================

/// A place jobs can be sent to run.
pub trait ExecutionContext: Send + Sync + 'static {
    /// Run `job` on this context as soon as possible.
    fn execute(&self, job: Job);

    /// Run `job` on this context once `delay` has elapsed.
    fn execute_after(&self, delay: Duration, job: Job);
}

// =============================================================================
// IMMEDIATE CONTEXT
// =============================================================================

/// Runs jobs inline on whichever thread submits them.
///
/// Delayed jobs are never run early. They are timed on the ambient tokio
/// runtime when there is one, otherwise on a short-lived timer thread, and
/// run on whichever thread timed them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateContext;

impl ExecutionContext for ImmediateContext {
    fn execute(&self, job: Job) {
        job();
    }

    fn execute_after(&self, delay: Duration, job: Job) {
        if let Ok(handle) = Handle::try_current() {
            handle.spawn(async move {
                tokio::time::sleep(delay).await;
                job();
            });
            return;
        }

        trace!(?delay, "no tokio runtime, timing delayed job on a thread");
        let spawned = std::thread::Builder::new()
            .name("ripple-timer".into())
            .spawn(move || {
                std::thread::sleep(delay);
                job();
            });
        if let Err(error) = spawned {
            warn!(%error, ?delay, "could not start timer thread, delayed job dropped");
        }
    }
}

// =============================================================================
// TOKIO CONTEXT
// =============================================================================

/// Spawns jobs as tasks on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioContext {
    handle: Handle,
}

impl TokioContext {
    /// Use the runtime behind `handle`.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is running on, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl ExecutionContext for TokioContext {
    fn execute(&self, job: Job) {
        self.handle.spawn(async move { job() });
    }

    fn execute_after(&self, delay: Duration, job: Job) {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            job();
        });
    }
}

// =============================================================================
// MAIN QUEUE
// =============================================================================

/// A serial queue owned by one thread.
///
/// Any thread may submit; jobs only run when the owner calls
/// [`MainQueue::run_pending`], so everything they touch stays on the owner's
/// thread. This is the context a render target lives on.
///
/// # Example
///
/// ```
/// use ripple_signals::{ExecutionContext, MainQueue};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
/// let queue = MainQueue::new(runtime.handle().clone());
///
/// let ran = Arc::new(AtomicBool::new(false));
/// let ran_clone = ran.clone();
/// std::thread::spawn({
///     let queue = queue.clone();
///     move || queue.execute(Box::new(move || ran_clone.store(true, Ordering::SeqCst)))
/// })
/// .join()
/// .unwrap();
///
/// assert!(!ran.load(Ordering::SeqCst));
/// assert_eq!(queue.run_pending(), 1);
/// assert!(ran.load(Ordering::SeqCst));
/// ```
#[derive(Clone)]
pub struct MainQueue {
    sender: mpsc::UnboundedSender<Job>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Job>>>,
    timer: Handle,
}

impl MainQueue {
    /// Create a queue whose delayed jobs are timed on `timer`.
    pub fn new(timer: Handle) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
            timer,
        }
    }

    /// Run every job that is queued right now, including jobs queued by the
    /// jobs themselves. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // Receive outside of the job call so jobs can submit more work.
            let job = self.receiver.lock().try_recv();
            match job {
                Ok(job) => {
                    job();
                    ran += 1;
                }
                Err(_) => break,
            }
        }
        if ran > 0 {
            trace!(ran, "main queue drained");
        }
        ran
    }

    /// Number of jobs waiting to run.
    pub fn pending(&self) -> usize {
        self.receiver.lock().len()
    }

    fn enqueue(sender: &mpsc::UnboundedSender<Job>, job: Job) {
        if sender.send(job).is_err() {
            warn!("main queue receiver gone, job dropped");
        }
    }
}

impl ExecutionContext for MainQueue {
    fn execute(&self, job: Job) {
        Self::enqueue(&self.sender, job);
    }

    fn execute_after(&self, delay: Duration, job: Job) {
        let sender = self.sender.clone();
        self.timer.spawn(async move {
            tokio::time::sleep(delay).await;
            Self::enqueue(&sender, job);
        });
    }
}

impl std::fmt::Debug for MainQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
