// ============================================================================
// ripple-signals - Search Service
// The capability the view model calls out to
// ============================================================================
//
// A service answers every request exactly once through its callback. Where
// that callback runs is the service's business: wrap a service that answers
// on a background thread in `DeliverOn` to hop the answer onto the context
// that owns the render target.
// ============================================================================

use std::sync::Arc;

use tracing::trace;

use crate::reactivity::scheduling::ExecutionContext;
use crate::search::error::SearchResult;
use crate::search::query::Query;

/// Receives the outcome of one request.
pub type SearchCallback = Box<dyn FnOnce(SearchResult) + Send + 'static>;

/// Something that can run searches.
pub trait SearchService: Send + Sync {
    /// Start a search for `query`; `callback` is invoked exactly once.
    fn search(&self, query: Query, callback: SearchCallback);
}

impl<S: SearchService + ?Sized> SearchService for Arc<S> {
    fn search(&self, query: Query, callback: SearchCallback) {
        (**self).search(query, callback);
    }
}

/// Delivers another service's answers on a fixed execution context.
pub struct DeliverOn<S> {
    inner: S,
    context: Arc<dyn ExecutionContext>,
}

impl<S: SearchService> DeliverOn<S> {
    pub fn new(inner: S, context: Arc<dyn ExecutionContext>) -> Self {
        Self { inner, context }
    }
}

impl<S: SearchService> SearchService for DeliverOn<S> {
    fn search(&self, query: Query, callback: SearchCallback) {
        let context = self.context.clone();
        self.inner.search(
            query,
            Box::new(move |result| {
                trace!(ok = result.is_ok(), "hopping search result to delivery context");
                context.execute(Box::new(move || callback(result)));
            }),
        );
    }
}
