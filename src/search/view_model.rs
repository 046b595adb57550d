// ============================================================================
// ripple-signals - Search View Model
// Input text to search requests to a result list and an error stream
// ============================================================================
//
// Pipeline, wired once at construction:
//
//   search_text ──map(len > valid)──────────────────> is_valid_query
//        │
//        ├──observe_new──> debug log
//        │
//        └──filter(len > min)──throttle(interval)──> execute_search
//                                                        │
//                     in_flight = true <─────────────────┤
//                                                        v
//                                                 SearchService
//                                                        │
//                     in_flight = false <────────────────┤
//            Ok(items): results.replace(items)  <────────┤
//            Err(e):    errors.next(message)    <────────┘
//
// Every subscription lives in the view model's bag; closures only hold weak
// references back to it, so a torn-down view model ignores late answers.
// ============================================================================

use std::sync::{Arc, Weak};

use tracing::{debug, info, warn};

use crate::collections::ObservableArray;
use crate::config::{ConfigError, SearchConfig};
use crate::primitives::bag::{DisposeBag, DisposeBagProvider, DisposeIn};
use crate::primitives::observable::Observable;
use crate::primitives::signal::{AsSignal, Signal};
use crate::primitives::subject::Subject;
use crate::reactivity::scheduling::ExecutionContext;
use crate::search::error::SearchResult;
use crate::search::query::{Query, SearchItem};
use crate::search::service::SearchService;

// =============================================================================
// VIEW MODEL INNER
// =============================================================================

struct ViewModelInner {
    search_text: Observable<String>,
    is_valid_query: Observable<bool>,
    results: ObservableArray<SearchItem>,
    in_flight: Observable<bool>,
    errors: Subject<String>,
    service: Arc<dyn SearchService>,
    bag: DisposeBag,
}

impl ViewModelInner {
    fn execute_search(self: &Arc<Self>, text: String) {
        if self.bag.is_closed() {
            return;
        }
        info!(text = %text, "issuing search");
        self.in_flight.set(true);

        let weak: Weak<ViewModelInner> = Arc::downgrade(self);
        self.service.search(
            Query::new(text),
            Box::new(move |result| match weak.upgrade() {
                Some(inner) => inner.handle_result(result),
                None => debug!("search answered after view model was dropped"),
            }),
        );
    }

    fn handle_result(&self, result: SearchResult) {
        if self.bag.is_closed() {
            debug!("search answered after teardown, ignored");
            return;
        }
        self.in_flight.set(false);
        match result {
            Ok(items) => {
                debug!(count = items.len(), "search succeeded");
                self.results.batch_update(|results| {
                    results.remove_all();
                    results.insert_contents_of(items, 0);
                });
            }
            Err(failure) => {
                warn!(error = %failure, "search failed");
                self.errors.next(failure.user_message().to_string());
            }
        }
    }
}

// =============================================================================
// SEARCH VIEW MODEL
// =============================================================================

/// The state behind a search screen.
///
/// Bind `search_text` two-way to the input widget, `results` to the list
/// view, `in_flight` to a progress indicator and `errors` to an alert.
///
/// # Example
///
/// ```
/// use ripple_signals::{
///     ImmediateContext, Query, SearchCallback, SearchConfig, SearchItem, SearchService,
///     SearchViewModel,
/// };
/// use std::sync::Arc;
///
/// struct Echo;
///
/// impl SearchService for Echo {
///     fn search(&self, query: Query, callback: SearchCallback) {
///         callback(Ok(vec![SearchItem::new(query.text, "https://img/echo")]));
///     }
/// }
///
/// let view_model = SearchViewModel::new(
///     &SearchConfig::with_api_key("key"),
///     Arc::new(Echo),
///     Arc::new(ImmediateContext),
/// );
///
/// view_model.execute_search("lighthouse");
/// assert_eq!(view_model.results().len(), 1);
/// assert!(!view_model.in_flight().get());
///
/// view_model.search_text().set("abc".to_string());
/// assert!(!view_model.is_valid_query().get());
/// ```
pub struct SearchViewModel {
    inner: Arc<ViewModelInner>,
}

impl SearchViewModel {
    /// Build the view model and wire its pipeline.
    ///
    /// Throttled search text is delivered on `context`, which should be the
    /// context that owns the render target.
    pub fn new(
        config: &SearchConfig,
        service: Arc<dyn SearchService>,
        context: Arc<dyn ExecutionContext>,
    ) -> Self {
        let inner = Arc::new(ViewModelInner {
            search_text: Observable::new(String::new()),
            is_valid_query: Observable::new(false),
            results: ObservableArray::default(),
            in_flight: Observable::new(false),
            errors: Subject::new(),
            service,
            bag: DisposeBag::new(),
        });

        let valid_min = config.valid_query_min_chars;
        inner
            .search_text
            .map(move |text| text.chars().count() > valid_min)
            .bind_to(&inner.is_valid_query)
            .dispose_in(&inner.bag);

        inner
            .search_text
            .observe_new(|text| debug!(text = %text, "search text changed"))
            .dispose_in(&inner.bag);

        let search_min = config.search_min_chars;
        let weak = Arc::downgrade(&inner);
        inner
            .search_text
            .filter(move |text| text.chars().count() > search_min)
            .throttle(config.throttle_interval, context)
            .observe_next(move |text| {
                if let Some(inner) = weak.upgrade() {
                    inner.execute_search(text.clone());
                }
            })
            .dispose_in(&inner.bag);

        debug!(
            throttle = ?config.throttle_interval,
            valid_min,
            search_min,
            "search view model wired"
        );
        Self { inner }
    }

    /// Build against the process-wide configuration.
    pub fn from_shared_config(
        service: Arc<dyn SearchService>,
        context: Arc<dyn ExecutionContext>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(SearchConfig::shared()?, service, context))
    }

    /// Raw input text. Bind this two-way to the input widget.
    pub fn search_text(&self) -> &Observable<String> {
        &self.inner.search_text
    }

    /// Whether the input is long enough to be worth styling as valid.
    pub fn is_valid_query(&self) -> &Observable<bool> {
        &self.inner.is_valid_query
    }

    /// Results of the last successful search.
    pub fn results(&self) -> &ObservableArray<SearchItem> {
        &self.inner.results
    }

    /// True while a request is outstanding.
    pub fn in_flight(&self) -> &Observable<bool> {
        &self.inner.in_flight
    }

    /// User-facing failure messages, one per failed search.
    pub fn errors(&self) -> Signal<String> {
        self.inner.errors.to_signal()
    }

    /// Search for `text` right away, bypassing the input pipeline.
    pub fn execute_search(&self, text: impl Into<String>) {
        self.inner.execute_search(text.into());
    }

    /// Release every subscription. Answers still in flight are ignored.
    pub fn teardown(&self) {
        debug!("search view model teardown");
        self.inner.bag.close();
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.bag.is_closed()
    }
}

impl DisposeBagProvider for SearchViewModel {
    fn dispose_bag(&self) -> &DisposeBag {
        &self.inner.bag
    }
}

impl std::fmt::Debug for SearchViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchViewModel")
            .field("search_text", &self.inner.search_text)
            .field("results", &self.inner.results.len())
            .field("in_flight", &self.inner.in_flight)
            .field("torn_down", &self.is_torn_down())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
