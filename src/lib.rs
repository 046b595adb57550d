// ============================================================================
// ripple-signals - Push-based Reactive Core
// ============================================================================
//
// Disposables, subjects, observables and signal operators, diff-emitting
// collections that drive incremental rendering, and a search view model
// built from those pieces.
// ============================================================================

mod macros;

pub mod collections;
pub mod config;
pub mod core;
pub mod primitives;
pub mod reactivity;
pub mod render;
pub mod search;

// Re-export core items at crate root for ergonomic access
pub use core::constants;
pub use core::types::{AnyDisposable, Disposable, Event, Job, Observer};

// Re-export primitives at crate root
pub use primitives::bag::{DisposeBag, DisposeBagProvider, DisposeIn};
pub use primitives::bind::{Bindable, FnSink, bidirectional_bind};
pub use primitives::composite::{CompositeDisposable, SerialDisposable, composite};
pub use primitives::disposable::{
    BlockDisposable, DeinitDisposable, NonDisposable, SimpleDisposable,
};
pub use primitives::observable::Observable;
pub use primitives::signal::{AsSignal, Signal};
pub use primitives::subject::Subject;

// Re-export execution contexts
pub use reactivity::scheduling::{ExecutionContext, ImmediateContext, MainQueue, TokioContext};

// Re-export collections and render binding
pub use collections::{
    ArrayEvent, ChangeKind, CollectionEvent, DictionaryEvent, ObservableArray,
    ObservableDictionary, OrderedEntries,
};
pub use render::{MirrorTarget, RenderOp, RenderTarget, RowSource, apply_event};

// Re-export configuration and search
pub use config::{ConfigError, SearchConfig};
pub use search::{
    DeliverOn, Query, SearchCallback, SearchFailure, SearchItem, SearchRequest, SearchResult,
    SearchService, SearchViewModel, USER_FAILURE_MESSAGE,
};

// =============================================================================
// TESTS
// =============================================================================
