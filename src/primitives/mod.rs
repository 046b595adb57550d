// ============================================================================
// ripple-signals - Primitives Module
// Disposables, subjects, signals, observables and bindings
// ============================================================================

pub mod bag;
pub mod bind;
pub mod composite;
pub mod disposable;
pub mod observable;
pub mod signal;
pub mod subject;

// Re-export for convenience
pub use bag::{DisposeBag, DisposeBagProvider, DisposeIn};
pub use bind::{Bindable, FnSink, bidirectional_bind};
pub use composite::{CompositeDisposable, SerialDisposable, composite};
pub use disposable::{BlockDisposable, DeinitDisposable, NonDisposable, SimpleDisposable};
pub use observable::Observable;
pub use signal::{AsSignal, Signal};
pub use subject::Subject;
