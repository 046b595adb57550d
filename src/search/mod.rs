// ============================================================================
// ripple-signals - Search
// The search boundary and the view model that drives it
// ============================================================================

mod error;
mod query;
mod service;
mod view_model;

pub use error::{SearchFailure, SearchResult, USER_FAILURE_MESSAGE};
pub use query::{Query, SearchItem, SearchRequest};
pub use service::{DeliverOn, SearchCallback, SearchService};
pub use view_model::SearchViewModel;
