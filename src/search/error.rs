// ============================================================================
// ripple-signals - Search Errors
// ============================================================================

use crate::search::query::SearchItem;

/// Message shown to the user for any failed search.
pub const USER_FAILURE_MESSAGE: &str = "Check your internet connection, or try another search term";

/// Why a search request did not produce results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchFailure {
    /// No response, or the transport reported an error
    #[error("search request failed: {0}")]
    Transport(String),

    /// A response arrived but could not be decoded into items
    #[error("could not decode search response: {0}")]
    Decode(String),

    /// The request could not be built (e.g. the term cannot appear in a URL)
    #[error("malformed search request: {0}")]
    MalformedRequest(String),
}

impl SearchFailure {
    /// What to tell the user. The same for every failure kind.
    pub fn user_message(&self) -> &'static str {
        USER_FAILURE_MESSAGE
    }
}

/// Outcome of one search request.
pub type SearchResult = Result<Vec<SearchItem>, SearchFailure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_detail() {
        let failure = SearchFailure::Transport("timed out".into());
        assert_eq!(failure.to_string(), "search request failed: timed out");
    }

    #[test]
    fn every_kind_maps_to_user_message() {
        for failure in [
            SearchFailure::Transport(String::new()),
            SearchFailure::Decode(String::new()),
            SearchFailure::MalformedRequest(String::new()),
        ] {
            assert_eq!(failure.user_message(), USER_FAILURE_MESSAGE);
        }
    }
}
