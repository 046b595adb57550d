// ============================================================================
// ripple-signals - Search Query
// What is asked, what comes back and how the request URL is built
// ============================================================================

use crate::config::SearchConfig;
use crate::search::error::SearchFailure;

/// The text to search for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    pub text: String,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One result row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchItem {
    pub name: String,
    pub image_url: String,
}

impl SearchItem {
    pub fn new(name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_url: image_url.into(),
        }
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// A fully resolved search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    url: String,
}

impl SearchRequest {
    /// Build the request for `query` against the configured endpoint.
    ///
    /// Parameters are emitted as
    /// `consumer_key`, `image_size`, `term`, `license_type`, in that order.
    /// Terms are placed in the URL as typed; a term containing whitespace or
    /// control characters cannot form a valid URL and is rejected.
    ///
    /// # Example
    ///
    /// ```
    /// use ripple_signals::{Query, SearchConfig, SearchRequest};
    ///
    /// let config = SearchConfig::with_api_key("KEY");
    /// let request = SearchRequest::new(&config, &Query::new("sunset")).unwrap();
    /// assert_eq!(
    ///     request.url(),
    ///     "https://api.500px.com/v1/photos/search?consumer_key=KEY&image_size=4&term=sunset&license_type=0"
    /// );
    /// ```
    pub fn new(config: &SearchConfig, query: &Query) -> Result<Self, SearchFailure> {
        if let Some(bad) = query
            .text
            .chars()
            .find(|c| c.is_whitespace() || c.is_control())
        {
            return Err(SearchFailure::MalformedRequest(format!(
                "term {:?} contains {:?}",
                query.text, bad
            )));
        }

        let params = [
            ("consumer_key", config.api_key.clone()),
            ("image_size", config.image_size.to_string()),
            ("term", query.text.clone()),
            ("license_type", config.license_type.to_string()),
        ];
        let query_string = params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");

        Ok(Self {
            url: format!("{}{}?{}", config.host, config.api_method, query_string),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
