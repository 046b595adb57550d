// ============================================================================
// ripple-signals - Configuration
// Search endpoint, pipeline thresholds and the process-wide instance
// ============================================================================

use std::time::Duration;

use once_cell::sync::OnceCell;
use tracing::debug;

/// Environment variable holding the search API key.
pub const API_KEY_VAR: &str = "RIPPLE_API_KEY";

/// Environment variable overriding the throttle interval, in milliseconds.
pub const THROTTLE_MS_VAR: &str = "RIPPLE_THROTTLE_MS";

static SHARED: OnceCell<SearchConfig> = OnceCell::new();

// =============================================================================
// ERRORS
// =============================================================================

/// Why a configuration could not be built or installed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing search API key (set RIPPLE_API_KEY)")]
    MissingApiKey,

    #[error("invalid throttle interval {value:?}: expected whole milliseconds greater than zero")]
    InvalidThrottle { value: String },

    #[error("shared search configuration is already installed")]
    AlreadyInstalled,
}

// =============================================================================
// SEARCH CONFIG
// =============================================================================

/// Everything the search pipeline needs to know about its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub host: String,
    pub api_method: String,
    pub api_key: String,
    pub image_size: u32,
    pub license_type: u32,
    /// How long the search text must settle before a request goes out.
    pub throttle_interval: Duration,
    /// Text strictly longer than this many characters counts as valid input.
    pub valid_query_min_chars: usize,
    /// Text strictly longer than this many characters triggers a search.
    pub search_min_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            host: "https://api.500px.com/".to_string(),
            api_method: "v1/photos/search".to_string(),
            api_key: String::new(),
            image_size: 4,
            license_type: 0,
            throttle_interval: Duration::from_millis(500),
            valid_query_min_chars: 3,
            search_min_chars: 4,
        }
    }
}

impl SearchConfig {
    /// Defaults with the given API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Build from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `RIPPLE_API_KEY`: search API key (required, non-empty)
    /// - `RIPPLE_THROTTLE_MS`: throttle interval in milliseconds (default: 500)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. `from_env` with the lookup injected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::with_api_key(api_key);
        if let Some(raw) = lookup(THROTTLE_MS_VAR) {
            config.throttle_interval = parse_throttle(&raw)?;
        }
        Ok(config)
    }

    /// Make `config` the process-wide configuration.
    ///
    /// Only the first installation wins; later attempts report
    /// `AlreadyInstalled` and leave the original in place.
    pub fn install(config: SearchConfig) -> Result<&'static SearchConfig, ConfigError> {
        SHARED
            .set(config)
            .map_err(|_| ConfigError::AlreadyInstalled)?;
        debug!("shared search configuration installed");
        SHARED.get().ok_or(ConfigError::AlreadyInstalled)
    }

    /// The process-wide configuration, loaded from the environment on first
    /// use unless one was installed earlier.
    pub fn shared() -> Result<&'static SearchConfig, ConfigError> {
        SHARED.get_or_try_init(|| {
            debug!("loading shared search configuration from environment");
            Self::from_env()
        })
    }
}

fn parse_throttle(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(millis) if millis > 0 => Ok(Duration::from_millis(millis)),
        _ => Err(ConfigError::InvalidThrottle {
            value: raw.to_string(),
        }),
    }
}

// =============================================================================
// TESTS
// =============================================================================
