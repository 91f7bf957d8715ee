//! Geocoder configuration.
//!
//! Defaults are defined in `services/nominatim.toml`, embedded at compile
//! time. The base URL and `User-Agent` can be overridden at startup with
//! the `SAFE_STEPS_GEOCODER_URL` and `SAFE_STEPS_GEOCODER_USER_AGENT`
//! environment variables.

use serde::Deserialize;

/// Environment variable overriding [`GeocoderConfig::base_url`].
pub const BASE_URL_ENV: &str = "SAFE_STEPS_GEOCODER_URL";

/// Environment variable overriding [`GeocoderConfig::user_agent`].
pub const USER_AGENT_ENV: &str = "SAFE_STEPS_GEOCODER_USER_AGENT";

const NOMINATIM_TOML: &str = include_str!("../services/nominatim.toml");

/// Connection settings for the Nominatim search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeocoderConfig {
    /// Unique identifier (e.g., `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Search endpoint (e.g., `"https://nominatim.openstreetmap.org/search"`).
    pub base_url: String,
    /// `User-Agent` sent with every request. Nominatim's usage policy
    /// rejects anonymous clients.
    pub user_agent: String,
    /// How many candidates to ask for per query.
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: u32,
}

const fn default_candidate_limit() -> u32 {
    1
}

impl GeocoderConfig {
    /// Returns the embedded default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed.
    #[must_use]
    pub fn embedded() -> Self {
        toml::de::from_str(NOMINATIM_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded geocoder config: {e}"))
    }

    /// Returns the embedded configuration with environment overrides
    /// applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::embedded().with_overrides(
            std::env::var(BASE_URL_ENV).ok(),
            std::env::var(USER_AGENT_ENV).ok(),
        )
    }

    /// Applies overrides, ignoring blank values.
    #[must_use]
    pub fn with_overrides(mut self, base_url: Option<String>, user_agent: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|s| !s.trim().is_empty()) {
            log::debug!("Geocoder base URL overridden: {url}");
            self.base_url = url;
        }
        if let Some(agent) = user_agent.filter(|s| !s.trim().is_empty()) {
            self.user_agent = agent;
        }
        self
    }
}
