//! Nominatim / `OpenStreetMap` geocoder client.
//!
//! Issues one free-form search per address. The public instance asks for
//! at most **1 request per second**; nothing here enforces that, so large
//! incident sets should point at a self-hosted instance.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use async_trait::async_trait;
use safe_steps_zone_models::Coordinates;

use crate::config::GeocoderConfig;
use crate::{AddressResolver, GeocodeCandidate, GeocodeError, select_candidate};

/// [`AddressResolver`] backed by a Nominatim search endpoint.
#[derive(Debug, Clone)]
pub struct NominatimResolver {
    client: reqwest::Client,
    config: GeocoderConfig,
}

impl NominatimResolver {
    /// Builds a resolver with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    /// The configuration this resolver was built with.
    #[must_use]
    pub const fn config(&self) -> &GeocoderConfig {
        &self.config
    }
}

#[async_trait]
impl AddressResolver for NominatimResolver {
    async fn resolve(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let candidates = search(
            &self.client,
            &self.config.base_url,
            address,
            self.config.candidate_limit,
        )
        .await?;

        log::trace!("Nominatim returned {} candidate(s) for {address:?}", candidates.len());

        Ok(select_candidate(address, &candidates)?)
    }
}

/// Runs a free-form Nominatim search and returns every candidate in the
/// provider's ranking order.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails,
/// or [`GeocodeError::RateLimited`] on HTTP 429.
pub async fn search(
    client: &reqwest::Client,
    base_url: &str,
    query: &str,
    limit: u32,
) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
    let limit = limit.to_string();
    let resp = client
        .get(base_url)
        .query(&[("q", query), ("format", "jsonv2"), ("limit", limit.as_str())])
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }

    let resp = resp.error_for_status()?;
    let body: serde_json::Value = resp.json().await?;
    parse_candidates(&body)
}

/// Parses a Nominatim JSON response into candidates.
///
/// Coordinates that are missing or unparseable are kept as `None` so the
/// selection policy can decide what to do with them.
fn parse_candidates(body: &serde_json::Value) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    Ok(results
        .iter()
        .map(|result| GeocodeCandidate {
            latitude: coordinate(&result["lat"]),
            longitude: coordinate(&result["lon"]),
            display_name: result["display_name"].as_str().map(String::from),
        })
        .collect())
}

/// Nominatim encodes coordinates as strings; some proxies re-encode them as
/// numbers.
fn coordinate(value: &serde_json::Value) -> Option<f64> {
    value
        .as_str()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .or_else(|| value.as_f64())
}
