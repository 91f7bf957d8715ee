#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding for `SafeSteps` incident places.
//!
//! Converts labelled place descriptions to latitude/longitude:
//!
//! 1. [`address::normalize_place`] rewrites the free-text description into
//!    a geocoder-friendly query.
//! 2. An [`AddressResolver`] turns the query into [`Coordinates`]. The
//!    production resolver is [`nominatim::NominatimResolver`], configured
//!    from the embedded `services/nominatim.toml` (see [`config`]).
//! 3. [`select_candidate`] applies the candidate policy: the provider's
//!    first candidate wins, and it must carry both coordinates.

pub mod address;
pub mod config;
pub mod nominatim;

use async_trait::async_trait;
use safe_steps_zone_models::Coordinates;
use thiserror::Error;

/// Resolves a normalized address to coordinates.
///
/// Implementations make exactly one provider call per invocation; callers
/// decide how many invocations run at once.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolves `address` to a single coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Resolution`] if the provider has no usable
    /// candidate, or another [`GeocodeError`] if the call itself fails.
    async fn resolve(&self, address: &str) -> Result<Coordinates, GeocodeError>;
}

/// One candidate location returned by a geocoding provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCandidate {
    /// Latitude (WGS84), if the provider returned one.
    pub latitude: Option<f64>,
    /// Longitude (WGS84), if the provider returned one.
    pub longitude: Option<f64>,
    /// The matched/canonical place name returned by the provider.
    pub display_name: Option<String>,
}

/// Why an address could not be turned into coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The provider returned no candidates at all.
    #[error("Could not geocode address: {address} (no candidates)")]
    NoCandidates {
        /// The query that was sent.
        address: String,
    },

    /// The selected candidate is missing a latitude or a longitude.
    #[error("Could not geocode address: {address} (candidate has no coordinates)")]
    MissingCoordinates {
        /// The query that was sent.
        address: String,
    },
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The provider answered but had no usable candidate.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Picks the coordinates to use from a provider's ranked candidates.
///
/// The first candidate is taken as-is, with no disambiguation; later
/// candidates are never consulted, even when the first lacks
/// coordinates.
///
/// # Errors
///
/// Returns [`ResolutionError::NoCandidates`] for an empty list and
/// [`ResolutionError::MissingCoordinates`] if the first candidate lacks
/// either coordinate.
pub fn select_candidate(
    address: &str,
    candidates: &[GeocodeCandidate],
) -> Result<Coordinates, ResolutionError> {
    let Some(first) = candidates.first() else {
        return Err(ResolutionError::NoCandidates {
            address: address.to_string(),
        });
    };

    match (first.latitude, first.longitude) {
        (Some(latitude), Some(longitude)) => Ok(Coordinates::new(latitude, longitude)),
        _ => Err(ResolutionError::MissingCoordinates {
            address: address.to_string(),
        }),
    }
}
