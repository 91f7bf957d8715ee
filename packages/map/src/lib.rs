#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Presentation layer for the `SafeSteps` map.
//!
//! Turns resolved danger zones into what the browser shows: one marker
//! per zone ([`marker`]), a detail panel for the open marker
//! ([`detail`]), and the surrounding HTML pages ([`page`]). The page is a
//! pure function of the zones, the [`MapSettings`] and the
//! [`marker::PanelState`].

pub mod detail;
pub mod marker;
pub mod page;

use safe_steps_zone_models::Coordinates;
use thiserror::Error;

/// Environment variable overriding the map center, as `lat,lng`.
pub const CENTER_ENV: &str = "SAFE_STEPS_MAP_CENTER";

/// Environment variable overriding the initial zoom level.
pub const ZOOM_ENV: &str = "SAFE_STEPS_MAP_ZOOM";

/// Central London, where the bundled incidents are.
const DEFAULT_CENTER: Coordinates = Coordinates::new(51.5074, -0.1278);
const DEFAULT_ZOOM: u8 = 12;
const MAX_ZOOM: u8 = 19;

/// Errors from map configuration and rendering.
#[derive(Debug, Error)]
pub enum MapError {
    /// The configured center is not `lat,lng` within range.
    #[error("Invalid map center '{0}': expected 'lat,lng'")]
    InvalidCenter(String),

    /// The configured zoom is not an integer between 0 and 19.
    #[error("Invalid map zoom '{0}': expected 0-19")]
    InvalidZoom(String),

    /// Marker data could not be serialized for the page script.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Initial map viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapSettings {
    /// Where the map is centered on load.
    pub center: Coordinates,
    /// Initial zoom level.
    pub zoom: u8,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl MapSettings {
    /// Reads [`CENTER_ENV`] and [`ZOOM_ENV`], keeping defaults for unset
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] if a variable is set but malformed.
    pub fn from_env() -> Result<Self, MapError> {
        Self::from_values(
            std::env::var(CENTER_ENV).ok().as_deref(),
            std::env::var(ZOOM_ENV).ok().as_deref(),
        )
    }

    /// Builds settings from optional raw values.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] if a value is present but malformed.
    pub fn from_values(center: Option<&str>, zoom: Option<&str>) -> Result<Self, MapError> {
        let mut settings = Self::default();

        if let Some(center) = center.filter(|s| !s.trim().is_empty()) {
            settings.center = parse_center(center)?;
        }
        if let Some(zoom) = zoom.filter(|s| !s.trim().is_empty()) {
            settings.zoom = zoom
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|z| *z <= MAX_ZOOM)
                .ok_or_else(|| MapError::InvalidZoom(zoom.to_string()))?;
        }

        Ok(settings)
    }
}

fn parse_center(value: &str) -> Result<Coordinates, MapError> {
    let invalid = || MapError::InvalidCenter(value.to_string());

    let (lat, lng) = value.split_once(',').ok_or_else(invalid)?;
    let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let longitude: f64 = lng.trim().parse().map_err(|_| invalid())?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(invalid());
    }

    Ok(Coordinates::new(latitude, longitude))
}
