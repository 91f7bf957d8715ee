#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the `SafeSteps` server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the zone types to allow independent evolution of the API
//! contract.

use chrono::{DateTime, FixedOffset, Utc};
use safe_steps_zone_models::{DangerLevel, DangerZone};
use serde::{Deserialize, Serialize};

/// A danger zone as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDangerZone {
    /// Place description as labelled.
    pub address: Option<String>,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Display classification.
    pub level: DangerLevel,
    /// When the incident happened (ISO 8601).
    pub occurred_at: DateTime<FixedOffset>,
    /// Marker position as `[latitude, longitude]`.
    pub position: [f64; 2],
    /// Source article URL.
    pub info_url: String,
}

impl From<DangerZone> for ApiDangerZone {
    fn from(zone: DangerZone) -> Self {
        Self {
            address: zone.address,
            title: zone.title,
            description: zone.description,
            level: zone.level,
            occurred_at: zone.occurred_at,
            position: [zone.position.latitude, zone.position.longitude],
            info_url: zone.info_url,
        }
    }
}

/// Query parameters for the map page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapQueryParams {
    /// Index of the zone whose detail panel is open.
    pub zone: Option<usize>,
}

/// The signed-in session as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSession {
    /// Who is signed in.
    pub username: String,
    /// When the session expires (ISO 8601).
    pub expires_at: DateTime<Utc>,
}

/// Error body returned by JSON endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}
