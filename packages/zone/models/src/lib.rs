#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident record and danger zone types for `SafeSteps`.
//!
//! Raw incident records are produced upstream by the news labelling tool
//! and bundled as JSON. The resolver pipeline turns each one into a
//! [`DangerZone`]: a geocoded, classified record ready for map display.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Display classification of a danger zone, derived from the raw
/// severity score.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DangerLevel {
    /// Severity score of 2 or less.
    Low,
    /// Severity score of 3 or 4.
    Medium,
    /// Severity score of 5 or more.
    High,
}

impl DangerLevel {
    /// Classifies a severity score.
    ///
    /// Scores are not range-checked: anything at or below 2 is
    /// [`Self::Low`] and anything above 4 is [`Self::High`].
    #[must_use]
    pub const fn classify(severity_score: i64) -> Self {
        if severity_score <= 2 {
            Self::Low
        } else if severity_score <= 4 {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Returns all variants of this enum, lowest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One entry of the bundled incidents document.
///
/// The labelling tool wraps every record in a `labels` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentEntry {
    /// The labelled incident.
    pub labels: RawIncidentRecord,
}

/// An incident as labelled upstream, before geocoding.
///
/// Field names on the wire are the ones the labelling tool emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIncidentRecord {
    /// Free-text place description (street, intersection, landmark).
    #[serde(rename = "miejsce")]
    pub place: String,
    /// When the incident happened, ideally ISO 8601 with an offset.
    #[serde(rename = "data")]
    pub occurred_at: String,
    /// Estimated end of the incident. Free text.
    #[serde(rename = "szacowany_czas_zakonczenia")]
    pub estimated_end_time: String,
    /// Danger score, nominally 1-5.
    #[serde(rename = "poziom_zagrozenia")]
    pub severity_score: i64,
    /// Impact on moving around the city, nominally 1-5.
    #[serde(rename = "komfort")]
    pub comfort_score: i64,
    /// Short summary of the incident.
    #[serde(rename = "podsumowanie")]
    pub summary: String,
    /// Source article URL.
    #[serde(rename = "adres_url")]
    pub info_url: String,
}

/// A geocoded, classified incident ready for map display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DangerZone {
    /// The place description as labelled (not the normalized query).
    pub address: Option<String>,
    /// Marker tooltip and panel title.
    pub title: String,
    /// Panel description.
    pub description: String,
    /// Display classification.
    pub level: DangerLevel,
    /// When the incident happened, in its original offset.
    pub occurred_at: DateTime<FixedOffset>,
    /// Resolved marker position.
    pub position: Coordinates,
    /// Link to the source article.
    pub info_url: String,
}

impl DangerZone {
    /// Builds a zone from a raw record and the coordinates its place
    /// resolved to.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTimestampError`] if the record's `occurred_at`
    /// cannot be parsed.
    pub fn from_record(
        record: &RawIncidentRecord,
        position: Coordinates,
    ) -> Result<Self, InvalidTimestampError> {
        Ok(Self {
            address: Some(record.place.clone()),
            title: record.summary.clone(),
            description: record.summary.clone(),
            level: DangerLevel::classify(record.severity_score),
            occurred_at: parse_timestamp(&record.occurred_at)?,
            position,
            info_url: record.info_url.clone(),
        })
    }
}

/// Naive timestamp layouts accepted when no offset is present. These are
/// interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parses an incident timestamp.
///
/// Accepts RFC 3339, ISO 8601 with an offset but without seconds, naive
/// date-times (taken as UTC) and bare dates (UTC midnight).
///
/// # Errors
///
/// Returns [`InvalidTimestampError`] if none of the accepted layouts
/// match.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, InvalidTimestampError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z") {
        return Ok(dt);
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc().fixed_offset());
    }

    Err(InvalidTimestampError {
        value: value.to_string(),
    })
}

/// Error returned when an incident timestamp is not in a recognized
/// layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTimestampError {
    /// The rejected input.
    pub value: String,
}

impl std::fmt::Display for InvalidTimestampError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid incident timestamp '{}'", self.value)
    }
}

impl std::error::Error for InvalidTimestampError {}
