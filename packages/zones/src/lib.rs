#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Resolution pipeline: labelled incidents in, danger zones out.
//!
//! Each pass normalizes every record's place description, geocodes all of
//! them concurrently (one provider call per record, no concurrency cap),
//! classifies the severity score and builds a [`DangerZone`]. Results are
//! collected positionally, so the output order always matches the input
//! order regardless of which lookups finish first.
//!
//! A pass is all-or-nothing: the first record that fails aborts the pass
//! and drops the lookups still in flight.

pub mod progress;

use std::path::Path;

use futures::future::try_join_all;
use safe_steps_geocoder::{AddressResolver, GeocodeError, address::normalize_place};
use safe_steps_zone_models::{DangerZone, IncidentEntry, InvalidTimestampError, RawIncidentRecord};
use thiserror::Error;

use crate::progress::ProgressCallback;

/// Environment variable pointing at an incidents JSON document that
/// replaces the bundled one.
pub const DATA_ENV: &str = "SAFE_STEPS_DATA";

/// The incidents document bundled at build time.
const BUNDLED_INCIDENTS: &str = include_str!("../data/incidents.json");

/// Errors from loading records or running a resolution pass.
#[derive(Debug, Error)]
pub enum ZoneError {
    /// A record's place could not be geocoded.
    #[error("Failed to resolve '{place}': {source}")]
    Geocode {
        /// The place description as labelled.
        place: String,
        /// Underlying geocoder failure.
        #[source]
        source: GeocodeError,
    },

    /// A record's timestamp is unreadable.
    #[error(transparent)]
    Timestamp(#[from] InvalidTimestampError),

    /// The incidents document is not valid JSON of the expected shape.
    #[error("Incidents JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The incidents document could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ZoneError {
    /// Whether this failure is the provider having no usable candidate, as
    /// opposed to a transport or input problem.
    #[must_use]
    pub const fn is_unresolvable(&self) -> bool {
        matches!(
            self,
            Self::Geocode {
                source: GeocodeError::Resolution(_),
                ..
            }
        )
    }
}

/// Parses an incidents document (an array of `{ "labels": { ... } }`).
///
/// # Errors
///
/// Returns [`ZoneError::Json`] if the document does not match the
/// expected shape.
pub fn parse_records(json: &str) -> Result<Vec<RawIncidentRecord>, ZoneError> {
    let entries: Vec<IncidentEntry> = serde_json::from_str(json)?;
    Ok(entries.into_iter().map(|entry| entry.labels).collect())
}

/// Returns the records bundled with the binary.
///
/// # Errors
///
/// Returns [`ZoneError::Json`] if the bundled document is malformed.
pub fn bundled_records() -> Result<Vec<RawIncidentRecord>, ZoneError> {
    parse_records(BUNDLED_INCIDENTS)
}

/// Reads records from an incidents document on disk.
///
/// # Errors
///
/// Returns [`ZoneError`] if the file cannot be read or parsed.
pub fn load_records(path: &Path) -> Result<Vec<RawIncidentRecord>, ZoneError> {
    let json = std::fs::read_to_string(path)?;
    parse_records(&json)
}

/// Loads records from `path` if given, else from [`DATA_ENV`], else the
/// bundled document.
///
/// # Errors
///
/// Returns [`ZoneError`] if the selected document cannot be read or
/// parsed.
pub fn load_records_or_bundled(path: Option<&Path>) -> Result<Vec<RawIncidentRecord>, ZoneError> {
    let from_env = std::env::var(DATA_ENV).ok().filter(|s| !s.trim().is_empty());

    match (path, from_env) {
        (Some(path), _) => {
            log::info!("Loading incidents from {}", path.display());
            load_records(path)
        }
        (None, Some(env_path)) => {
            log::info!("Loading incidents from {env_path} ({DATA_ENV})");
            load_records(Path::new(&env_path))
        }
        (None, None) => bundled_records(),
    }
}

/// Resolves a single record into a danger zone.
///
/// # Errors
///
/// Returns [`ZoneError::Geocode`] if the place cannot be geocoded, or
/// [`ZoneError::Timestamp`] if the record's timestamp is unreadable.
pub async fn resolve_zone(
    resolver: &dyn AddressResolver,
    record: &RawIncidentRecord,
) -> Result<DangerZone, ZoneError> {
    let query = normalize_place(&record.place);
    log::debug!("Geocoding {:?} as {query:?}", record.place);

    let position = resolver
        .resolve(&query)
        .await
        .map_err(|source| ZoneError::Geocode {
            place: record.place.clone(),
            source,
        })?;

    Ok(DangerZone::from_record(record, position)?)
}

/// Runs one resolution pass over `records`.
///
/// All lookups run concurrently. On success the output has exactly one
/// zone per record, in input order.
///
/// # Errors
///
/// Returns the first [`ZoneError`] raised by any record; no partial
/// result is returned.
pub async fn resolve_zones(
    resolver: &dyn AddressResolver,
    records: &[RawIncidentRecord],
    progress: &dyn ProgressCallback,
) -> Result<Vec<DangerZone>, ZoneError> {
    progress.set_total(records.len() as u64);

    let result = try_join_all(records.iter().map(|record| async move {
        let zone = resolve_zone(resolver, record).await?;
        progress.inc(1);
        Ok::<_, ZoneError>(zone)
    }))
    .await;

    match result {
        Ok(zones) => {
            log::info!("Resolved {} danger zone(s)", zones.len());
            progress.finish(format!("Resolved {} zone(s)", zones.len()));
            Ok(zones)
        }
        Err(e) => {
            log::error!("Resolution pass aborted: {e}");
            progress.finish_and_clear();
            Err(e)
        }
    }
}
