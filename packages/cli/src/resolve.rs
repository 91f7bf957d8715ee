//! The `resolve` command: one resolution pass over the incident records,
//! printed or written as JSON.

use std::path::{Path, PathBuf};
use std::time::Instant;

use dialoguer::Input;
use safe_steps_cli_utils::{IndicatifProgress, MultiProgress};
use safe_steps_geocoder::config::GeocoderConfig;
use safe_steps_geocoder::nominatim::NominatimResolver;
use safe_steps_server_models::ApiDangerZone;
use safe_steps_zone_models::DangerZone;
use safe_steps_zones::{load_records_or_bundled, resolve_zones};

/// Runs one pass and emits the zones as pretty JSON, to `output` if given
/// or stdout otherwise.
///
/// # Errors
///
/// Returns an error if the records cannot be loaded, any record fails to
/// resolve, or the output cannot be written.
pub async fn run(
    multi: &MultiProgress,
    data: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    let records = load_records_or_bundled(data)?;
    log::info!("Loaded {} incident record(s)", records.len());

    let config = GeocoderConfig::from_env();
    log::info!("Geocoding with {} ({})", config.name, config.base_url);
    let resolver = NominatimResolver::new(config)?;

    let progress = IndicatifProgress::geocoding_bar(multi, "Geocoding incidents");
    let zones = resolve_zones(&resolver, &records, progress.as_ref()).await?;

    let json = zones_json(zones)?;
    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")?;
            log::info!("Wrote zones to {}", path.display());
        }
        None => println!("{json}"),
    }

    log::info!(
        "Resolution complete in {:.1}s",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Prompts for the input and output paths, then runs [`run`].
///
/// # Errors
///
/// Returns an error if a prompt fails or the pass fails.
pub async fn interactive(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let data: String = Input::new()
        .with_prompt("Incidents JSON (empty for default)")
        .allow_empty(true)
        .interact_text()?;
    let output: String = Input::new()
        .with_prompt("Output file (empty for stdout)")
        .allow_empty(true)
        .interact_text()?;

    let data = non_empty_path(&data);
    let output = non_empty_path(&output);

    run(multi, data.as_deref(), output.as_deref()).await
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}

/// Serializes zones in the same shape as `GET /api/zones`.
fn zones_json(zones: Vec<DangerZone>) -> Result<String, serde_json::Error> {
    let api_zones: Vec<ApiDangerZone> = zones.into_iter().map(ApiDangerZone::from).collect();
    serde_json::to_string_pretty(&api_zones)
}
