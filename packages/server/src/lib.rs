#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the `SafeSteps` danger map.
//!
//! Serves the landing, sign-in and map pages plus a small JSON API. Each
//! map request runs a fresh resolution pass over the loaded incident
//! records; a failed pass renders an error page instead of the map.
//! Sign-in is backed by an [`IdentityProvider`] and a session cookie.

mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use safe_steps_auth::{CredentialsProvider, IdentityProvider, store};
use safe_steps_geocoder::AddressResolver;
use safe_steps_geocoder::config::GeocoderConfig;
use safe_steps_geocoder::nominatim::NominatimResolver;
use safe_steps_map::MapSettings;
use safe_steps_zone_models::RawIncidentRecord;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "safe_steps_session";

/// Shared application state.
pub struct AppState {
    /// Geocoder used for every resolution pass.
    pub resolver: Arc<dyn AddressResolver>,
    /// Sign-in and session lookup.
    pub identity: Arc<dyn IdentityProvider>,
    /// Incident records loaded at startup.
    pub records: Arc<Vec<RawIncidentRecord>>,
    /// Initial map viewport.
    pub map: MapSettings,
}

/// Registers every page and API route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::landing))
        .route("/map", web::get().to(handlers::map_page))
        .route("/signin", web::get().to(handlers::sign_in_page))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .route("/zones", web::get().to(handlers::zones))
                .route("/auth/signin", web::post().to(handlers::sign_in))
                .route("/auth/signout", web::post().to(handlers::sign_out))
                .route("/auth/session", web::get().to(handlers::session)),
        );
}

/// Builds the production state from the environment: the incident
/// records, the Nominatim geocoder, the `SQLite` credential store and the
/// map settings.
///
/// # Errors
///
/// Returns an `std::io::Error` wrapping whichever component failed to
/// initialize.
pub async fn state_from_env() -> std::io::Result<AppState> {
    log::info!("Loading incident records...");
    let records = safe_steps_zones::load_records_or_bundled(None).map_err(std::io::Error::other)?;
    log::info!("Loaded {} incident record(s)", records.len());

    let config = GeocoderConfig::from_env();
    log::info!("Geocoding with {} ({})", config.name, config.base_url);
    let resolver = NominatimResolver::new(config).map_err(std::io::Error::other)?;

    let db_path = store::db_path_from_env();
    log::info!("Opening auth database at {}...", db_path.display());
    let credentials = store::SqliteCredentialStore::open(&db_path)
        .await
        .map_err(std::io::Error::other)?;

    let map = MapSettings::from_env().map_err(std::io::Error::other)?;

    Ok(AppState {
        resolver: Arc::new(resolver),
        identity: Arc::new(CredentialsProvider::new(credentials)),
        records: Arc::new(records),
        map,
    })
}

/// Starts the `SafeSteps` server.
///
/// Builds the state with [`state_from_env`], then binds to `BIND_ADDR`
/// (default `127.0.0.1`) and `PORT` (default `8080`). The caller is
/// responsible for initializing the logger and providing the async
/// runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the state cannot be built, the
/// server fails to bind, or it encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let state = web::Data::new(state_from_env().await?);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
