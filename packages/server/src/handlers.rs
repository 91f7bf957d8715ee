//! HTTP handler functions for the `SafeSteps` server.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use safe_steps_auth::{AuthError, Credentials, SESSION_LIFETIME_DAYS, Session};
use safe_steps_map::marker::{MAP_PATH, PanelState};
use safe_steps_map::page::{
    render_error_page, render_landing_page, render_map_page, render_sign_in_page,
};
use safe_steps_server_models::{ApiDangerZone, ApiError, ApiHealth, ApiSession, MapQueryParams};
use safe_steps_zone_models::DangerZone;
use safe_steps_zones::progress::NullProgress;
use safe_steps_zones::{ZoneError, resolve_zones};

use crate::{AppState, SESSION_COOKIE};

const HTML: &str = "text/html; charset=utf-8";

const MAP_UNAVAILABLE: &str = "Nie udało się ustalić położenia stref zagrożenia.";
const BAD_CREDENTIALS: &str = "Nieprawidłowa nazwa użytkownika lub hasło.";

async fn resolve_pass(state: &AppState) -> Result<Vec<DangerZone>, ZoneError> {
    resolve_zones(state.resolver.as_ref(), &state.records, &NullProgress).await
}

/// Looks up the session named by the request's cookie, if any.
async fn current_session(
    state: &AppState,
    req: &HttpRequest,
) -> Result<Option<Session>, AuthError> {
    match req.cookie(SESSION_COOKIE) {
        Some(cookie) => state.identity.session(cookie.value()).await,
        None => Ok(None),
    }
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::days(SESSION_LIFETIME_DAYS))
        .finish()
}

fn see_other(location: &str) -> actix_web::HttpResponseBuilder {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, location));
    builder
}

/// `GET /`
pub async fn landing(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let session = current_session(&state, &req).await.unwrap_or_else(|e| {
        log::error!("Failed to look up session: {e}");
        None
    });

    HttpResponse::Ok()
        .content_type(HTML)
        .body(render_landing_page(session.as_ref().map(|s| s.username.as_str())))
}

/// `GET /map`
///
/// Runs a resolution pass and renders the map with the detail panel
/// named by `?zone=`.
pub async fn map_page(
    state: web::Data<AppState>,
    params: web::Query<MapQueryParams>,
) -> HttpResponse {
    let zones = match resolve_pass(&state).await {
        Ok(zones) => zones,
        Err(e) => {
            log::error!("Failed to resolve danger zones: {e}");
            return HttpResponse::BadGateway()
                .content_type(HTML)
                .body(render_error_page(MAP_UNAVAILABLE));
        }
    };

    let panel = PanelState::from_query(params.zone, zones.len());

    match render_map_page(&zones, &state.map, panel) {
        Ok(html) => HttpResponse::Ok().content_type(HTML).body(html),
        Err(e) => {
            log::error!("Failed to render map page: {e}");
            HttpResponse::InternalServerError()
                .content_type(HTML)
                .body(render_error_page(MAP_UNAVAILABLE))
        }
    }
}

/// `GET /signin`
pub async fn sign_in_page() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(HTML)
        .body(render_sign_in_page(None, ""))
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/zones`
///
/// Runs a resolution pass and returns every zone, in record order.
pub async fn zones(state: web::Data<AppState>) -> HttpResponse {
    match resolve_pass(&state).await {
        Ok(zones) => {
            let api_zones: Vec<ApiDangerZone> = zones.into_iter().map(ApiDangerZone::from).collect();
            HttpResponse::Ok().json(api_zones)
        }
        Err(e) => {
            log::error!("Failed to resolve danger zones: {e}");
            HttpResponse::BadGateway().json(ApiError::new(e.to_string()))
        }
    }
}

/// `POST /api/auth/signin`
///
/// On success sets the session cookie and redirects to the map; bad
/// credentials re-render the form with a 401.
pub async fn sign_in(
    state: web::Data<AppState>,
    form: web::Form<Credentials>,
) -> HttpResponse {
    let credentials = form.into_inner();

    match state.identity.sign_in(&credentials).await {
        Ok(session) => see_other(MAP_PATH)
            .cookie(session_cookie(session.token))
            .finish(),
        Err(AuthError::InvalidCredentials) => HttpResponse::Unauthorized()
            .content_type(HTML)
            .body(render_sign_in_page(
                Some(BAD_CREDENTIALS),
                &credentials.username,
            )),
        Err(e) => {
            log::error!("Sign-in failed: {e}");
            HttpResponse::InternalServerError()
                .content_type(HTML)
                .body(render_error_page("Logowanie jest chwilowo niedostępne."))
        }
    }
}

/// `POST /api/auth/signout`
pub async fn sign_out(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if let Err(e) = state.identity.sign_out(cookie.value()).await {
            log::error!("Sign-out failed: {e}");
        }
    }

    let mut removal = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    removal.make_removal();

    see_other("/").cookie(removal).finish()
}

/// `GET /api/auth/session`
pub async fn session(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    match current_session(&state, &req).await {
        Ok(Some(session)) => HttpResponse::Ok().json(ApiSession {
            username: session.username,
            expires_at: session.expires_at,
        }),
        Ok(None) => HttpResponse::Unauthorized().json(ApiError::new("Not signed in")),
        Err(e) => {
            log::error!("Failed to look up session: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Session lookup failed"))
        }
    }
}
