//! Server-rendered HTML pages.
//!
//! The map page embeds the marker view models as JSON and lets Leaflet
//! draw them; the detail panel is rendered server-side from the panel
//! state in the URL. Every interpolated string goes through
//! [`escape_html`].

use std::fmt::Write as _;

use safe_steps_zone_models::DangerZone;

use crate::detail::DetailPanel;
use crate::marker::{MAP_PATH, PanelState, marker_views};
use crate::{MapError, MapSettings};

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Form action for signing in.
pub const SIGN_IN_ACTION: &str = "/api/auth/signin";

/// Form action for signing out.
pub const SIGN_OUT_ACTION: &str = "/api/auth/signout";

const STYLES: &str = r"
body { margin: 0; font-family: system-ui, sans-serif; }
.centered { display: flex; height: 100vh; flex-direction: column; align-items: center; justify-content: center; gap: 1.5rem; }
.muted { color: #6b7280; font-size: 1.125rem; }
.error { color: #b91c1c; }
.button { display: inline-flex; gap: .5rem; padding: .5rem 1rem; border-radius: .375rem; background: #111827; color: #fff; text-decoration: none; border: 0; cursor: pointer; font-size: 1rem; }
.link { color: #2563eb; }
form.credentials { display: flex; flex-direction: column; gap: .75rem; min-width: 18rem; }
#map { height: 100vh; width: 100vw; }
.danger-marker { border-radius: 9999px; min-width: 5rem; min-height: 5rem; opacity: .6; border: 2px solid; transition: opacity .2s; }
.danger-marker:hover, .danger-marker.active { opacity: 1; }
.danger-low { background: rgba(234, 179, 8, .8); border-color: #eab308; }
.danger-medium { background: rgba(249, 115, 22, .8); border-color: #f97316; }
.danger-high { background: rgba(239, 68, 68, .8); border-color: #ef4444; }
.panel { position: absolute; z-index: 2000; top: 2.5rem; left: 2.5rem; bottom: 2.5rem; width: 24rem; overflow-y: auto; background: #fff; border-radius: .5rem; box-shadow: 0 10px 25px rgba(0,0,0,.25); padding: 1.5rem; }
.panel .close { position: absolute; top: .75rem; right: 1rem; text-decoration: none; color: #111827; font-size: 1.25rem; }
.panel .actions { display: flex; flex-direction: column; align-items: stretch; gap: 1.25rem; padding: 0 1rem; }
";

/// Escapes text for inclusion in HTML content or a quoted attribute.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serializes a value for an inline `<script>`, neutralizing `</script>`.
fn script_json<T: serde::Serialize>(value: &T) -> Result<String, MapError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn layout(title: &str, head: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"pl\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{STYLES}</style>\n{head}</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

/// Renders the landing page. `username` is the signed-in user, if any.
#[must_use]
pub fn render_landing_page(username: Option<&str>) -> String {
    let mut body = String::new();
    body.push_str("<main class=\"centered\">\n");
    body.push_str("<h1>Witaj w Safe Steps!</h1>\n");
    body.push_str("<p class=\"muted\">Sprawdź bezpieczeństwo swojej okolicy</p>\n");
    let _ = writeln!(body, "<a class=\"link\" href=\"{MAP_PATH}\">Przejdź do mapy</a>");

    match username {
        Some(username) => {
            let _ = writeln!(
                body,
                "<p>Zalogowano jako <strong>{}</strong></p>\n\
                 <form method=\"post\" action=\"{SIGN_OUT_ACTION}\">\
                 <button class=\"button\" type=\"submit\">Wyloguj się</button></form>",
                escape_html(username)
            );
        }
        None => {
            body.push_str("<a class=\"button\" href=\"/signin\">Zaloguj się</a>\n");
        }
    }
    body.push_str("</main>\n");

    layout("Safe Steps", "", &body)
}

/// Renders the credentials sign-in form, optionally with an error message
/// and the previously entered username.
#[must_use]
pub fn render_sign_in_page(error: Option<&str>, username: &str) -> String {
    let mut body = String::new();
    body.push_str("<main class=\"centered\">\n<h1>Zaloguj się</h1>\n");
    if let Some(error) = error {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", escape_html(error));
    }
    let _ = writeln!(
        body,
        "<form class=\"credentials\" method=\"post\" action=\"{SIGN_IN_ACTION}\">\n\
         <label>Nazwa użytkownika <input type=\"text\" name=\"username\" \
         placeholder=\"jan.kowalski\" value=\"{}\" required></label>\n\
         <label>Hasło <input type=\"password\" name=\"password\" required></label>\n\
         <button class=\"button\" type=\"submit\">Zaloguj się</button>\n</form>",
        escape_html(username)
    );
    body.push_str("</main>\n");

    layout("Zaloguj się | Safe Steps", "", &body)
}

/// Renders the page shown when the map cannot be built.
#[must_use]
pub fn render_error_page(message: &str) -> String {
    let body = format!(
        "<main class=\"centered\">\n<h1>Nie udało się załadować mapy</h1>\n\
         <p class=\"error\">{}</p>\n<a class=\"link\" href=\"/\">Wróć</a>\n</main>\n",
        escape_html(message)
    );
    layout("Błąd | Safe Steps", "", &body)
}

fn render_panel(panel: &DetailPanel, close_href: &str) -> String {
    let mut html = String::new();
    html.push_str("<aside class=\"panel\">\n");
    let _ = writeln!(
        html,
        "<a class=\"close\" href=\"{}\" aria-label=\"Zamknij\">&times;</a>",
        escape_html(close_href)
    );
    let _ = writeln!(
        html,
        "<header><h2>{}</h2><p class=\"muted\">{}</p></header>",
        escape_html(&panel.title),
        escape_html(&panel.description)
    );
    html.push_str("<div class=\"actions\">\n");
    let _ = writeln!(
        html,
        "<p>Lokalizacja: {}</p>",
        escape_html(panel.address.as_deref().unwrap_or(""))
    );
    let _ = writeln!(
        html,
        "<p>Data wydarzenia: {}</p>",
        escape_html(&panel.occurred_at)
    );
    if let Some(info_url) = &panel.info_url {
        let _ = writeln!(
            html,
            "<a class=\"link\" href=\"{}\">Więcej informacji</a>",
            escape_html(info_url)
        );
    }
    let _ = writeln!(
        html,
        "<a class=\"button\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Nawiguj</a>",
        escape_html(&panel.navigate_url)
    );
    let _ = writeln!(
        html,
        "<a class=\"button\" href=\"{}\">Wezwij pomoc</a>",
        panel.emergency_url
    );
    html.push_str("</div>\n</aside>\n");
    html
}

/// Renders the full-screen map with one marker per zone and the detail
/// panel for `state`.
///
/// # Errors
///
/// Returns [`MapError::Json`] if the marker data cannot be serialized.
pub fn render_map_page(
    zones: &[DangerZone],
    settings: &MapSettings,
    state: PanelState,
) -> Result<String, MapError> {
    let markers = script_json(&marker_views(zones, state))?;
    let center = script_json(&[settings.center.latitude, settings.center.longitude])?;
    let tile_url = script_json(&TILE_URL)?;
    let attribution = script_json(&TILE_ATTRIBUTION)?;

    let head = format!("<link rel=\"stylesheet\" href=\"{LEAFLET_CSS}\">\n");

    let mut body = String::from("<div id=\"map\"></div>\n");

    if let Some(zone) = state.open_index().and_then(|i| zones.get(i)) {
        body.push_str(&render_panel(
            &DetailPanel::for_zone(zone),
            &state.close().href(),
        ));
    }

    let _ = write!(
        body,
        "<script src=\"{LEAFLET_JS}\"></script>\n<script>\n\
         const MARKERS = {markers};\n\
         const map = L.map('map').setView({center}, {zoom});\n\
         L.tileLayer({tile_url}, {{ attribution: {attribution} }}).addTo(map);\n\
         for (const m of MARKERS) {{\n\
         \x20 const icon = L.divIcon({{ className: m.style.className + (m.active ? ' active' : ''), iconAnchor: [0, 24], popupAnchor: [0, -36] }});\n\
         \x20 const marker = L.marker([m.position.latitude, m.position.longitude], {{ icon }}).addTo(map);\n\
         \x20 const tip = document.createElement('span');\n\
         \x20 tip.textContent = m.title;\n\
         \x20 marker.bindTooltip(tip);\n\
         \x20 marker.on('click', () => {{ if (m.href) {{ window.location.href = m.href; }} }});\n\
         }}\n\
         </script>\n",
        zoom = settings.zoom,
    );

    Ok(layout("Mapa | Safe Steps", &head, &body))
}
