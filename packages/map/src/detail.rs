//! The detail panel shown for an open marker.

use chrono::{DateTime, FixedOffset};
use safe_steps_zone_models::{Coordinates, DangerLevel, DangerZone};

/// Fixed emergency-call link (European emergency number).
pub const EMERGENCY_URL: &str = "tel:112";

/// Directions deep link base; the destination is appended as `lat,lng`.
const NAVIGATE_BASE_URL: &str = "https://www.google.com/maps/dir/?api=1&destination=";

/// Display layout for event dates (`4.10.2025, 13:45:00`).
const LOCAL_DATE_FORMAT: &str = "%-d.%m.%Y, %H:%M:%S";

/// Everything the panel displays for one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPanel {
    /// Panel heading.
    pub title: String,
    /// Text under the heading.
    pub description: String,
    /// Place description, if known.
    pub address: Option<String>,
    /// Event date formatted for display.
    pub occurred_at: String,
    /// Classification of the zone.
    pub level: DangerLevel,
    /// "More information" link; `None` unless it is an `http(s)` URL.
    pub info_url: Option<String>,
    /// Directions to the zone.
    pub navigate_url: String,
    /// Emergency-call link.
    pub emergency_url: &'static str,
}

impl DetailPanel {
    #[must_use]
    pub fn for_zone(zone: &DangerZone) -> Self {
        Self {
            title: zone.title.clone(),
            description: zone.description.clone(),
            address: zone.address.clone(),
            occurred_at: format_local(&zone.occurred_at),
            level: zone.level,
            info_url: web_link(&zone.info_url),
            navigate_url: navigate_url(zone.position),
            emergency_url: EMERGENCY_URL,
        }
    }
}

/// Builds the directions link for a position.
#[must_use]
pub fn navigate_url(position: Coordinates) -> String {
    format!(
        "{NAVIGATE_BASE_URL}{},{}",
        position.latitude, position.longitude
    )
}

/// Returns `url` trimmed if it uses the `http` or `https` scheme.
#[must_use]
pub fn web_link(url: &str) -> Option<String> {
    let url = url.trim();
    let scheme = url.split_once(':').map(|(scheme, _)| scheme)?;
    (scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"))
        .then(|| url.to_string())
}

/// Formats an event date in its own offset.
#[must_use]
pub fn format_local(occurred_at: &DateTime<FixedOffset>) -> String {
    occurred_at.format(LOCAL_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use safe_steps_zone_models::parse_timestamp;

    use super::*;

    fn zone() -> DangerZone {
        DangerZone {
            address: Some("Intersection of Rye Lane and Peckham High Street".to_string()),
            title: "Strzelanina w Peckham".to_string(),
            description: "Strzelanina w Peckham".to_string(),
            level: DangerLevel::High,
            occurred_at: parse_timestamp("2025-09-30T23:55:00+01:00").unwrap(),
            position: Coordinates::new(51.4736, -0.0692),
            info_url: "https://example.com/news/peckham".to_string(),
        }
    }

    #[test]
    fn builds_navigate_link_from_position() {
        assert_eq!(
            navigate_url(Coordinates::new(51.4736, -0.0692)),
            "https://www.google.com/maps/dir/?api=1&destination=51.4736,-0.0692"
        );
    }

    #[test]
    fn formats_date_in_event_offset() {
        let dt = parse_timestamp("2025-10-04T08:05:09+02:00").unwrap();
        assert_eq!(format_local(&dt), "4.10.2025, 08:05:09");
    }

    #[test]
    fn keeps_only_web_links() {
        assert_eq!(
            web_link(" HTTPS://example.com/a ").as_deref(),
            Some("HTTPS://example.com/a")
        );
        assert_eq!(
            web_link("http://example.com").as_deref(),
            Some("http://example.com")
        );
        assert_eq!(web_link("javascript:alert(1)"), None);
        assert_eq!(web_link("JavaScript:alert(1)"), None);
        assert_eq!(web_link("data:text/html,<script>alert(1)</script>"), None);
        assert_eq!(web_link("/relative/path"), None);
        assert_eq!(web_link(""), None);
    }

    #[test]
    fn panel_drops_non_web_info_url() {
        let zone = DangerZone {
            info_url: "javascript:alert(1)".to_string(),
            ..zone()
        };
        assert_eq!(DetailPanel::for_zone(&zone).info_url, None);
    }

    #[test]
    fn panel_carries_zone_fields_and_fixed_links() {
        let panel = DetailPanel::for_zone(&zone());
        assert_eq!(panel.title, "Strzelanina w Peckham");
        assert_eq!(
            panel.address.as_deref(),
            Some("Intersection of Rye Lane and Peckham High Street")
        );
        assert_eq!(panel.occurred_at, "30.09.2025, 23:55:00");
        assert_eq!(
            panel.info_url.as_deref(),
            Some("https://example.com/news/peckham")
        );
        assert!(panel.navigate_url.ends_with("destination=51.4736,-0.0692"));
        assert_eq!(panel.emergency_url, "tel:112");
    }
}
