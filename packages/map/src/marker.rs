//! Map markers and the detail-panel state machine.
//!
//! The panel is either closed or open for exactly one marker, and the
//! state lives in the page URL (`/map?zone=<index>`). Each marker's click
//! target is computed from the current state; the marker whose panel is
//! already open has none, so clicking it again does nothing.

use safe_steps_zone_models::{Coordinates, DangerLevel, DangerZone};
use serde::Serialize;

/// Path of the map page.
pub const MAP_PATH: &str = "/map";

/// Which detail panel, if any, is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PanelState {
    /// No panel open.
    #[default]
    Closed,
    /// Panel open for the marker at this index.
    Open(usize),
}

impl PanelState {
    /// Builds the state from the `zone` query parameter. Indices past the
    /// end of the zone list are treated as closed.
    #[must_use]
    pub fn from_query(zone: Option<usize>, zone_count: usize) -> Self {
        match zone {
            Some(index) if index < zone_count => Self::Open(index),
            Some(index) => {
                log::debug!("Ignoring out-of-range zone index {index} ({zone_count} zones)");
                Self::Closed
            }
            None => Self::Closed,
        }
    }

    /// The state after clicking marker `index`, or `None` if the click is a
    /// no-op because that marker's panel is already open.
    #[must_use]
    pub fn click(self, index: usize) -> Option<Self> {
        match self {
            Self::Open(open) if open == index => None,
            _ => Some(Self::Open(index)),
        }
    }

    /// The state after dismissing the panel.
    #[must_use]
    pub const fn close(self) -> Self {
        Self::Closed
    }

    /// The open marker index, if any.
    #[must_use]
    pub const fn open_index(self) -> Option<usize> {
        match self {
            Self::Open(index) => Some(index),
            Self::Closed => None,
        }
    }

    /// The map page URL that renders this state.
    #[must_use]
    pub fn href(self) -> String {
        match self {
            Self::Closed => MAP_PATH.to_string(),
            Self::Open(index) => format!("{MAP_PATH}?zone={index}"),
        }
    }
}

/// Visual treatment for one danger level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    /// CSS classes applied to the marker icon.
    pub class_name: &'static str,
    /// Fill/border color, for legends.
    pub color: &'static str,
}

impl MarkerStyle {
    #[must_use]
    pub const fn for_level(level: DangerLevel) -> Self {
        match level {
            DangerLevel::Low => Self {
                class_name: "danger-marker danger-low",
                color: "#eab308",
            },
            DangerLevel::Medium => Self {
                class_name: "danger-marker danger-medium",
                color: "#f97316",
            },
            DangerLevel::High => Self {
                class_name: "danger-marker danger-high",
                color: "#ef4444",
            },
        }
    }
}

/// What the map script needs to draw one marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerView {
    /// Position of the zone in the resolved list.
    pub index: usize,
    /// Marker position.
    pub position: Coordinates,
    /// Tooltip text.
    pub title: String,
    /// Visual treatment.
    pub style: MarkerStyle,
    /// Where a click navigates; `None` when the click is a no-op.
    pub href: Option<String>,
    /// Whether this marker's panel is the open one.
    pub active: bool,
}

/// Builds one marker per zone, in zone order.
#[must_use]
pub fn marker_views(zones: &[DangerZone], state: PanelState) -> Vec<MarkerView> {
    zones
        .iter()
        .enumerate()
        .map(|(index, zone)| MarkerView {
            index,
            position: zone.position,
            title: zone.title.clone(),
            style: MarkerStyle::for_level(zone.level),
            href: state.click(index).map(PanelState::href),
            active: state.open_index() == Some(index),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use safe_steps_zone_models::parse_timestamp;

    use super::*;

    fn zone(level: DangerLevel, lat: f64) -> DangerZone {
        DangerZone {
            address: Some("Rye Lane".to_string()),
            title: format!("Zdarzenie {lat}"),
            description: "Opis".to_string(),
            level,
            occurred_at: parse_timestamp("2025-10-04T13:45:00+01:00").unwrap(),
            position: Coordinates::new(lat, -0.1),
            info_url: "https://example.com".to_string(),
        }
    }

    #[test]
    fn clicking_a_closed_marker_opens_it() {
        assert_eq!(PanelState::Closed.click(3), Some(PanelState::Open(3)));
    }

    #[test]
    fn clicking_the_open_marker_is_a_no_op() {
        assert_eq!(PanelState::Open(2).click(2), None);
    }

    #[test]
    fn clicking_another_marker_switches_panel() {
        assert_eq!(PanelState::Open(2).click(0), Some(PanelState::Open(0)));
    }

    #[test]
    fn close_returns_to_closed() {
        assert_eq!(PanelState::Open(1).close(), PanelState::Closed);
        assert_eq!(PanelState::Closed.close().href(), "/map");
    }

    #[test]
    fn query_index_is_bounds_checked() {
        assert_eq!(PanelState::from_query(Some(1), 3), PanelState::Open(1));
        assert_eq!(PanelState::from_query(Some(3), 3), PanelState::Closed);
        assert_eq!(PanelState::from_query(None, 3), PanelState::Closed);
    }

    #[test]
    fn one_marker_per_zone_in_order() {
        let zones = [
            zone(DangerLevel::High, 51.1),
            zone(DangerLevel::Low, 51.2),
            zone(DangerLevel::Medium, 51.3),
        ];
        let markers = marker_views(&zones, PanelState::Closed);

        assert_eq!(markers.len(), 3);
        for (i, marker) in markers.iter().enumerate() {
            assert_eq!(marker.index, i);
            assert_eq!(marker.position, zones[i].position);
            assert_eq!(marker.title, zones[i].title);
            assert_eq!(marker.href.as_deref(), Some(format!("/map?zone={i}").as_str()));
            assert!(!marker.active);
        }
        assert_eq!(markers[0].style.class_name, "danger-marker danger-high");
        assert_eq!(markers[1].style.class_name, "danger-marker danger-low");
        assert_eq!(markers[2].style.class_name, "danger-marker danger-medium");
    }

    #[test]
    fn open_marker_has_no_click_target() {
        let zones = [zone(DangerLevel::High, 51.1), zone(DangerLevel::Low, 51.2)];
        let markers = marker_views(&zones, PanelState::Open(1));

        assert_eq!(markers[0].href.as_deref(), Some("/map?zone=0"));
        assert!(!markers[0].active);
        assert_eq!(markers[1].href, None);
        assert!(markers[1].active);
    }

    #[test]
    fn styles_are_distinct_per_level() {
        let styles: Vec<MarkerStyle> = DangerLevel::all()
            .iter()
            .map(|l| MarkerStyle::for_level(*l))
            .collect();
        assert_ne!(styles[0], styles[1]);
        assert_ne!(styles[1], styles[2]);
        assert_ne!(styles[0], styles[2]);
    }
}
