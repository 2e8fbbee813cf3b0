//! Degraded-mode substitutes used when the search service is unreachable.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::model::types::{EntityType, ResultItem};

/// Advisory shown when a surface uses [`FallbackDialect::Advisory`].
pub const RETRY_ADVISORY: &str = "Something went wrong. Please try again.";

/// Advisory shown alongside the canned offline sample.
pub const OFFLINE_ADVISORY: &str = "Search service unavailable; showing offline sample results.";

/// How a search surface degrades when a gateway call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackDialect {
    /// Substitute a small canned list filtered by the query text.
    CannedSample,
    /// Zero results plus a generic "try again later" advisory.
    Advisory,
}

impl FromStr for FallbackDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "canned_sample" | "canned" | "sample" => Ok(Self::CannedSample),
            "advisory" | "message" => Ok(Self::Advisory),
            other => Err(format!("unknown fallback dialect '{other}'")),
        }
    }
}

impl FallbackDialect {
    /// Items and advisory text for a failed search of `text`.
    pub fn degrade(self, text: &str) -> (Vec<ResultItem>, &'static str) {
        match self {
            FallbackDialect::CannedSample => (canned_matches(text), OFFLINE_ADVISORY),
            FallbackDialect::Advisory => (Vec::new(), RETRY_ADVISORY),
        }
    }
}

fn canned_sample() -> Vec<ResultItem> {
    vec![
        ResultItem::new("1", "HardwarePanel", "Hardware Panel 1", 0.95)
            .with_description("Main cockpit panel")
            .with_manufacturer("OpenA3XX")
            .with_snippet("Main cockpit panel for aircraft configuration")
            .with_action("view", "/view/hardware-panel-details?id=1"),
        ResultItem::new("2", "HardwareOutputType", "LED Generic Indicator", 0.87)
            .with_description("LED indicator component")
            .with_manufacturer("OpenA3XX")
            .with_snippet("LED indicator component for status display")
            .with_action("view", "/manage/hardware-output-types"),
        ResultItem::new("3", "HardwareInputType", "Button Switch", 0.82)
            .with_description("Push button switch")
            .with_manufacturer("OpenA3XX")
            .with_snippet("Push button switch for user input")
            .with_action("view", "/manage/hardware-input-types"),
    ]
}

/// Canned offline items whose title, entity type or description contains `text`.
pub fn canned_matches(text: &str) -> Vec<ResultItem> {
    let needle = text.trim();
    canned_sample()
        .into_iter()
        .filter(|item| item.matches_text(needle))
        .collect()
}

/// Static entity-type catalog served when the service cannot provide one.
pub fn default_entity_types() -> Vec<EntityType> {
    [
        ("AircraftModel", "Aircraft Models", "Aircraft model definitions", "airplanemode_active"),
        ("HardwarePanel", "Hardware Panels", "Hardware panel configurations", "dashboard"),
        ("HardwareBoard", "Hardware Boards", "Hardware board definitions", "memory"),
        ("HardwareInput", "Hardware Inputs", "Hardware input devices", "login"),
        ("HardwareOutput", "Hardware Outputs", "Hardware output devices", "logout"),
        ("HardwareInputType", "Hardware Input Types", "Hardware input type definitions", "input"),
        ("HardwareOutputType", "Hardware Output Types", "Hardware output type definitions", "output"),
        ("SimulatorEvent", "Simulator Events", "Simulator event definitions", "laptop"),
    ]
    .into_iter()
    .map(|(id, name, description, icon)| EntityType {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        icon: icon.into(),
    })
    .collect()
}
