// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The event published when a watched act changes significantly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const EVENT_TYPE: &str = "legislation.changed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegislationChangeEvent {
    pub event_type: String,
    pub law_id: String,
    pub title: String,
    pub source_url: String,
    /// Character-length delta in percent, rounded to two decimals.
    pub change_percentage: f64,
    pub diff: String,
    pub timestamp: DateTime<Utc>,
}

impl LegislationChangeEvent {
    pub fn new(
        law_id: impl Into<String>,
        title: impl Into<String>,
        source_url: impl Into<String>,
        change_percentage: f64,
        diff: String,
    ) -> Self {
        Self {
            event_type: EVENT_TYPE.to_string(),
            law_id: law_id.into(),
            title: title.into(),
            source_url: source_url.into(),
            change_percentage: (change_percentage * 100.0).round() / 100.0,
            diff,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_wire_names() {
        let event = LegislationChangeEvent::new(
            "115-fz",
            "О правовом положении",
            "https://x.test",
            12.3456,
            "+ new".into(),
        );
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["eventType"], "legislation.changed");
        assert_eq!(json["lawId"], "115-fz");
        assert_eq!(json["sourceUrl"], "https://x.test");
        assert_eq!(json["changePercentage"], 12.35);
        assert_eq!(json["diff"], "+ new");
        assert!(json["timestamp"].is_string());
    }
}
