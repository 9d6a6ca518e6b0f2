//! Alert and outage history recorded against a patient.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Coordinates, RecordId, extract_coordinates};

/// Which history an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Fall or distress alert raised by the device.
    Alert,
    /// Device connectivity outage.
    Outage,
}

/// One alert or outage entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: RecordId,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub video_url: Option<String>,
    pub last_known_location: Option<String>,
    /// Parsed from `last_known_location`; absent when unparseable.
    pub coordinates: Option<Coordinates>,
}

impl EventRecord {
    /// Build a record, extracting coordinates from the location text.
    pub fn new(
        id: RecordId,
        kind: EventKind,
        timestamp: DateTime<Utc>,
        video_url: Option<String>,
        last_known_location: Option<String>,
    ) -> Self {
        let coordinates = last_known_location.as_deref().and_then(extract_coordinates);
        Self {
            id,
            kind,
            timestamp,
            video_url,
            last_known_location,
            coordinates,
        }
    }

    /// Map link for the event location, when one could be parsed.
    pub fn map_link(&self) -> Option<String> {
        self.coordinates.as_ref().map(Coordinates::map_link)
    }
}

/// Content of one dashboard panel that may fail independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "items", rename_all = "camelCase")]
pub enum PanelState<T> {
    Loaded(T),
    /// The fetch failed; the view renders a placeholder.
    Unavailable,
}

impl<T> PanelState<T> {
    /// Borrow the loaded value.
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Unavailable => None,
        }
    }

    /// Whether the panel failed to load.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

/// Alert and outage panels for one patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientEvents {
    pub patient_id: RecordId,
    pub alerts: PanelState<Vec<EventRecord>>,
    pub outages: PanelState<Vec<EventRecord>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn new_extracts_coordinates_from_location() {
        let record = EventRecord::new(
            RecordId::new(9),
            EventKind::Alert,
            at_noon(),
            None,
            Some("https://maps.google.com/?q=14.5,121.0".to_owned()),
        );
        let coords = record.coordinates.expect("coordinates");
        assert_eq!((coords.latitude, coords.longitude), (14.5, 121.0));
        assert!(record.map_link().is_some());
    }

    #[test]
    fn unparseable_location_keeps_raw_text() {
        let record = EventRecord::new(
            RecordId::new(1),
            EventKind::Outage,
            at_noon(),
            None,
            Some("near the market".to_owned()),
        );
        assert!(record.coordinates.is_none());
        assert_eq!(record.last_known_location.as_deref(), Some("near the market"));
        assert!(record.map_link().is_none());
    }

    #[test]
    fn panels_serialise_with_state_tag() {
        let events = PatientEvents {
            patient_id: RecordId::new(3),
            alerts: PanelState::Loaded(Vec::new()),
            outages: PanelState::Unavailable,
        };
        assert_eq!(
            serde_json::to_value(events).expect("serialise"),
            json!({
                "patientId": 3,
                "alerts": { "state": "loaded", "items": [] },
                "outages": { "state": "unavailable" },
            })
        );
    }
}
