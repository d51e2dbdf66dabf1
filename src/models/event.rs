use serde::{Deserialize, Serialize};
use std::fmt;

/// Event timestamp as supplied by the feed.
///
/// Kept opaque: epoch milliseconds stay a JSON number and placeholder
/// strings stay strings. Nothing downstream parses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTime {
    Number(serde_json::Number),
    Text(String),
}

impl EventTime {
    pub fn from_millis(millis: i64) -> Self {
        EventTime::Number(millis.into())
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Number(n) => write!(f, "{}", n),
            EventTime::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A single normalized earthquake record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeismicEvent {
    place: String,
    magnitude: f64,
    longitude: f64,
    latitude: f64,
    depth_km: f64,
    time: EventTime,
}

impl SeismicEvent {
    pub fn new(
        place: impl Into<String>,
        magnitude: f64,
        longitude: f64,
        latitude: f64,
        depth_km: f64,
        time: EventTime,
    ) -> Self {
        SeismicEvent {
            place: place.into(),
            magnitude,
            longitude,
            latitude,
            depth_km,
            time,
        }
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn depth_km(&self) -> f64 {
        self.depth_km
    }

    pub fn time(&self) -> &EventTime {
        &self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_time_keeps_integer_millis() {
        let time: EventTime = serde_json::from_str("1700000000123").unwrap();
        assert_eq!(time, EventTime::from_millis(1700000000123));
        assert_eq!(time.to_string(), "1700000000123");
        assert_eq!(serde_json::to_string(&time).unwrap(), "1700000000123");
    }

    #[test]
    fn test_event_time_text_passthrough() {
        let time: EventTime = serde_json::from_str("\"Demo\"").unwrap();
        assert_eq!(time, EventTime::Text("Demo".to_string()));
        assert_eq!(time.to_string(), "Demo");
    }

    #[test]
    fn test_accessors() {
        let event = SeismicEvent::new("Andaman Sea", 7.2, 92.5, 10.1, 30.0, EventTime::from_millis(0));
        assert_eq!(event.place(), "Andaman Sea");
        assert_eq!(event.magnitude(), 7.2);
        assert_eq!(event.longitude(), 92.5);
        assert_eq!(event.latitude(), 10.1);
        assert_eq!(event.depth_km(), 30.0);
    }
}
