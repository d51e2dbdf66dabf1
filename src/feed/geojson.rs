//! GeoJSON feature normalization
//!
//! The feed body is a FeatureCollection. Each feature is checked on its own
//! so one bad record never sinks the batch.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::models::{EventTime, SeismicEvent};

/// Why a single feed record was rejected
#[derive(Error, Debug, PartialEq)]
pub enum RecordError {
    #[error("record has unexpected shape: {0}")]
    Shape(String),

    #[error("record is missing {0}")]
    MissingField(&'static str),

    #[error("expected 3 coordinates, found {0}")]
    Coordinates(usize),
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    properties: Option<RawProperties>,
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
struct RawProperties {
    /// Outer `None` when the key is absent, inner `None` when it is `null`
    #[serde(default, deserialize_with = "present")]
    place: Option<Option<String>>,
    mag: Option<f64>,
    time: Option<EventTime>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    coordinates: Option<Vec<f64>>,
}

fn normalize(raw: RawFeature) -> Result<SeismicEvent, RecordError> {
    let properties = raw.properties.ok_or(RecordError::MissingField("properties"))?;
    // USGS sends `"place": null` for unnamed locations
    let place = properties
        .place
        .ok_or(RecordError::MissingField("properties.place"))?
        .unwrap_or_default();
    let magnitude = properties.mag.ok_or(RecordError::MissingField("properties.mag"))?;
    let time = properties.time.ok_or(RecordError::MissingField("properties.time"))?;

    let coordinates = raw
        .geometry
        .and_then(|g| g.coordinates)
        .ok_or(RecordError::MissingField("geometry.coordinates"))?;

    // [longitude, latitude, depth_km]
    match coordinates.as_slice() {
        [longitude, latitude, depth_km, ..] => Ok(SeismicEvent::new(
            place, magnitude, *longitude, *latitude, *depth_km, time,
        )),
        other => Err(RecordError::Coordinates(other.len())),
    }
}

/// Normalize one GeoJSON feature
pub fn parse_feature(feature: Value) -> Result<SeismicEvent, RecordError> {
    let raw: RawFeature =
        serde_json::from_value(feature).map_err(|e| RecordError::Shape(e.to_string()))?;
    normalize(raw)
}

/// Parse a feed response body into events, dropping malformed records.
///
/// Fails only when the body as a whole is not a JSON object carrying a
/// `features` array.
pub fn parse_feed(body: &str) -> Result<Vec<SeismicEvent>, serde_json::Error> {
    let collection: FeatureCollection = serde_json::from_str(body)?;
    let total = collection.features.len();

    let events: Vec<SeismicEvent> = collection
        .features
        .into_iter()
        .enumerate()
        .filter_map(|(index, feature)| match parse_feature(feature) {
            Ok(event) => Some(event),
            Err(e) => {
                log::debug!("Dropping feed record {}: {}", index, e);
                None
            }
        })
        .collect();

    if events.len() < total {
        log::info!(
            "Dropped {} of {} feed record(s) with missing fields",
            total - events.len(),
            total
        );
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(mag: Value, coordinates: Value) -> Value {
        json!({
            "type": "Feature",
            "properties": { "place": "95 km W of Banda Aceh", "mag": mag, "time": 1700000000000i64 },
            "geometry": { "type": "Point", "coordinates": coordinates },
            "id": "us7000abcd"
        })
    }

    #[test]
    fn test_parse_well_formed_feature() {
        let event = parse_feature(feature(json!(7.8), json!([94.5, 5.4, 25.0]))).unwrap();
        assert_eq!(event.place(), "95 km W of Banda Aceh");
        assert_eq!(event.magnitude(), 7.8);
        assert_eq!(event.longitude(), 94.5);
        assert_eq!(event.latitude(), 5.4);
        assert_eq!(event.depth_km(), 25.0);
        assert_eq!(event.time(), &EventTime::from_millis(1700000000000));
    }

    #[test]
    fn test_missing_magnitude_is_rejected() {
        let mut value = feature(json!(7.0), json!([94.5, 5.4, 25.0]));
        value["properties"].as_object_mut().unwrap().remove("mag");
        assert_eq!(
            parse_feature(value),
            Err(RecordError::MissingField("properties.mag"))
        );
    }

    #[test]
    fn test_null_place_is_kept_as_unknown() {
        let mut value = feature(json!(7.9), json!([95.0, 3.0, 20.0]));
        value["properties"]["place"] = Value::Null;

        let event = parse_feature(value).unwrap();
        assert_eq!(event.place(), "");
        assert_eq!(event.magnitude(), 7.9);
    }

    #[test]
    fn test_absent_place_is_rejected() {
        let mut value = feature(json!(7.9), json!([95.0, 3.0, 20.0]));
        value["properties"].as_object_mut().unwrap().remove("place");
        assert_eq!(
            parse_feature(value),
            Err(RecordError::MissingField("properties.place"))
        );
    }

    #[test]
    fn test_null_magnitude_is_rejected() {
        let result = parse_feature(feature(Value::Null, json!([94.5, 5.4, 25.0])));
        assert_eq!(result, Err(RecordError::MissingField("properties.mag")));
    }

    #[test]
    fn test_short_coordinates_are_rejected() {
        let result = parse_feature(feature(json!(6.0), json!([94.5, 5.4])));
        assert_eq!(result, Err(RecordError::Coordinates(2)));
    }

    #[test]
    fn test_non_numeric_magnitude_is_rejected() {
        let result = parse_feature(feature(json!("big"), json!([94.5, 5.4, 25.0])));
        assert!(matches!(result, Err(RecordError::Shape(_))));
    }

    #[test]
    fn test_batch_keeps_good_records() {
        let mut bad = feature(json!(6.1), json!([10.0, 10.0, 10.0]));
        bad["properties"].as_object_mut().unwrap().remove("mag");
        let body = json!({
            "type": "FeatureCollection",
            "features": [bad, feature(json!(6.1), json!([120.0, -5.0, 40.0]))]
        })
        .to_string();

        let events = parse_feed(&body).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].longitude(), 120.0);
    }

    #[test]
    fn test_body_without_features_is_malformed() {
        assert!(parse_feed(r#"{"type": "FeatureCollection"}"#).is_err());
        assert!(parse_feed("<html>Service Unavailable</html>").is_err());
    }

    #[test]
    fn test_empty_feature_list() {
        let events = parse_feed(r#"{"features": []}"#).unwrap();
        assert!(events.is_empty());
    }
}
