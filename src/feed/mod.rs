//! Earthquake feed ingestion
//!
//! Fetches recent events from a USGS FDSN endpoint and normalizes the
//! GeoJSON records into [`SeismicEvent`](crate::models::SeismicEvent)s.

pub mod client;
pub mod clock;
pub mod geojson;

pub use client::{EarthquakeFeedClient, FeedError, MIN_FEED_MAGNITUDE};
pub use clock::{Clock, FixedClock, SystemClock};
pub use geojson::{parse_feed, RecordError};
