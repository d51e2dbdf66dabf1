//! One assessment cycle: fetch, fall back, classify, summarize

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier;
use crate::config::FeedConfig;
use crate::feed::{EarthquakeFeedClient, FeedError};
use crate::models::{EventTime, RiskReport, SeismicEvent};

/// Where the events in an assessment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Straight from the feed (possibly an empty, successful response)
    Live,
    /// The feed yielded nothing and the demonstration event was substituted
    Demo,
    /// The feed failed and no fallback was configured
    Unavailable,
}

/// Result of one monitoring cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub earthquakes: Vec<RiskReport>,
    /// Events found before the report limit was applied
    pub total_found: usize,
    pub hours_checked: f64,
    pub timestamp: DateTime<Utc>,
    pub source: DataSource,
}

/// The Andaman Sea placeholder used when no live data is available
pub fn demo_event(now: DateTime<Utc>) -> SeismicEvent {
    SeismicEvent::new(
        "Andaman Sea",
        7.2,
        92.5,
        10.1,
        30.0,
        EventTime::from_millis(now.timestamp_millis()),
    )
}

/// Ties the feed client to the classifier
pub struct TsunamiMonitor {
    client: EarthquakeFeedClient,
    max_reports: usize,
    demo_fallback: bool,
}

impl TsunamiMonitor {
    pub fn new(client: EarthquakeFeedClient, config: &FeedConfig) -> Self {
        TsunamiMonitor {
            client,
            max_reports: config.max_reports,
            demo_fallback: config.demo_fallback,
        }
    }

    pub fn client(&self) -> &EarthquakeFeedClient {
        &self.client
    }

    /// Run one cycle over the last `window_hours`
    pub async fn assess(&self, window_hours: f64) -> Assessment {
        let fetched = self.client.fetch_events(window_hours).await;
        self.build_assessment(fetched, window_hours)
    }

    fn build_assessment(
        &self,
        fetched: Result<Vec<SeismicEvent>, FeedError>,
        window_hours: f64,
    ) -> Assessment {
        let now = self.client.clock().now();

        let (events, source) = match fetched {
            Ok(events) if !events.is_empty() => (events, DataSource::Live),
            Ok(_) if self.demo_fallback => {
                log::info!("No qualifying events in the last {} hour(s), using demo data", window_hours);
                (vec![demo_event(now)], DataSource::Demo)
            }
            Ok(events) => (events, DataSource::Live),
            Err(e) if self.demo_fallback => {
                log::warn!("Earthquake feed unavailable ({}), using demo data", e);
                (vec![demo_event(now)], DataSource::Demo)
            }
            Err(e) => {
                log::warn!("Earthquake feed unavailable: {}", e);
                (Vec::new(), DataSource::Unavailable)
            }
        };

        let total_found = events.len();
        let earthquakes: Vec<RiskReport> = events
            .iter()
            .take(self.max_reports)
            .map(classifier::classify)
            .collect();

        Assessment {
            earthquakes,
            total_found,
            hours_checked: window_hours,
            timestamp: now,
            source,
        }
    }
}
