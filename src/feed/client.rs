use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;

use super::clock::{Clock, SystemClock};
use super::geojson::parse_feed;
use crate::config::FeedConfig;
use crate::models::SeismicEvent;

/// Only events at or above this magnitude are requested from the feed
pub const MIN_FEED_MAGNITUDE: f64 = 5.0;

const FEED_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Errors that can occur while fetching the earthquake feed
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Lookback window must be a positive number of hours, got {0}")]
    InvalidWindow(f64),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Feed request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Feed returned HTTP {0}")]
    Status(u16),

    #[error("Malformed feed body: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FeedError::Timeout
        } else {
            FeedError::Transport(e)
        }
    }
}

/// Client for the USGS FDSN earthquake event feed
///
/// One call is one round trip: no retry, caching, or pagination.
pub struct EarthquakeFeedClient {
    endpoint: String,
    client: Client,
    clock: Arc<dyn Clock>,
}

impl EarthquakeFeedClient {
    /// Create a client using the system clock
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a client with a custom time source
    pub fn with_clock(config: &FeedConfig, clock: Arc<dyn Clock>) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FeedError::Client)?;

        Ok(EarthquakeFeedClient {
            endpoint: config.endpoint.clone(),
            client,
            clock,
        })
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Fetch events reported in the last `window_hours`, reporting failures.
    pub async fn fetch_events(&self, window_hours: f64) -> Result<Vec<SeismicEvent>, FeedError> {
        let (start, end) = window_bounds(self.clock.now(), window_hours)?;
        let start = start.format(FEED_TIME_FORMAT).to_string();
        let end = end.format(FEED_TIME_FORMAT).to_string();
        let min_magnitude = MIN_FEED_MAGNITUDE.to_string();

        log::debug!("Querying {} for events between {} and {}", self.endpoint, start, end);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("format", "geojson"),
                ("starttime", start.as_str()),
                ("endtime", end.as_str()),
                ("minmagnitude", min_magnitude.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let events = parse_feed(&body)?;

        log::info!(
            "Feed returned {} event(s) for the last {} hour(s)",
            events.len(),
            window_hours
        );
        Ok(events)
    }

    /// Fetch events reported in the last `window_hours`.
    ///
    /// Any failure yields an empty list. An empty result therefore means
    /// "no data available", not "no earthquakes occurred".
    pub async fn fetch_recent_events(&self, window_hours: f64) -> Vec<SeismicEvent> {
        match self.fetch_events(window_hours).await {
            Ok(events) => events,
            Err(e) => {
                log::warn!("Earthquake feed unavailable: {}", e);
                Vec::new()
            }
        }
    }
}

/// Compute the `[now - window_hours, now]` query window
pub fn window_bounds(
    now: DateTime<Utc>,
    window_hours: f64,
) -> Result<(DateTime<Utc>, DateTime<Utc>), FeedError> {
    if !window_hours.is_finite() || window_hours <= 0.0 {
        return Err(FeedError::InvalidWindow(window_hours));
    }

    let millis = (window_hours * 3_600_000.0).round();
    let span = Duration::try_milliseconds(millis as i64).ok_or(FeedError::InvalidWindow(window_hours))?;
    let start = now
        .checked_sub_signed(span)
        .ok_or(FeedError::InvalidWindow(window_hours))?;

    Ok((start, now))
}
