//! Alerting module for tsunami risk notifications
//!
//! Renders the alert text for a risk report and dispatches reports
//! asynchronously to Slack, Discord, and generic webhooks.

use crate::config::{AlertConfig, DiscordConfig, SlackConfig, WebhookConfig};
use crate::models::{RiskLevel, RiskReport};
use reqwest::Client;
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::mpsc;

/// Capacity of the alert channel between producers and the dispatcher
pub const ALERT_CHANNEL_CAPACITY: usize = 100;

/// Errors that can occur during alert dispatch
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Alert channel closed")]
    ChannelClosed,
}

/// Render the human-readable alert for a report.
///
/// Every tier gets the same template, including `Low`.
pub fn generate_alert(report: &RiskReport) -> String {
    format!(
        "🌊 Tsunami Alert for {}!\nMagnitude: {}\nDepth: {} km\nRisk Level: {}\nTime: {}",
        report.place, report.magnitude, report.depth_km, report.risk, report.time
    )
}

/// Async alert dispatcher
///
/// Runs as a tokio task, receiving risk reports from a channel and
/// forwarding them to every configured notification channel.
pub struct AlertDispatcher {
    config: AlertConfig,
    client: Client,
}

impl AlertDispatcher {
    pub fn new(config: AlertConfig) -> Result<Self, AlertError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(AlertDispatcher { config, client })
    }

    pub fn min_risk(&self) -> RiskLevel {
        self.config.min_risk
    }

    /// Create a sender/receiver pair for queueing alerts
    pub fn create_channel() -> (mpsc::Sender<RiskReport>, mpsc::Receiver<RiskReport>) {
        mpsc::channel(ALERT_CHANNEL_CAPACITY)
    }

    /// Whether a report passes the enabled flag and the minimum tier
    pub fn should_dispatch(&self, report: &RiskReport) -> bool {
        self.config.enabled && report.risk >= self.config.min_risk
    }

    /// Run the alert dispatch loop until every sender is dropped
    pub async fn run(self, mut rx: mpsc::Receiver<RiskReport>) {
        log::info!("Alert dispatcher started");

        while let Some(report) = rx.recv().await {
            if !self.should_dispatch(&report) {
                log::debug!(
                    "Skipping alert for {} (risk {}, min {})",
                    report.place,
                    report.risk,
                    self.config.min_risk
                );
                continue;
            }

            log::info!("Dispatching alert: {} (risk {})", report.place, report.risk);

            if let Err(e) = self.dispatch_alert(&report).await {
                log::error!("Failed to dispatch alert: {}", e);
            }
        }

        log::info!("Alert dispatcher stopped");
    }

    /// Dispatch an alert to all configured channels
    pub async fn dispatch_alert(&self, report: &RiskReport) -> Result<(), AlertError> {
        let mut errors = Vec::new();

        if let Some(ref slack) = self.config.slack {
            if let Err(e) = self.send_slack_alert(slack, report).await {
                log::error!("Slack alert failed: {}", e);
                errors.push(e);
            }
        }

        if let Some(ref discord) = self.config.discord {
            if let Err(e) = self.send_discord_alert(discord, report).await {
                log::error!("Discord alert failed: {}", e);
                errors.push(e);
            }
        }

        for webhook in &self.config.webhooks {
            if let Err(e) = self.send_generic_webhook(webhook, report).await {
                log::error!("Webhook {} failed: {}", webhook.name, e);
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.remove(0))
        }
    }

    async fn send_slack_alert(
        &self,
        config: &SlackConfig,
        report: &RiskReport,
    ) -> Result<(), AlertError> {
        let color = match report.risk {
            RiskLevel::High => "danger",
            RiskLevel::Moderate => "warning",
            RiskLevel::Low => "good",
        };

        let payload = serde_json::json!({
            "channel": config.channel,
            "username": config.username.as_deref().unwrap_or("Tsunami Watch"),
            "icon_emoji": ":ocean:",
            "attachments": [{
                "color": color,
                "title": format!("{} risk: {}", report.risk, report.place),
                "text": generate_alert(report),
                "fields": [
                    { "title": "Magnitude", "value": report.magnitude.to_string(), "short": true },
                    { "title": "Depth", "value": format!("{} km", report.depth_km), "short": true },
                ],
            }]
        });

        let response = self
            .client
            .post(&config.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            log::warn!("Slack returned non-success status: {}", response.status());
        }

        Ok(())
    }

    async fn send_discord_alert(
        &self,
        config: &DiscordConfig,
        report: &RiskReport,
    ) -> Result<(), AlertError> {
        let color = match report.risk {
            RiskLevel::High => 0xFF0000,
            RiskLevel::Moderate => 0xFFCC00,
            RiskLevel::Low => 0x00CCFF,
        };

        let payload = serde_json::json!({
            "username": config.username.as_deref().unwrap_or("Tsunami Watch"),
            "embeds": [{
                "title": format!(":ocean: {} risk: {}", report.risk, report.place),
                "description": generate_alert(report),
                "color": color,
                "fields": [
                    { "name": "Latitude", "value": report.coordinates.lat.to_string(), "inline": true },
                    { "name": "Longitude", "value": report.coordinates.lon.to_string(), "inline": true },
                ],
                "footer": {
                    "text": "Tsunami Watch"
                }
            }]
        });

        let response = self
            .client
            .post(&config.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            log::warn!("Discord returned non-success status: {}", response.status());
        }

        Ok(())
    }

    async fn send_generic_webhook(
        &self,
        config: &WebhookConfig,
        report: &RiskReport,
    ) -> Result<(), AlertError> {
        let method = config.method.as_deref().unwrap_or("POST");

        let mut request = match method.to_uppercase().as_str() {
            "PUT" => self.client.put(&config.url),
            _ => self.client.post(&config.url),
        };

        if let Some(ref headers) = config.headers {
            for (key, value) in headers {
                request = request.header(key, value);
            }
        }

        let response = request.json(report).send().await?;

        if !response.status().is_success() {
            log::warn!(
                "Webhook {} returned non-success status: {}",
                config.name,
                response.status()
            );
        }

        Ok(())
    }
}

/// Remembers which events have already been alerted on.
///
/// Only keys from the most recent poll are kept, so memory stays bounded by
/// the size of one lookback window.
#[derive(Debug, Default)]
pub struct AlertLedger {
    alerted: HashSet<String>,
}

impl AlertLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity of an event across polls
    pub fn key(report: &RiskReport) -> String {
        format!("{}|{}", report.place, report.time)
    }

    /// Return the reports not seen in the previous poll and forget
    /// everything that has left the window.
    pub fn fresh<'a>(&mut self, reports: &'a [RiskReport]) -> Vec<&'a RiskReport> {
        let current: HashSet<String> = reports.iter().map(Self::key).collect();
        self.alerted.retain(|k| current.contains(k));

        reports
            .iter()
            .filter(|report| self.alerted.insert(Self::key(report)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.alerted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerted.is_empty()
    }
}

/// Sync-friendly handle for queueing alerts to the dispatcher
#[derive(Clone)]
pub struct AlertQueue {
    tx: mpsc::Sender<RiskReport>,
}

impl AlertQueue {
    pub fn new(tx: mpsc::Sender<RiskReport>) -> Self {
        AlertQueue { tx }
    }

    /// Queue an alert without blocking. Drops the alert if the queue is full.
    pub fn queue_alert(&self, report: RiskReport) {
        if let Err(e) = self.tx.try_send(report) {
            match e {
                mpsc::error::TrySendError::Full(_) => {
                    log::warn!("Alert queue full, dropping alert");
                }
                mpsc::error::TrySendError::Closed(_) => {
                    log::warn!("Alert queue closed");
                }
            }
        }
    }

    pub async fn queue_alert_async(&self, report: RiskReport) -> Result<(), AlertError> {
        self.tx
            .send(report)
            .await
            .map_err(|_| AlertError::ChannelClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
