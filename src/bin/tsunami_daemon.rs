use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tsunami_watch::config::Config;
use tsunami_watch::output::{OutputFormat, OutputHandler};
use tsunami_watch::{
    AlertDispatcher, AlertLedger, AlertQueue, DataSource, EarthquakeFeedClient, TsunamiMonitor,
};

/// Polls the earthquake feed, records risk reports, and dispatches alerts
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting Tsunami Watch daemon...");

    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        log::warn!("Config file not found, using defaults");
        Config::default()
    };

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal, gracefully stopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut output_handler = OutputHandler::new(
        OutputFormat::from_str(&config.output.format),
        config.output.file_path.clone(),
    )?;

    let (tx, rx) = AlertDispatcher::create_channel();
    let alert_queue = AlertQueue::new(tx);
    let dispatcher = AlertDispatcher::new(config.alerting.clone())?;
    let min_risk = dispatcher.min_risk();
    let dispatcher = tokio::spawn(dispatcher.run(rx));

    let client = EarthquakeFeedClient::new(&config.feed)?;
    let monitor = TsunamiMonitor::new(client, &config.feed);
    let poll_interval = Duration::from_secs(config.daemon.poll_interval_secs.max(1));

    log::info!(
        "Polling every {}s over a {} hour window. Press Ctrl+C to stop.",
        poll_interval.as_secs(),
        config.feed.window_hours
    );

    let mut ledger = AlertLedger::new();

    while running.load(Ordering::SeqCst) {
        let assessment = monitor.assess(config.feed.window_hours).await;

        for report in &assessment.earthquakes {
            output_handler.write_report(report)?;
        }

        // Demo data is never alerted on
        if assessment.source == DataSource::Live {
            for report in ledger.fresh(&assessment.earthquakes) {
                let level = if report.risk >= min_risk {
                    log::Level::Warn
                } else {
                    log::Level::Info
                };
                log::log!(
                    level,
                    "{} tsunami risk: {} (M{}, {} km)",
                    report.risk,
                    report.place,
                    report.magnitude,
                    report.depth_km
                );
                alert_queue.queue_alert(report.clone());
            }
        }

        // Sleep in short steps so Ctrl+C is noticed promptly
        let mut waited = Duration::ZERO;
        while waited < poll_interval && running.load(Ordering::SeqCst) {
            let step = Duration::from_millis(250);
            tokio::time::sleep(step).await;
            waited += step;
        }
    }

    output_handler.flush()?;
    drop(alert_queue);
    if let Err(e) = dispatcher.await {
        log::error!("Alert dispatcher task failed: {}", e);
    }

    log::info!("Tsunami Watch daemon stopped");
    Ok(())
}
