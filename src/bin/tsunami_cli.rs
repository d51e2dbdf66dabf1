use std::path::PathBuf;
use structopt::StructOpt;

use tsunami_watch::config::Config;
use tsunami_watch::output::{OutputFormat, OutputHandler};
use tsunami_watch::{generate_alert, EarthquakeFeedClient, TsunamiMonitor};

/// Tsunami Watch command line interface
#[derive(StructOpt, Debug)]
#[structopt(name = "tsunami", about = "Earthquake feed tsunami risk checker")]
pub enum Cli {
    /// Fetch recent earthquakes and print their risk reports
    Check {
        /// Path to configuration file (defaults are used if missing)
        #[structopt(short, long, default_value = "config.toml")]
        config: PathBuf,
        /// Lookback window in hours (overrides the config)
        #[structopt(long)]
        hours: Option<f64>,
        /// Maximum number of reports (overrides the config)
        #[structopt(short, long)]
        limit: Option<usize>,
        /// Output format: json, jsonl, or console
        #[structopt(short, long, default_value = "json")]
        format: String,
        /// Do not substitute demo data when the feed yields nothing
        #[structopt(long)]
        no_demo: bool,
    },
    /// Print alert messages for recent earthquakes
    Alerts {
        #[structopt(short, long, default_value = "config.toml")]
        config: PathBuf,
        #[structopt(long)]
        hours: Option<f64>,
    },
    /// Generate a default configuration file
    Config {
        /// Output path for the configuration file
        #[structopt(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}

fn load_config(path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        Ok(Config::from_file(path)?)
    } else {
        log::debug!("Config file {:?} not found, using defaults", path);
        Ok(Config::default())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::from_args();

    match cli {
        Cli::Check { config, hours, limit, format, no_demo } => {
            let mut config = load_config(&config)?;
            if let Some(limit) = limit {
                config.feed.max_reports = limit;
            }
            if no_demo {
                config.feed.demo_fallback = false;
            }
            let hours = hours.unwrap_or(config.feed.window_hours);

            let client = EarthquakeFeedClient::new(&config.feed)?;
            let monitor = TsunamiMonitor::new(client, &config.feed);
            let assessment = monitor.assess(hours).await;

            let mut output = OutputHandler::new(OutputFormat::from_str(&format), None)?;
            output.write_assessment(&assessment)?;
        }
        Cli::Alerts { config, hours } => {
            let config = load_config(&config)?;
            let hours = hours.unwrap_or(config.feed.window_hours);

            let client = EarthquakeFeedClient::new(&config.feed)?;
            let monitor = TsunamiMonitor::new(client, &config.feed);
            let assessment = monitor.assess(hours).await;

            for report in &assessment.earthquakes {
                println!("{}\n", generate_alert(report));
            }
        }
        Cli::Config { output } => {
            let config = Config::default();
            config.to_file(&output)?;
            println!("Default configuration written to: {:?}", output);
        }
    }

    Ok(())
}
