pub mod alerting;
pub mod classifier;
pub mod config;
pub mod feed;
pub mod models;
pub mod monitor;
pub mod output;

// Re-export commonly used types
pub use models::{Coordinates, EventTime, RiskLevel, RiskReport, SeismicEvent};
pub use classifier::{classify, TsunamiRiskClassifier};
pub use feed::{Clock, EarthquakeFeedClient, FeedError, FixedClock, SystemClock};
pub use alerting::{generate_alert, AlertDispatcher, AlertLedger, AlertQueue};
pub use monitor::{Assessment, DataSource, TsunamiMonitor};
