pub mod event;
pub mod report;

pub use event::{EventTime, SeismicEvent};
pub use report::{Coordinates, RiskLevel, RiskReport};
