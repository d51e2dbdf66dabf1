pub mod rule_indian_ocean;

pub use rule_indian_ocean::{assess, classify, in_basin, TsunamiRiskClassifier};
