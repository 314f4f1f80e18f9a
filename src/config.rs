use crate::customer::FarePolicy;
use crate::filter::engine::FilterEngine;
use crate::flight::FlightSegment;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub scenario: PathBuf,
    /// Fare per km for segments that don't carry their own rate.
    pub base_rate: f64,
    pub fare_policy: FarePolicy,
    pub engine: FilterEngine,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scenario: PathBuf::from("data/default.json"),
            base_rate: FlightSegment::DEFAULT_BASE_RATE,
            fare_policy: FarePolicy::default(),
            engine: FilterEngine::default(),
        }
    }
}
