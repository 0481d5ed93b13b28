//! Deserializable topology and run configuration.

use serde::Deserialize;

/// Parameters for a wired line of `num_stations` stations, each with one
/// switch, one network service, and (unless excluded) one active traffic
/// source, connected station-to-station by a queue/transceiver pair per
/// hop. Mirrors the reference's `WiredLineNetwork(num_stations=...,
/// payload_size=..., ...)` constructor parameters, with the distribution
/// parameters narrowed to constants, since this rewrite's `Sampler` supports
/// richer distributions, but a scenario file only ever needs to describe
/// one.
#[derive(Debug, Clone, Deserialize)]
pub struct TopologyConfig {
    pub num_stations: usize,
    pub payload_size: f64,
    pub header_size: f64,
    pub bitrate: f64,
    #[serde(default)]
    pub preamble: f64,
    #[serde(default)]
    pub ifs: f64,
    pub distance: f64,
    pub speed_of_light: f64,
    pub source_interval: f64,
    /// Station indices that generate traffic, each addressed to the last
    /// station in the line. Default: only station 0.
    #[serde(default = "TopologyConfig::default_active_sources")]
    pub active_sources: Vec<usize>,
    pub queue_capacity: Option<usize>,
}

impl TopologyConfig {
    fn default_active_sources() -> Vec<usize> {
        vec![0]
    }
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            num_stations: 2,
            payload_size: 100.0,
            header_size: 10.0,
            bitrate: 500.0,
            preamble: 0.0,
            ifs: 0.0,
            distance: 500.0,
            speed_of_light: 10_000.0,
            source_interval: 1.0,
            active_sources: Self::default_active_sources(),
            queue_capacity: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub topology: TopologyConfig,
    pub stime_limit: f64,
    #[serde(default)]
    pub seed: u64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            description: String::new(),
            topology: TopologyConfig::default(),
            stime_limit: 1000.0,
            seed: 0,
        }
    }
}
