//! JSON-serializable run summary, read back out of a finished `Sim`.

use serde::Serialize;

use netsim_core::Sim;
use netsim_modules::{Queue, RandomSource, Sink, WiredTransceiver};

use crate::scenario::Scenario;
use crate::topology::Topology;

#[derive(Debug, Clone, Serialize)]
pub struct StationReport {
    pub address: u64,
    pub num_packets_sent: Option<u64>,
    pub num_packets_received: u64,
    pub mean_delay: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterfaceReport {
    pub left_station: usize,
    pub right_station: usize,
    pub queue_size_mean: f64,
    pub queue_num_dropped: u64,
    pub tx_busy_ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub scenario_name: String,
    pub stime_limit: f64,
    pub final_time: f64,
    pub stations: Vec<StationReport>,
    pub interfaces: Vec<InterfaceReport>,
}

/// Read every statistic the composer wired up off a finished `Sim`. Takes
/// `scenario` only for its name/`stime_limit`, not to re-derive anything
/// already recorded in `topology`.
pub fn build_report(sim: &Sim, topology: &Topology, scenario: &Scenario) -> SimulationReport {
    let stations = topology
        .stations
        .iter()
        .map(|station| {
            let sink = sim.module::<Sink>(station.sink);
            let num_packets_sent = station
                .source
                .map(|source| sim.module::<RandomSource>(source).num_packets_sent());
            StationReport {
                address: station.address,
                num_packets_sent,
                num_packets_received: sink.num_packets_received(),
                mean_delay: sink.delay_vector().mean(),
            }
        })
        .collect();

    let interfaces = topology
        .interfaces
        .iter()
        .map(|(left, _right)| {
            let queue = sim.module::<Queue>(left.queue);
            let transceiver = sim.module::<WiredTransceiver>(left.transceiver);
            InterfaceReport {
                left_station: left.station,
                right_station: left.station + 1,
                queue_size_mean: queue.size_trace().mean(),
                queue_num_dropped: queue.num_dropped(),
                tx_busy_ratio: transceiver.tx_busy_trace().mean(),
            }
        })
        .collect();

    SimulationReport {
        scenario_name: scenario.name.clone(),
        stime_limit: scenario.stime_limit,
        final_time: sim.time(),
        stations,
        interfaces,
    }
}
