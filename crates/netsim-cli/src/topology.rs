//! Wired-line topology composer: wires a straight line of stations, each
//! with a switch, a network service, a sink, and (for active stations) a
//! traffic source, connected hop-to-hop by a queue/transceiver pair.
//!
//! Grounded in the reference's `WiredLineNetwork`: every active source
//! addresses its traffic to the last station in the line, and a packet
//! travels hop-by-hop through each intermediate switch's routing table
//! rather than being delivered in one jump.

use netsim_core::{Address, ConnectionId, Link, ModuleId, Sampler, Sim};
use netsim_modules::{
    start_source, start_transceiver, NetworkService, NetworkSwitch, Queue, RandomSource, Sink,
    WiredTransceiver,
};

use crate::scenario::TopologyConfig;

/// Handles into one station's modules, kept around so a report can read
/// statistics back out after the run.
#[derive(Debug, Clone, Copy)]
pub struct StationHandles {
    pub address: Address,
    pub source: Option<ModuleId>,
    pub sink: ModuleId,
    pub switch: ModuleId,
}

/// Handles into one hop's queue/transceiver pair, on the station-`left`
/// side of the link.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceHandles {
    pub station: usize,
    pub queue: ModuleId,
    pub transceiver: ModuleId,
}

#[derive(Debug, Clone)]
pub struct Topology {
    pub stations: Vec<StationHandles>,
    /// One pair of interfaces per hop: `interfaces[k]` is `(left, right)`,
    /// the station-`k` side and the station-`k+1` side of the link between
    /// them.
    pub interfaces: Vec<(InterfaceHandles, InterfaceHandles)>,
}

impl Topology {
    /// The interface a station uses to reach `other`, mirroring the
    /// reference's `station.get_interface_to(other)`. Only adjacent
    /// stations have a direct interface; this is enough for every scenario
    /// in this crate, since statistics are only ever read off the
    /// endpoints' immediate links.
    pub fn interface_between(&self, station: usize, other: usize) -> Option<&InterfaceHandles> {
        if other == station + 1 {
            self.interfaces.get(station).map(|(left, _)| left)
        } else if station == other + 1 {
            self.interfaces.get(other).map(|(_, right)| right)
        } else {
            None
        }
    }
}

/// Build a `Sim` from `config` and wire every module described above into
/// it. Also bootstraps every active source's first `GENERATE` timer and
/// every transceiver's `START` timer, so the returned `Sim` is ready for
/// `run_until`/`run_until_complete`.
pub fn build(config: &TopologyConfig, seed: u64) -> (Sim, Topology) {
    let mut sim = Sim::new(seed);
    let n = config.num_stations;
    assert!(n >= 2, "a wired line needs at least two stations");
    let server_addr = (n - 1) as Address;
    let prop_delay = config.distance / config.speed_of_light;

    let mut stations = Vec::with_capacity(n);
    for i in 0..n {
        let address = i as Address;
        let sink = sim.add_module(Sink::new());
        let network_service = sim.add_module(NetworkService::new());
        let switch = sim.add_module(NetworkSwitch::new());
        sim.module_mut::<NetworkSwitch>(switch)
            .register_local_address(address);

        sim.connect(network_service, "sink", sink, "network", 0.0);
        sim.connect(network_service, "network", switch, "user", 0.0);

        let source = if config.active_sources.contains(&i) {
            let source = sim.add_module(RandomSource::new(
                i as u64,
                server_addr,
                Sampler::constant(config.payload_size),
                Sampler::constant(config.source_interval),
            ));
            sim.connect(source, "network", network_service, "source", 0.0);
            Some(source)
        } else {
            None
        };

        stations.push(StationHandles {
            address,
            source,
            sink,
            switch,
        });
    }

    // `right_link[i]`/`left_link[i]` are the egress connection (owned by
    // station i's switch) and immediate-neighbor address to use for
    // destinations above/below i, populated while building each hop.
    let mut right_link: Vec<Option<(ConnectionId, Address)>> = vec![None; n];
    let mut left_link: Vec<Option<(ConnectionId, Address)>> = vec![None; n];
    let mut interfaces = Vec::with_capacity(n - 1);

    for k in 0..n - 1 {
        let left_queue = sim.add_module(Queue::new(config.queue_capacity));
        let left_transceiver = sim.add_module(WiredTransceiver::new(
            stations[k].address,
            config.bitrate,
            config.header_size,
            config.preamble,
            config.ifs,
        ));
        let right_queue = sim.add_module(Queue::new(config.queue_capacity));
        let right_transceiver = sim.add_module(WiredTransceiver::new(
            stations[k + 1].address,
            config.bitrate,
            config.header_size,
            config.preamble,
            config.ifs,
        ));

        let (right_tx, _) = sim.connect(stations[k].switch, "right_tx", left_queue, "network", 0.0);
        sim.connect(left_queue, "service", left_transceiver, "queue", 0.0);
        sim.connect(left_transceiver, "up", stations[k].switch, "right_rx", 0.0);

        let (left_tx, _) = sim.connect(stations[k + 1].switch, "left_tx", right_queue, "network", 0.0);
        sim.connect(right_queue, "service", right_transceiver, "queue", 0.0);
        sim.connect(right_transceiver, "up", stations[k + 1].switch, "left_rx", 0.0);

        sim.connect(left_transceiver, "peer", right_transceiver, "peer", prop_delay);

        right_link[k] = Some((right_tx, stations[k + 1].address));
        left_link[k + 1] = Some((left_tx, stations[k].address));

        interfaces.push((
            InterfaceHandles {
                station: k,
                queue: left_queue,
                transceiver: left_transceiver,
            },
            InterfaceHandles {
                station: k + 1,
                queue: right_queue,
                transceiver: right_transceiver,
            },
        ));
    }

    for i in 0..n {
        let switch = sim.module_mut::<NetworkSwitch>(stations[i].switch);
        for dst in 0..n {
            if dst == i {
                continue;
            }
            let link = if dst > i { right_link[i] } else { left_link[i] };
            let Some((connection, next_hop)) = link else {
                continue;
            };
            switch.table_mut().add(dst as Address, Link::new(connection, next_hop));
        }
    }

    for station in &stations {
        if let Some(source) = station.source {
            start_source(&mut sim, source);
        }
    }
    for (left, right) in &interfaces {
        start_transceiver(&mut sim, left.transceiver);
        start_transceiver(&mut sim, right.transceiver);
    }

    (sim, Topology { stations, interfaces })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_station_line_has_one_hop_and_routes_both_ways() {
        let config = TopologyConfig {
            num_stations: 2,
            ..TopologyConfig::default()
        };
        let (sim, topology) = build(&config, 0);
        assert_eq!(topology.stations.len(), 2);
        assert_eq!(topology.interfaces.len(), 1);
        assert!(topology.stations[0].source.is_some());
        assert!(topology.stations[1].source.is_none());

        let left = sim.module::<NetworkSwitch>(topology.stations[0].switch);
        assert!(left.table().get(1).is_some());
        let right = sim.module::<NetworkSwitch>(topology.stations[1].switch);
        assert!(right.table().get(0).is_some());
    }

    #[test]
    fn four_station_line_routes_through_every_hop() {
        let config = TopologyConfig {
            num_stations: 4,
            ..TopologyConfig::default()
        };
        let (sim, topology) = build(&config, 0);
        assert_eq!(topology.interfaces.len(), 3);
        for i in 0..4 {
            let switch = sim.module::<NetworkSwitch>(topology.stations[i].switch);
            for dst in 0..4 {
                if dst != i {
                    assert!(switch.table().get(dst as Address).is_some());
                }
            }
        }
    }
}
