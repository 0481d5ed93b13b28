//! End-to-end wired-line scenarios, grounded in the reference's
//! `test_wired_network.py` functional test suite.

use netsim_cli::scenario::TopologyConfig;
use netsim_cli::topology;
use netsim_modules::{NetworkSwitch, Queue, RandomSource, Sink, WiredTransceiver};

const SIM_TIME_LIMIT: f64 = 1000.0;
const PAYLOAD_SIZE: f64 = 100.0;
const SOURCE_INTERVAL: f64 = 1.0;
const HEADER_SIZE: f64 = 10.0;
const BITRATE: f64 = 500.0;
const DISTANCE: f64 = 500.0;
const SPEED_OF_LIGHT: f64 = 10_000.0;

fn assert_allclose(actual: f64, expected: f64, rtol: f64) {
    let tolerance = expected.abs() * rtol;
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {actual} to be within {rtol:?} of {expected}"
    );
}

fn base_config(num_stations: usize, active_sources: Vec<usize>) -> TopologyConfig {
    TopologyConfig {
        num_stations,
        payload_size: PAYLOAD_SIZE,
        header_size: HEADER_SIZE,
        bitrate: BITRATE,
        preamble: 0.0,
        ifs: 0.0,
        distance: DISTANCE,
        speed_of_light: SPEED_OF_LIGHT,
        source_interval: SOURCE_INTERVAL,
        active_sources,
        queue_capacity: None,
    }
}

#[test]
fn two_wire_connected_stations() {
    let config = base_config(2, vec![0]);
    let (mut sim, topo) = topology::build(&config, 0);
    sim.run_until(SIM_TIME_LIMIT).unwrap();

    let expected_packets = (SIM_TIME_LIMIT / SOURCE_INTERVAL).floor() as u64;
    let client_src = sim.module::<RandomSource>(topo.stations[0].source.unwrap());
    assert_eq!(client_src.num_packets_sent(), expected_packets);

    let server_sink = sim.module::<Sink>(topo.stations[1].sink);
    let received = server_sink.num_packets_received();
    assert!(received >= expected_packets - 1 && received <= expected_packets);

    let expected_transmission_delay = (PAYLOAD_SIZE + HEADER_SIZE) / BITRATE;
    let expected_delay = DISTANCE / SPEED_OF_LIGHT + expected_transmission_delay;
    assert_allclose(server_sink.delay_vector().mean(), expected_delay, 0.1);

    let client_if = topo.interface_between(0, 1).unwrap();
    let queue = sim.module::<Queue>(client_if.queue);
    assert_eq!(queue.size_trace().mean(), 0.0);

    let expected_busy_ratio = expected_transmission_delay / SOURCE_INTERVAL;
    let transceiver = sim.module::<WiredTransceiver>(client_if.transceiver);
    assert_allclose(transceiver.tx_busy_trace().mean(), expected_busy_ratio, 0.1);
}

#[test]
fn wired_line_network_with_single_source_scales_delay_with_hops() {
    for num_stations in [3usize, 4] {
        let config = base_config(num_stations, vec![0]);
        let (mut sim, topo) = topology::build(&config, 0);
        sim.run_until(SIM_TIME_LIMIT).unwrap();

        let expected_packets = (SIM_TIME_LIMIT / SOURCE_INTERVAL).floor() as u64;
        let client_src = sim.module::<RandomSource>(topo.stations[0].source.unwrap());
        assert_eq!(client_src.num_packets_sent(), expected_packets);

        let server_sink = sim.module::<Sink>(topo.stations[num_stations - 1].sink);
        let received = server_sink.num_packets_received();
        assert!(received >= expected_packets - 1 && received <= expected_packets);

        let expected_transmission_delay = (PAYLOAD_SIZE + HEADER_SIZE) / BITRATE;
        let expected_delay = (DISTANCE / SPEED_OF_LIGHT + expected_transmission_delay)
            * (num_stations - 1) as f64;
        assert_allclose(server_sink.delay_vector().mean(), expected_delay, 0.1);

        let first_hop = topo.interface_between(0, 1).unwrap();
        let queue = sim.module::<Queue>(first_hop.queue);
        assert_eq!(queue.size_trace().mean(), 0.0);

        let expected_busy_ratio = expected_transmission_delay / SOURCE_INTERVAL;
        let transceiver = sim.module::<WiredTransceiver>(first_hop.transceiver);
        assert_allclose(transceiver.tx_busy_trace().mean(), expected_busy_ratio, 0.1);
    }
}

#[test]
fn wired_line_network_without_cross_traffic_keeps_middle_queues_empty() {
    for num_stations in [3usize, 4] {
        let config = base_config(num_stations, vec![0]);
        let (mut sim, topo) = topology::build(&config, 0);
        sim.run_until(SIM_TIME_LIMIT).unwrap();

        for i in 1..num_stations - 1 {
            let iface = topo.interface_between(i, i + 1).unwrap();
            let queue = sim.module::<Queue>(iface.queue);
            assert_eq!(queue.size_trace().timeavg(), 0.0);
        }
    }
}

#[test]
fn wired_line_network_with_cross_traffic_loads_middle_queues() {
    for num_stations in [3usize, 4] {
        let active: Vec<usize> = (0..num_stations - 1).collect();
        let config = base_config(num_stations, active);
        let (mut sim, topo) = topology::build(&config, 0);
        sim.run_until(SIM_TIME_LIMIT).unwrap();

        let expected_transmission_delay = (PAYLOAD_SIZE + HEADER_SIZE) / BITRATE;
        let delay_low_bound = (DISTANCE / SPEED_OF_LIGHT + expected_transmission_delay)
            * (num_stations - 1) as f64;
        let client_src = sim.module::<RandomSource>(topo.stations[0].source.unwrap());
        let server_sink = sim.module::<Sink>(topo.stations[num_stations - 1].sink);
        assert!(server_sink.delay_vector().mean() > delay_low_bound);
        assert!(client_src.num_packets_sent() > 0);

        let first_hop = topo.interface_between(0, 1).unwrap();
        let client_queue = sim.module::<Queue>(first_hop.queue);
        assert_eq!(client_queue.size_trace().timeavg(), 0.0);

        for i in 1..num_stations - 1 {
            let iface = topo.interface_between(i, i + 1).unwrap();
            let queue = sim.module::<Queue>(iface.queue);
            assert!(queue.size_trace().timeavg() > 0.0);
        }
    }
}

#[test]
fn unroutable_address_space_has_no_effect_on_two_station_line() {
    // A sanity check that a switch's table only ever holds routes for
    // addresses that actually exist in the line.
    let config = base_config(2, vec![0]);
    let (sim, topo) = topology::build(&config, 0);
    let switch = sim.module::<NetworkSwitch>(topo.stations[0].switch);
    assert!(switch.table().get(1).is_some());
    assert!(switch.table().get(2).is_none());
}
