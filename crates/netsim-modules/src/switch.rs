//! Static-routing switch: SSN assignment, stale-duplicate suppression,
//! local delivery, and egress stamping.

use std::collections::HashMap;

use netsim_core::{Address, Context, Message, Module, ModuleId, ConnectionId, SimError, SimResult, SwitchTable};
use tracing::{debug, trace};

/// One switch per station. Holds the static routing table and the
/// recorded max-SSN per address, shared between the stale-duplicate
/// filter (keyed by `src_addr`) and the user-originated assignment
/// counter (keyed by `dst_addr`, see `handle_message` step 4). This crate
/// only composes single-interface stations, so a switch has at most one
/// address of its own; that address doubles as both "am I the
/// destination?" and "what do I stamp as `snd_addr`?".
#[derive(Debug, Default)]
pub struct NetworkSwitch {
    table: SwitchTable,
    ssns: HashMap<Address, u64>,
    station_address: Option<Address>,
}

impl NetworkSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_mut(&mut self) -> &mut SwitchTable {
        &mut self.table
    }

    pub fn table(&self) -> &SwitchTable {
        &self.table
    }

    /// Register this station's own address: packets addressed to it are
    /// delivered on `'user'` instead of routed, and it is what gets
    /// stamped as `snd_addr`/assigned as `src_addr` on egress. Replaces the
    /// reference's duck-typed scan over connected peers for a
    /// `module.address` attribute.
    pub fn register_local_address(&mut self, addr: Address) {
        self.station_address = Some(addr);
    }

    pub fn max_ssn(&self, addr: Address) -> Option<u64> {
        self.ssns.get(&addr).copied()
    }
}

impl Module for NetworkSwitch {
    fn handle_message(
        &mut self,
        ctx: &mut Context,
        msg: Message,
        connection: ConnectionId,
        _sender: ModuleId,
    ) -> SimResult<()> {
        let Some(mut packet) = msg.into_network_packet() else {
            return Ok(());
        };
        let incoming_name = ctx.name_of(connection).to_string();

        // 1. Stale-duplicate filter.
        if let Some(src_addr) = packet.src_addr {
            let ssn = packet.ssn.ok_or(SimError::MissingSsn { src_addr })?;
            match self.ssns.get(&src_addr).copied() {
                None => {
                    self.ssns.insert(src_addr, ssn);
                }
                Some(recorded) if ssn <= recorded => {
                    trace!(src_addr, ssn, recorded, "dropping stale duplicate");
                    return Ok(());
                }
                Some(_) => {
                    self.ssns.insert(src_addr, ssn);
                }
            }
        }

        // 2. Local delivery.
        if self.station_address == Some(packet.dst_addr) {
            let user = ctx.expect_connection("user")?;
            ctx.send(user, packet);
            return Ok(());
        }

        // 3. Route lookup.
        let Some(link) = self.table.get(packet.dst_addr).copied() else {
            debug!(dst_addr = packet.dst_addr, "no route, dropping");
            return Ok(());
        };

        // 4. Address & SSN assignment.
        if incoming_name == "user" {
            let egress_addr = self
                .station_address
                .expect("switch must register its own address before routing user traffic");
            packet.src_addr = Some(egress_addr);
            // Preserved verbatim: the assignment counter is keyed by
            // dst_addr, not src_addr, sharing the map above with the
            // src-keyed stale-duplicate lookups.
            let next = self.ssns.get(&packet.dst_addr).map(|n| n + 1).unwrap_or(0);
            self.ssns.insert(packet.dst_addr, next);
            packet.ssn = Some(next);
        } else if packet.src_addr.is_none() || packet.ssn.is_none() {
            return Err(SimError::MissingSsn {
                src_addr: packet.dst_addr,
            });
        }

        // 5. Egress stamping.
        packet.rcv_addr = Some(link.next_hop);
        packet.snd_addr = self.station_address;
        ctx.send(link.connection, packet);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Sink;
    use netsim_core::{AppData, Link, NetworkPacket, Sim};

    fn packet(dst: Address, src: Option<Address>, ssn: Option<u64>) -> NetworkPacket {
        NetworkPacket {
            dst_addr: dst,
            src_addr: src,
            snd_addr: None,
            rcv_addr: None,
            ssn,
            data: AppData::new(0, dst, 10.0),
        }
    }

    #[test]
    fn s5_user_originated_packets_get_dst_keyed_ssn() {
        let mut sim = Sim::new(0);
        let iface_peer = sim.add_module(Sink::new());
        let user_peer = sim.add_module(Sink::new());
        let sw = sim.add_module(NetworkSwitch::new());

        let (eth0, _) = sim.connect(sw, "eth0", iface_peer, "up", 0.0);
        sim.connect(sw, "user", user_peer, "network", 0.0);

        sim.module_mut::<NetworkSwitch>(sw).register_local_address(100);
        sim.module_mut::<NetworkSwitch>(sw)
            .table_mut()
            .add(5, Link::new(eth0, 5));

        let user_conn = sim.connection_named(sw, "user").unwrap();
        sim.schedule_message(0.0, sw, packet(5, None, None), user_conn, user_peer);
        sim.schedule_message(0.0, sw, packet(5, None, None), user_conn, user_peer);
        sim.run_until_complete().unwrap();

        assert_eq!(sim.module::<NetworkSwitch>(sw).max_ssn(5), Some(1));
    }

    #[test]
    fn s5_duplicate_ssn_is_dropped_but_newer_one_forwards() {
        let mut sim = Sim::new(0);
        let iface_peer = sim.add_module(Sink::new());
        let sw = sim.add_module(NetworkSwitch::new());
        sim.connect(sw, "eth0", iface_peer, "up", 0.0);
        // Destination 1 has no registered local address and no route: it
        // is dropped silently after the duplicate filter runs, isolating
        // this test to the stale-duplicate behavior.
        sim.module_mut::<NetworkSwitch>(sw).register_local_address(99);

        let eth0_conn = sim.connection_named(sw, "eth0").unwrap();
        sim.schedule_message(0.0, sw, packet(1, Some(9), Some(7)), eth0_conn, iface_peer);
        sim.schedule_message(0.0, sw, packet(1, Some(9), Some(7)), eth0_conn, iface_peer);
        sim.schedule_message(0.0, sw, packet(1, Some(9), Some(8)), eth0_conn, iface_peer);
        sim.run_until_complete().unwrap();

        assert_eq!(sim.module::<NetworkSwitch>(sw).max_ssn(9), Some(8));
        assert_eq!(sim.module::<Sink>(iface_peer).num_packets_received(), 0);
    }

    #[test]
    fn unroutable_destination_is_dropped_silently() {
        let mut sim = Sim::new(0);
        let user_peer = sim.add_module(Sink::new());
        let sw = sim.add_module(NetworkSwitch::new());
        sim.connect(sw, "user", user_peer, "network", 0.0);
        sim.module_mut::<NetworkSwitch>(sw).register_local_address(1);

        let user_conn = sim.connection_named(sw, "user").unwrap();
        sim.schedule_message(0.0, sw, packet(42, None, None), user_conn, user_peer);
        sim.run_until_complete().unwrap();
    }
}
