//! Routing table consulted by a network switch.

use std::collections::HashMap;

use crate::module::ConnectionId;
use crate::packet::Address;

/// A single routing entry: which local connection to send on, and the
/// address of the next hop reachable through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub connection: ConnectionId,
    pub next_hop: Address,
}

impl Link {
    pub fn new(connection: ConnectionId, next_hop: Address) -> Self {
        Self { connection, next_hop }
    }
}

/// Maps destination addresses to the `Link` that reaches them. Distinct
/// from the connection table owned by the simulation: this one is
/// per-switch routing state, populated at topology-build time.
#[derive(Debug, Clone, Default)]
pub struct SwitchTable {
    routes: HashMap<Address, Link>,
}

impl SwitchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, dst_addr: Address, link: Link) {
        self.routes.insert(dst_addr, link);
    }

    pub fn get(&self, dst_addr: Address) -> Option<&Link> {
        self.routes.get(&dst_addr)
    }

    pub fn contains(&self, dst_addr: Address) -> bool {
        self.routes.contains_key(&dst_addr)
    }

    pub fn as_map(&self) -> &HashMap<Address, Link> {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_get_round_trips() {
        let mut table = SwitchTable::new();
        table.add(7, Link::new(ConnectionId(3), 9));
        let link = table.get(7).unwrap();
        assert_eq!(link.connection, ConnectionId(3));
        assert_eq!(link.next_hop, 9);
        assert!(!table.contains(8));
    }
}
