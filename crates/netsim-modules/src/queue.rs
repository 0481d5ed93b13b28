//! Bounded FIFO with pull-based service.

use std::collections::VecDeque;

use netsim_core::{Context, ConnectionId, Message, Module, ModuleId, NetworkPacket, SimError, SimResult, Trace};
use tracing::trace;

/// A link-layer buffer between a `NetworkSwitch`'s egress interface and a
/// `WiredTransceiver`. `capacity = None` means unbounded. Packets pushed
/// while a service connection is already waiting bypass the buffer
/// entirely, going straight to the waiter and never touching the traces.
#[derive(Debug)]
pub struct Queue {
    capacity: Option<usize>,
    packets: VecDeque<NetworkPacket>,
    waiters: VecDeque<ConnectionId>,
    num_dropped: u64,
    size_trace: Trace,
    bitsize_trace: Trace,
}

impl Queue {
    pub fn new(capacity: Option<usize>) -> Self {
        let mut size_trace = Trace::new();
        let mut bitsize_trace = Trace::new();
        size_trace.record(0.0, 0.0);
        bitsize_trace.record(0.0, 0.0);
        Self {
            capacity,
            packets: VecDeque::new(),
            waiters: VecDeque::new(),
            num_dropped: 0,
            size_trace,
            bitsize_trace,
        }
    }

    pub fn size(&self) -> usize {
        self.packets.len()
    }

    pub fn bitsize(&self) -> f64 {
        self.packets.iter().map(|p| p.size()).sum()
    }

    pub fn as_slice(&self) -> &VecDeque<NetworkPacket> {
        &self.packets
    }

    pub fn num_dropped(&self) -> u64 {
        self.num_dropped
    }

    pub fn size_trace(&self) -> &Trace {
        &self.size_trace
    }

    pub fn bitsize_trace(&self) -> &Trace {
        &self.bitsize_trace
    }

    fn pop(&mut self) -> SimResult<NetworkPacket> {
        self.packets.pop_front().ok_or(SimError::PopFromEmptyQueue)
    }

    /// Push a packet. Hands it directly to a waiting service if one is
    /// parked; otherwise buffers it (recording the new size into both
    /// traces) if capacity allows, else drops it.
    pub fn push(&mut self, ctx: &mut Context, packet: NetworkPacket) {
        if let Some(waiter) = self.waiters.pop_front() {
            ctx.send(waiter, packet);
            return;
        }
        if self.capacity.is_none_or(|cap| self.packets.len() < cap) {
            self.packets.push_back(packet);
            let now = ctx.now();
            self.size_trace.record(now, self.packets.len() as f64);
            self.bitsize_trace.record(now, self.bitsize());
        } else {
            self.num_dropped += 1;
            trace!(dropped = self.num_dropped, "queue full, dropping packet");
        }
    }

    /// A service (transceiver) requests the next packet on `connection`.
    /// If one is buffered, pop and send it immediately; otherwise park
    /// `connection` to be served by the next `push`.
    pub fn get_next(&mut self, ctx: &mut Context, connection: ConnectionId) -> SimResult<()> {
        if self.packets.is_empty() {
            self.waiters.push_back(connection);
            return Ok(());
        }
        let packet = self.pop()?;
        let now = ctx.now();
        self.size_trace.record(now, self.packets.len() as f64);
        self.bitsize_trace.record(now, self.bitsize());
        ctx.send(connection, packet);
        Ok(())
    }
}

impl Module for Queue {
    fn handle_message(
        &mut self,
        ctx: &mut Context,
        msg: Message,
        connection: ConnectionId,
        _sender: ModuleId,
    ) -> SimResult<()> {
        let incoming_name = ctx.name_of(connection).to_string();
        match incoming_name.as_str() {
            "network" => {
                if let Some(packet) = msg.into_network_packet() {
                    self.push(ctx, packet);
                }
            }
            "service" => {
                // A service signals readiness by sending on 'service';
                // the payload itself is irrelevant, only the connection
                // identity matters.
                self.get_next(ctx, connection)?;
            }
            _ => {}
        }
        Ok(())
    }
}
