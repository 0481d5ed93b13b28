//! Payload and PDU types exchanged between modules.

use serde::{Deserialize, Serialize};

/// Addresses and source ids are opaque, non-negative, equality-comparable
/// identifiers. The core never structurally distinguishes the two
/// namespaces, even though one is conventionally IP-like and the other
/// MAC-like.
pub type Address = u64;

/// Application-layer payload. Immutable once built: a `RandomSource` hands
/// it down the stack by value and nothing downstream mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    pub source_id: u64,
    pub dest_addr: Address,
    pub size: f64,
    /// Absolute send timestamp, stamped by whatever produced this packet.
    /// Zero for payloads nobody timestamped. Threaded unchanged through
    /// `NetworkPacket`/`WireFrame` since neither ever rebuilds `AppData`,
    /// so a `Sink` at the far end can recover end-to-end delay without
    /// the composer tracking per-packet state itself.
    pub sent_at: f64,
}

impl AppData {
    pub fn new(source_id: u64, dest_addr: Address, size: f64) -> Self {
        Self {
            source_id,
            dest_addr,
            size,
            sent_at: 0.0,
        }
    }

    pub fn with_sent_at(mut self, sent_at: f64) -> Self {
        self.sent_at = sent_at;
        self
    }
}

impl std::fmt::Display for AppData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AppData{{sid={},dst={},size={}}}",
            self.source_id, self.dest_addr, self.size
        )
    }
}

/// Network-layer PDU. `src_addr`/`ssn` are assigned at the first switch a
/// packet passes through; `snd_addr`/`rcv_addr` are rewritten at every hop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkPacket {
    pub dst_addr: Address,
    pub src_addr: Option<Address>,
    pub snd_addr: Option<Address>,
    pub rcv_addr: Option<Address>,
    pub ssn: Option<u64>,
    pub data: AppData,
}

impl NetworkPacket {
    /// Construct a packet as `NetworkService` does: only `dst_addr` and the
    /// encapsulated payload are known at this point.
    pub fn new(dst_addr: Address, data: AppData) -> Self {
        Self {
            dst_addr,
            src_addr: None,
            snd_addr: None,
            rcv_addr: None,
            ssn: None,
            data,
        }
    }

    /// The size the link layer measures. Delegates to the payload.
    pub fn size(&self) -> f64 {
        self.data.size
    }
}

impl std::fmt::Display for NetworkPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields = Vec::new();
        fields.push(format!("DST={}", self.dst_addr));
        if let Some(src) = self.src_addr {
            fields.push(format!("SRC={src}"));
        }
        if let Some(snd) = self.snd_addr {
            fields.push(format!("SND={snd}"));
        }
        if let Some(rcv) = self.rcv_addr {
            fields.push(format!("RCV={rcv}"));
        }
        if let Some(ssn) = self.ssn {
            fields.push(format!("SSN={ssn}"));
        }
        write!(f, "NetPkt{{{} | {}}}", fields.join(","), self.data)
    }
}

/// Link-layer unit. Transient: it exists only for the duration of a single
/// on-wire transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFrame {
    pub packet: NetworkPacket,
    pub duration: f64,
    pub header_size: f64,
    pub preamble: f64,
}

impl WireFrame {
    pub fn new(packet: NetworkPacket, duration: f64, header_size: f64, preamble: f64) -> Self {
        Self {
            packet,
            duration,
            header_size,
            preamble,
        }
    }
}

impl std::fmt::Display for WireFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WireFrame[D={},HDR={},PR={} | {}]",
            self.duration, self.header_size, self.preamble, self.packet
        )
    }
}
