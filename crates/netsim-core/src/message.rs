//! The closed sum type carried over every connection.
//!
//! Replaces the dynamically-typed `handle_message(msg, ...)` of the source
//! system: every module matches exhaustively on `Message` instead of
//! introspecting an arbitrary object at runtime.

use crate::packet::{AppData, NetworkPacket, WireFrame};

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    AppData(AppData),
    NetworkPacket(NetworkPacket),
    WireFrame(WireFrame),
}

impl From<AppData> for Message {
    fn from(value: AppData) -> Self {
        Message::AppData(value)
    }
}

impl From<NetworkPacket> for Message {
    fn from(value: NetworkPacket) -> Self {
        Message::NetworkPacket(value)
    }
}

impl From<WireFrame> for Message {
    fn from(value: WireFrame) -> Self {
        Message::WireFrame(value)
    }
}

impl Message {
    pub fn as_app_data(&self) -> Option<&AppData> {
        match self {
            Message::AppData(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_app_data(self) -> Option<AppData> {
        match self {
            Message::AppData(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_network_packet(&self) -> Option<&NetworkPacket> {
        match self {
            Message::NetworkPacket(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_network_packet(self) -> Option<NetworkPacket> {
        match self {
            Message::NetworkPacket(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_wire_frame(self) -> Option<WireFrame> {
        match self {
            Message::WireFrame(v) => Some(v),
            _ => None,
        }
    }
}
