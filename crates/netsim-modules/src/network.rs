//! Network layer: encapsulation/decapsulation between the application
//! layer and the switched network.

use netsim_core::{Context, Message, Module, ModuleId, NetworkPacket, ConnectionId, SimResult};

/// Sits between a `RandomSource`/`Sink` pair (connections `'source'` and
/// `'sink'`) and a `NetworkSwitch` (connection `'network'`). Stateless: it
/// only ever wraps or unwraps a single message, never buffers anything.
#[derive(Debug, Default)]
pub struct NetworkService;

impl NetworkService {
    pub fn new() -> Self {
        Self
    }
}

impl Module for NetworkService {
    fn handle_message(
        &mut self,
        ctx: &mut Context,
        msg: Message,
        connection: ConnectionId,
        _sender: ModuleId,
    ) -> SimResult<()> {
        let incoming_name = ctx.name_of(connection).to_string();
        match incoming_name.as_str() {
            "source" => {
                let Some(data) = msg.as_app_data().copied() else {
                    return Ok(());
                };
                let packet = NetworkPacket::new(data.dest_addr, data);
                let network = ctx.expect_connection("network")?;
                ctx.send(network, packet);
            }
            "network" => {
                let Some(packet) = msg.into_network_packet() else {
                    return Ok(());
                };
                let sink = ctx.expect_connection("sink")?;
                ctx.send(sink, packet.data);
            }
            _ => {}
        }
        Ok(())
    }
}
