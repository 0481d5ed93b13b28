//! Application layer: traffic generation and termination.

use netsim_core::{AppData, ConnectionId, Context, Intervals, Message, Module, ModuleId, Sampler, Sim, SimResult, Statistic, Trace};
use tracing::{debug, trace};

const GENERATE: u32 = 1;

/// Bootstrap a `RandomSource`'s first `GENERATE` timer. A composer calls
/// this once per active source immediately after wiring it, before the
/// first `Sim::step`; a source with an already-exhausted interval stream
/// never generates anything.
pub fn start_source(sim: &mut Sim, id: ModuleId) {
    if let Some(delay) = sim.module_mut::<RandomSource>(id).first_delay() {
        sim.schedule_timer(delay, id, GENERATE);
    }
}

/// Generates `AppData` at stochastic intervals and sizes, sending each on
/// its `'network'` connection. Construction alone does not schedule
/// anything, a composer must call [`start_source`] after wiring, the same
/// pattern used to bootstrap `WiredTransceiver`'s `START` timer via
/// [`crate::transceiver::start_transceiver`].
#[derive(Debug)]
pub struct RandomSource {
    source_id: u64,
    dest_addr: u64,
    data_size: Sampler,
    interval: Sampler,
    arrival_intervals: Intervals,
    data_size_stat: Statistic,
    num_packets_sent: u64,
}

impl RandomSource {
    pub fn new(source_id: u64, dest_addr: u64, data_size: Sampler, interval: Sampler) -> Self {
        Self {
            source_id,
            dest_addr,
            data_size,
            interval,
            arrival_intervals: Intervals::new(),
            data_size_stat: Statistic::new(),
            num_packets_sent: 0,
        }
    }

    /// Draw the first inter-arrival interval. `None` means this source
    /// never generates anything (an exhausted or absent interval stream).
    pub fn first_delay(&mut self) -> Option<f64> {
        self.interval.sample()
    }

    pub fn arrival_intervals(&self) -> &Intervals {
        &self.arrival_intervals
    }

    pub fn data_size_stat(&self) -> &Statistic {
        &self.data_size_stat
    }

    pub fn num_packets_sent(&self) -> u64 {
        self.num_packets_sent
    }
}

impl Module for RandomSource {
    fn handle_timer(&mut self, ctx: &mut Context, token: u32) -> SimResult<()> {
        if token != GENERATE {
            return Ok(());
        }
        let Some(size) = self.data_size.sample() else {
            debug!(source_id = self.source_id, "data size stream exhausted, stopping");
            return Ok(());
        };
        let data = AppData::new(self.source_id, self.dest_addr, size).with_sent_at(ctx.now());
        trace!(source_id = self.source_id, ?data, "generated packet");
        let network = ctx.expect_connection("network")?;
        ctx.send(network, data);
        self.arrival_intervals.record(ctx.now());
        self.data_size_stat.append(size);
        self.num_packets_sent += 1;
        match self.interval.sample() {
            Some(next_interval) => ctx.schedule_timer(next_interval, GENERATE),
            None => debug!(source_id = self.source_id, "interval stream exhausted, stopping"),
        }
        Ok(())
    }
}

/// Terminates `AppData`, tallying delivery statistics. `delay_vector`
/// records end-to-end delay by reading `AppData::sent_at`, which a
/// `RandomSource` stamps at generation time and which survives unchanged
/// through `NetworkPacket`/`WireFrame` encapsulation. A `Sink` never
/// stamps anything itself, it only reads what arrived.
#[derive(Debug, Default)]
pub struct Sink {
    num_packets_received: u64,
    delay_vector: Trace,
}

impl Sink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_packets_received(&self) -> u64 {
        self.num_packets_received
    }

    pub fn delay_vector(&self) -> &Trace {
        &self.delay_vector
    }
}

impl Module for Sink {
    fn handle_message(
        &mut self,
        ctx: &mut Context,
        msg: Message,
        _connection: ConnectionId,
        _sender: ModuleId,
    ) -> SimResult<()> {
        if let Some(data) = msg.as_app_data() {
            self.num_packets_received += 1;
            let now = ctx.now();
            self.delay_vector.record(now, now - data.sent_at);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netsim_core::Sim;

    #[test]
    fn s1_source_basic_schedule() {
        let mut sim = Sim::new(0);
        let sink = sim.add_module(Sink::new());
        let src = sim.add_module(RandomSource::new(
            34,
            13,
            Sampler::constant(42.0),
            Sampler::drained([74.0, 21.0]),
        ));
        sim.connect(src, "network", sink, "network", 0.0);

        let first_delay = sim
            .module_mut::<RandomSource>(src)
            .first_delay()
            .expect("first interval present");
        assert_eq!(first_delay, 74.0);
        sim.schedule_timer(first_delay, src, GENERATE);

        // First firing, at t=74: a packet is sent and the next generation
        // timer is scheduled for t=74+21=95.
        assert!(sim.step().unwrap());
        assert_eq!(sim.time(), 74.0);
        assert_eq!(sim.module::<RandomSource>(src).num_packets_sent(), 1);
        assert_eq!(sim.module::<Sink>(sink).num_packets_received(), 1);
        assert_eq!(sim.module::<RandomSource>(src).data_size_stat().as_slice(), &[42.0]);

        // Second firing, at t=95: the interval stream is now exhausted,
        // but the packet due at this firing is still sent.
        assert!(sim.step().unwrap());
        assert_eq!(sim.time(), 95.0);
        assert_eq!(sim.module::<RandomSource>(src).num_packets_sent(), 2);
    }

    #[test]
    fn s2_finite_interval_sequence_stops_after_exhaustion() {
        let mut sim = Sim::new(0);
        let sink = sim.add_module(Sink::new());
        let src = sim.add_module(RandomSource::new(
            1,
            2,
            Sampler::constant(123.0),
            Sampler::drained([34.0, 42.0]),
        ));
        sim.connect(src, "network", sink, "network", 0.0);

        let first_delay = sim.module_mut::<RandomSource>(src).first_delay().unwrap();
        sim.schedule_timer(first_delay, src, GENERATE);
        sim.run_until_complete().unwrap();

        assert_eq!(sim.module::<RandomSource>(src).num_packets_sent(), 2);
        assert_eq!(sim.module::<Sink>(sink).num_packets_received(), 2);
    }
}
