//! Module and connection framework.
//!
//! A `Sim` owns an arena of modules and a flat table of connections between
//! them. Every connection is named on both ends and carries a propagation
//! delay; `Connection::send` (exposed through `Context::send`) never calls
//! the peer directly, it only schedules a future delivery event, so a
//! module's `handle_message`/`handle_timer` never needs to reach across the
//! arena into another module's state.

use crate::error::{SimError, SimResult};
use crate::message::Message;
use crate::scheduler::Scheduler;

/// Opaque handle to a module in the simulation's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub usize);

/// Opaque handle to one endpoint of a connection. The connection's other
/// endpoint, the `reverse` field of its `ConnectionRecord`, has its own
/// `ConnectionId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub usize);

/// One endpoint of a bidirectional connection between two modules.
///
/// Connections are created in pairs: connecting module `a` (as `name_a`) to
/// module `b` (as `name_b`) allocates two `ConnectionRecord`s, each other's
/// `reverse`, sharing the same propagation `delay`.
#[derive(Debug, Clone)]
pub struct ConnectionRecord {
    pub owner: ModuleId,
    pub name: String,
    pub peer: ModuleId,
    pub delay: f64,
    pub reverse: ConnectionId,
}

/// The per-callback handle passed to `Module::handle_message` and
/// `Module::handle_timer`. Borrows only the scheduler and the connection
/// table, never another module, so it cannot be used to re-enter the
/// arena.
pub struct Context<'a> {
    pub(crate) scheduler: &'a mut Scheduler,
    pub(crate) connections: &'a [ConnectionRecord],
    pub(crate) owner: ModuleId,
}

impl<'a> Context<'a> {
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    /// The module this context's callback is executing for.
    pub fn owner(&self) -> ModuleId {
        self.owner
    }

    fn record(&self, connection: ConnectionId) -> &ConnectionRecord {
        &self.connections[connection.0]
    }

    /// Find the outgoing connection on this module named `name`.
    pub fn connection_named(&self, name: &str) -> Option<ConnectionId> {
        self.connections
            .iter()
            .enumerate()
            .find(|(_, rec)| rec.owner == self.owner && rec.name == name)
            .map(|(idx, _)| ConnectionId(idx))
    }

    /// Like `connection_named`, but fails with `SimError::MissingConnection`
    /// instead of returning `None`. The common case for a module whose
    /// wiring is an invariant, not an optional feature.
    pub fn expect_connection(&self, name: &str) -> SimResult<ConnectionId> {
        self.connection_named(name)
            .ok_or_else(|| SimError::MissingConnection {
                module: format!("{:?}", self.owner),
                name: name.to_string(),
            })
    }

    /// Every connection owned by this module, with its id.
    pub fn connections(&self) -> impl Iterator<Item = (ConnectionId, &ConnectionRecord)> {
        self.connections
            .iter()
            .enumerate()
            .filter(|(_, rec)| rec.owner == self.owner)
            .map(|(idx, rec)| (ConnectionId(idx), rec))
    }

    /// Find the outgoing connection on this module whose peer is `peer`.
    pub fn connection_to(&self, peer: ModuleId) -> Option<ConnectionId> {
        self.connections
            .iter()
            .enumerate()
            .find(|(_, rec)| rec.owner == self.owner && rec.peer == peer)
            .map(|(idx, _)| ConnectionId(idx))
    }

    pub fn peer_of(&self, connection: ConnectionId) -> ModuleId {
        self.record(connection).peer
    }

    pub fn name_of(&self, connection: ConnectionId) -> &str {
        &self.record(connection).name
    }

    /// Schedule delivery of `msg` to the peer on `connection`, after that
    /// connection's propagation delay. The peer receives it tagged with the
    /// *reverse* connection id, i.e. the name the peer knows this link by.
    pub fn send(&mut self, connection: ConnectionId, msg: impl Into<Message>) {
        let record = self.record(connection);
        let target = record.peer;
        let delivery_connection = record.reverse;
        let delay = record.delay;
        self.scheduler
            .schedule_message(delay, target, msg.into(), delivery_connection, self.owner);
    }

    /// Schedule a timer callback for this module after `delay`, tagged with
    /// `token` so the module can distinguish concurrent timers.
    pub fn schedule_timer(&mut self, delay: f64, token: u32) {
        self.scheduler.schedule_timer(delay, self.owner, token);
    }
}

/// Implemented by every simulated component. Both methods default to a
/// no-op so a module that only reacts to one kind of event doesn't have to
/// write out the other.
pub trait Module: std::fmt::Debug + std::any::Any {
    /// Enables `Sim::module::<M>()` to recover a module's concrete type
    /// after a run completes. The default body is correct for every
    /// implementor; it exists only because trait objects can't upcast to
    /// `dyn Any` on their own.
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn handle_message(
        &mut self,
        _ctx: &mut Context,
        _msg: Message,
        _connection: ConnectionId,
        _sender: ModuleId,
    ) -> SimResult<()> {
        Ok(())
    }

    fn handle_timer(&mut self, _ctx: &mut Context, _token: u32) -> SimResult<()> {
        Ok(())
    }
}
