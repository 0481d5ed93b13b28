//! Ties the module arena, connection table, and scheduler together.

use crate::error::{SimError, SimResult};
use crate::message::Message;
use crate::module::{ConnectionId, ConnectionRecord, Context, Module, ModuleId};
use crate::scheduler::{EventKind, Scheduler};

/// Owns every module, every connection between them, and the event queue.
/// Modules are stored as `Option<Box<dyn Module>>` slots so a callback can
/// `take()` its module out of the arena for the duration of the dispatch.
/// The context it receives borrows only the scheduler and the connection
/// table, so nothing needs to re-enter the arena while a module is absent
/// from its slot.
pub struct Sim {
    modules: Vec<Option<Box<dyn Module>>>,
    connections: Vec<ConnectionRecord>,
    scheduler: Scheduler,
    seed: u64,
}

impl Sim {
    pub fn new(seed: u64) -> Self {
        Self {
            modules: Vec::new(),
            connections: Vec::new(),
            scheduler: Scheduler::new(),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn time(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn add_module(&mut self, module: impl Module + 'static) -> ModuleId {
        let id = ModuleId(self.modules.len());
        self.modules.push(Some(Box::new(module)));
        id
    }

    /// Wire a bidirectional connection: `a` knows the peer as `name_a`, `b`
    /// knows it as `name_b`, both directions share `delay`. Returns the two
    /// `ConnectionId`s (the one owned by `a`, then the one owned by `b`).
    pub fn connect(
        &mut self,
        a: ModuleId,
        name_a: impl Into<String>,
        b: ModuleId,
        name_b: impl Into<String>,
        delay: f64,
    ) -> (ConnectionId, ConnectionId) {
        let id_a = ConnectionId(self.connections.len());
        let id_b = ConnectionId(self.connections.len() + 1);
        self.connections.push(ConnectionRecord {
            owner: a,
            name: name_a.into(),
            peer: b,
            delay,
            reverse: id_b,
        });
        self.connections.push(ConnectionRecord {
            owner: b,
            name: name_b.into(),
            peer: a,
            delay,
            reverse: id_a,
        });
        (id_a, id_b)
    }

    pub fn connection_named(&self, owner: ModuleId, name: &str) -> SimResult<ConnectionId> {
        self.connections
            .iter()
            .enumerate()
            .find(|(_, rec)| rec.owner == owner && rec.name == name)
            .map(|(idx, _)| ConnectionId(idx))
            .ok_or_else(|| SimError::MissingConnection {
                module: format!("{owner:?}"),
                name: name.to_string(),
            })
    }

    /// Schedule a message delivery without going through a `Context`. Used
    /// by a composer to inject the first message on a connection, and by
    /// tests that want to simulate an inbound delivery without wiring a
    /// full upstream module.
    pub fn schedule_message(
        &mut self,
        delay: f64,
        target: ModuleId,
        msg: impl Into<Message>,
        connection: ConnectionId,
        sender: ModuleId,
    ) {
        self.scheduler
            .schedule_message(delay, target, msg.into(), connection, sender);
    }

    /// Schedule a timer for `target` without going through a `Context`. Used
    /// by a composer to kick off a module's first self-scheduled callback
    /// (e.g. `WiredTransceiver`'s `START` timer) before the event loop has
    /// begun.
    pub fn schedule_timer(&mut self, delay: f64, target: ModuleId, token: u32) {
        self.scheduler.schedule_timer(delay, target, token);
    }

    fn dispatch(&mut self, target: ModuleId, run: impl FnOnce(&mut dyn Module, &mut Context) -> SimResult<()>) -> SimResult<()> {
        let mut module = self.modules[target.0]
            .take()
            .expect("module slot empty during dispatch (re-entrant call?)");
        let mut ctx = Context {
            scheduler: &mut self.scheduler,
            connections: &self.connections,
            owner: target,
        };
        let result = run(module.as_mut(), &mut ctx);
        self.modules[target.0] = Some(module);
        result
    }

    /// Pop and dispatch the next event. Returns `Ok(true)` if an event was
    /// processed, `Ok(false)` if the queue was empty.
    pub fn step(&mut self) -> SimResult<bool> {
        let Some(event) = self.scheduler.pop() else {
            return Ok(false);
        };
        let target = event.target;
        match event.kind {
            EventKind::Deliver {
                msg,
                connection,
                sender,
            } => {
                self.dispatch(target, move |module, ctx| {
                    module.handle_message(ctx, msg, connection, sender)
                })?;
            }
            EventKind::Timer { token } => {
                self.dispatch(target, move |module, ctx| module.handle_timer(ctx, token))?;
            }
        }
        Ok(true)
    }

    /// Run until the queue empties or simulated time reaches `time_limit`.
    pub fn run_until(&mut self, time_limit: f64) -> SimResult<()> {
        while self.scheduler.now() < time_limit {
            if !self.step()? {
                break;
            }
        }
        Ok(())
    }

    /// Run until the event queue is exhausted. Only safe when every source
    /// of events is known to terminate (e.g. all `Sampler`s eventually
    /// return `None`); a topology with an unconditionally self-rescheduling
    /// module never returns.
    pub fn run_until_complete(&mut self) -> SimResult<()> {
        while self.step()? {}
        Ok(())
    }

    /// Borrow a module's concrete type for inspection after the run
    /// completes (statistics readout). Panics if `M` doesn't match the
    /// module stored at `id`; callers are expected to know their own
    /// topology.
    pub fn module<M: Module + 'static>(&self, id: ModuleId) -> &M {
        self.modules[id.0]
            .as_ref()
            .expect("module slot empty outside dispatch")
            .as_ref()
            .as_any()
            .downcast_ref::<M>()
            .expect("module type mismatch")
    }

    /// Mutable counterpart of [`Sim::module`], for composer-side setup
    /// (e.g. drawing a `RandomSource`'s first interval before its initial
    /// timer is scheduled) and test fixtures.
    pub fn module_mut<M: Module + 'static>(&mut self, id: ModuleId) -> &mut M {
        self.modules[id.0]
            .as_mut()
            .expect("module slot empty outside dispatch")
            .as_mut()
            .as_any_mut()
            .downcast_mut::<M>()
            .expect("module type mismatch")
    }
}
