//! The event queue driving the simulation clock.
//!
//! A min-heap keyed by `(time, sequence)`, exactly as the teacher's engine
//! does it, generalized from two fixed node kinds to an arbitrary
//! `ModuleId` arena. No cancellation: once scheduled, an event always
//! fires. A module that needs to ignore a stale timer does so itself, by
//! checking its own state when the timer fires.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::message::Message;
use crate::module::{ConnectionId, ModuleId};

#[derive(Debug)]
pub enum EventKind {
    Deliver {
        msg: Message,
        connection: ConnectionId,
        sender: ModuleId,
    },
    Timer {
        token: u32,
    },
}

#[derive(Debug)]
pub struct Event {
    pub time: f64,
    pub target: ModuleId,
    pub kind: EventKind,
    seq: u64,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the smallest
        // (time, seq) pair to pop first.
        other
            .time
            .partial_cmp(&self.time)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Owns simulated time and the pending event queue. FIFO among events at
/// the same timestamp is guaranteed by the monotonically increasing
/// sequence number assigned at scheduling time, not by insertion order
/// into the heap.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: f64,
    queue: BinaryHeap<Event>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    pub fn schedule_message(
        &mut self,
        delay: f64,
        target: ModuleId,
        msg: Message,
        connection: ConnectionId,
        sender: ModuleId,
    ) {
        let seq = self.next_seq();
        self.queue.push(Event {
            time: self.now + delay,
            target,
            kind: EventKind::Deliver {
                msg,
                connection,
                sender,
            },
            seq,
        });
    }

    pub fn schedule_timer(&mut self, delay: f64, target: ModuleId, token: u32) {
        let seq = self.next_seq();
        self.queue.push(Event {
            time: self.now + delay,
            target,
            kind: EventKind::Timer { token },
            seq,
        });
    }

    /// Pop the next event, advancing `now` to its timestamp. `None` means
    /// the simulation has run out of work.
    pub fn pop(&mut self) -> Option<Event> {
        let event = self.queue.pop()?;
        self.now = event.time;
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::AppData;

    fn mid(n: usize) -> ModuleId {
        ModuleId(n)
    }

    #[test]
    fn pops_in_time_order() {
        let mut sched = Scheduler::new();
        sched.schedule_timer(5.0, mid(0), 1);
        sched.schedule_timer(1.0, mid(0), 2);
        sched.schedule_timer(3.0, mid(0), 3);
        let times: Vec<f64> = std::iter::from_fn(|| sched.pop()).map(|e| e.time).collect();
        assert_eq!(times, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn fifo_at_equal_timestamps() {
        let mut sched = Scheduler::new();
        sched.schedule_timer(2.0, mid(0), 10);
        sched.schedule_timer(2.0, mid(0), 20);
        sched.schedule_timer(2.0, mid(0), 30);
        let tokens: Vec<u64> = std::iter::from_fn(|| sched.pop())
            .map(|e| match e.kind {
                EventKind::Timer { token } => token,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(tokens, vec![10, 20, 30]);
    }

    #[test]
    fn now_advances_to_popped_event_time() {
        let mut sched = Scheduler::new();
        sched.schedule_message(
            4.0,
            mid(1),
            Message::AppData(AppData::new(0, 1, 10.0)),
            ConnectionId(0),
            mid(0),
        );
        assert_eq!(sched.now(), 0.0);
        sched.pop();
        assert_eq!(sched.now(), 4.0);
    }
}
