//! Error taxonomy for precondition and topology violations.
//!
//! Only violations of a structural invariant belong here. A packet
//! arriving on an unrecognized connection, or a stale duplicate, is a
//! normal occurrence handled by a silent drop and a counter, not a
//! `SimError`.

use crate::packet::Address;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("attempted to start a transmission while one was already in progress")]
    ConcurrentTransmission,

    #[error("attempted to pop from an empty queue")]
    PopFromEmptyQueue,

    #[error("module {module:?} has no connection named {name:?}")]
    MissingConnection { module: String, name: String },

    #[error("packet addressed to {src_addr} has no assigned SSN")]
    MissingSsn { src_addr: Address },
}

pub type SimResult<T> = Result<T, SimError>;
