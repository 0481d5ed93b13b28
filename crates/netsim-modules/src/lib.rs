pub mod network;
pub mod queue;
pub mod source;
pub mod switch;
pub mod transceiver;

pub use network::NetworkService;
pub use queue::Queue;
pub use source::{start_source, RandomSource, Sink};
pub use switch::NetworkSwitch;
pub use transceiver::{start_transceiver, WiredTransceiver};
