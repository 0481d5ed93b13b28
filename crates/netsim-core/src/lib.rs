pub mod config;
pub mod error;
pub mod message;
pub mod module;
pub mod packet;
pub mod sampler;
pub mod scheduler;
pub mod sim;
pub mod stats;
pub mod switch_table;

pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use message::Message;
pub use module::{ConnectionId, ConnectionRecord, Context, Module, ModuleId};
pub use packet::{Address, AppData, NetworkPacket, WireFrame};
pub use sampler::Sampler;
pub use sim::Sim;
pub use stats::{Intervals, Statistic, Trace};
pub use switch_table::{Link, SwitchTable};
