//! The simulator core's only configuration knob. Per-topology parameters
//! (bitrate, distance, queue capacity, ...) belong to the caller's own
//! config struct, not here. The core treats samplers and connection
//! delays as opaque, already-resolved values.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimConfig {
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { seed: 0 }
    }
}
