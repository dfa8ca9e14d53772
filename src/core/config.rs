//! Engine configuration.
//!
//! Tuning knobs for the analytics pipeline with serde support, defaults,
//! and validation.

use crate::core::error::{JakaumaError, Result};
use serde::{Deserialize, Serialize};

/// Default number of concurrent fetch windows per round.
const DEFAULT_FAN_OUT: usize = 4;

/// Configuration for the analytics engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Number of sub-windows the request time range is split into; each
    /// sub-window is fetched concurrently within a round
    pub fan_out: usize,
    /// Seed for the adaptive thinning step. When set, repeated runs over
    /// the same upstream data retain the same records; when unset, each
    /// run seeds from OS entropy
    pub sampling_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fan_out: DEFAULT_FAN_OUT,
            sampling_seed: None,
        }
    }
}

impl EngineConfig {
    /// Sets the number of concurrent fetch windows
    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// Sets a fixed seed for the adaptive thinning step
    pub fn with_sampling_seed(mut self, seed: u64) -> Self {
        self.sampling_seed = Some(seed);
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.fan_out == 0 {
            return Err(JakaumaError::config("fan_out must be at least 1"));
        }
        Ok(())
    }
}
