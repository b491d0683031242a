use serde::{Deserialize, Serialize};

use crate::latency::DelayProfile;

/// Configuration for a simulated backend.
///
/// Defaults to 500 generated records and a 300–900 ms delay on every
/// call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    pub count: usize,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            seed: 42,
            count: 500,
            delay_min_ms: 300,
            delay_max_ms: 900,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid sim config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("delay_min_ms ({min}) exceeds delay_max_ms ({max})")]
    DelayBounds { min: u64, max: u64 },
}

impl SimConfig {
    /// Parse from a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(input)?;
        if config.delay_min_ms > config.delay_max_ms {
            return Err(ConfigError::DelayBounds {
                min: config.delay_min_ms,
                max: config.delay_max_ms,
            });
        }
        Ok(config)
    }

    /// Seeded config with no delay, for deterministic tests.
    pub fn deterministic(seed: u64) -> Self {
        SimConfig {
            seed,
            delay_min_ms: 0,
            delay_max_ms: 0,
            ..SimConfig::default()
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn delay(&self) -> DelayProfile {
        DelayProfile::from_millis(self.delay_min_ms, self.delay_max_ms)
    }
}
