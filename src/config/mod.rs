//! Coordinator configuration.
//!
//! Loaded from an optional TOML file with an environment-variable overlay
//! (prefix `LATSIM`, highest priority), deserialized with per-field serde
//! defaults and validated before any worker is spawned. Construction fails
//! on nonsense values instead of deferring the error.

use std::time::Duration;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_WAIT_TIMEOUT_MS;
use crate::Result;

/// What a typed accessor does when the consistency wait times out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadPolicy {
    /// Raise a stale-data error
    #[default]
    Strict,
    /// Log a warning and serve the last-known-good snapshot
    BestEffort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Default bound on consistency waits inside the typed accessors,
    /// in milliseconds
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,

    /// Skip the heavier beam-envelope emittance computation
    #[serde(default)]
    pub disable_emittance: bool,

    /// Accessor behavior on a consistency-wait timeout
    #[serde(default)]
    pub read_policy: ReadPolicy,
}

fn default_wait_timeout_ms() -> u64 {
    DEFAULT_WAIT_TIMEOUT_MS
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: default_wait_timeout_ms(),
            disable_emittance: false,
            read_policy: ReadPolicy::default(),
        }
    }
}

impl SimConfig {
    /// Load configuration with priority:
    /// 1. Serde field defaults
    /// 2. Optional TOML file
    /// 3. Environment variables (`LATSIM_*`, highest priority)
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(p) = path {
            builder = builder.add_source(File::with_name(p));
        }
        builder = builder.add_source(Environment::with_prefix("LATSIM"));

        let config: SimConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.wait_timeout_ms == 0 {
            return Err(ConfigError::Message("wait_timeout_ms must be greater than zero".to_string()).into());
        }
        Ok(())
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}

#[cfg(test)]
mod config_test;
