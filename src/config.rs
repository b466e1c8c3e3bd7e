use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::event::FaultPolicy;

/// Environment variable selecting the bus's fault policy
pub const FAULT_POLICY_ENV: &str = "PUBSUB_FAULT_POLICY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid fault policy '{0}' (expected 'fail-fast' or 'isolate')")]
    InvalidFaultPolicy(String),
}

/// Settings applied to an event bus at construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusConfig {
    #[serde(default)]
    pub fault_policy: FaultPolicy,
}

impl BusConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fault_policy(mut self, fault_policy: FaultPolicy) -> Self {
        self.fault_policy = fault_policy;
        self
    }

    /// Reads the configuration from the process environment
    ///
    /// Unset variables fall back to their defaults; a set but unparseable
    /// value is an error rather than silently ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BusConfig::from_env`] but with a caller-supplied variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(FAULT_POLICY_ENV) {
            config.fault_policy = raw
                .trim()
                .parse::<FaultPolicy>()
                .map_err(|_| ConfigError::InvalidFaultPolicy(raw.clone()))?;
        }

        debug!(fault_policy = %config.fault_policy, "Loaded bus configuration");
        Ok(config)
    }
}
