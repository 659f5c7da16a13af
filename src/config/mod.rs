//! Builder configuration.
//!
//! ```rust
//! use execution_plan::config::{BranchPolicy, PlanConfig};
//!
//! let config = PlanConfig::new().branch_policy(BranchPolicy::AlwaysBranch);
//! assert_eq!(config.branch_policy, BranchPolicy::AlwaysBranch);
//! ```
//!
//! Configuration can also be read from a JSON file or from environment
//! variables (`EXECUTION_PLAN_BRANCH_POLICY=always_branch`).

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default prefix for environment variables.
pub const DEFAULT_ENV_PREFIX: &str = "EXECUTION_PLAN_";

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The key with invalid value
        key: String,
        /// Error message
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),
}

impl ConfigError {
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Where a leaf write lands when the current scope node is already in use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchPolicy {
    /// The first write into a fresh scope occupies the scope node; later
    /// writes at the same level spawn siblings.
    #[default]
    WriteOnce,
    /// Every write spawns a fresh child of the scope node.
    AlwaysBranch,
}

impl BranchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchPolicy::WriteOnce => "write_once",
            BranchPolicy::AlwaysBranch => "always_branch",
        }
    }
}

impl std::fmt::Display for BranchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BranchPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "write_once" => Ok(BranchPolicy::WriteOnce),
            "always_branch" => Ok(BranchPolicy::AlwaysBranch),
            other => Err(ConfigError::invalid_value(
                "branch_policy",
                format!("expected write_once or always_branch, got '{}'", other),
            )),
        }
    }
}

/// Configuration for [`ExecutionPlanBuilder`](crate::ExecutionPlanBuilder).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    pub branch_policy: BranchPolicy,
}

impl PlanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn branch_policy(mut self, policy: BranchPolicy) -> Self {
        self.branch_policy = policy;
        self
    }

    /// Read overrides from `EXECUTION_PLAN_*` environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_env_with_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Read overrides from `<prefix>BRANCH_POLICY`; unset variables keep defaults.
    pub fn from_env_with_prefix(prefix: &str) -> ConfigResult<Self> {
        let mut config = Self::default();
        let key = format!("{}BRANCH_POLICY", prefix);
        match std::env::var(&key) {
            Ok(value) => {
                config.branch_policy = value.parse().map_err(|e| match e {
                    ConfigError::InvalidValue { message, .. } => {
                        ConfigError::InvalidValue { key, message }
                    }
                    other => other,
                })?
            }
            Err(std::env::VarError::NotPresent) => {}
            Err(e) => return Err(ConfigError::Env(e)),
        }
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file. A missing file yields the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
