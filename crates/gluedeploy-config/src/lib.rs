// gluedeploy-config - Runtime configuration for the custom-resource handler
//
// Two independent inputs:
// - Resource parameters: bucket names, script URLs, catalog names, role ARN.
//   Raw (unprefixed) environment variables set by the deployment template.
//   Every key an operation needs is required; there are no defaults.
// - Handler configuration: optional resource toggles and logging.
//   1. Environment variables (GLUEDEPLOY_* prefix, highest priority)
//   2. Config file path from GLUEDEPLOY_CONFIG
//   3. Config file contents from GLUEDEPLOY_CONFIG_CONTENT
//   4. Defaults (lowest priority)

use anyhow::Result;
use serde::{Deserialize, Serialize};

mod env_overrides;
mod error;
mod params;
mod sources;
mod validation;

pub use env_overrides::{EnvSource, ENV_PREFIX};
pub use error::ConfigError;
pub use params::{CreateParameters, DeleteParameters, S3Uri};
pub use sources::{MapEnvSource, StdEnvSource};

/// Handler configuration (everything that is not a resource parameter)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub crawler: ResourceToggle,
    pub jobs: ResourceToggle,
    pub logging: LoggingConfig,
}

/// Enables an optional resource type for both create and delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceToggle {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

impl DeployConfig {
    /// Load configuration from the process environment and config files
    pub fn load() -> Result<Self> {
        sources::load_config(&StdEnvSource)
    }

    /// Load configuration from an arbitrary environment source
    pub fn load_from<E: EnvSource>(env: &E) -> Result<Self> {
        sources::load_config(env)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Non-fatal configuration problems, for logging once tracing is up
    pub fn warnings(&self) -> Vec<String> {
        validation::config_warnings(self)
    }
}
