use crate::{DeployConfig, LogFormat};
use anyhow::{anyhow, Context, Result};

pub const ENV_PREFIX: &str = "GLUEDEPLOY_";

/// Abstraction over environment-variable lookups so tests can supply their
/// own source instead of mutating the process environment.
pub trait EnvSource {
    /// Get an environment variable with the GLUEDEPLOY_ prefix applied
    fn get(&self, key: &str) -> Option<String>;

    /// Get an environment variable WITHOUT the GLUEDEPLOY_ prefix
    /// Used for resource parameters set by the deployment template
    fn get_raw(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority) to the config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut DeployConfig, env: &E) -> Result<()> {
    // Optional resource toggles
    if let Some(val) = get_env_bool(env, "ENABLE_CRAWLER")? {
        config.crawler.enabled = val;
    }
    if let Some(val) = get_env_bool(env, "ENABLE_ETL_JOBS")? {
        config.jobs.enabled = val;
    }

    // Logging
    if let Some(level) = env.get("LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = env.get("LOG_FORMAT") {
        config.logging.format = format
            .parse::<LogFormat>()
            .context("Invalid GLUEDEPLOY_LOG_FORMAT value")?;
    }

    Ok(())
}

fn get_env_bool<E: EnvSource>(env: &E, key: &str) -> Result<Option<bool>> {
    match env.get(key) {
        Some(val) => {
            let parsed = match val.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                other => {
                    return Err(anyhow!(
                        "Failed to parse {}{} (expected bool): {}",
                        ENV_PREFIX,
                        key,
                        other
                    ))
                }
            };
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
