// Configuration source loading.
//
// Priority order:
// 1. Environment variables (GLUEDEPLOY_* prefix)
// 2. Config file path from GLUEDEPLOY_CONFIG
// 3. Inline config content from GLUEDEPLOY_CONFIG_CONTENT
// 4. Default config file (./gluedeploy.toml, shipped next to the bootstrap binary)
// 5. Defaults

use crate::env_overrides::{self, EnvSource, ENV_PREFIX};
use crate::DeployConfig;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "./gluedeploy.toml";

/// Load configuration using the given environment source.
pub fn load_config<E: EnvSource>(env: &E) -> Result<DeployConfig> {
    let mut config = load_from_file(env)?.unwrap_or_default();

    env_overrides::apply_env_overrides(&mut config, env)?;
    config.validate()?;
    Ok(config)
}

fn load_from_file<E: EnvSource>(env: &E) -> Result<Option<DeployConfig>> {
    if let Some(path) = env.get("CONFIG") {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let config: DeployConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;
        return Ok(Some(config));
    }

    if let Some(content) = env.get("CONFIG_CONTENT") {
        let config: DeployConfig = toml::from_str(&content)
            .context("Failed to parse inline config from GLUEDEPLOY_CONFIG_CONTENT")?;
        return Ok(Some(config));
    }

    if Path::new(DEFAULT_CONFIG_FILE).exists() {
        let content = std::fs::read_to_string(DEFAULT_CONFIG_FILE)
            .with_context(|| format!("Failed to read config file: {}", DEFAULT_CONFIG_FILE))?;
        let config: DeployConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", DEFAULT_CONFIG_FILE))?;
        return Ok(Some(config));
    }

    Ok(None)
}

/// Reads from the process environment
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(format!("{}{}", ENV_PREFIX, key)).ok()
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of variables, keyed by their full (raw) names
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: BTreeMap<String, String>,
}

impl MapEnvSource {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.vars.remove(key);
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(&format!("{}{}", ENV_PREFIX, key)).cloned()
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}
