// Configuration validation

use crate::*;
use anyhow::{bail, Result};

pub fn validate_config(config: &DeployConfig) -> Result<()> {
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Settings that load fine but are likely mistakes.
pub fn config_warnings(config: &DeployConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    // Jobs read the crawled table
    if config.jobs.enabled && !config.crawler.enabled {
        warnings.push(
            "jobs.enabled is set without crawler.enabled; the DQ job expects a crawled table"
                .to_string(),
        );
    }

    warnings
}

fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    if config.level.trim().is_empty() {
        bail!("logging.level must not be empty");
    }

    Ok(())
}
