use std::path::Path;

use anyhow::{anyhow, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::config::services::StaticConfig;
use crate::config::settings::{LoggingConfig, SettingsConfig};
use crate::config::validator;

/// ================================
/// Full requester configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RequesterConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub services: StaticConfig,
}

/// Load, expand and validate config from a YAML file
pub async fn file_to_config(path: &Path) -> Result<RequesterConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("failed to read config '{}': {}", path.display(), e))?;

    let expanded = expand_env_vars(&content)?;
    parse_config(&expanded)
}

pub fn parse_config(content: &str) -> Result<RequesterConfig> {
    let mut config: RequesterConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    // Apply defaults
    if config.settings.logging.is_none() {
        config.settings.logging = Some(LoggingConfig::default());
    }

    debug!("validation config ...");
    validator::validate_requester_config(&config)
        .map_err(|errors| anyhow!("config is not valid: {}", errors.join("; ")))?;

    if config.services.is_empty() {
        warn!("config: 'services' is empty; every request will fail");
    }
    Ok(config)
}

/// Replace `${VAR}` and `${VAR:default}` with environment values.
/// Unset variables without a default expand to an empty string.
pub fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]*))?\}")?;
    let expanded = re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    });
    Ok(expanded.into_owned())
}
