//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - service base_url is an absolute http(s) url without trailing '/'
//! - credentials are present
//! - tenant context is usable as a header value

use http::HeaderValue;
use tracing::{error, info};

use crate::config::loader::RequesterConfig;
use crate::config::services::ServiceCredential;
use crate::config::settings::SettingsConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_requester_config(cfg: &RequesterConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);

    let mut services: Vec<(&String, &ServiceCredential)> = cfg.services.iter().collect();
    services.sort_by(|a, b| a.0.cmp(b.0));
    for (name, credential) in services {
        validate_service(name, credential, &mut errors);
    }

    if errors.is_empty() {
        info!("config is valid, {} service(s) configured", cfg.services.len());
        Ok(())
    } else {
        for e in &errors {
            error!("config validation: {}", e);
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.http.timeout_ms == 0 {
        errors.push("settings.http.timeout_ms must be > 0".to_string());
    }
    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn validate_service(name: &str, credential: &ServiceCredential, errors: &mut Vec<String>) {
    if name.trim().is_empty() {
        errors.push("services: service name must not be empty".to_string());
    }
    if credential.token.is_empty() {
        errors.push(format!("services['{}'].token must not be empty", name));
    }
    if credential.secret.is_empty() {
        errors.push(format!("services['{}'].secret must not be empty", name));
    }
    if HeaderValue::from_str(&credential.context).is_err() {
        errors.push(format!(
            "services['{}'].context is not a valid header value",
            name
        ));
    }

    let base_url = credential.base_url.as_str();
    match reqwest::Url::parse(base_url) {
        Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
            errors.push(format!(
                "services['{}'].base_url '{}' must use http or https",
                name, base_url
            ));
        }
        Ok(_) => {}
        Err(e) => {
            errors.push(format!(
                "services['{}'].base_url '{}' is not a valid url: {}",
                name, base_url, e
            ));
        }
    }
    if base_url.ends_with('/') {
        errors.push(format!(
            "services['{}'].base_url '{}' must not end with '/'",
            name, base_url
        ));
    }
}
