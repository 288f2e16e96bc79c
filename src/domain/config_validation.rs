//! Configuration validation.
//!
//! Validates config fields before a run and resolves them into [`Settings`].

use crate::domain::error::TvlError;
use crate::domain::settings::{
    Settings, DEFAULT_DATA_PATH, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS,
};
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub data_path: Option<PathBuf>,
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TvlError> {
    reject_blank(config, "source", "endpoint")?;
    reject_blank(config, "store", "path")?;
    if let Some(endpoint) = config.get_string("source", "endpoint") {
        parse_endpoint(&endpoint)?;
    }
    validate_timeout(config)?;
    Ok(())
}

/// Resolves settings with precedence: override, config file, default.
pub fn resolve_settings(
    config: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<Settings, TvlError> {
    validate_config(config)?;

    let endpoint = overrides
        .endpoint
        .clone()
        .or_else(|| config.get_string("source", "endpoint"))
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let endpoint = parse_endpoint(&endpoint)?;

    let data_path = match &overrides.data_path {
        Some(p) if p.as_os_str().is_empty() => {
            return Err(invalid("store", "path", "path must not be empty"));
        }
        Some(p) => p.clone(),
        None => config
            .get_string("store", "path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
    };

    let timeout_secs = config.get_int("source", "timeout_secs", DEFAULT_TIMEOUT_SECS);

    Ok(Settings {
        endpoint,
        api_key: config.get_string("source", "api_key"),
        timeout: Duration::from_secs(timeout_secs as u64),
        data_path,
    })
}

fn parse_endpoint(raw: &str) -> Result<Url, TvlError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| invalid("source", "endpoint", &format!("invalid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(
            "source",
            "endpoint",
            &format!("unsupported scheme {other}, expected http or https"),
        )),
    }
}

/// A key written with no value would silently fall back to the default.
fn reject_blank(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), TvlError> {
    if config.has_key(section, key) && config.get_string(section, key).is_none() {
        return Err(invalid(section, key, &format!("{key} must not be empty")));
    }
    Ok(())
}

fn validate_timeout(config: &dyn ConfigPort) -> Result<(), TvlError> {
    let value = config.get_int("source", "timeout_secs", DEFAULT_TIMEOUT_SECS);
    if value <= 0 {
        return Err(invalid(
            "source",
            "timeout_secs",
            "timeout_secs must be positive",
        ));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> TvlError {
    TvlError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
