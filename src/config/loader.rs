//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{ServiceConfig, Unit};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `back.weather_api_key`.
pub const WEATHER_API_KEY_ENV: &str = "WEATHER_API_KEY";
/// Environment variable overriding `front.back_url`.
pub const BACK_URL_ENV: &str = "BACK_URL";
/// Environment variable overriding `observability.otlp_endpoint`.
pub const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServiceConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Apply environment overrides on top of file values.
pub fn apply_env_overrides(config: &mut ServiceConfig) {
    apply_overrides(config, |name| std::env::var(name).ok());
}

fn apply_overrides(config: &mut ServiceConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(key) = lookup(WEATHER_API_KEY_ENV) {
        config.back.weather_api_key = Some(key);
    }
    if let Some(url) = lookup(BACK_URL_ENV) {
        config.front.back_url = url;
    }
    if let Some(endpoint) = lookup(OTLP_ENDPOINT_ENV) {
        config.observability.otlp_endpoint = Some(endpoint);
    }
}

/// Load (or default), apply env overrides and validate for `unit`.
pub fn resolve_config(path: Option<&Path>, unit: Unit) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    apply_env_overrides(&mut config);
    validate_config(&config, unit).map_err(ConfigError::Validation)?;
    Ok(config)
}
