//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and upstream URLs parse
//! - Validate value ranges (timeouts > 0)
//! - Require the weather API key for the Back unit
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function of (config, unit)
//! - Runs before any subsystem is initialized

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{ServiceConfig, Unit};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: invalid URL '{value}': {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("listener.path must start with '/' (got '{0}')")]
    InvalidPath(String),

    #[error("back.weather_api_key is required (set it in the config file or WEATHER_API_KEY)")]
    MissingWeatherApiKey,
}

/// Check `config` for everything `unit` needs at startup.
pub fn validate_config(config: &ServiceConfig, unit: Unit) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let bind = config.listener.bind_address_for(unit);
    if bind.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: bind,
        });
    }

    if !config.listener.path.starts_with('/') {
        errors.push(ValidationError::InvalidPath(config.listener.path.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    for (field, value) in [
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.upstream_secs", config.timeouts.upstream_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout { field });
        }
    }

    match unit {
        Unit::Front => {
            check_url(&mut errors, "front.back_url", &config.front.back_url);
        }
        Unit::Back => {
            check_url(&mut errors, "back.directory_url", &config.back.directory_url);
            check_url(&mut errors, "back.weather_url", &config.back.weather_url);

            let has_key = config
                .back
                .weather_api_key
                .as_deref()
                .is_some_and(|k| !k.trim().is_empty());
            if !has_key {
                errors.push(ValidationError::MissingWeatherApiKey);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}
