//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for both units.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which deployable unit this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Validates the postal code and relays to the Back unit.
    Front,
    /// Resolves locality and temperature from the upstream services.
    Back,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Front => "front",
            Unit::Back => "back",
        }
    }

    /// Listener address used when the config file does not set one.
    pub fn default_bind_address(&self) -> &'static str {
        match self {
            Unit::Front => "0.0.0.0:8080",
            Unit::Back => "0.0.0.0:8081",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root configuration for either unit.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address, route path).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Front unit settings.
    pub front: FrontConfig,

    /// Back unit settings.
    pub back: BackConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080"). Unset means the unit's default.
    pub bind_address: Option<String>,

    /// Path serving `GET ?cep=<code>`.
    pub path: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: None,
            path: "/temperature".to_string(),
        }
    }
}

impl ListenerConfig {
    /// Configured bind address, or the unit's default.
    pub fn bind_address_for(&self, unit: Unit) -> String {
        self.bind_address
            .clone()
            .unwrap_or_else(|| unit.default_bind_address().to_string())
    }
}

/// Timeout configuration for inbound and outbound calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Inbound request deadline in seconds.
    pub request_secs: u64,

    /// Outbound connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Outbound total request timeout in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            connect_secs: 5,
            upstream_secs: 10,
        }
    }
}

/// Front unit configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FrontConfig {
    /// Back unit lookup endpoint; `cep` is appended as a query parameter.
    pub back_url: String,
}

impl Default for FrontConfig {
    fn default() -> Self {
        Self {
            back_url: "http://service-b:8081/temperature".to_string(),
        }
    }
}

/// Back unit configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackConfig {
    /// Postal code directory base URL.
    pub directory_url: String,

    /// Weather API base URL.
    pub weather_url: String,

    /// Weather API key. Required by the Back unit; usually set via `WEATHER_API_KEY`.
    pub weather_api_key: Option<String>,
}

impl Default for BackConfig {
    fn default() -> Self {
        Self {
            directory_url: "https://viacep.com.br".to_string(),
            weather_url: "http://api.weatherapi.com".to_string(),
            weather_api_key: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// OTLP/HTTP collector base URL (e.g., "http://otel-collector:4318").
    pub otlp_endpoint: Option<String>,

    /// `service.name` resource attribute.
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
            otlp_endpoint: None,
            service_name: "cep-weather".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.path, "/temperature");
        assert_eq!(config.listener.bind_address_for(Unit::Front), "0.0.0.0:8080");
        assert_eq!(config.listener.bind_address_for(Unit::Back), "0.0.0.0:8081");
        assert!(config.back.weather_api_key.is_none());
    }

    #[test]
    fn test_full_config() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"
            path = "/temp"

            [timeouts]
            upstream_secs = 3

            [back]
            weather_api_key = "k"

            [observability]
            log_format = "json"
            otlp_endpoint = "http://collector:4318"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address_for(Unit::Back), "127.0.0.1:9000");
        assert_eq!(config.listener.path, "/temp");
        assert_eq!(config.timeouts.upstream_secs, 3);
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.back.weather_api_key.as_deref(), Some("k"));
        assert_eq!(config.back.directory_url, "https://viacep.com.br");
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }
}
