//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize logging, telemetry and metrics in order
//! - Build the unit's components with their injected collaborators
//! - Bind the listener and serve until a shutdown signal
//! - Flush telemetry on the way out
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use url::Url;

use crate::back::{ViaCepClient, WeatherApiClient, WeatherResolver};
use crate::config::{ConfigError, ServiceConfig, TimeoutConfig, Unit};
use crate::domain::TemperatureResolver;
use crate::front::BackClient;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::wait_for_signal;
use crate::observability::{logging, metrics, Instrumentation, Telemetry, TelemetryError};

/// Errors that stop the process before or while serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("invalid URL in {field}: {source}")]
    Url {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("back.weather_api_key is not set")]
    MissingApiKey,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, StartupError> {
    Url::parse(value).map_err(|source| StartupError::Url { field, source })
}

/// Outbound HTTP client shared by a unit's components.
pub fn build_http_client(timeouts: &TimeoutConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!("cep-weather/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.upstream_secs))
        .build()
}

/// Wire the resolver for `unit` from configuration.
pub fn build_resolver(
    unit: Unit,
    config: &ServiceConfig,
    instrumentation: &Instrumentation,
) -> Result<Arc<dyn TemperatureResolver>, StartupError> {
    let http = build_http_client(&config.timeouts)?;

    let resolver: Arc<dyn TemperatureResolver> = match unit {
        Unit::Front => Arc::new(BackClient::new(
            http,
            parse_url("front.back_url", &config.front.back_url)?,
            instrumentation.clone(),
        )),
        Unit::Back => {
            let api_key = config
                .back
                .weather_api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .ok_or(StartupError::MissingApiKey)?;

            let locality = ViaCepClient::new(
                http.clone(),
                parse_url("back.directory_url", &config.back.directory_url)?,
                instrumentation.clone(),
            );
            let temperature = WeatherApiClient::new(
                http,
                parse_url("back.weather_url", &config.back.weather_url)?,
                api_key,
                instrumentation.clone(),
            );
            Arc::new(WeatherResolver::new(
                Arc::new(locality),
                Arc::new(temperature),
                instrumentation.clone(),
            ))
        }
    };

    Ok(resolver)
}

/// Run `unit` with a validated `config` until SIGINT/SIGTERM.
pub async fn run(unit: Unit, config: ServiceConfig) -> Result<(), StartupError> {
    logging::init_logging(&config.observability)?;
    tracing::info!(unit = %unit, version = env!("CARGO_PKG_VERSION"), "cep-weather starting");

    let scope = match unit {
        Unit::Front => "cep-weather-front",
        Unit::Back => "cep-weather-back",
    };
    let telemetry = Telemetry::init(scope, &config.observability)?;
    let instrumentation = telemetry.instrumentation();

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let resolver = build_resolver(unit, &config, &instrumentation)?;

    let bind_address = config.listener.bind_address_for(unit);
    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, unit, resolver, instrumentation);
    let server_shutdown = shutdown.subscribe();

    let signal_task = tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    let result = server.run(listener, server_shutdown).await;
    signal_task.abort();

    telemetry.shutdown();
    tracing::info!("Shutdown complete");
    result.map_err(StartupError::from)
}
