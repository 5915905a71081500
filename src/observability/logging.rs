//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the logging subsystem once per process
//! - Pick the log level from `RUST_LOG`, falling back to config
//! - Pretty output for development, JSON for collectors
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - Log events carry `trace_id` fields so they line up with exported spans

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// Install the global tracing subscriber.
pub fn init_logging(
    config: &ObservabilityConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "cep_weather={level},tower_http={level}",
            level = config.log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .json(),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    }
}
