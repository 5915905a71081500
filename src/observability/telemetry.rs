//! OpenTelemetry provider lifecycle.
//!
//! Providers are created once at process start and shut down at process stop.
//! They are never installed as globals; components receive `Instrumentation`
//! handles derived from them.

use opentelemetry::metrics::MeterProvider as _;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use thiserror::Error;

use crate::config::ObservabilityConfig;
use crate::observability::trace::Instrumentation;

/// Errors raised while initializing telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build OTLP exporter: {0}")]
    OtlpExporter(#[from] opentelemetry_otlp::ExporterBuildError),
}

/// Owner of the tracer and meter providers for one process.
pub struct Telemetry {
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
    scope: &'static str,
}

impl Telemetry {
    /// Build providers for `scope` (the unit's instrumentation scope name).
    ///
    /// Exporters are attached only when `config.otlp_endpoint` is set.
    pub fn init(scope: &'static str, config: &ObservabilityConfig) -> Result<Self, TelemetryError> {
        let resource = Resource::builder()
            .with_service_name(config.service_name.clone())
            .with_attributes([KeyValue::new("service.version", env!("CARGO_PKG_VERSION"))])
            .build();

        let mut tracer_builder = SdkTracerProvider::builder().with_resource(resource.clone());
        let mut meter_builder = SdkMeterProvider::builder().with_resource(resource);

        match config.otlp_endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => {
                let endpoint = endpoint.trim_end_matches('/');
                let span_exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .with_endpoint(format!("{}/v1/traces", endpoint))
                    .build()?;
                let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
                    .with_http()
                    .with_endpoint(format!("{}/v1/metrics", endpoint))
                    .build()?;

                tracer_builder = tracer_builder.with_batch_exporter(span_exporter);
                meter_builder = meter_builder.with_periodic_exporter(metric_exporter);

                tracing::info!(
                    endpoint = %endpoint,
                    service = %config.service_name,
                    "OTLP export enabled"
                );
            }
            _ => {
                tracing::info!(service = %config.service_name, "OTLP export disabled");
            }
        }

        Ok(Self {
            tracer_provider: tracer_builder.build(),
            meter_provider: meter_builder.build(),
            scope,
        })
    }

    /// Handles to inject into the unit's components.
    pub fn instrumentation(&self) -> Instrumentation {
        let tracer = self.tracer_provider.tracer(self.scope);
        let meter = self.meter_provider.meter(self.scope);
        Instrumentation::new(tracer, &meter)
    }

    /// Flush pending spans and metrics, then close both providers.
    pub fn shutdown(self) {
        if let Err(e) = self.tracer_provider.shutdown() {
            tracing::warn!(error = %e, "Tracer provider shutdown failed");
        }
        if let Err(e) = self.meter_provider.shutdown() {
            tracing::warn!(error = %e, "Meter provider shutdown failed");
        }
        tracing::info!("Telemetry shut down");
    }
}
