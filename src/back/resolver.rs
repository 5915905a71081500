//! Back unit resolution pipeline.
//!
//! Locality first, then temperature, then unit conversion. The steps run
//! strictly in order and the first failure ends the request.

use std::sync::Arc;

use async_trait::async_trait;
use opentelemetry::trace::SpanKind;
use opentelemetry::{Context, KeyValue};

use crate::domain::{
    LocalityLookup, LookupError, PostalCode, TemperatureLookup, TemperatureResolver, WeatherReport,
};
use crate::observability::Instrumentation;

/// Span name prefix; the postal code is appended.
pub const BACK_SPAN: &str = "weather-back";

/// `TemperatureResolver` chaining a locality lookup and a temperature lookup.
pub struct WeatherResolver {
    locality: Arc<dyn LocalityLookup>,
    temperature: Arc<dyn TemperatureLookup>,
    instrumentation: Instrumentation,
}

impl WeatherResolver {
    pub fn new(
        locality: Arc<dyn LocalityLookup>,
        temperature: Arc<dyn TemperatureLookup>,
        instrumentation: Instrumentation,
    ) -> Self {
        Self {
            locality,
            temperature,
            instrumentation,
        }
    }
}

#[async_trait]
impl TemperatureResolver for WeatherResolver {
    async fn resolve(&self, cx: &Context, cep: &PostalCode) -> Result<WeatherReport, LookupError> {
        let span = self
            .instrumentation
            .start_span(format!("{}-{}", BACK_SPAN, cep), SpanKind::Server, cx);

        let locality = match self.locality.lookup_locality(span.context(), cep).await {
            Ok(locality) => locality,
            Err(LookupError::NotFound) => {
                span.fail(LookupError::NotFound.to_string());
                return Err(LookupError::NotFound);
            }
            Err(e) => {
                span.fail(e.to_string());
                return Err(LookupError::upstream(e));
            }
        };

        let celsius = match self
            .temperature
            .lookup_temperature(span.context(), &locality)
            .await
        {
            Ok(celsius) => celsius,
            Err(e) => {
                span.fail(e.to_string());
                return Err(LookupError::upstream(e));
            }
        };

        let report = WeatherReport::from_celsius(locality, celsius);

        let attributes = [
            KeyValue::new("Temperature in C", report.temp_c),
            KeyValue::new("Temperature in F", report.temp_f),
            KeyValue::new("Temperature in K", report.temp_k),
            KeyValue::new("City", report.city.clone()),
        ];
        for attribute in &attributes {
            span.set_attribute(attribute.clone());
        }
        self.instrumentation.record_lookup(&attributes);

        tracing::info!(
            cep = %cep,
            city = %report.city,
            temp_c = report.temp_c,
            temp_f = report.temp_f,
            temp_k = report.temp_k,
            trace_id = %span.trace_id(),
            "Resolved temperature"
        );

        Ok(report)
    }
}
