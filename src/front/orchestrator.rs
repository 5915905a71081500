//! Relay from the Front unit to the Back unit.
//!
//! # Responsibilities
//! - Forward the postal code to the Back unit's lookup endpoint
//! - Inject the current trace context into the outbound headers
//! - Translate the Back unit's status into `LookupError`
//!
//! # Design Decisions
//! - 404 from the Back unit is the only not-found signal
//! - Any other non-200 status carries the Back unit's text body as the message

use async_trait::async_trait;
use axum::http::HeaderMap;
use opentelemetry::trace::SpanKind;
use opentelemetry::{Context, KeyValue};
use reqwest::StatusCode;
use url::Url;

use crate::domain::{LookupError, PostalCode, TemperatureResolver, WeatherReport};
use crate::observability::Instrumentation;

/// Span name prefix; the postal code is appended.
pub const FRONT_SPAN: &str = "weather-front";

/// `TemperatureResolver` that asks the Back unit over HTTP.
pub struct BackClient {
    http: reqwest::Client,
    endpoint: Url,
    instrumentation: Instrumentation,
}

impl BackClient {
    pub fn new(http: reqwest::Client, endpoint: Url, instrumentation: Instrumentation) -> Self {
        Self {
            http,
            endpoint,
            instrumentation,
        }
    }

    fn request_url(&self, cep: &PostalCode) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("cep", cep.as_str());
        url
    }

    async fn call(&self, cx: &Context, cep: &PostalCode) -> Result<WeatherReport, LookupError> {
        let mut headers = HeaderMap::new();
        self.instrumentation.inject(cx, &mut headers);

        let response = self
            .http
            .get(self.request_url(cep))
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let body = response.bytes().await?;
                serde_json::from_slice::<WeatherReport>(&body).map_err(|e| {
                    LookupError::Upstream(format!("invalid response from back unit: {}", e))
                })
            }
            StatusCode::NOT_FOUND => Err(LookupError::NotFound),
            _ => {
                let body = match response.text().await {
                    Ok(body) => body,
                    Err(e) => {
                        tracing::debug!(status = %status, error = %e, "Failed to read back unit error body");
                        String::new()
                    }
                };
                let message = body.trim();
                if message.is_empty() {
                    Err(LookupError::Upstream(format!(
                        "back unit responded with status {}",
                        status
                    )))
                } else {
                    Err(LookupError::Upstream(message.to_string()))
                }
            }
        }
    }
}

#[async_trait]
impl TemperatureResolver for BackClient {
    async fn resolve(&self, cx: &Context, cep: &PostalCode) -> Result<WeatherReport, LookupError> {
        let span = self
            .instrumentation
            .start_span(format!("{}-{}", FRONT_SPAN, cep), SpanKind::Client, cx);

        tracing::info!(
            cep = %cep,
            trace_id = %span.trace_id(),
            "Sending CEP to back unit"
        );

        match self.call(span.context(), cep).await {
            Ok(report) => {
                span.set_attribute(KeyValue::new("city", report.city.clone()));
                tracing::info!(
                    cep = %cep,
                    city = %report.city,
                    temp_c = report.temp_c,
                    trace_id = %span.trace_id(),
                    "Back unit resolved temperature"
                );
                Ok(report)
            }
            Err(e) => {
                span.fail(e.to_string());
                match &e {
                    LookupError::NotFound => {
                        tracing::warn!(cep = %cep, trace_id = %span.trace_id(), "Back unit could not find zipcode")
                    }
                    _ => {
                        tracing::error!(cep = %cep, error = %e, trace_id = %span.trace_id(), "Back unit request failed")
                    }
                }
                Err(e)
            }
        }
    }
}
