//! Weather API client.
//!
//! Calls `GET {weather}/v1/current.json?key=<key>&q=<locality>` and reads
//! `current.temp_c`. The key is configuration; it never appears in logs.

use async_trait::async_trait;
use axum::http::HeaderMap;
use opentelemetry::trace::SpanKind;
use opentelemetry::{Context, KeyValue};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::domain::{LookupError, TemperatureLookup};
use crate::observability::Instrumentation;

pub const TEMPERATURE_SPAN: &str = "weatherAPI";

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temp_c: f64,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn parse_celsius(body: &[u8]) -> Result<f64, LookupError> {
    serde_json::from_slice::<CurrentResponse>(body)
        .map(|r| r.current.temp_c)
        .map_err(|e| LookupError::Upstream(format!("invalid weather response: {}", e)))
}

fn status_error(status: StatusCode, body: &[u8]) -> LookupError {
    match serde_json::from_slice::<ApiErrorResponse>(body) {
        Ok(api) => LookupError::Upstream(format!(
            "weather service responded with status {}: {}",
            status, api.error.message
        )),
        Err(_) => LookupError::Upstream(format!(
            "weather service responded with status {}",
            status
        )),
    }
}

/// `TemperatureLookup` backed by weatherapi.com.
pub struct WeatherApiClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    instrumentation: Instrumentation,
}

impl WeatherApiClient {
    pub fn new(
        http: reqwest::Client,
        base_url: Url,
        api_key: String,
        instrumentation: Instrumentation,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key,
            instrumentation,
        }
    }

    fn request_url(&self, locality: &str) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::Upstream("weather URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v1", "current.json"]);
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("q", locality);
        Ok(url)
    }

    async fn fetch(&self, cx: &Context, locality: &str) -> Result<f64, LookupError> {
        let url = self.request_url(locality)?;
        let mut headers = HeaderMap::new();
        self.instrumentation.inject(cx, &mut headers);

        // reqwest errors embed the URL, which holds the key.
        let response = self
            .http
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| LookupError::upstream(e.without_url()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| LookupError::upstream(e.without_url()))?;

        if status != StatusCode::OK {
            return Err(status_error(status, &body));
        }
        parse_celsius(&body)
    }
}

#[async_trait]
impl TemperatureLookup for WeatherApiClient {
    async fn lookup_temperature(&self, cx: &Context, locality: &str) -> Result<f64, LookupError> {
        let span = self
            .instrumentation
            .start_span(TEMPERATURE_SPAN, SpanKind::Client, cx);

        tracing::info!(city = %locality, trace_id = %span.trace_id(), "Getting weather for city");

        match self.fetch(span.context(), locality).await {
            Ok(celsius) => {
                span.set_attribute(KeyValue::new("Temperature in C", celsius));
                tracing::info!(city = %locality, temp_c = celsius, "Weather service responded");
                Ok(celsius)
            }
            Err(e) => {
                span.fail(e.to_string());
                tracing::error!(city = %locality, error = %e, trace_id = %span.trace_id(), "Weather lookup failed");
                Err(e)
            }
        }
    }
}
