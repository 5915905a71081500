//! Postal code directory client.
//!
//! # Responsibilities
//! - Call `GET {directory}/ws/{cep}/json/`
//! - Tell "code does not exist" apart from transport and decode failures
//!
//! # Design Decisions
//! - The directory answers unknown codes with HTTP 200 and an `erro` flag, not 404
//! - `erro` arrives as a boolean or as the string "true"; both count
//! - No flag means found, but then the locality must be present

use async_trait::async_trait;
use axum::http::HeaderMap;
use opentelemetry::trace::SpanKind;
use opentelemetry::{Context, KeyValue};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::domain::{LocalityLookup, LookupError, PostalCode};
use crate::observability::Instrumentation;

pub const LOCALITY_SPAN: &str = "viaCep";

#[derive(Debug, Deserialize)]
struct DirectoryResponse {
    #[serde(default)]
    localidade: Option<String>,
    #[serde(default)]
    erro: Option<NotFoundFlag>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NotFoundFlag {
    Bool(bool),
    Text(String),
}

impl NotFoundFlag {
    fn is_set(&self) -> bool {
        match self {
            NotFoundFlag::Bool(flag) => *flag,
            NotFoundFlag::Text(text) => text.eq_ignore_ascii_case("true"),
        }
    }
}

/// Decode a directory body into the locality name.
fn parse_locality(body: &[u8]) -> Result<String, LookupError> {
    let response: DirectoryResponse = serde_json::from_slice(body)
        .map_err(|e| LookupError::Upstream(format!("invalid directory response: {}", e)))?;

    if response.erro.as_ref().is_some_and(NotFoundFlag::is_set) {
        return Err(LookupError::NotFound);
    }

    match response.localidade {
        Some(locality) if !locality.trim().is_empty() => Ok(locality),
        _ => Err(LookupError::Upstream(
            "directory response has no locality".to_string(),
        )),
    }
}

/// `LocalityLookup` backed by the ViaCEP directory.
pub struct ViaCepClient {
    http: reqwest::Client,
    base_url: Url,
    instrumentation: Instrumentation,
}

impl ViaCepClient {
    pub fn new(http: reqwest::Client, base_url: Url, instrumentation: Instrumentation) -> Self {
        Self {
            http,
            base_url,
            instrumentation,
        }
    }

    fn request_url(&self, cep: &PostalCode) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::Upstream("directory URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["ws", cep.as_str(), "json", ""]);
        Ok(url)
    }

    async fn fetch(&self, cx: &Context, cep: &PostalCode) -> Result<String, LookupError> {
        let url = self.request_url(cep)?;
        let mut headers = HeaderMap::new();
        self.instrumentation.inject(cx, &mut headers);

        let response = self.http.get(url).headers(headers).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(LookupError::Upstream(format!(
                "directory service responded with status {}",
                status
            )));
        }

        let body = response.bytes().await?;
        parse_locality(&body)
    }
}

#[async_trait]
impl LocalityLookup for ViaCepClient {
    async fn lookup_locality(&self, cx: &Context, cep: &PostalCode) -> Result<String, LookupError> {
        let span = self
            .instrumentation
            .start_span(LOCALITY_SPAN, SpanKind::Client, cx);

        tracing::info!(cep = %cep, trace_id = %span.trace_id(), "Sending CEP to directory service");

        match self.fetch(span.context(), cep).await {
            Ok(locality) => {
                let attribute = KeyValue::new("cep", locality.clone());
                span.set_attribute(attribute.clone());
                self.instrumentation.record_lookup(&[attribute]);
                tracing::info!(cep = %cep, city = %locality, "Directory resolved locality");
                Ok(locality)
            }
            Err(LookupError::NotFound) => {
                span.fail(LookupError::NotFound.to_string());
                tracing::error!(cep = %cep, trace_id = %span.trace_id(), "can not find zipcode");
                Err(LookupError::NotFound)
            }
            Err(e) => {
                span.fail(e.to_string());
                tracing::error!(cep = %cep, error = %e, trace_id = %span.trace_id(), "Directory lookup failed");
                Err(e)
            }
        }
    }
}
