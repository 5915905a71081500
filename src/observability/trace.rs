//! Distributed tracing support.
//!
//! # Responsibilities
//! - Extract trace context from incoming request headers
//! - Inject trace context into outbound request headers
//! - Create child spans that are closed on every return path
//! - Count resolved lookups
//!
//! # Design Decisions
//! - W3C Trace Context + Baggage headers
//! - Handles are built once by `Telemetry` and passed to each component;
//!   nothing here reads OpenTelemetry globals

use std::borrow::Cow;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::metrics::{Counter, Meter};
use opentelemetry::propagation::{
    Extractor, Injector, TextMapCompositePropagator, TextMapPropagator,
};
use opentelemetry::trace::{SpanKind, Status, TraceContextExt, Tracer};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};
use opentelemetry_sdk::trace::SdkTracer;

/// Name of the counter incremented once per resolved lookup.
pub const LOOKUP_COUNTER: &str = "weather.cep";

/// Writes propagation fields into an HTTP header map.
pub struct HeaderInjector<'a>(pub &'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        let name = match HeaderName::from_bytes(key.as_bytes()) {
            Ok(name) => name,
            Err(_) => return,
        };
        if let Ok(value) = HeaderValue::from_str(&value) {
            self.0.insert(name, value);
        }
    }
}

/// Reads propagation fields from an HTTP header map.
pub struct HeaderExtractor<'a>(pub &'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

/// Tracer, propagator and counter shared by every component of a unit.
///
/// Cheap to clone; safe for concurrent use.
#[derive(Clone)]
pub struct Instrumentation {
    tracer: SdkTracer,
    propagator: Arc<dyn TextMapPropagator + Send + Sync>,
    lookups: Counter<u64>,
}

impl Instrumentation {
    pub fn new(tracer: SdkTracer, meter: &Meter) -> Self {
        let lookups = meter
            .u64_counter(LOOKUP_COUNTER)
            .with_description("Get Weather by temperature")
            .with_unit("{cep}")
            .build();

        Self {
            tracer,
            propagator: Arc::new(default_propagator()),
            lookups,
        }
    }

    /// Start a child of whatever span `parent` carries.
    pub fn start_span(
        &self,
        name: impl Into<Cow<'static, str>>,
        kind: SpanKind,
        parent: &Context,
    ) -> SpanScope {
        let span = self
            .tracer
            .span_builder(name)
            .with_kind(kind)
            .start_with_context(&self.tracer, parent);
        SpanScope {
            cx: parent.with_span(span),
        }
    }

    /// Serialize `cx` into outbound request headers.
    pub fn inject(&self, cx: &Context, headers: &mut HeaderMap) {
        self.propagator
            .inject_context(cx, &mut HeaderInjector(headers));
    }

    /// Rebuild the caller's context from inbound request headers.
    ///
    /// Without propagation headers this is an empty context, and the next
    /// span started under it becomes a new root.
    pub fn extract(&self, headers: &HeaderMap) -> Context {
        self.propagator.extract(&HeaderExtractor(headers))
    }

    pub fn record_lookup(&self, attributes: &[KeyValue]) {
        self.lookups.add(1, attributes);
    }
}

fn default_propagator() -> TextMapCompositePropagator {
    TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ])
}

/// A started span that ends when dropped.
pub struct SpanScope {
    cx: Context,
}

impl SpanScope {
    /// Context holding this span; pass it to nested calls and outbound carriers.
    pub fn context(&self) -> &Context {
        &self.cx
    }

    pub fn set_attribute(&self, attribute: KeyValue) {
        self.cx.span().set_attribute(attribute);
    }

    /// Mark the span as failed with `message`.
    pub fn fail(&self, message: impl Into<Cow<'static, str>>) {
        self.cx.span().set_status(Status::error(message));
    }

    /// Hex trace id, for log correlation.
    pub fn trace_id(&self) -> String {
        trace_id(&self.cx)
    }
}

impl Drop for SpanScope {
    fn drop(&mut self) {
        self.cx.span().end();
    }
}

/// Hex trace id of the span in `cx` (all zeros when there is none).
pub fn trace_id(cx: &Context) -> String {
    cx.span().span_context().trace_id().to_string()
}
