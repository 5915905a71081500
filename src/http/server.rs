//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the temperature and health handlers
//! - Wire up middleware (request ID, tracing, request deadline)
//! - Bind server to listener and shut down gracefully
//! - Extract inbound trace context and dispatch to the unit's resolver
//! - Observability (request metrics, correlation IDs)

use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ServiceConfig, Unit};
use crate::domain::{PostalCode, TemperatureResolver};
use crate::http::request::{request_id, MakeRequestId};
use crate::observability::{metrics, Instrumentation};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub unit: Unit,
    pub resolver: Arc<dyn TemperatureResolver>,
    pub instrumentation: Instrumentation,
}

/// First `cep` value of a query string; empty when absent.
///
/// Repeated parameters are not a rejection: later values are ignored.
pub fn cep_param(query: Option<&str>) -> String {
    query
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "cep")
                .map(|(_, value)| value.into_owned())
                .unwrap_or_default()
        })
        .unwrap_or_default()
}

/// HTTP server for one unit.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    unit: Unit,
}

impl HttpServer {
    /// Create a new HTTP server serving `resolver` on the configured path.
    pub fn new(
        config: ServiceConfig,
        unit: Unit,
        resolver: Arc<dyn TemperatureResolver>,
        instrumentation: Instrumentation,
    ) -> Self {
        let state = AppState {
            unit,
            resolver,
            instrumentation,
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            unit,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestId))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id(request.headers()),
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )));

        Router::new()
            .route(&config.listener.path, get(temperature_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(middleware)
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            unit = %self.unit,
            address = %addr,
            path = %self.config.listener.path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!(unit = %self.unit, "HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// `GET {path}?cep=<code>` for both units.
///
/// Dropping this future (client gone or deadline hit) drops the in-flight
/// upstream call with it.
async fn temperature_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let cep = cep_param(query.as_deref());
    let start = Instant::now();
    let unit = state.unit.as_str();
    let parent = state.instrumentation.extract(&headers);

    let response = match PostalCode::parse(&cep) {
        Err(e) => {
            tracing::error!(
                unit,
                request_id = %request_id(&headers),
                cep = %cep,
                "invalid zipcode"
            );
            e.into_response()
        }
        Ok(cep) => match state.resolver.resolve(&parent, &cep).await {
            Ok(report) => (StatusCode::OK, Json(report)).into_response(),
            Err(e) => e.into_response(),
        },
    };

    tracing::debug!(
        unit,
        request_id = %request_id(&headers),
        status = response.status().as_u16(),
        "Request complete"
    );
    metrics::record_request(unit, response.status().as_u16(), start);
    response
}

async fn health_handler() -> &'static str {
    "OK"
}
