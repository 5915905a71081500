//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use cep_weather::config::{ServiceConfig, Unit};
use cep_weather::domain::TemperatureResolver;
use cep_weather::lifecycle::build_resolver;
use cep_weather::{HttpServer, Instrumentation, Shutdown};
use opentelemetry::metrics::MeterProvider as _;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
pub const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

/// Instrumentation whose finished spans land in memory.
pub struct TestTelemetry {
    pub instrumentation: Instrumentation,
    exporter: InMemorySpanExporter,
    _provider: SdkTracerProvider,
}

impl TestTelemetry {
    pub fn new() -> Self {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let meter = SdkMeterProvider::default().meter("test");
        let instrumentation = Instrumentation::new(provider.tracer("test"), &meter);
        Self {
            instrumentation,
            exporter,
            _provider: provider,
        }
    }

    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.exporter.get_finished_spans().unwrap()
    }

    pub fn span_names(&self) -> Vec<String> {
        self.finished_spans()
            .iter()
            .map(|s| s.name.to_string())
            .collect()
    }
}

/// Serve `resolver` as `unit` on an ephemeral port.
pub async fn start_server(
    unit: Unit,
    config: ServiceConfig,
    resolver: Arc<dyn TemperatureResolver>,
    instrumentation: Instrumentation,
) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, unit, resolver, instrumentation);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Build `unit` from `config` and serve it on an ephemeral port.
pub async fn start_unit(
    unit: Unit,
    config: ServiceConfig,
    instrumentation: &Instrumentation,
) -> (SocketAddr, Shutdown) {
    let resolver = match build_resolver(unit, &config, instrumentation) {
        Ok(resolver) => resolver,
        Err(e) => panic!("failed to build {} resolver: {}", unit, e),
    };
    start_server(unit, config, resolver, instrumentation.clone()).await
}

/// Back unit config pointing at mocked upstreams.
pub fn back_config(directory_url: &str, weather_url: &str) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.back.directory_url = directory_url.to_string();
    config.back.weather_url = weather_url.to_string();
    config.back.weather_api_key = Some("test-key".to_string());
    config.timeouts.upstream_secs = 5;
    config
}

/// Front unit config pointing at `back_url`.
pub fn front_config(back_url: &str) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.front.back_url = back_url.to_string();
    config.timeouts.upstream_secs = 5;
    config
}

/// Start a mock backend that answers every request with `status` and `body`
/// and keeps the raw request head of each call.
pub async fn start_capturing_backend(
    status: u16,
    body: &'static str,
) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured = Arc::new(Mutex::new(Vec::new()));
    let heads = captured.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let heads = heads.clone();
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 1024];
                        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                            }
                        }
                        heads
                            .lock()
                            .unwrap()
                            .push(String::from_utf8_lossy(&buf).into_owned());

                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, captured)
}

/// Start a backend that answers with a 500 whose body is cut short: it
/// announces more bytes than it sends and closes the connection.
pub async fn start_truncating_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let response = "HTTP/1.1 500 Internal Server Error\r\nContent-Type: text/plain\r\nContent-Length: 100\r\n\r\npartial";
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Value of `name` in a raw HTTP request head (case-insensitive name).
pub fn header_value(head: &str, name: &str) -> Option<String> {
    head.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().to_string())
    })
}

/// Trace id field of a `traceparent` header value.
pub fn trace_id_of(traceparent: &str) -> Option<String> {
    traceparent.split('-').nth(1).map(str::to_string)
}

/// Client that never reuses connections or goes through a proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
