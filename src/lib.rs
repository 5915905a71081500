//! Postal code → city temperature, split across a Front and a Back unit
//! with one distributed trace per request.

pub mod back;
pub mod config;
pub mod domain;
pub mod front;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::{ServiceConfig, Unit};
pub use domain::{LookupError, PostalCode, TemperatureResolver, WeatherReport};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::{Instrumentation, Telemetry};
