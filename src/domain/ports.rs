//! Capability traits the units are wired from.

use async_trait::async_trait;
use opentelemetry::Context;

use crate::domain::error::LookupError;
use crate::domain::model::{PostalCode, WeatherReport};

/// Anything that can turn a postal code into a weather report.
///
/// Implemented by the Front unit's `BackClient` and the Back unit's
/// `WeatherResolver`; the HTTP handler only sees this trait.
#[async_trait]
pub trait TemperatureResolver: Send + Sync {
    /// `cx` carries the caller's trace context; implementations open child spans under it.
    async fn resolve(&self, cx: &Context, cep: &PostalCode) -> Result<WeatherReport, LookupError>;
}

/// Postal code → locality name.
#[async_trait]
pub trait LocalityLookup: Send + Sync {
    /// Returns `LookupError::NotFound` when the directory reports an unknown code.
    async fn lookup_locality(&self, cx: &Context, cep: &PostalCode) -> Result<String, LookupError>;
}

/// Locality name → current temperature in Celsius.
#[async_trait]
pub trait TemperatureLookup: Send + Sync {
    async fn lookup_temperature(&self, cx: &Context, locality: &str) -> Result<f64, LookupError>;
}
