//! Back unit.
//!
//! # Data Flow
//! ```text
//! GET ?cep=<code> (trace context extracted by the handler)
//!     → resolver.rs (span per request)
//!         → locality.rs    GET {directory}/ws/{cep}/json/
//!         → weather.rs     GET {weather}/v1/current.json?key=..&q=..
//!         → WeatherReport::from_celsius
//! ```
//!
//! # Design Decisions
//! - Not-found from the directory short-circuits; the weather API is not called
//! - Every other failure surfaces as `LookupError::Upstream`

pub mod locality;
pub mod resolver;
pub mod weather;

pub use locality::ViaCepClient;
pub use resolver::WeatherResolver;
pub use weather::WeatherApiClient;
