//! Domain types shared by the Front and Back units.
//!
//! # Data Flow
//! ```text
//! ?cep=<8 chars>
//!     → model.rs (PostalCode::parse)
//!     → ports.rs (TemperatureResolver::resolve)
//!         Back: LocalityLookup → TemperatureLookup → WeatherReport::from_celsius
//!     → WeatherReport (city + three scales) or LookupError
//! ```
//!
//! # Design Decisions
//! - Failures are classified into `LookupError` at the point of detection
//! - Collaborators are traits, injected at construction as `Arc<dyn _>`

pub mod error;
pub mod model;
pub mod ports;

pub use error::LookupError;
pub use model::{convert, PostalCode, WeatherReport};
pub use ports::{LocalityLookup, TemperatureLookup, TemperatureResolver};
