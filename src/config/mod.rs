//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: WEATHER_API_KEY, BACK_URL, ...)
//!     → validation.rs (semantic checks for the selected unit)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Secrets come from the environment; a missing weather key fails startup

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError};
pub use schema::{
    BackConfig, FrontConfig, ListenerConfig, LogFormat, ObservabilityConfig, ServiceConfig,
    TimeoutConfig, Unit,
};
pub use validation::{validate_config, ValidationError};
