//! Front unit.
//!
//! # Data Flow
//! ```text
//! GET ?cep=<code> (handler validates length)
//!     → orchestrator.rs (child span, inject traceparent)
//!     → GET <back_url>?cep=<code>
//!     → WeatherReport relayed, or 404 → NotFound, else → Upstream
//! ```

pub mod orchestrator;

pub use orchestrator::BackClient;
