//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request produces:
//!     → logging.rs (structured log events)
//!     → metrics.rs (request counter and latency histogram)
//!     → trace.rs (spans, propagation headers, lookup counter)
//!
//! Process lifecycle:
//!     telemetry.rs builds tracer/meter providers at startup
//!     → hands out Instrumentation to components
//!     → flushes and closes providers at shutdown
//! ```
//!
//! # Design Decisions
//! - No OpenTelemetry globals: handles are injected at construction
//! - Exporters are optional; spans are still created and propagated without them

pub mod logging;
pub mod metrics;
pub mod telemetry;
pub mod trace;

pub use telemetry::{Telemetry, TelemetryError};
pub use trace::{Instrumentation, SpanScope};
