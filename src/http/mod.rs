//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → server.rs handler (extract trace context, validate cep)
//!     → [unit's TemperatureResolver]
//!     → response.rs (LookupError → status + text body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestId, X_REQUEST_ID};
pub use response::status_for;
pub use server::{AppState, HttpServer};
