//! Caller-facing error categories.

use thiserror::Error;

/// Failure of a temperature lookup, classified by whoever detected it.
///
/// The `Display` text is the plain body returned to HTTP callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Postal code is not exactly 8 characters. Rejected before any remote call.
    #[error("invalid zipcode")]
    InvalidInput,

    /// The directory service reported that the postal code does not exist.
    #[error("can not find zipcode")]
    NotFound,

    /// Transport failure, unexpected status or undecodable body from a dependency.
    #[error("{0}")]
    Upstream(String),
}

impl LookupError {
    /// Build an `Upstream` error from anything printable.
    pub fn upstream(err: impl std::fmt::Display) -> Self {
        LookupError::Upstream(err.to_string())
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::InvalidInput => "invalid_input",
            LookupError::NotFound => "not_found",
            LookupError::Upstream(_) => "upstream",
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        LookupError::Upstream(err.to_string())
    }
}
