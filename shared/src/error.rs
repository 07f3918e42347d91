//! Data-access error taxonomy
//!
//! Every provider implementation maps its transport failures into this
//! closed set exactly once, at the response boundary. Callers branch on
//! the variant, never on message text.

use crate::resource::Resource;
use http::StatusCode;
use thiserror::Error;

/// Error produced by data-provider operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// Transport failure: connection refused, timeout, DNS, TLS
    #[error("Network error: {0}")]
    Network(String),

    /// Optimistic-concurrency rejection; the record changed on the server
    #[error("{resource} {id} was modified by someone else")]
    VersionConflict { resource: Resource, id: i64 },

    /// The service rejected the payload
    #[error("Validation error: {0}")]
    Validation(String),

    /// Anything the other variants do not cover
    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl ProviderError {
    /// Create a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a VersionConflict error
    pub fn version_conflict(resource: Resource, id: i64) -> Self {
        Self::VersionConflict { resource, id }
    }

    /// Create a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an Unknown error
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown(message.into())
    }

    /// Create a not-found error for a record
    ///
    /// The taxonomy has no dedicated kind for missing records; they
    /// surface as Unknown with a readable message.
    pub fn not_found(resource: Resource, id: i64) -> Self {
        Self::Unknown(format!("{resource} {id} not found"))
    }

    /// Map an HTTP error status and response body into the taxonomy
    ///
    /// `id` is the record identity of the failed call, when the call had one.
    pub fn from_status(status: StatusCode, resource: Resource, id: Option<i64>, body: String) -> Self {
        match status {
            StatusCode::CONFLICT => Self::VersionConflict {
                resource,
                id: id.unwrap_or_default(),
            },
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Validation(non_empty(body, "Request rejected"))
            }
            _ => Self::Unknown(non_empty(
                body,
                &format!("{} returned HTTP {}", resource, status.as_u16()),
            )),
        }
    }

    /// True for the variant the UI surfaces as "reload and retry"
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

fn non_empty(body: String, fallback: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;
