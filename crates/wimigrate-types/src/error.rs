//! Structured error model for calls against the remote tracking service.
//!
//! [`ServiceError`] carries a category that decides retry eligibility, a short
//! machine-readable code, and a human message. Construct via the
//! category-specific factory methods.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad classification of a remote-service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ServiceErrorKind {
    /// Service temporarily unavailable (retryable).
    ServiceUnavailable,
    /// Attachment download/upload failure (retryable).
    AttachmentIo,
    /// Destination schema rejected a value.
    Validation,
    /// Record or type does not exist.
    NotFound,
    /// Caller lacks access.
    Permission,
    /// Anything else.
    Internal,
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ServiceUnavailable => "service_unavailable",
            Self::AttachmentIo => "attachment_io",
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Permission => "permission",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("[{kind}] {code}: {message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServiceError {
    fn new(kind: ServiceErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Service temporarily unavailable (retryable).
    #[must_use]
    pub fn unavailable(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::ServiceUnavailable, code, message)
    }

    /// Attachment transfer failure (retryable).
    #[must_use]
    pub fn attachment_io(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::AttachmentIo, code, message)
    }

    /// Schema rejected a value (not retryable).
    #[must_use]
    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Validation, code, message)
    }

    #[must_use]
    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::NotFound, code, message)
    }

    #[must_use]
    pub fn permission(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Permission, code, message)
    }

    #[must_use]
    pub fn internal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Internal, code, message)
    }

    /// Attach structured diagnostic details.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Whether a retry policy may re-attempt the failed call.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            ServiceErrorKind::ServiceUnavailable | ServiceErrorKind::AttachmentIo
        )
    }
}
