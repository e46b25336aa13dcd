// crates/infohub-core/src/core/error.rs
// ============================================================================
// Module: Info Hub Errors
// Description: Error kinds and the error type shared across capability seams.
// Purpose: Classify failures so transports can map them to stable statuses.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Every collaborator call returns [`HubError`]. The [`ErrorKind`] is what the
//! core branches on (only `NotFound` from a cache read changes control flow)
//! and what the transport maps to an HTTP status.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Error Kind
// ============================================================================

/// Classification of a [`HubError`].
///
/// # Invariants
/// - Variants and labels are stable for logging and HTTP mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unclassified failure.
    Unknown,
    /// Caller sent unusable input.
    BadRequest,
    /// Caller is not authenticated.
    Unauthorized,
    /// Caller is not allowed to perform the operation.
    Forbidden,
    /// Requested entity does not exist.
    NotFound,
    /// Entity already exists.
    Exists,
    /// Deadline expired before the operation completed.
    Timeout,
    /// Caller canceled the request.
    Canceled,
    /// Internal failure.
    Internal,
    /// Downstream service is unavailable.
    ServiceUnavailable,
}

impl ErrorKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::Exists => "exists",
            Self::Timeout => "timeout",
            Self::Canceled => "canceled",
            Self::Internal => "internal",
            Self::ServiceUnavailable => "service_unavailable",
        }
    }

    /// Returns the HTTP status code conventionally used for the kind.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Exists => 409,
            Self::Canceled => 499,
            Self::ServiceUnavailable => 503,
            Self::Timeout => 504,
            Self::Unknown | Self::Internal => 500,
        }
    }

    /// Classifies an HTTP status code returned by a collaborator.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Exists,
            408 | 504 => Self::Timeout,
            503 => Self::ServiceUnavailable,
            500 => Self::Internal,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Hub Error
// ============================================================================

/// Error returned by the core and by every collaborator capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HubError {
    /// Error classification.
    kind: ErrorKind,
    /// Human-readable message including any wrapped context.
    message: String,
}

impl HubError {
    /// Creates an error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates an [`ErrorKind::Unknown`] error.
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    /// Creates an [`ErrorKind::BadRequest`] error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// Creates an [`ErrorKind::NotFound`] error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Creates an [`ErrorKind::Internal`] error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Wraps a foreign error as [`ErrorKind::Unknown`] under a context message.
    #[must_use]
    pub fn wrap(context: &str, source: &impl fmt::Display) -> Self {
        Self::unknown(format!("{context}: {source}"))
    }

    /// Prefixes the message with operation context, keeping the kind.
    #[must_use]
    pub fn context(self, context: &str) -> Self {
        Self {
            kind: self.kind,
            message: format!("{context}: {}", self.message),
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true when the error is of the given kind.
    #[must_use]
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
