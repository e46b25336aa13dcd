// crates/infohub-core/src/core/events.rs
// ============================================================================
// Module: Info Hub Events
// Description: Structured event payloads emitted by the hub and its transport.
// Purpose: Carry observability data to an injected sink without a global logger.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Events are plain serializable records. The core builds [`HubEvent`] values
//! for failures, triggers and skipped import items; transports add
//! [`HttpRequestEvent`] values. Sinks decide where the JSON ends up.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;

use crate::core::error::HubError;

// ============================================================================
// SECTION: Levels and Operations
// ============================================================================

/// Severity of an event. Ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    /// Verbose diagnostics.
    Debug,
    /// Normal operation.
    #[default]
    Info,
    /// Recoverable problem.
    Warn,
    /// Failed operation.
    Error,
}

impl EventLevel {
    /// Returns a stable label for the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Hub operation an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Export orchestration.
    Export,
    /// Import pipeline.
    Import,
}

// ============================================================================
// SECTION: Hub Event
// ============================================================================

/// Event emitted by the hub service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Severity.
    pub level: EventLevel,
    /// Operation in progress.
    pub operation: Operation,
    /// Human-readable summary.
    pub message: String,
    /// Request identifier when provided.
    pub request_id: Option<String>,
    /// Export name when known.
    pub export_name: Option<String>,
    /// Policy name when the event concerns one policy.
    pub policy: Option<String>,
    /// Import identifier when the event concerns one imported item.
    pub import_id: Option<String>,
    /// Error kind label when the event reports a failure.
    pub error_kind: Option<&'static str>,
    /// Error message when the event reports a failure.
    pub error: Option<String>,
}

/// Inputs required to construct a hub event.
#[derive(Debug, Clone)]
pub struct HubEventParams {
    /// Event identifier.
    pub event: &'static str,
    /// Severity.
    pub level: EventLevel,
    /// Operation in progress.
    pub operation: Operation,
    /// Human-readable summary.
    pub message: String,
    /// Request identifier when provided.
    pub request_id: Option<String>,
    /// Export name when known.
    pub export_name: Option<String>,
    /// Policy name when the event concerns one policy.
    pub policy: Option<String>,
    /// Import identifier when the event concerns one imported item.
    pub import_id: Option<String>,
    /// Failure being reported.
    pub error: Option<HubError>,
}

impl HubEventParams {
    /// Starts a parameter set with every optional field empty.
    #[must_use]
    pub fn new(
        event: &'static str,
        level: EventLevel,
        operation: Operation,
        message: impl Into<String>,
    ) -> Self {
        Self {
            event,
            level,
            operation,
            message: message.into(),
            request_id: None,
            export_name: None,
            policy: None,
            import_id: None,
            error: None,
        }
    }
}

impl HubEvent {
    /// Creates a new hub event with a consistent timestamp.
    #[must_use]
    pub fn new(params: HubEventParams) -> Self {
        let (error_kind, error) = match params.error {
            Some(err) => (Some(err.kind().as_str()), Some(err.message().to_string())),
            None => (None, None),
        };
        Self {
            event: params.event,
            timestamp_ms: now_ms(),
            level: params.level,
            operation: params.operation,
            message: params.message,
            request_id: params.request_id,
            export_name: params.export_name,
            policy: params.policy,
            import_id: params.import_id,
            error_kind,
            error,
        }
    }
}

// ============================================================================
// SECTION: HTTP Request Event
// ============================================================================

/// Event emitted by a transport for each handled request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpRequestEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Severity derived from the response status.
    pub level: EventLevel,
    /// Request identifier.
    pub request_id: Option<String>,
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Response status code.
    pub status: u16,
    /// Handling latency in milliseconds.
    pub latency_ms: u128,
}

impl HttpRequestEvent {
    /// Creates a request event; 5xx responses are errors, 4xx warnings.
    #[must_use]
    pub fn new(
        request_id: Option<String>,
        method: impl Into<String>,
        path: impl Into<String>,
        status: u16,
        latency_ms: u128,
    ) -> Self {
        let level = match status {
            500.. => EventLevel::Error,
            400..=499 => EventLevel::Warn,
            _ => EventLevel::Info,
        };
        Self {
            event: "http_request",
            timestamp_ms: now_ms(),
            level,
            request_id,
            method: method.into(),
            path: path.into(),
            status,
            latency_ms,
        }
    }
}

/// Returns the current time in milliseconds since the epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use super::EventLevel;
    use super::HttpRequestEvent;
    use super::HubEvent;
    use super::HubEventParams;
    use super::Operation;
    use crate::core::error::HubError;

    #[test]
    fn hub_event_flattens_error() {
        let mut params = HubEventParams::new(
            "export_failed",
            EventLevel::Error,
            Operation::Export,
            "export failed",
        );
        params.error = Some(HubError::not_found("export configuration not found"));
        let event = HubEvent::new(params);
        assert_eq!(event.error_kind, Some("not_found"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["operation"], "export");
        assert_eq!(json["level"], "error");
        assert_eq!(json["error"], "export configuration not found");
    }

    #[test]
    fn http_levels_follow_status() {
        assert_eq!(HttpRequestEvent::new(None, "GET", "/", 200, 1).level, EventLevel::Info);
        assert_eq!(HttpRequestEvent::new(None, "GET", "/", 404, 1).level, EventLevel::Warn);
        assert_eq!(HttpRequestEvent::new(None, "GET", "/", 503, 1).level, EventLevel::Error);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(EventLevel::Debug < EventLevel::Info);
        assert!(EventLevel::Warn < EventLevel::Error);
    }
}
