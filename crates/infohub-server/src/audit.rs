// crates/infohub-server/src/audit.rs
// ============================================================================
// Module: Event Sinks
// Description: JSON-line sinks for hub and request events.
// Purpose: Route structured events to stderr or an append-only file.
// Dependencies: infohub-core, infohub-config, serde_json
// ============================================================================

//! ## Overview
//! Sinks serialize each event as one JSON line and drop events below their
//! configured minimum level. Write failures are ignored so logging can never
//! fail a request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use infohub_config::ServerAuditConfig;
use infohub_core::EventLevel;
use infohub_core::HttpRequestEvent;
use infohub_core::HubEvent;
use infohub_core::HubEventSink;
use infohub_core::NoopEventSink;
use serde::Serialize;

// ============================================================================
// SECTION: Stderr Sink
// ============================================================================

/// Sink that writes JSON lines to stderr.
#[derive(Debug, Clone, Copy)]
pub struct StderrEventSink {
    /// Minimum level written.
    min_level: EventLevel,
}

impl StderrEventSink {
    /// Creates a sink writing events at or above `min_level`.
    #[must_use]
    pub const fn new(min_level: EventLevel) -> Self {
        Self {
            min_level,
        }
    }

    /// Writes one event line.
    fn write(&self, level: EventLevel, event: &impl Serialize) {
        if level < self.min_level {
            return;
        }
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

impl HubEventSink for StderrEventSink {
    fn record(&self, event: &HubEvent) {
        self.write(event.level, event);
    }

    fn record_http(&self, event: &HttpRequestEvent) {
        self.write(event.level, event);
    }
}

// ============================================================================
// SECTION: File Sink
// ============================================================================

/// Sink that appends JSON lines to a file.
pub struct FileEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
    /// Minimum level written.
    min_level: EventLevel,
}

impl FileEventSink {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path, min_level: EventLevel) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            min_level,
        })
    }

    /// Writes one event line.
    fn write(&self, level: EventLevel, event: &impl Serialize) {
        if level < self.min_level {
            return;
        }
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl HubEventSink for FileEventSink {
    fn record(&self, event: &HubEvent) {
        self.write(event.level, event);
    }

    fn record_http(&self, event: &HttpRequestEvent) {
        self.write(event.level, event);
    }
}

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Builds the sink described by the audit configuration.
///
/// # Errors
///
/// Returns an error when the configured log file cannot be opened.
pub fn build_event_sink(config: &ServerAuditConfig) -> io::Result<Arc<dyn HubEventSink>> {
    if !config.enabled {
        return Ok(Arc::new(NoopEventSink));
    }
    match &config.path {
        Some(path) => Ok(Arc::new(FileEventSink::new(Path::new(path.trim()), config.level)?)),
        None => Ok(Arc::new(StderrEventSink::new(config.level))),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
