// crates/infohub-core/src/core/context.rs
// ============================================================================
// Module: Info Hub Request Context
// Description: Per-request cancellation and deadline propagation.
// Purpose: Stop collaborator fan-out once the caller gives up.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`RequestContext`] travels with every collaborator call. The core checks
//! it before each call so no further calls are issued after cancellation or
//! deadline expiry; adapters use [`RequestContext::remaining`] to bound their
//! own I/O.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use crate::core::error::ErrorKind;
use crate::core::error::HubError;

// ============================================================================
// SECTION: Cancel Token
// ============================================================================

/// Cloneable cancellation flag shared between a request and its worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    /// Shared cancellation flag.
    canceled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the token. Idempotent.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    /// Returns true once the token has fired.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Per-request context passed to the core and every collaborator.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Optional request identifier for event correlation.
    request_id: Option<String>,
    /// Optional absolute deadline.
    deadline: Option<Instant>,
    /// Cancellation token.
    cancel: CancelToken,
}

impl RequestContext {
    /// Creates a context without deadline or request id.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a copy with the request identifier set.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Returns a copy whose deadline is `timeout` from now.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    /// Returns a copy with an absolute deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Returns a copy bound to the given cancel token.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the request identifier, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Returns the cancel token.
    #[must_use]
    pub const fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Returns the time left before the deadline, `None` when unbounded.
    ///
    /// An expired deadline yields `Some(Duration::ZERO)`.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Fails when the request was canceled or its deadline passed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Canceled`] or [`ErrorKind::Timeout`].
    pub fn check(&self) -> Result<(), HubError> {
        if self.cancel.is_canceled() {
            return Err(HubError::new(ErrorKind::Canceled, "request canceled"));
        }
        if self.remaining().is_some_and(|left| left.is_zero()) {
            return Err(HubError::new(ErrorKind::Timeout, "request deadline exceeded"));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use std::time::Duration;
    use std::time::Instant;

    use super::CancelToken;
    use super::RequestContext;
    use crate::core::error::ErrorKind;

    #[test]
    fn background_context_passes_check() {
        let ctx = RequestContext::background();
        assert!(ctx.check().is_ok());
        assert!(ctx.remaining().is_none());
    }

    #[test]
    fn canceled_token_fails_check() {
        let token = CancelToken::new();
        let ctx = RequestContext::background().with_cancel_token(token.clone());
        token.cancel();
        assert_eq!(ctx.check().unwrap_err().kind(), ErrorKind::Canceled);
    }

    #[test]
    fn expired_deadline_fails_check() {
        let past = Instant::now().checked_sub(Duration::from_millis(5)).unwrap();
        let ctx = RequestContext::background().with_deadline(past);
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
        assert_eq!(ctx.check().unwrap_err().kind(), ErrorKind::Timeout);
    }
}
