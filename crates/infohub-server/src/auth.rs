// crates/infohub-server/src/auth.rs
// ============================================================================
// Module: Inbound Authentication
// Description: Bearer-token checks for the export and import routes.
// Purpose: Reject unauthenticated callers before any core work starts.
// Dependencies: axum, infohub-core, infohub-config
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use infohub_config::ServerAuthMode;
use infohub_config::ServerConfig;
use infohub_core::ErrorKind;
use infohub_core::HubError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted `Authorization` header size in bytes.
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;

// ============================================================================
// SECTION: Authenticator
// ============================================================================

/// Bearer-token authenticator; open when no tokens are configured.
#[derive(Debug, Clone, Default)]
pub struct BearerAuth {
    /// Accepted tokens; `None` disables authentication.
    tokens: Option<BTreeSet<String>>,
}

impl BearerAuth {
    /// Authenticator that accepts every request.
    #[must_use]
    pub const fn open() -> Self {
        Self {
            tokens: None,
        }
    }

    /// Authenticator that accepts only the given tokens.
    #[must_use]
    pub fn with_tokens(tokens: impl IntoIterator<Item = String>) -> Self {
        Self {
            tokens: Some(tokens.into_iter().collect()),
        }
    }

    /// Builds the authenticator described by server configuration.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        match (config.auth_mode(), &config.auth) {
            (ServerAuthMode::BearerToken, Some(auth)) => {
                Self::with_tokens(auth.bearer_tokens.iter().cloned())
            }
            _ => Self::open(),
        }
    }

    /// Checks the request headers.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] with kind `Unauthorized` when a token is required
    /// and missing, malformed, or not accepted.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), HubError> {
        let Some(tokens) = &self.tokens else {
            return Ok(());
        };
        let header = headers
            .get(AUTHORIZATION)
            .ok_or_else(|| unauthenticated("missing authorization"))?;
        if header.len() > MAX_AUTH_HEADER_BYTES {
            return Err(unauthenticated("authorization header too large"));
        }
        let header = header.to_str().map_err(|_| unauthenticated("invalid authorization header"))?;
        let token = parse_bearer_token(header)?;
        if tokens.contains(token) {
            Ok(())
        } else {
            Err(unauthenticated("invalid bearer token"))
        }
    }
}

/// Extracts the token from a `Bearer` authorization header.
fn parse_bearer_token(header: &str) -> Result<&str, HubError> {
    let (scheme, token) = header.trim().split_once(' ').unwrap_or((header.trim(), ""));
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(unauthenticated("invalid authorization header"));
    }
    Ok(token)
}

/// Builds an authentication failure.
fn unauthenticated(message: &str) -> HubError {
    HubError::new(ErrorKind::Unauthorized, message)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
