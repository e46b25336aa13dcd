// crates/infohub-clients/src/oauth.rs
// ============================================================================
// Module: OAuth2 Client Credentials
// Description: Token source for the OAuth2 client-credentials grant.
// Purpose: Fetch, cache, and refresh the access token sent to collaborators.
// Dependencies: infohub-core, reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! [`ClientCredentials`] obtains an access token from `token_url` with
//! `grant_type=client_credentials`, authenticating with HTTP Basic client
//! credentials. The token is cached and reused until it is within
//! [`EXPIRY_DELTA`] of its `expires_in`; a token issued without `expires_in`
//! never expires. Clones share one cache, so the policy, cache, and signer
//! clients hold a single token between them.
//!
//! Refreshes happen inline on the request that finds the token stale and are
//! serialized, so concurrent requests wait for one fetch instead of racing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use infohub_core::HubError;
use infohub_core::RequestContext;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Deserialize;
use url::Url;
use url::form_urlencoded;

use crate::http::classify_send_error;
use crate::http::read_limited;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tokens this close to expiry are refreshed before use.
pub const EXPIRY_DELTA: Duration = Duration::from_secs(10);
/// Default token request timeout in milliseconds.
const DEFAULT_TOKEN_TIMEOUT_MS: u64 = 10_000;
/// Maximum token endpoint response size.
const MAX_TOKEN_RESPONSE_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// OAuth2 client-credentials settings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OAuthConfig {
    /// OAuth2 client identifier.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// Token endpoint URL.
    pub token_url: String,
    /// Scopes requested with each token.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Token request timeout in milliseconds.
    #[serde(default = "default_token_timeout_ms")]
    pub timeout_ms: u64,
}

impl OAuthConfig {
    /// Creates settings with no scopes and the default timeout.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: token_url.into(),
            scopes: Vec::new(),
            timeout_ms: DEFAULT_TOKEN_TIMEOUT_MS,
        }
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("token_url", &self.token_url)
            .field("scopes", &self.scopes)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

/// Returns the default token request timeout.
const fn default_token_timeout_ms() -> u64 {
    DEFAULT_TOKEN_TIMEOUT_MS
}

// ============================================================================
// SECTION: Token Source
// ============================================================================

/// Shared, self-refreshing client-credentials token source.
#[derive(Clone)]
pub struct ClientCredentials {
    /// State shared by clones.
    inner: Arc<TokenSource>,
}

/// Token endpoint settings and the cached token.
struct TokenSource {
    /// Client settings.
    config: OAuthConfig,
    /// Parsed token endpoint.
    token_url: Url,
    /// Configured request timeout.
    timeout: Duration,
    /// HTTP client for token requests.
    client: Client,
    /// Last token issued.
    cached: Mutex<Option<CachedToken>>,
}

/// Access token with its expiry.
struct CachedToken {
    /// Bearer token value.
    access_token: String,
    /// Expiry instant; `None` when the server gave no lifetime.
    expires_at: Option<Instant>,
}

impl CachedToken {
    /// Returns true when the token can still be sent at `now`.
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at
            .is_none_or(|expires_at| now.checked_add(EXPIRY_DELTA).is_some_and(|t| t < expires_at))
    }
}

/// Token endpoint success body.
#[derive(Deserialize)]
struct TokenResponse {
    /// Issued access token.
    access_token: String,
    /// Token type; only bearer tokens are usable.
    #[serde(default)]
    token_type: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    expires_in: Option<u64>,
}

impl ClientCredentials {
    /// Builds a token source.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] when the token URL is not an absolute http(s) URL
    /// or the client cannot be built.
    pub fn new(config: &OAuthConfig) -> Result<Self, HubError> {
        let token_url = Url::parse(&config.token_url)
            .map_err(|err| HubError::bad_request(format!("invalid oauth token url: {err}")))?;
        if !matches!(token_url.scheme(), "http" | "https") {
            return Err(HubError::bad_request(format!(
                "unsupported oauth token url scheme: {}",
                token_url.scheme()
            )));
        }
        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| HubError::internal(format!("oauth client build failed: {err}")))?;
        Ok(Self {
            inner: Arc::new(TokenSource {
                config: config.clone(),
                token_url,
                timeout,
                client,
                cached: Mutex::new(None),
            }),
        })
    }

    /// Returns a usable access token, fetching a new one when the cached token
    /// is absent or about to expire.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] when the context is done or the token request
    /// fails.
    pub fn token(&self, ctx: &RequestContext) -> Result<String, HubError> {
        ctx.check()?;
        let mut cached = self
            .inner
            .cached
            .lock()
            .map_err(|_| HubError::internal("oauth token cache mutex poisoned"))?;
        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh(Instant::now())) {
            return Ok(token.access_token.clone());
        }
        let fresh = self.inner.fetch(ctx)?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        drop(cached);
        Ok(access_token)
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials").field("token_url", &self.inner.token_url.as_str()).finish()
    }
}

impl TokenSource {
    /// Requests a new token from the endpoint.
    fn fetch(&self, ctx: &RequestContext) -> Result<CachedToken, HubError> {
        let mut form = form_urlencoded::Serializer::new(String::new());
        form.append_pair("grant_type", "client_credentials");
        if !self.config.scopes.is_empty() {
            form.append_pair("scope", &self.config.scopes.join(" "));
        }
        let timeout = ctx.remaining().map_or(self.timeout, |left| left.min(self.timeout));
        let response = self
            .client
            .post(self.token_url.clone())
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .body(form.finish())
            .timeout(timeout)
            .send()
            .map_err(|err| classify_send_error(&err).context("oauth token request failed"))?;
        let status = response.status();
        let body = read_limited(response, MAX_TOKEN_RESPONSE_BYTES)
            .map_err(|err| err.context("oauth token request failed"))?;
        if !status.is_success() {
            return Err(HubError::unknown(format!(
                "oauth token request failed: {status}: {}",
                String::from_utf8_lossy(&body).trim()
            )));
        }
        let issued: TokenResponse = serde_json::from_slice(&body)
            .map_err(|err| HubError::wrap("oauth token response invalid", &err))?;
        if issued.access_token.is_empty() {
            return Err(HubError::unknown("oauth token response invalid: empty access_token"));
        }
        if let Some(kind) = issued.token_type.as_deref()
            && !kind.eq_ignore_ascii_case("bearer")
        {
            return Err(HubError::unknown(format!("unsupported oauth token type: {kind}")));
        }
        let expires_at = issued
            .expires_in
            .filter(|secs| *secs > 0)
            .and_then(|secs| Instant::now().checked_add(Duration::from_secs(secs)));
        Ok(CachedToken {
            access_token: issued.access_token,
            expires_at,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        reason = "Test-only assertions."
    )]

    use std::time::Duration;
    use std::time::Instant;

    use super::CachedToken;
    use super::EXPIRY_DELTA;
    use super::OAuthConfig;

    fn token(expires_in: Option<Duration>) -> CachedToken {
        CachedToken {
            access_token: "t".to_string(),
            expires_at: expires_in.map(|left| Instant::now() + left),
        }
    }

    #[test]
    fn token_without_lifetime_stays_fresh() {
        assert!(token(None).is_fresh(Instant::now()));
    }

    #[test]
    fn token_inside_expiry_delta_is_stale() {
        assert!(token(Some(Duration::from_secs(60))).is_fresh(Instant::now()));
        assert!(!token(Some(EXPIRY_DELTA / 2)).is_fresh(Instant::now()));
    }

    #[test]
    fn debug_output_hides_secret() {
        let config = OAuthConfig::new("infohub", "s3cret", "http://auth/token");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("infohub"));
    }
}
