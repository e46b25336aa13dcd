// crates/infohub-clients/src/http.rs
// ============================================================================
// Module: Shared HTTP Transport
// Description: Client construction, deadline-bounded requests, bounded reads.
// Purpose: Give every collaborator client the same limits and error mapping.
// Dependencies: infohub-core, reqwest, serde, url
// ============================================================================

//! ## Overview
//! [`HttpTransport`] wraps a blocking `reqwest` client built from an
//! [`HttpClientConfig`]. Each request is bounded by the smaller of the
//! configured timeout and the caller's remaining deadline; a canceled or
//! expired context fails before any I/O. Response bodies are read up to
//! `max_response_bytes` and fail closed beyond it.
//!
//! Requests are authorized at send time: with a [`ClientCredentials`] token
//! source attached, its current token is sent; otherwise the static
//! `bearer_token`, if any.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use infohub_core::ErrorKind;
use infohub_core::HubError;
use infohub_core::RequestContext;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use reqwest::header::AUTHORIZATION;
use reqwest::redirect::Policy;
use serde::Deserialize;
use url::Url;

use crate::oauth::ClientCredentials;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default response size limit in bytes.
const DEFAULT_MAX_RESPONSE_BYTES: usize = 2 * 1024 * 1024;
/// Maximum error body surfaced in error messages.
const MAX_ERROR_BODY_BYTES: usize = 2 * 1024 * 1024;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Connection settings for one collaborator service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpClientConfig {
    /// Base address, e.g. `http://policy:8080`.
    pub addr: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// User agent for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum response size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Optional bearer token sent as `Authorization`.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl HttpClientConfig {
    /// Creates a configuration for `addr` with default limits.
    #[must_use]
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: default_user_agent(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            bearer_token: None,
        }
    }
}

/// Returns the default request timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Returns the default user agent.
fn default_user_agent() -> String {
    format!("infohub/{}", env!("CARGO_PKG_VERSION"))
}

/// Returns the default response size limit.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Blocking HTTP transport shared by the collaborator clients.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Base address without trailing slash.
    base: String,
    /// Configured request timeout.
    timeout: Duration,
    /// Response size limit.
    max_response_bytes: usize,
    /// Optional bearer token.
    bearer_token: Option<String>,
    /// Optional OAuth2 token source; takes precedence over `bearer_token`.
    token_source: Option<ClientCredentials>,
    /// Underlying client.
    client: Client,
}

impl HttpTransport {
    /// Builds a transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] when the address is not an absolute http(s) URL or
    /// the client cannot be built.
    pub fn new(config: &HttpClientConfig) -> Result<Self, HubError> {
        let base = config.addr.trim_end_matches('/');
        let url = Url::parse(base)
            .map_err(|err| HubError::bad_request(format!("invalid service address: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HubError::bad_request(format!(
                "unsupported service address scheme: {}",
                url.scheme()
            )));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| HubError::internal(format!("http client build failed: {err}")))?;
        Ok(Self {
            base: base.to_string(),
            timeout: Duration::from_millis(config.timeout_ms),
            max_response_bytes: config.max_response_bytes,
            bearer_token: config.bearer_token.clone(),
            token_source: None,
            client,
        })
    }

    /// Authorizes every request with tokens from `source`.
    #[must_use]
    pub fn with_token_source(mut self, source: ClientCredentials) -> Self {
        self.token_source = Some(source);
        self
    }

    /// Resolves `path` against the base address.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] with kind `BadRequest` when the result is not a URL.
    pub fn url(&self, path: &str) -> Result<Url, HubError> {
        Url::parse(&format!("{}{path}", self.base))
            .map_err(|err| HubError::bad_request(format!("invalid request url: {err}")))
    }

    /// Starts a GET request.
    #[must_use]
    pub fn get(&self, url: Url) -> RequestBuilder {
        self.client.get(url)
    }

    /// Starts a POST request.
    #[must_use]
    pub fn post(&self, url: Url) -> RequestBuilder {
        self.client.post(url)
    }

    /// Adds the OAuth2 or static bearer token when configured.
    fn authorize(
        &self,
        ctx: &RequestContext,
        builder: RequestBuilder,
    ) -> Result<RequestBuilder, HubError> {
        let token = match (&self.token_source, &self.bearer_token) {
            (Some(source), _) => source.token(ctx)?,
            (None, Some(token)) => token.clone(),
            (None, None) => return Ok(builder),
        };
        Ok(builder.header(AUTHORIZATION, format!("Bearer {token}")))
    }

    /// Sends a request bounded by the context deadline.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] when the context is done or the request fails.
    pub fn send(&self, ctx: &RequestContext, builder: RequestBuilder) -> Result<Response, HubError> {
        ctx.check()?;
        let builder = self.authorize(ctx, builder)?;
        let timeout = ctx.remaining().map_or(self.timeout, |left| left.min(self.timeout));
        builder.timeout(timeout).send().map_err(|err| classify_send_error(&err))
    }

    /// Reads a response body while enforcing the size limit.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] when the body exceeds the limit or cannot be read.
    pub fn read_body(&self, response: Response) -> Result<Vec<u8>, HubError> {
        read_limited(response, self.max_response_bytes)
    }

    /// Converts a non-success response into an error of the mapped kind,
    /// carrying the bounded response body as the message.
    #[must_use]
    pub fn status_error(response: Response) -> HubError {
        let status = response.status();
        let kind = ErrorKind::from_status(status.as_u16());
        let body = read_limited(response, MAX_ERROR_BODY_BYTES).unwrap_or_default();
        let message = String::from_utf8_lossy(&body).trim().to_string();
        if message.is_empty() {
            HubError::new(kind, format!("unexpected response: {status}"))
        } else {
            HubError::new(kind, message)
        }
    }
}

/// Maps transport failures to error kinds.
pub(crate) fn classify_send_error(err: &reqwest::Error) -> HubError {
    if err.is_timeout() {
        HubError::new(ErrorKind::Timeout, format!("request timed out: {err}"))
    } else if err.is_connect() {
        HubError::new(ErrorKind::ServiceUnavailable, format!("connection failed: {err}"))
    } else {
        HubError::wrap("http request failed", err)
    }
}

/// Reads the response body while enforcing a byte limit.
pub(crate) fn read_limited(response: Response, max_bytes: usize) -> Result<Vec<u8>, HubError> {
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| HubError::internal("response size limit exceeds u64"))?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(HubError::internal("http response exceeds size limit"));
    }
    let mut buf = Vec::new();
    response
        .take(max_bytes_u64.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|err| HubError::wrap("failed to read response", &err))?;
    if buf.len() > max_bytes {
        return Err(HubError::internal("http response exceeds size limit"));
    }
    Ok(buf)
}
