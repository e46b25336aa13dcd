// crates/infohub-clients/src/policy.rs
// ============================================================================
// Module: Policy Client
// Description: HTTP adapter for the policy evaluation service.
// Purpose: Trigger policy evaluations whose results the service caches.
// Dependencies: infohub-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! A policy named `group/policy/version` is evaluated by posting its input to
//! `{addr}/policy/group/policy/version/evaluation`. The cache key travels in
//! `x-evaluation-id` and the optional TTL in `x-cache-ttl`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use infohub_core::CacheKey;
use infohub_core::HubError;
use infohub_core::PolicyEvaluator;
use infohub_core::PolicyName;
use infohub_core::RequestContext;
use reqwest::StatusCode;
use serde_json::Value;

use crate::http::HttpClientConfig;
use crate::http::HttpTransport;
use crate::oauth::ClientCredentials;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the evaluation identifier.
pub const HEADER_EVALUATION_ID: &str = "x-evaluation-id";
/// Header carrying the result TTL in seconds.
pub const HEADER_CACHE_TTL: &str = "x-cache-ttl";

// ============================================================================
// SECTION: Client
// ============================================================================

/// Policy service client.
#[derive(Debug, Clone)]
pub struct PolicyClient {
    /// Shared transport.
    http: HttpTransport,
}

impl PolicyClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] when the configuration is unusable.
    pub fn new(config: &HttpClientConfig) -> Result<Self, HubError> {
        Ok(Self {
            http: HttpTransport::new(config)?,
        })
    }

    /// Authorizes requests with OAuth2 client-credentials tokens.
    #[must_use]
    pub fn with_token_source(mut self, source: ClientCredentials) -> Self {
        self.http = self.http.with_token_source(source);
        self
    }
}

impl PolicyEvaluator for PolicyClient {
    fn evaluate(
        &self,
        ctx: &RequestContext,
        policy: &PolicyName,
        input: &Value,
        key: &CacheKey,
        ttl_secs: Option<u64>,
    ) -> Result<Vec<u8>, HubError> {
        let url = self
            .http
            .url(&format!("/policy/{policy}/evaluation"))
            .map_err(|err| err.context("invalid policy evaluation URL"))?;
        let mut request = self.http.post(url).json(input);
        if !key.as_str().is_empty() {
            request = request.header(HEADER_EVALUATION_ID, key.as_str());
        }
        if let Some(ttl) = ttl_secs {
            request = request.header(HEADER_CACHE_TTL, ttl.to_string());
        }
        let response = self.http.send(ctx, request)?;
        if response.status() != StatusCode::OK {
            return Err(HubError::unknown(format!(
                "unexpected response on policy evaluation: {}",
                response.status()
            )));
        }
        self.http.read_body(response)
    }
}
