// crates/infohub-clients/src/cache.rs
// ============================================================================
// Module: Cache Client
// Description: HTTP adapter for the cache service.
// Purpose: Read and write cache entries addressed by key, namespace, and scope.
// Dependencies: infohub-core, reqwest
// ============================================================================

//! ## Overview
//! Entries live at `{addr}/v1/cache`; the key and partition travel in
//! headers. A `404` on read is the only response surfaced as `NotFound`, which
//! the export flow depends on to select its trigger path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use infohub_core::Cache;
use infohub_core::CacheKey;
use infohub_core::CachePartition;
use infohub_core::HubError;
use infohub_core::RequestContext;
use reqwest::StatusCode;
use reqwest::blocking::RequestBuilder;
use reqwest::header::CONTENT_TYPE;

use crate::http::HttpClientConfig;
use crate::http::HttpTransport;
use crate::oauth::ClientCredentials;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Cache endpoint path.
const CACHE_PATH: &str = "/v1/cache";
/// Header carrying the cache key.
pub const HEADER_CACHE_KEY: &str = "x-cache-key";
/// Header carrying the cache namespace.
pub const HEADER_CACHE_NAMESPACE: &str = "x-cache-namespace";
/// Header carrying the cache scope.
pub const HEADER_CACHE_SCOPE: &str = "x-cache-scope";

// ============================================================================
// SECTION: Client
// ============================================================================

/// Cache service client.
#[derive(Debug, Clone)]
pub struct CacheClient {
    /// Shared transport.
    http: HttpTransport,
}

impl CacheClient {
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

/// Adds key and partition headers; empty partition parts are omitted.
fn address(request: RequestBuilder, key: &CacheKey, partition: &CachePartition) -> RequestBuilder {
    let mut request = request.header(HEADER_CACHE_KEY, key.as_str());
    if let Some(namespace) = partition.namespace.as_deref().filter(|value| !value.is_empty()) {
        request = request.header(HEADER_CACHE_NAMESPACE, namespace);
    }
    if let Some(scope) = partition.scope.as_deref().filter(|value| !value.is_empty()) {
        request = request.header(HEADER_CACHE_SCOPE, scope);
    }
    request
}

impl Cache for CacheClient {
    fn get(
        &self,
        ctx: &RequestContext,
        key: &CacheKey,
        partition: &CachePartition,
    ) -> Result<Vec<u8>, HubError> {
        let url = self.http.url(CACHE_PATH)?;
        let response = self.http.send(ctx, address(self.http.get(url), key, partition))?;
        match response.status() {
            StatusCode::OK => self.http.read_body(response),
            StatusCode::NOT_FOUND => Err(HubError::not_found(format!("no data for key {key}"))),
            _ => Err(HttpTransport::status_error(response)),
        }
    }

    fn set(
        &self,
        ctx: &RequestContext,
        key: &CacheKey,
        partition: &CachePartition,
        value: &[u8],
    ) -> Result<(), HubError> {
        let url = self.http.url(CACHE_PATH)?;
        let request = address(self.http.post(url), key, partition)
            .header(CONTENT_TYPE, "application/json")
            .body(value.to_vec());
        let response = self.http.send(ctx, request)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(HttpTransport::status_error(response))
        }
    }
}
