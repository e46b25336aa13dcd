// crates/infohub-clients/src/signer.rs
// ============================================================================
// Module: Signer Client
// Description: HTTP adapter for the signer service.
// Purpose: Create signed presentations and verify incoming ones.
// Dependencies: infohub-core, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! Presentations are created by posting `{issuer, namespace, key, data}` to
//! `/v1/presentation` and verified by posting raw bytes to
//! `/v1/presentation/verify`, which must answer `{"valid": true}`. Error
//! responses keep the status-derived kind and carry the response body.

// ============================================================================
// SECTION: Imports
// ============================================================================

use infohub_core::HubError;
use infohub_core::PresentationRequest;
use infohub_core::PresentationSigner;
use infohub_core::RequestContext;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::Value;

use crate::http::HttpClientConfig;
use crate::http::HttpTransport;
use crate::oauth::ClientCredentials;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Presentation creation path.
const CREATE_PRESENTATION_PATH: &str = "/v1/presentation";
/// Presentation verification path.
const VERIFY_PRESENTATION_PATH: &str = "/v1/presentation/verify";

// ============================================================================
// SECTION: Client
// ============================================================================

/// Verification response body.
#[derive(Debug, Deserialize)]
struct VerifyResult {
    /// Whether every proof verified.
    #[serde(default)]
    valid: bool,
}

/// Signer service client.
#[derive(Debug, Clone)]
pub struct SignerClient {
    /// Shared transport.
    http: HttpTransport,
}

impl SignerClient {
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

impl PresentationSigner for SignerClient {
    fn create_presentation(
        &self,
        ctx: &RequestContext,
        request: &PresentationRequest,
    ) -> Result<Value, HubError> {
        let url = self.http.url(CREATE_PRESENTATION_PATH)?;
        let response = self.http.send(ctx, self.http.post(url).json(request))?;
        if response.status() != StatusCode::OK {
            return Err(HttpTransport::status_error(response));
        }
        let body = self.http.read_body(response)?;
        match serde_json::from_slice::<Value>(&body) {
            Ok(presentation @ Value::Object(_)) => Ok(presentation),
            Ok(_) => Err(HubError::unknown(
                "error decoding signer response as verifiable presentation: not an object",
            )),
            Err(err) => Err(HubError::wrap(
                "error decoding signer response as verifiable presentation",
                &err,
            )),
        }
    }

    fn verify_presentation(&self, ctx: &RequestContext, raw: &[u8]) -> Result<(), HubError> {
        let url = self.http.url(VERIFY_PRESENTATION_PATH)?;
        let request =
            self.http.post(url).header(CONTENT_TYPE, "application/json").body(raw.to_vec());
        let response = self.http.send(ctx, request)?;
        if response.status() != StatusCode::OK {
            return Err(HttpTransport::status_error(response));
        }
        let body = self.http.read_body(response)?;
        let result: VerifyResult = serde_json::from_slice(&body)
            .map_err(|err| HubError::wrap("failed to decode response", &err))?;
        if !result.valid {
            return Err(HubError::unknown("invalid presentation proof"));
        }
        Ok(())
    }
}
