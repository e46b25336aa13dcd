// crates/infohub-server/src/routes.rs
// ============================================================================
// Module: HTTP Routes
// Description: Export, import, and health handlers.
// Purpose: Translate HTTP requests into core calls and core results into
//          HTTP responses.
// Dependencies: axum, infohub-core, serde, tokio, uuid
// ============================================================================

//! ## Overview
//! Routes:
//! - `GET /v1/export/{exportName}` returns the signed presentation or the
//!   accepted sentinel.
//! - `POST /v1/import` takes the raw presentation body and returns
//!   `{"importIds": [...]}`.
//! - `GET /liveness` and `GET /readiness` report service status.
//!
//! Failures are rendered as `{"kind","message","requestId"}` with the status
//! conventionally mapped from the error kind. Every response carries
//! `x-request-id`, and every request is recorded as an `http_request` event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::Request;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::middleware;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use infohub_core::CancelToken;
use infohub_core::ExportName;
use infohub_core::HttpRequestEvent;
use infohub_core::HubError;
use infohub_core::HubEventSink;
use infohub_core::InfoHub;
use infohub_core::RequestContext;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::BearerAuth;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the request identifier.
pub const HEADER_REQUEST_ID: &str = "x-request-id";
/// Maximum accepted length of a caller-supplied request identifier.
const MAX_REQUEST_ID_LENGTH: usize = 128;
/// Service name reported by the health endpoints.
const SERVICE_NAME: &str = "infohub";

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Core service.
    hub: Arc<InfoHub>,
    /// Event sink for request records.
    events: Arc<dyn HubEventSink>,
    /// Inbound authentication.
    auth: BearerAuth,
    /// Deadline applied to each request.
    request_timeout: Duration,
    /// Maximum request body size.
    max_body_bytes: usize,
}

impl AppState {
    /// Creates handler state.
    #[must_use]
    pub fn new(
        hub: InfoHub,
        events: Arc<dyn HubEventSink>,
        auth: BearerAuth,
        request_timeout: Duration,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            hub: Arc::new(hub),
            events,
            auth,
            request_timeout,
            max_body_bytes,
        }
    }

    /// Runs core work on the blocking pool under a fresh request context.
    ///
    /// The context is canceled when the returned future is dropped, so work
    /// abandoned by a disconnected client stops at its next collaborator call.
    async fn run<T, F>(&self, request_id: &str, work: F) -> Result<T, HubError>
    where
        T: Send + 'static,
        F: FnOnce(&InfoHub, &RequestContext) -> Result<T, HubError> + Send + 'static,
    {
        let cancel = CancelToken::new();
        let _guard = CancelOnDrop(cancel.clone());
        let ctx = RequestContext::background()
            .with_request_id(request_id)
            .with_timeout(self.request_timeout)
            .with_cancel_token(cancel);
        let hub = Arc::clone(&self.hub);
        tokio::task::spawn_blocking(move || work(&hub, &ctx))
            .await
            .map_err(|err| HubError::internal(format!("request worker failed: {err}")))?
    }
}

/// Fires the wrapped token when dropped.
struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the HTTP router.
pub fn router(state: AppState) -> Router {
    let max_body_bytes = state.max_body_bytes;
    let state = Arc::new(state);
    Router::new()
        .route("/v1/export/{export_name}", get(export))
        .route("/v1/import", post(import))
        .route("/liveness", get(health))
        .route("/readiness", get(health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::from_fn_with_state(Arc::clone(&state), track_request))
        .with_state(state)
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles `GET /v1/export/{exportName}`.
async fn export(
    State(state): State<Arc<AppState>>,
    Path(export_name): Path<String>,
    headers: HeaderMap,
) -> Response {
    let request_id = request_id(&headers);
    if let Err(err) = state.auth.authorize(&headers) {
        return error_response(&err, &request_id);
    }
    let name = ExportName::new(export_name);
    match state.run(&request_id, move |hub, ctx| hub.export(ctx, &name)).await {
        Ok(result) => (StatusCode::OK, Json(result.into_json())).into_response(),
        Err(err) => error_response(&err, &request_id),
    }
}

/// Handles `POST /v1/import`.
async fn import(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = request_id(&headers);
    if let Err(err) = state.auth.authorize(&headers) {
        return error_response(&err, &request_id);
    }
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            return error_body(rejection.status(), "bad_request", &rejection.body_text(), &request_id);
        }
    };
    match state.run(&request_id, move |hub, ctx| hub.import(ctx, &body)).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => error_response(&err, &request_id),
    }
}

/// Health response body.
#[derive(Debug, Serialize)]
struct HealthResponse {
    /// Service name.
    service: &'static str,
    /// Service status.
    status: &'static str,
    /// Service version.
    version: &'static str,
}

/// Handles `GET /liveness` and `GET /readiness`.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: SERVICE_NAME,
        status: "up",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// SECTION: Middleware
// ============================================================================

/// Assigns a request identifier and records the request outcome.
async fn track_request(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let request_id = assign_request_id(request.headers_mut());
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(HEADER_REQUEST_ID, value);
    }
    state.events.record_http(&HttpRequestEvent::new(
        Some(request_id),
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis(),
    ));
    response
}

/// Keeps a well-formed caller identifier or replaces it with a fresh one.
fn assign_request_id(headers: &mut HeaderMap) -> String {
    let supplied = headers
        .get(HEADER_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| {
            !value.is_empty()
                && value.len() <= MAX_REQUEST_ID_LENGTH
                && value.bytes().all(|byte| byte.is_ascii_graphic())
        })
        .map(str::to_string);
    let request_id = supplied.unwrap_or_else(|| Uuid::new_v4().to_string());
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(HEADER_REQUEST_ID, value);
    }
    request_id
}

/// Reads the identifier assigned by [`track_request`].
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(HEADER_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_default()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Error response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    /// Error kind label.
    kind: &'a str,
    /// Error message.
    message: &'a str,
    /// Request identifier.
    request_id: &'a str,
}

/// Renders a core error with its conventional status.
fn error_response(err: &HubError, request_id: &str) -> Response {
    let status =
        StatusCode::from_u16(err.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_body(status, err.kind().as_str(), err.message(), request_id)
}

/// Renders an error body with an explicit status.
fn error_body(status: StatusCode, kind: &str, message: &str, request_id: &str) -> Response {
    let body = ErrorBody {
        kind,
        message,
        request_id,
    };
    (status, Json(body)).into_response()
}
