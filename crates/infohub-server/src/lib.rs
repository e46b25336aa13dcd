// crates/infohub-server/src/lib.rs
// ============================================================================
// Module: Info Hub Server Library
// Description: HTTP surface for the Info Hub core.
// Purpose: Map export and import requests onto the blocking core service.
// Dependencies: axum, infohub-core, infohub-clients, infohub-config, tokio
// ============================================================================

//! ## Overview
//! The server owns one [`infohub_core::InfoHub`] built from validated
//! configuration and exposes it over HTTP. Each request runs on the blocking
//! pool under a [`infohub_core::RequestContext`] carrying the configured
//! deadline and a cancel token that fires when the client goes away.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod auth;
pub mod routes;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileEventSink;
pub use audit::StderrEventSink;
pub use audit::build_event_sink;
pub use auth::BearerAuth;
pub use routes::AppState;
pub use routes::HEADER_REQUEST_ID;
pub use routes::router;
pub use server::InfoHubServer;
pub use server::ServerError;
pub use server::build_collaborators;
