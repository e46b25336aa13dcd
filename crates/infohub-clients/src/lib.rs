// crates/infohub-clients/src/lib.rs
// ============================================================================
// Module: Info Hub Clients Library
// Description: Collaborator adapters for the Info Hub core.
// Purpose: Reach the policy, cache, and signer services over HTTP and parse
//          verifiable presentations.
// Dependencies: infohub-core, reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! Each client implements one capability trait from `infohub-core` over a
//! shared blocking [`HttpTransport`]. Every request honors the caller's
//! [`infohub_core::RequestContext`]: cancellation is checked before I/O and
//! the per-request timeout never outlives the remaining deadline. Requests
//! carry either a static bearer token or tokens from an OAuth2
//! client-credentials [`ClientCredentials`] source shared by all clients.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cache;
pub mod credential;
pub mod http;
pub mod oauth;
pub mod policy;
pub mod signer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cache::CacheClient;
pub use cache::HEADER_CACHE_KEY;
pub use cache::HEADER_CACHE_NAMESPACE;
pub use cache::HEADER_CACHE_SCOPE;
pub use credential::JsonLdCredentialParser;
pub use http::HttpClientConfig;
pub use http::HttpTransport;
pub use oauth::ClientCredentials;
pub use oauth::OAuthConfig;
pub use policy::HEADER_CACHE_TTL;
pub use policy::HEADER_EVALUATION_ID;
pub use policy::PolicyClient;
pub use signer::SignerClient;
