// crates/infohub-core/src/interfaces/mod.rs
// ============================================================================
// Module: Info Hub Interfaces
// Description: Capability traits for every collaborator of the hub.
// Purpose: Define the narrow seams the runtime depends on.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! The hub never talks to a concrete backend. Each collaborator is a
//! `Send + Sync` capability injected at construction time, so deployments wire
//! HTTP adapters and tests wire recording fakes.
//!
//! Every method receives the caller's [`RequestContext`]. Implementations
//! performing I/O should bound it by [`RequestContext::remaining`] and must
//! surface absent entries as [`ErrorKind::NotFound`](crate::core::ErrorKind).

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::core::CacheKey;
use crate::core::CachePartition;
use crate::core::ExportConfiguration;
use crate::core::ExportName;
use crate::core::HttpRequestEvent;
use crate::core::HubError;
use crate::core::HubEvent;
use crate::core::PolicyName;
use crate::core::Presentation;
use crate::core::PresentationRequest;
use crate::core::RequestContext;

// ============================================================================
// SECTION: Configuration Store
// ============================================================================

/// Resolves export names to export configurations.
pub trait ConfigurationStore: Send + Sync {
    /// Looks up an export configuration by name.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] with kind `NotFound` when no configuration exists.
    fn export_configuration(
        &self,
        ctx: &RequestContext,
        name: &ExportName,
    ) -> Result<ExportConfiguration, HubError>;
}

// ============================================================================
// SECTION: Policy Evaluator
// ============================================================================

/// Executes named policies; results reach the cache as a side effect.
pub trait PolicyEvaluator: Send + Sync {
    /// Invokes a policy with its input payload.
    ///
    /// `key` is the idempotency token under which the evaluator is expected to
    /// cache its result; `ttl_secs` applies to that cache write.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] when the invocation fails.
    fn evaluate(
        &self,
        ctx: &RequestContext,
        policy: &PolicyName,
        input: &Value,
        key: &CacheKey,
        ttl_secs: Option<u64>,
    ) -> Result<Vec<u8>, HubError>;
}

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Key/value cache with optional namespace and scope partitioning.
pub trait Cache: Send + Sync {
    /// Reads an entry.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] with kind `NotFound` when the entry is absent.
    fn get(
        &self,
        ctx: &RequestContext,
        key: &CacheKey,
        partition: &CachePartition,
    ) -> Result<Vec<u8>, HubError>;

    /// Writes an entry.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] when the write fails.
    fn set(
        &self,
        ctx: &RequestContext,
        key: &CacheKey,
        partition: &CachePartition,
        value: &[u8],
    ) -> Result<(), HubError>;
}

// ============================================================================
// SECTION: Presentation Signer
// ============================================================================

/// Builds signed presentations and verifies incoming ones.
pub trait PresentationSigner: Send + Sync {
    /// Builds a signed presentation from claim objects.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] when signing fails.
    fn create_presentation(
        &self,
        ctx: &RequestContext,
        request: &PresentationRequest,
    ) -> Result<Value, HubError>;

    /// Verifies the proofs of raw presentation bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] when the presentation is not authentic.
    fn verify_presentation(&self, ctx: &RequestContext, raw: &[u8]) -> Result<(), HubError>;
}

// ============================================================================
// SECTION: Credential Parser
// ============================================================================

/// Parses raw presentation bytes into credentials.
///
/// Proofs are not checked here; callers verify them first.
pub trait CredentialParser: Send + Sync {
    /// Parses a presentation.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] when the document is structurally invalid.
    fn parse_presentation(
        &self,
        ctx: &RequestContext,
        raw: &[u8],
    ) -> Result<Presentation, HubError>;
}

// ============================================================================
// SECTION: Event Sink
// ============================================================================

/// Destination for structured hub events.
pub trait HubEventSink: Send + Sync {
    /// Records a hub event.
    fn record(&self, event: &HubEvent);

    /// Records a transport request event.
    fn record_http(&self, _event: &HttpRequestEvent) {}
}
