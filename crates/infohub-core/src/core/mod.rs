// crates/infohub-core/src/core/mod.rs
// ============================================================================
// Module: Info Hub Core Types
// Description: Identifiers, data model, errors, and request context.
// Purpose: Shared vocabulary for the runtime and every collaborator adapter.
// Dependencies: serde, serde_json, thiserror, uuid
// ============================================================================

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod context;
pub mod error;
pub mod events;
pub mod export;
pub mod identifiers;
pub mod presentation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use context::CancelToken;
pub use context::RequestContext;
pub use error::ErrorKind;
pub use error::HubError;
pub use events::EventLevel;
pub use events::HttpRequestEvent;
pub use events::HubEvent;
pub use events::HubEventParams;
pub use events::Operation;
pub use export::EXPORT_ACCEPTED_MESSAGE;
pub use export::ExportConfiguration;
pub use export::ExportResult;
pub use export::ImportResult;
pub use identifiers::CacheKey;
pub use identifiers::CachePartition;
pub use identifiers::ExportName;
pub use identifiers::ImportId;
pub use identifiers::PolicyName;
pub use presentation::Credential;
pub use presentation::Presentation;
pub use presentation::PresentationRequest;
pub use presentation::Subject;
