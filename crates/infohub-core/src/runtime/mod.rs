// crates/infohub-core/src/runtime/mod.rs
// ============================================================================
// Module: Info Hub Runtime
// Description: Hub service and in-memory collaborators.
// Purpose: Execute exports and imports against injected capabilities.
// Dependencies: crate::{core, interfaces}
// ============================================================================

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod hub;
pub mod memory;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use hub::HubCollaborators;
pub use hub::InfoHub;
pub use memory::InMemoryCache;
pub use memory::InMemoryConfigurationStore;
pub use memory::NoopEventSink;
