// crates/infohub-core/src/lib.rs
// ============================================================================
// Module: Info Hub Core Library
// Description: Public API surface for the Info Hub core.
// Purpose: Expose core types, capability traits, and the hub service.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Info Hub assembles cached, policy-evaluated data into signed presentations
//! for export and fans imported presentations out into a shared cache. The
//! core is transport-agnostic and synchronous; every external system is
//! reached through a capability trait from [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::Cache;
pub use interfaces::ConfigurationStore;
pub use interfaces::CredentialParser;
pub use interfaces::HubEventSink;
pub use interfaces::PolicyEvaluator;
pub use interfaces::PresentationSigner;
pub use runtime::HubCollaborators;
pub use runtime::InMemoryCache;
pub use runtime::InMemoryConfigurationStore;
pub use runtime::InfoHub;
pub use runtime::NoopEventSink;
