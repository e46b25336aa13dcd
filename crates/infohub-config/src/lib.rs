// crates/infohub-config/src/lib.rs
// ============================================================================
// Module: Info Hub Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for infohub.toml semantics.
// Dependencies: infohub-core, infohub-clients, infohub-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `infohub-config` loads `infohub.toml` and validates it fail-closed before
//! any collaborator or listener is built from it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
