// crates/infohub-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Export Store
// Description: Durable ConfigurationStore backend using SQLite.
// Purpose: Persist export configurations across restarts.
// Dependencies: infohub-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`ConfigurationStore`] for export
//! configurations. Export names are unique case-insensitively and rows are
//! validated on read, failing closed on corruption.
//!
//! [`ConfigurationStore`]: infohub_core::ConfigurationStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_CONFIG_BYTES;
pub use store::SqliteExportStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
