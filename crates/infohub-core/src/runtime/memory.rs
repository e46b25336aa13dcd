// crates/infohub-core/src/runtime/memory.rs
// ============================================================================
// Module: Info Hub In-Memory Collaborators
// Description: In-memory cache, configuration store, and no-op event sink.
// Purpose: Provide dependency-free collaborators for tests and local demos.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Simple in-memory implementations of [`Cache`], [`ConfigurationStore`] and
//! [`HubEventSink`]. They are not intended for production use; TTLs are
//! ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::CacheKey;
use crate::core::CachePartition;
use crate::core::ExportConfiguration;
use crate::core::ExportName;
use crate::core::HubError;
use crate::core::HubEvent;
use crate::core::RequestContext;
use crate::interfaces::Cache;
use crate::interfaces::ConfigurationStore;
use crate::interfaces::HubEventSink;

// ============================================================================
// SECTION: In-Memory Cache
// ============================================================================

/// Composite map key: partition plus cache key.
type EntryKey = (Option<String>, Option<String>, String);

/// In-memory cache for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCache {
    /// Entries protected by a mutex.
    entries: Arc<Mutex<BTreeMap<EntryKey, Vec<u8>>>>,
}

impl InMemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|guard| guard.len()).unwrap_or_default()
    }

    /// Returns true when no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds the map key of a cache entry.
fn entry_key(key: &CacheKey, partition: &CachePartition) -> EntryKey {
    (partition.namespace.clone(), partition.scope.clone(), key.as_str().to_string())
}

impl Cache for InMemoryCache {
    fn get(
        &self,
        ctx: &RequestContext,
        key: &CacheKey,
        partition: &CachePartition,
    ) -> Result<Vec<u8>, HubError> {
        ctx.check()?;
        let guard =
            self.entries.lock().map_err(|_| HubError::internal("cache mutex poisoned"))?;
        guard
            .get(&entry_key(key, partition))
            .cloned()
            .ok_or_else(|| HubError::not_found(format!("cache entry not found: {key}")))
    }

    fn set(
        &self,
        ctx: &RequestContext,
        key: &CacheKey,
        partition: &CachePartition,
        value: &[u8],
    ) -> Result<(), HubError> {
        ctx.check()?;
        self.entries
            .lock()
            .map_err(|_| HubError::internal("cache mutex poisoned"))?
            .insert(entry_key(key, partition), value.to_vec());
        Ok(())
    }
}

// ============================================================================
// SECTION: In-Memory Configuration Store
// ============================================================================

/// In-memory export configuration store with case-insensitive names.
#[derive(Debug, Default, Clone)]
pub struct InMemoryConfigurationStore {
    /// Configurations keyed by [`ExportName::lookup_key`].
    exports: Arc<Mutex<BTreeMap<String, ExportConfiguration>>>,
}

impl InMemoryConfigurationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with configurations.
    ///
    /// Later entries replace earlier ones with the same name.
    #[must_use]
    pub fn with_exports(exports: impl IntoIterator<Item = ExportConfiguration>) -> Self {
        let map = exports
            .into_iter()
            .map(|config| (config.export_name.lookup_key(), config))
            .collect();
        Self {
            exports: Arc::new(Mutex::new(map)),
        }
    }

    /// Inserts or replaces a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] when the store lock is poisoned.
    pub fn put(&self, config: ExportConfiguration) -> Result<(), HubError> {
        self.exports
            .lock()
            .map_err(|_| HubError::internal("configuration store mutex poisoned"))?
            .insert(config.export_name.lookup_key(), config);
        Ok(())
    }
}

impl ConfigurationStore for InMemoryConfigurationStore {
    fn export_configuration(
        &self,
        ctx: &RequestContext,
        name: &ExportName,
    ) -> Result<ExportConfiguration, HubError> {
        ctx.check()?;
        let guard = self
            .exports
            .lock()
            .map_err(|_| HubError::internal("configuration store mutex poisoned"))?;
        guard
            .get(&name.lookup_key())
            .cloned()
            .ok_or_else(|| HubError::not_found("export configuration not found"))
    }
}

// ============================================================================
// SECTION: No-Op Sink
// ============================================================================

/// Event sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl HubEventSink for NoopEventSink {
    fn record(&self, _event: &HubEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use serde_json::json;

    use super::InMemoryCache;
    use super::InMemoryConfigurationStore;
    use crate::core::CacheKey;
    use crate::core::CachePartition;
    use crate::core::ErrorKind;
    use crate::core::ExportConfiguration;
    use crate::core::ExportName;
    use crate::core::RequestContext;
    use crate::interfaces::Cache;
    use crate::interfaces::ConfigurationStore;

    #[test]
    fn cache_partitions_are_isolated() {
        let cache = InMemoryCache::new();
        let ctx = RequestContext::background();
        let key = CacheKey::new("k");
        let scoped = CachePartition {
            namespace: Some("ns".to_string()),
            scope: None,
        };
        cache.set(&ctx, &key, &scoped, b"v").unwrap();
        assert_eq!(cache.get(&ctx, &key, &scoped).unwrap(), b"v");
        let err = cache.get(&ctx, &key, &CachePartition::none()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn store_matches_names_case_insensitively() {
        let config: ExportConfiguration = serde_json::from_value(json!({
            "exportName": "TestExport",
            "issuer": "did:web:example.com",
            "keyNamespace": "transit",
            "key": "key1"
        }))
        .unwrap();
        let store = InMemoryConfigurationStore::with_exports([config]);
        let ctx = RequestContext::background();
        let found = store.export_configuration(&ctx, &ExportName::new("testexport")).unwrap();
        assert_eq!(found.export_name.as_str(), "TestExport");
        let err = store.export_configuration(&ctx, &ExportName::new("other")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
