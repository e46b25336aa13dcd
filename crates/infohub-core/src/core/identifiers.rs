// crates/infohub-core/src/core/identifiers.rs
// ============================================================================
// Module: Info Hub Identifiers
// Description: Canonical opaque identifiers for exports, policies, and imports.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde, uuid
// ============================================================================

//! ## Overview
//! This module defines the string-based identifiers used throughout Info Hub.
//! Identifiers are opaque and serialize as strings. Validation is handled at
//! configuration boundaries rather than within these wrappers, with the
//! exception of [`PolicyName::segments`] which exposes the
//! `group/policy/version` structure to validators.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Separator between export and policy names in policy result cache keys.
pub const CACHE_KEY_SEPARATOR: &str = ":";

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Name of an export configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExportName(String);

impl ExportName {
    /// Creates a new export name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the case-folded form under which stores match this name.
    ///
    /// Folding is Unicode-aware, so `Überblick` and `überblick` share a key.
    #[must_use]
    pub fn lookup_key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for ExportName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ExportName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ExportName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Versioned policy name formatted as `group/policy/version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyName(String);

impl PolicyName {
    /// Creates a new policy name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the name into `(group, policy, version)`.
    ///
    /// Returns `None` unless the name has exactly three non-empty segments.
    #[must_use]
    pub fn segments(&self) -> Option<(&str, &str, &str)> {
        let mut parts = self.0.split('/');
        let group = parts.next()?;
        let policy = parts.next()?;
        let version = parts.next()?;
        if parts.next().is_some() || group.is_empty() || policy.is_empty() || version.is_empty()
        {
            return None;
        }
        Some((group, policy, version))
    }
}

impl fmt::Display for PolicyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PolicyName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PolicyName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Identifier assigned to one imported credential subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportId(String);

impl ImportId {
    /// Wraps an existing import identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ImportId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Key of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Creates a cache key from a raw string.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Builds the result key for a policy evaluated on behalf of an export.
    ///
    /// # Invariants
    /// - Always `export + ":" + policy`, so equal policy names under different
    ///   exports never share a key.
    #[must_use]
    pub fn for_policy(export: &ExportName, policy: &PolicyName) -> Self {
        Self(format!("{}{CACHE_KEY_SEPARATOR}{}", export.as_str(), policy.as_str()))
    }

    /// Builds the key under which an imported credential subject is stored.
    #[must_use]
    pub fn for_import(id: &ImportId) -> Self {
        Self(id.as_str().to_string())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for CacheKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Optional namespace/scope partition of the cache.
///
/// The default value addresses the unpartitioned cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CachePartition {
    /// Optional cache namespace.
    pub namespace: Option<String>,
    /// Optional cache scope.
    pub scope: Option<String>,
}

impl CachePartition {
    /// Returns the unpartitioned cache location.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            namespace: None,
            scope: None,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
