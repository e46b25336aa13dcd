// crates/infohub-core/src/core/export.rs
// ============================================================================
// Module: Info Hub Export Model
// Description: Export configuration records and export/import results.
// Purpose: Define the data exchanged between the core and its callers.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`ExportConfiguration`] is owned by the configuration store and read-only
//! to the core. [`ExportResult`] and [`ImportResult`] are the only success
//! shapes of the two core operations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::core::identifiers::ExportName;
use crate::core::identifiers::ImportId;
use crate::core::identifiers::PolicyName;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Message carried by the accepted sentinel.
pub const EXPORT_ACCEPTED_MESSAGE: &str = "export request is accepted";

// ============================================================================
// SECTION: Export Configuration
// ============================================================================

/// Named export: which policies to evaluate and how to sign the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfiguration {
    /// Unique export name.
    pub export_name: ExportName,
    /// Additional JSON-LD contexts declared for the export.
    ///
    /// Stored and returned with the record so configurations round-trip
    /// unchanged. The hub does not read it: the signer builds the
    /// presentation's `@context` itself and its request carries no contexts.
    #[serde(default)]
    pub contexts: Vec<String>,
    /// Policies to evaluate, keyed by name, with their input payloads.
    #[serde(default)]
    pub policies: BTreeMap<PolicyName, Value>,
    /// Optional TTL in seconds applied to every policy result.
    #[serde(default)]
    pub cache_ttl: Option<u64>,
    /// Issuer identifier (DID) of the exported presentation.
    pub issuer: String,
    /// Signing key namespace.
    pub key_namespace: String,
    /// Signing key name.
    pub key: String,
}

impl ExportConfiguration {
    /// Returns the configured policy names in iteration order.
    #[must_use]
    pub fn policy_names(&self) -> Vec<&PolicyName> {
        self.policies.keys().collect()
    }
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// Successful outcome of an export.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportResult {
    /// Presentation built by the signer from cached policy results.
    Presentation(Value),
    /// Computation was triggered; the caller must retry later.
    Accepted,
}

impl ExportResult {
    /// Returns true for the accepted sentinel.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Renders the result as the JSON returned to callers.
    #[must_use]
    pub fn into_json(self) -> Value {
        match self {
            Self::Presentation(value) => value,
            Self::Accepted => json!({ "result": EXPORT_ACCEPTED_MESSAGE }),
        }
    }
}

/// Successful outcome of an import.
///
/// # Invariants
/// - One identifier per stored credential subject, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    /// Cache keys of the stored credential subjects, in credential order.
    pub import_ids: Vec<ImportId>,
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use serde_json::json;

    use super::ExportConfiguration;
    use super::ExportResult;
    use super::ImportResult;
    use crate::core::identifiers::ImportId;

    #[test]
    fn accepted_sentinel_json_shape() {
        assert_eq!(
            ExportResult::Accepted.into_json(),
            json!({"result": "export request is accepted"})
        );
    }

    #[test]
    fn import_result_serializes_camel_case() {
        let result = ImportResult {
            import_ids: vec![ImportId::new("a")],
        };
        assert_eq!(serde_json::to_value(result).unwrap(), json!({"importIds": ["a"]}));
    }

    #[test]
    fn export_configuration_deserializes_camel_case() {
        let config: ExportConfiguration = serde_json::from_value(json!({
            "exportName": "testexport",
            "policies": {"xfsc/did/1.0": {"hello": "world"}},
            "cacheTtl": 60,
            "issuer": "did:web:example.com",
            "keyNamespace": "transit",
            "key": "key1"
        }))
        .unwrap();
        assert_eq!(config.cache_ttl, Some(60));
        assert_eq!(config.policy_names().len(), 1);
        assert!(config.contexts.is_empty());
    }

    #[test]
    fn contexts_round_trip_unchanged() {
        let record = json!({
            "exportName": "testexport",
            "contexts": ["https://w3id.org/security/suites/jws-2020/v1"],
            "policies": {},
            "cacheTtl": null,
            "issuer": "did:web:example.com",
            "keyNamespace": "transit",
            "key": "key1"
        });
        let config: ExportConfiguration = serde_json::from_value(record.clone()).unwrap();
        assert_eq!(serde_json::to_value(&config).unwrap(), record);
    }
}
