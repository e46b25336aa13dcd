// crates/infohub-core/tests/properties.rs
// ============================================================================
// Module: Property Tests
// Description: Generated inputs for key derivation and import decomposition.
// ============================================================================
//! ## Overview
//! Property checks that hold for arbitrary names and subject sets.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Tests use unwrap on deterministic fixtures."
)]

mod common;

use std::collections::BTreeSet;

use common::Harness;
use common::credential_with_subject;
use infohub_core::CacheKey;
use infohub_core::ExportName;
use infohub_core::PolicyName;
use infohub_core::RequestContext;
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn policy_keys_are_export_colon_policy(
        export in "[A-Za-z0-9_-]{1,16}",
        policy in "[a-z]{1,8}/[a-z]{1,8}/[0-9]\\.[0-9]",
    ) {
        let key = CacheKey::for_policy(&ExportName::new(export.clone()), &PolicyName::new(policy.clone()));
        prop_assert_eq!(key.as_str(), format!("{export}:{policy}"));
    }

    #[test]
    fn distinct_exports_never_share_policy_keys(
        first in "[a-z]{1,8}",
        second in "[a-z]{1,8}",
    ) {
        prop_assume!(first != second);
        let policy = PolicyName::new("xfsc/shared/1.0");
        let a = CacheKey::for_policy(&ExportName::new(first), &policy);
        let b = CacheKey::for_policy(&ExportName::new(second), &policy);
        prop_assert_ne!(a, b);
    }

    #[test]
    fn import_returns_one_unique_id_per_stored_subject(
        values in prop::collection::vec(any::<i64>(), 0..8),
    ) {
        let harness = Harness::new(Vec::new());
        harness.parse_to(
            values.iter().map(|value| credential_with_subject(json!({"value": value}))).collect(),
        );

        let result = harness.hub.import(&RequestContext::background(), b"{}").unwrap();

        prop_assert_eq!(result.import_ids.len(), values.len());
        let unique: BTreeSet<&str> = result.import_ids.iter().map(|id| id.as_str()).collect();
        prop_assert_eq!(unique.len(), values.len());
        for (id, value) in result.import_ids.iter().zip(&values) {
            let stored = harness.cache.value(id.as_str()).unwrap();
            prop_assert_eq!(stored, serde_json::to_vec(&json!({"value": value})).unwrap());
        }
    }
}
