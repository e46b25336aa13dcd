// crates/infohub-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Recording fakes for every hub collaborator.
// Purpose: Observe which collaborators the hub calls, and in what order.
// Dependencies: infohub-core
// ============================================================================

//! ## Overview
//! Every fake appends to a shared call log so tests can assert both call
//! counts and ordering across collaborators.

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Shared test helpers may be unused in some cases."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use infohub_core::Cache;
use infohub_core::CancelToken;
use infohub_core::CacheKey;
use infohub_core::CachePartition;
use infohub_core::ConfigurationStore;
use infohub_core::Credential;
use infohub_core::CredentialParser;
use infohub_core::ExportConfiguration;
use infohub_core::ExportName;
use infohub_core::HubCollaborators;
use infohub_core::HubError;
use infohub_core::HubEvent;
use infohub_core::HubEventSink;
use infohub_core::InMemoryConfigurationStore;
use infohub_core::InfoHub;
use infohub_core::PolicyEvaluator;
use infohub_core::PolicyName;
use infohub_core::Presentation;
use infohub_core::PresentationRequest;
use infohub_core::PresentationSigner;
use infohub_core::RequestContext;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Call Log
// ============================================================================

/// Collaborator call observed by a fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// Configuration lookup.
    Lookup(String),
    /// Cache read of a key.
    CacheGet(String),
    /// Cache write of a key.
    CacheSet(String),
    /// Evaluator invocation: policy, key, ttl.
    Evaluate(String, String, Option<u64>),
    /// Presentation creation.
    Sign,
    /// Presentation verification.
    Verify,
    /// Presentation parsing.
    Parse,
}

/// Shared append-only call log.
#[derive(Debug, Default, Clone)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    /// Appends a call.
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    /// Returns every recorded call.
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    /// Counts calls matching a predicate.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    /// Counts cache reads and writes.
    pub fn cache_calls(&self) -> usize {
        self.count(|call| matches!(call, Call::CacheGet(_) | Call::CacheSet(_)))
    }

    /// Counts cache writes.
    pub fn cache_sets(&self) -> usize {
        self.count(|call| matches!(call, Call::CacheSet(_)))
    }

    /// Counts evaluator invocations.
    pub fn evaluations(&self) -> usize {
        self.count(|call| matches!(call, Call::Evaluate(..)))
    }

    /// Counts signer presentation builds.
    pub fn signs(&self) -> usize {
        self.count(|call| matches!(call, Call::Sign))
    }
}

// ============================================================================
// SECTION: Fakes
// ============================================================================

/// Configuration store delegating to the in-memory store.
pub struct RecordingStore {
    /// Shared call log.
    log: CallLog,
    /// Backing store.
    inner: InMemoryConfigurationStore,
}

impl ConfigurationStore for RecordingStore {
    fn export_configuration(
        &self,
        ctx: &RequestContext,
        name: &ExportName,
    ) -> Result<ExportConfiguration, HubError> {
        self.log.push(Call::Lookup(name.as_str().to_string()));
        self.inner.export_configuration(ctx, name)
    }
}

/// Cache backed by a map, with injectable failures.
#[derive(Default)]
pub struct RecordingCache {
    /// Shared call log.
    log: CallLog,
    /// Stored entries.
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
    /// Keys whose reads fail with the given error.
    get_failures: Mutex<BTreeMap<String, HubError>>,
    /// Zero-based write indices that fail.
    failing_sets: Mutex<BTreeSet<usize>>,
    /// Number of writes attempted so far.
    set_attempts: Mutex<usize>,
    /// Token fired while serving the next write.
    cancel_during_set: Mutex<Option<CancelToken>>,
}

impl RecordingCache {
    /// Returns the stored value of a key.
    pub fn value(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl Cache for RecordingCache {
    fn get(
        &self,
        _ctx: &RequestContext,
        key: &CacheKey,
        partition: &CachePartition,
    ) -> Result<Vec<u8>, HubError> {
        assert_eq!(partition, &CachePartition::none());
        self.log.push(Call::CacheGet(key.as_str().to_string()));
        if let Some(err) = self.get_failures.lock().unwrap().get(key.as_str()) {
            return Err(err.clone());
        }
        self.value(key.as_str()).ok_or_else(|| HubError::not_found("no data"))
    }

    fn set(
        &self,
        _ctx: &RequestContext,
        key: &CacheKey,
        partition: &CachePartition,
        value: &[u8],
    ) -> Result<(), HubError> {
        assert_eq!(partition, &CachePartition::none());
        self.log.push(Call::CacheSet(key.as_str().to_string()));
        if let Some(token) = self.cancel_during_set.lock().unwrap().take() {
            token.cancel();
        }
        let mut attempts = self.set_attempts.lock().unwrap();
        let index = *attempts;
        *attempts += 1;
        if self.failing_sets.lock().unwrap().contains(&index) {
            return Err(HubError::unknown("cache unavailable"));
        }
        self.entries.lock().unwrap().insert(key.as_str().to_string(), value.to_vec());
        Ok(())
    }
}

/// Evaluator that records invocations and can fail on one policy.
#[derive(Default)]
pub struct RecordingEvaluator {
    /// Shared call log.
    log: CallLog,
    /// Policy whose evaluation fails.
    failing_policy: Mutex<Option<String>>,
    /// Token fired while serving the next evaluation.
    cancel_during_evaluate: Mutex<Option<CancelToken>>,
}

impl PolicyEvaluator for RecordingEvaluator {
    fn evaluate(
        &self,
        _ctx: &RequestContext,
        policy: &PolicyName,
        _input: &Value,
        key: &CacheKey,
        ttl_secs: Option<u64>,
    ) -> Result<Vec<u8>, HubError> {
        self.log.push(Call::Evaluate(
            policy.as_str().to_string(),
            key.as_str().to_string(),
            ttl_secs,
        ));
        if let Some(token) = self.cancel_during_evaluate.lock().unwrap().take() {
            token.cancel();
        }
        if self.failing_policy.lock().unwrap().as_deref() == Some(policy.as_str()) {
            return Err(HubError::unknown("unexpected response on policy evaluation: 500"));
        }
        Ok(br#"{"allow":true}"#.to_vec())
    }
}

/// Signer that echoes its request and optionally rejects verification.
#[derive(Default)]
pub struct RecordingSigner {
    /// Shared call log.
    log: CallLog,
    /// Whether verification fails.
    reject_verification: Mutex<bool>,
    /// Whether signing fails.
    fail_signing: Mutex<bool>,
    /// Received presentation requests.
    requests: Mutex<Vec<PresentationRequest>>,
}

impl RecordingSigner {
    /// Returns every presentation request received.
    pub fn requests(&self) -> Vec<PresentationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl PresentationSigner for RecordingSigner {
    fn create_presentation(
        &self,
        _ctx: &RequestContext,
        request: &PresentationRequest,
    ) -> Result<Value, HubError> {
        self.log.push(Call::Sign);
        if *self.fail_signing.lock().unwrap() {
            return Err(HubError::internal("signer unavailable"));
        }
        self.requests.lock().unwrap().push(request.clone());
        Ok(json!({
            "type": ["VerifiablePresentation"],
            "issuer": request.issuer,
            "credentials": request.data.len(),
        }))
    }

    fn verify_presentation(&self, _ctx: &RequestContext, _raw: &[u8]) -> Result<(), HubError> {
        self.log.push(Call::Verify);
        if *self.reject_verification.lock().unwrap() {
            return Err(HubError::unknown("invalid presentation proof"));
        }
        Ok(())
    }
}

/// Parser returning a fixed presentation.
#[derive(Default)]
pub struct FixedParser {
    /// Shared call log.
    log: CallLog,
    /// Presentation returned by every parse.
    presentation: Mutex<Presentation>,
}

impl CredentialParser for FixedParser {
    fn parse_presentation(
        &self,
        _ctx: &RequestContext,
        _raw: &[u8],
    ) -> Result<Presentation, HubError> {
        self.log.push(Call::Parse);
        Ok(self.presentation.lock().unwrap().clone())
    }
}

/// Sink retaining every event.
#[derive(Default)]
pub struct RecordingSink {
    /// Recorded events.
    events: Mutex<Vec<HubEvent>>,
}

impl RecordingSink {
    /// Returns the event identifiers in order.
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|event| event.event).collect()
    }

    /// Returns every event.
    pub fn events(&self) -> Vec<HubEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl HubEventSink for RecordingSink {
    fn record(&self, event: &HubEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Hub wired to recording fakes.
pub struct Harness {
    /// Calls across every collaborator.
    pub log: CallLog,
    /// Cache fake.
    pub cache: Arc<RecordingCache>,
    /// Evaluator fake.
    pub evaluator: Arc<RecordingEvaluator>,
    /// Signer fake.
    pub signer: Arc<RecordingSigner>,
    /// Parser fake.
    pub parser: Arc<FixedParser>,
    /// Event sink fake.
    pub sink: Arc<RecordingSink>,
    /// Hub under test.
    pub hub: InfoHub,
}

impl Harness {
    /// Builds a harness serving the given export configurations.
    pub fn new(exports: Vec<ExportConfiguration>) -> Self {
        let log = CallLog::default();
        let store = Arc::new(RecordingStore {
            log: log.clone(),
            inner: InMemoryConfigurationStore::with_exports(exports),
        });
        let cache = Arc::new(RecordingCache {
            log: log.clone(),
            ..RecordingCache::default()
        });
        let evaluator = Arc::new(RecordingEvaluator {
            log: log.clone(),
            ..RecordingEvaluator::default()
        });
        let signer = Arc::new(RecordingSigner {
            log: log.clone(),
            ..RecordingSigner::default()
        });
        let parser = Arc::new(FixedParser {
            log: log.clone(),
            ..FixedParser::default()
        });
        let sink = Arc::new(RecordingSink::default());
        let hub = InfoHub::new(HubCollaborators {
            store,
            evaluator: evaluator.clone(),
            cache: cache.clone(),
            signer: signer.clone(),
            parser: parser.clone(),
            events: sink.clone(),
        });
        Self {
            log,
            cache,
            evaluator,
            signer,
            parser,
            sink,
            hub,
        }
    }

    /// Seeds a cache entry without recording a call.
    pub fn seed_cache(&self, key: &str, value: &[u8]) {
        self.cache.entries.lock().unwrap().insert(key.to_string(), value.to_vec());
    }

    /// Makes reads of `key` fail with `err`.
    pub fn fail_cache_get(&self, key: &str, err: HubError) {
        self.cache.get_failures.lock().unwrap().insert(key.to_string(), err);
    }

    /// Makes the zero-based `index`-th cache write fail.
    pub fn fail_cache_set(&self, index: usize) {
        self.cache.failing_sets.lock().unwrap().insert(index);
    }

    /// Makes the evaluator fail for `policy`.
    pub fn fail_evaluation(&self, policy: &str) {
        *self.evaluator.failing_policy.lock().unwrap() = Some(policy.to_string());
    }

    /// Fires `token` from inside the next cache write, after it completes.
    pub fn cancel_during_cache_set(&self, token: CancelToken) {
        *self.cache.cancel_during_set.lock().unwrap() = Some(token);
    }

    /// Fires `token` from inside the next evaluation, after it completes.
    pub fn cancel_during_evaluation(&self, token: CancelToken) {
        *self.evaluator.cancel_during_evaluate.lock().unwrap() = Some(token);
    }

    /// Makes presentation verification fail.
    pub fn reject_verification(&self) {
        *self.signer.reject_verification.lock().unwrap() = true;
    }

    /// Makes presentation signing fail.
    pub fn fail_signing(&self) {
        *self.signer.fail_signing.lock().unwrap() = true;
    }

    /// Sets the presentation returned by the parser.
    pub fn parse_to(&self, credentials: Vec<Credential>) {
        *self.parser.presentation.lock().unwrap() = Presentation::new(credentials);
    }
}

// ============================================================================
// SECTION: Sample Data
// ============================================================================

/// Export configuration with the given policies, each with a small input.
pub fn export_config(name: &str, policies: &[&str], ttl: Option<u64>) -> ExportConfiguration {
    let policies: serde_json::Map<String, Value> = policies
        .iter()
        .map(|policy| ((*policy).to_string(), json!({"input": *policy})))
        .collect();
    serde_json::from_value(json!({
        "exportName": name,
        "policies": policies,
        "cacheTtl": ttl,
        "issuer": "did:web:example.com",
        "keyNamespace": "transit",
        "key": "key1"
    }))
    .unwrap()
}

/// Embedded credential with the given subject value.
pub fn credential_with_subject(subject: Value) -> Credential {
    let Value::Object(claims) = json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "type": "VerifiableCredential",
        "credentialSubject": subject,
    }) else {
        unreachable!("literal is an object");
    };
    Credential::Embedded(claims)
}

/// Embedded credential with no subject field.
pub fn credential_without_subject() -> Credential {
    let Value::Object(claims) = json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "type": "VerifiableCredential",
    }) else {
        unreachable!("literal is an object");
    };
    Credential::Embedded(claims)
}
