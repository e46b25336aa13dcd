// crates/infohub-core/src/runtime/hub.rs
// ============================================================================
// Module: Info Hub Service
// Description: Export orchestration and import pipeline.
// Purpose: Coordinate the store, evaluator, cache, signer, and parser.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! [`InfoHub`] implements the two hub operations:
//!
//! - **Export** is cache-first. When every policy result of an export is
//!   cached, the results are signed into a presentation. Any miss triggers
//!   evaluation of every policy of the export and returns
//!   [`ExportResult::Accepted`]. Triggering is not transactional: a failed
//!   invocation aborts the export, and policies already triggered stay
//!   triggered.
//! - **Import** verifies, parses and decomposes a presentation, storing each
//!   credential subject under a fresh identifier. Structural faults abort the
//!   whole import; a failed cache write only skips its credential.
//!
//! Collaborator calls are sequential, and the request context is checked
//! before each one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Map;
use serde_json::Value;

use crate::core::CacheKey;
use crate::core::CachePartition;
use crate::core::ErrorKind;
use crate::core::EventLevel;
use crate::core::ExportConfiguration;
use crate::core::ExportName;
use crate::core::ExportResult;
use crate::core::HubError;
use crate::core::HubEvent;
use crate::core::HubEventParams;
use crate::core::ImportId;
use crate::core::ImportResult;
use crate::core::Operation;
use crate::core::PolicyName;
use crate::core::PresentationRequest;
use crate::core::RequestContext;
use crate::core::Subject;
use crate::interfaces::Cache;
use crate::interfaces::ConfigurationStore;
use crate::interfaces::CredentialParser;
use crate::interfaces::HubEventSink;
use crate::interfaces::PolicyEvaluator;
use crate::interfaces::PresentationSigner;

// ============================================================================
// SECTION: Collaborators
// ============================================================================

/// Capabilities injected into the hub.
#[derive(Clone)]
pub struct HubCollaborators {
    /// Export configuration lookup.
    pub store: Arc<dyn ConfigurationStore>,
    /// Policy evaluator.
    pub evaluator: Arc<dyn PolicyEvaluator>,
    /// Shared cache.
    pub cache: Arc<dyn Cache>,
    /// Presentation signer and verifier.
    pub signer: Arc<dyn PresentationSigner>,
    /// Credential parser.
    pub parser: Arc<dyn CredentialParser>,
    /// Event sink.
    pub events: Arc<dyn HubEventSink>,
}

// ============================================================================
// SECTION: Service
// ============================================================================

/// Export/import orchestrator.
///
/// # Invariants
/// - Holds no per-request mutable state; safe to share across threads.
#[derive(Clone)]
pub struct InfoHub {
    /// Injected capabilities.
    deps: HubCollaborators,
}

/// Outcome of reading every policy result of an export.
enum CachedResults {
    /// All results present, in policy order.
    Complete(Vec<(PolicyName, Vec<u8>)>),
    /// At least one result is absent.
    Miss,
}

impl InfoHub {
    /// Creates a hub over the given collaborators.
    #[must_use]
    pub const fn new(deps: HubCollaborators) -> Self {
        Self {
            deps,
        }
    }

    /// Exports the named configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] when the configuration is unknown, a cache read
    /// fails with anything but `NotFound`, a cached result is not a JSON
    /// object, signing fails, or a trigger invocation fails.
    pub fn export(
        &self,
        ctx: &RequestContext,
        name: &ExportName,
    ) -> Result<ExportResult, HubError> {
        let reporter = Reporter::new(self.deps.events.as_ref(), ctx, Operation::Export)
            .with_export(name.as_str());

        ctx.check().inspect_err(|err| reporter.failed("export aborted", err))?;
        let config = self
            .deps
            .store
            .export_configuration(ctx, name)
            .inspect_err(|err| reporter.failed("error getting export configuration", err))?;
        let reporter = reporter.with_export(config.export_name.as_str());

        let results = match self.read_cached_results(ctx, &config) {
            Ok(CachedResults::Complete(results)) => results,
            Ok(CachedResults::Miss) => {
                self.trigger_export(ctx, &config, &reporter)?;
                return Ok(ExportResult::Accepted);
            }
            Err(err) => {
                reporter.failed("failed to get policy results from cache", &err);
                return Err(err);
            }
        };

        let mut data = Vec::with_capacity(results.len());
        for (policy, bytes) in results {
            let object = decode_policy_result(&bytes).inspect_err(|err| {
                reporter.policy_failed("error decoding policy result as json", &policy, err);
            })?;
            data.push(object);
        }

        let request = PresentationRequest {
            issuer: config.issuer.clone(),
            namespace: config.key_namespace.clone(),
            key: config.key.clone(),
            data,
        };
        let presentation = ctx
            .check()
            .and_then(|()| self.deps.signer.create_presentation(ctx, &request))
            .map_err(|err| err.context("error creating export"))
            .inspect_err(|err| reporter.failed("error creating verifiable presentation", err))?;
        Ok(ExportResult::Presentation(presentation))
    }

    /// Imports a signed presentation, caching each credential subject.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] when verification or parsing fails, or when a
    /// credential is not a claim container with an object subject. Cache write
    /// failures are not errors; the affected credential is omitted.
    pub fn import(&self, ctx: &RequestContext, raw: &[u8]) -> Result<ImportResult, HubError> {
        let reporter = Reporter::new(self.deps.events.as_ref(), ctx, Operation::Import);

        ctx.check()
            .and_then(|()| self.deps.signer.verify_presentation(ctx, raw))
            .inspect_err(|err| reporter.failed("error verifying presentation", err))?;

        let presentation = ctx
            .check()
            .and_then(|()| self.deps.parser.parse_presentation(ctx, raw))
            .map_err(|err| err.context("error parsing verifiable presentation"))
            .inspect_err(|err| reporter.failed("error parsing verifiable presentation", err))?;

        let mut subjects = Vec::with_capacity(presentation.credentials.len());
        for credential in &presentation.credentials {
            let subject = match credential.subject() {
                None => Err(HubError::bad_request(
                    "verifiable presentation contains unknown credential type",
                )),
                Some(Subject::Missing) => {
                    Err(HubError::bad_request("verifiable credential doesn't contain subject"))
                }
                Some(Subject::NotAnObject) => Err(HubError::bad_request(
                    "verifiable credential subject is not a map object",
                )),
                Some(Subject::Object(subject)) => encode_subject(subject),
            }
            .inspect_err(|err| reporter.failed("invalid credential in presentation", err))?;
            subjects.push(subject);
        }

        let mut import_ids = Vec::with_capacity(subjects.len());
        for subject in subjects {
            ctx.check().inspect_err(|err| reporter.failed("import aborted", err))?;
            let import_id = ImportId::generate();
            let key = CacheKey::for_import(&import_id);
            if let Err(err) = self.deps.cache.set(ctx, &key, &CachePartition::none(), &subject) {
                reporter.import_skipped(&import_id, &err);
                continue;
            }
            import_ids.push(import_id);
        }
        Ok(ImportResult {
            import_ids,
        })
    }

    /// Reads every policy result; stops at the first error or miss.
    fn read_cached_results(
        &self,
        ctx: &RequestContext,
        config: &ExportConfiguration,
    ) -> Result<CachedResults, HubError> {
        let mut results = Vec::with_capacity(config.policies.len());
        for policy in config.policies.keys() {
            ctx.check()?;
            let key = CacheKey::for_policy(&config.export_name, policy);
            match self.deps.cache.get(ctx, &key, &CachePartition::none()) {
                Ok(bytes) => results.push((policy.clone(), bytes)),
                Err(err) if err.is(ErrorKind::NotFound) => {
                    return Ok(CachedResults::Miss);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(CachedResults::Complete(results))
    }

    /// Invokes the evaluator for every policy of the export.
    ///
    /// Each failure is recorded here, naming the policy when one is involved.
    fn trigger_export(
        &self,
        ctx: &RequestContext,
        config: &ExportConfiguration,
        reporter: &Reporter<'_>,
    ) -> Result<(), HubError> {
        reporter.record(HubEventParams::new(
            "export_triggered",
            EventLevel::Info,
            Operation::Export,
            "export triggered",
        ));
        for (policy, input) in &config.policies {
            ctx.check().inspect_err(|err| reporter.failed("export trigger aborted", err))?;
            let key = CacheKey::for_policy(&config.export_name, policy);
            self.deps
                .evaluator
                .evaluate(ctx, policy, input, &key, config.cache_ttl)
                .inspect_err(|err| {
                    reporter.policy_failed("error triggering policy evaluation", policy, err);
                })?;
        }
        Ok(())
    }
}

/// Decodes a cached policy result, which must be a JSON object.
fn decode_policy_result(bytes: &[u8]) -> Result<Map<String, Value>, HubError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(HubError::unknown("error creating export: policy result is not a JSON object")),
        Err(err) => Err(HubError::wrap("error creating export", &err)),
    }
}

/// Serializes a credential subject for caching.
fn encode_subject(subject: &Map<String, Value>) -> Result<Vec<u8>, HubError> {
    serde_json::to_vec(subject)
        .map_err(|err| HubError::internal(format!("error encoding subject to json: {err}")))
}

// ============================================================================
// SECTION: Event Reporting
// ============================================================================

/// Builds events sharing the request and export of one operation.
struct Reporter<'a> {
    /// Destination sink.
    sink: &'a dyn HubEventSink,
    /// Request identifier.
    request_id: Option<String>,
    /// Operation in progress.
    operation: Operation,
    /// Export name once known.
    export_name: Option<String>,
}

impl<'a> Reporter<'a> {
    /// Creates a reporter for one operation of one request.
    fn new(sink: &'a dyn HubEventSink, ctx: &RequestContext, operation: Operation) -> Self {
        Self {
            sink,
            request_id: ctx.request_id().map(str::to_string),
            operation,
            export_name: None,
        }
    }

    /// Attaches the export name to subsequent events.
    fn with_export(mut self, export_name: &str) -> Self {
        self.export_name = Some(export_name.to_string());
        self
    }

    /// Records an event with the shared fields filled in.
    fn record(&self, mut params: HubEventParams) {
        params.request_id.clone_from(&self.request_id);
        params.export_name.clone_from(&self.export_name);
        self.sink.record(&HubEvent::new(params));
    }

    /// Records an operation failure.
    fn failed(&self, message: &str, err: &HubError) {
        let mut params = HubEventParams::new(
            failure_event(self.operation),
            EventLevel::Error,
            self.operation,
            message,
        );
        params.error = Some(err.clone());
        self.record(params);
    }

    /// Records a failure concerning one policy.
    fn policy_failed(&self, message: &str, policy: &PolicyName, err: &HubError) {
        let mut params = HubEventParams::new(
            failure_event(self.operation),
            EventLevel::Error,
            self.operation,
            message,
        );
        params.policy = Some(policy.as_str().to_string());
        params.error = Some(err.clone());
        self.record(params);
    }

    /// Records a credential skipped after a failed cache write.
    fn import_skipped(&self, import_id: &ImportId, err: &HubError) {
        let mut params = HubEventParams::new(
            "import_item_skipped",
            EventLevel::Warn,
            Operation::Import,
            "error saving imported data to cache",
        );
        params.import_id = Some(import_id.as_str().to_string());
        params.error = Some(err.clone());
        self.record(params);
    }
}

/// Returns the failure event identifier of an operation.
const fn failure_event(operation: Operation) -> &'static str {
    match operation {
        Operation::Export => "export_failed",
        Operation::Import => "import_failed",
    }
}
