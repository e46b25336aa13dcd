// crates/infohub-clients/src/credential.rs
// ============================================================================
// Module: JSON-LD Credential Parser
// Description: Structural parser for W3C verifiable presentations.
// Purpose: Expose embedded credentials without re-checking proofs.
// Dependencies: infohub-core, serde_json
// ============================================================================

//! ## Overview
//! Proofs are verified by the signer before parsing, so this parser only
//! validates document structure: a JSON object whose `@context` starts with
//! the W3C credentials context and whose `type` includes
//! `VerifiablePresentation`. Credentials are returned in document order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use infohub_core::Credential;
use infohub_core::CredentialParser;
use infohub_core::HubError;
use infohub_core::Presentation;
use infohub_core::RequestContext;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Base context every presentation must declare first.
pub const CREDENTIALS_V1_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";
/// Presentation type marker.
pub const PRESENTATION_TYPE: &str = "VerifiablePresentation";
/// Maximum accepted presentation size in bytes.
pub const MAX_PRESENTATION_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Parser for JSON-LD verifiable presentations.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLdCredentialParser;

impl JsonLdCredentialParser {
    /// Creates a parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parses presentation bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HubError`] with kind `BadRequest` when the document is not a
    /// structurally valid presentation.
    pub fn parse(&self, raw: &[u8]) -> Result<Presentation, HubError> {
        if raw.len() > MAX_PRESENTATION_BYTES {
            return Err(HubError::bad_request("presentation exceeds size limit"));
        }
        let document: Value = serde_json::from_slice(raw)
            .map_err(|err| HubError::bad_request(format!("decode presentation: {err}")))?;
        let Value::Object(document) = document else {
            return Err(HubError::bad_request("presentation must be a JSON object"));
        };
        validate_context(&document)?;
        validate_type(&document)?;
        let credentials = match document.get("verifiableCredential") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().map(to_credential).collect(),
            Some(item @ (Value::Object(_) | Value::String(_))) => vec![to_credential(item)],
            Some(_) => {
                return Err(HubError::bad_request(
                    "verifiableCredential must be an object, string, or array",
                ));
            }
        };
        Ok(Presentation::new(credentials))
    }
}

impl CredentialParser for JsonLdCredentialParser {
    fn parse_presentation(
        &self,
        ctx: &RequestContext,
        raw: &[u8],
    ) -> Result<Presentation, HubError> {
        ctx.check()?;
        self.parse(raw)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Checks that `@context` leads with the credentials context.
fn validate_context(document: &Map<String, Value>) -> Result<(), HubError> {
    let first = match document.get("@context") {
        Some(Value::String(context)) => Some(context.as_str()),
        Some(Value::Array(contexts)) => contexts.first().and_then(Value::as_str),
        _ => None,
    };
    match first {
        Some(CREDENTIALS_V1_CONTEXT) => Ok(()),
        Some(other) => Err(HubError::bad_request(format!(
            "@context must start with {CREDENTIALS_V1_CONTEXT}, found {other}"
        ))),
        None => Err(HubError::bad_request("presentation is missing @context")),
    }
}

/// Checks that `type` names a verifiable presentation.
fn validate_type(document: &Map<String, Value>) -> Result<(), HubError> {
    let found = match document.get("type") {
        Some(Value::String(kind)) => kind == PRESENTATION_TYPE,
        Some(Value::Array(kinds)) => kinds.iter().any(|kind| kind.as_str() == Some(PRESENTATION_TYPE)),
        _ => false,
    };
    if found {
        Ok(())
    } else {
        Err(HubError::bad_request(format!("presentation type must include {PRESENTATION_TYPE}")))
    }
}

/// Classifies one credential entry.
fn to_credential(value: &Value) -> Credential {
    match value {
        Value::Object(claims) => Credential::Embedded(claims.clone()),
        Value::String(compact) => Credential::Compact(compact.clone()),
        other => Credential::Other(other.clone()),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use infohub_core::Credential;
    use infohub_core::ErrorKind;
    use infohub_core::Subject;
    use serde_json::Value;
    use serde_json::json;

    use super::JsonLdCredentialParser;

    fn parse(value: &Value) -> Result<infohub_core::Presentation, infohub_core::HubError> {
        JsonLdCredentialParser::new().parse(&serde_json::to_vec(value).unwrap())
    }

    fn presentation(credentials: Value) -> Value {
        json!({
            "@context": ["https://www.w3.org/2018/credentials/v1", "https://schema.org"],
            "type": ["VerifiablePresentation"],
            "verifiableCredential": credentials,
        })
    }

    #[test]
    fn credentials_keep_document_order_and_shape() {
        let parsed = parse(&presentation(json!([
            {"credentialSubject": {"id": "a"}},
            "eyJhbGciOiJFUzI1NiJ9.e30.sig",
            42
        ])))
        .unwrap();

        assert_eq!(parsed.credentials.len(), 3);
        assert!(matches!(
            parsed.credentials[0].subject(),
            Some(Subject::Object(subject)) if subject["id"] == "a"
        ));
        assert!(matches!(parsed.credentials[1], Credential::Compact(_)));
        assert_eq!(parsed.credentials[2], Credential::Other(json!(42)));
    }

    #[test]
    fn single_embedded_credential_is_accepted() {
        let parsed = parse(&presentation(json!({"credentialSubject": {"id": "a"}}))).unwrap();
        assert_eq!(parsed.credentials.len(), 1);
    }

    #[test]
    fn missing_credentials_yield_empty_presentation() {
        let parsed = parse(&json!({
            "@context": "https://www.w3.org/2018/credentials/v1",
            "type": "VerifiablePresentation"
        }))
        .unwrap();
        assert!(parsed.credentials.is_empty());
    }

    #[test]
    fn wrong_leading_context_is_rejected() {
        let err = parse(&json!({
            "@context": ["https://schema.org", "https://www.w3.org/2018/credentials/v1"],
            "type": "VerifiablePresentation"
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn missing_presentation_type_is_rejected() {
        let err = parse(&json!({
            "@context": "https://www.w3.org/2018/credentials/v1",
            "type": ["VerifiableCredential"]
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn non_json_input_is_rejected() {
        let err = JsonLdCredentialParser::new().parse(b"not-a-valid-signed-object").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn scalar_credential_field_is_rejected() {
        let err = parse(&presentation(json!(7))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }
}
