// crates/infohub-core/src/core/presentation.rs
// ============================================================================
// Module: Info Hub Presentations
// Description: Logical presentation and credential model.
// Purpose: Give the import pipeline a parser-independent view of credentials.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The credential parser turns raw bytes into a [`Presentation`]. The core only
//! interprets the `credentialSubject` field of embedded credentials; every
//! other field is carried opaquely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Field holding the disclosed claims of a credential.
pub const CREDENTIAL_SUBJECT_FIELD: &str = "credentialSubject";

// ============================================================================
// SECTION: Presentation
// ============================================================================

/// Parsed presentation exposing its embedded credentials.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    /// Credentials in document order.
    pub credentials: Vec<Credential>,
}

impl Presentation {
    /// Creates a presentation from credentials.
    #[must_use]
    pub const fn new(credentials: Vec<Credential>) -> Self {
        Self {
            credentials,
        }
    }
}

/// One credential embedded in a presentation.
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    /// JSON object credential (generic claim container).
    Embedded(Map<String, Value>),
    /// Compact serialized credential such as a JWT.
    Compact(String),
    /// Any other JSON value.
    Other(Value),
}

impl Credential {
    /// Returns the claim container when the credential is an embedded object.
    #[must_use]
    pub const fn as_claims(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Embedded(claims) => Some(claims),
            Self::Compact(_) | Self::Other(_) => None,
        }
    }

    /// Classifies the `credentialSubject` field.
    ///
    /// Returns `None` when the credential is not a claim container.
    #[must_use]
    pub fn subject(&self) -> Option<Subject<'_>> {
        self.as_claims().map(credential_subject)
    }
}

/// Classification of a credential subject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Subject<'a> {
    /// Subject field missing or null.
    Missing,
    /// Subject present but not a JSON object.
    NotAnObject,
    /// Subject mapping.
    Object(&'a Map<String, Value>),
}

/// Reads the subject of a claim container.
#[must_use]
pub fn credential_subject(claims: &Map<String, Value>) -> Subject<'_> {
    match claims.get(CREDENTIAL_SUBJECT_FIELD) {
        None | Some(Value::Null) => Subject::Missing,
        Some(Value::Object(subject)) => Subject::Object(subject),
        Some(_) => Subject::NotAnObject,
    }
}

// ============================================================================
// SECTION: Signer Request
// ============================================================================

/// Input to the presentation signer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationRequest {
    /// Issuer identifier.
    pub issuer: String,
    /// Signing key namespace.
    pub namespace: String,
    /// Signing key name.
    pub key: String,
    /// Claim objects to embed.
    pub data: Vec<Map<String, Value>>,
}
