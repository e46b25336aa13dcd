// crates/infohub-clients/tests/policy_client.rs
// ============================================================================
// Module: Policy Client Tests
// Description: Wire-level checks for policy evaluation requests.
// Purpose: Verify paths, headers, and status handling against a live socket.
// Dependencies: infohub-clients, infohub-core, tiny_http
// ============================================================================

//! ## Overview
//! Each test starts a one-shot HTTP server, drives [`PolicyClient`] against
//! it, and inspects the captured request.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    reason = "Test-only panic-based assertions are permitted."
)]

mod common;

use infohub_clients::HEADER_CACHE_TTL;
use infohub_clients::HEADER_EVALUATION_ID;
use infohub_clients::HttpClientConfig;
use infohub_clients::PolicyClient;
use infohub_core::CacheKey;
use infohub_core::ErrorKind;
use infohub_core::ExportName;
use infohub_core::PolicyEvaluator;
use infohub_core::PolicyName;
use infohub_core::RequestContext;
use serde_json::Value;
use serde_json::json;

use crate::common::OneShot;
use crate::common::Reply;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn evaluation_posts_input_with_key_and_ttl() {
    let server = OneShot::start(Reply::new(200, r#"{"allow":true}"#));
    let client = PolicyClient::new(&server.config()).unwrap();
    let policy = PolicyName::new("example/examplePolicy/1.0");
    let key = CacheKey::for_policy(&ExportName::new("testexport"), &policy);

    let result = client
        .evaluate(&RequestContext::background(), &policy, &json!({"hello": "world"}), &key, Some(60))
        .unwrap();

    assert_eq!(result, br#"{"allow":true}"#.to_vec());
    let request = server.request().unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.url, "/policy/example/examplePolicy/1.0/evaluation");
    assert_eq!(request.header(HEADER_EVALUATION_ID), Some(key.as_str()));
    assert_eq!(request.header(HEADER_CACHE_TTL), Some("60"));
    let body: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body, json!({"hello": "world"}));
}

#[test]
fn ttl_header_is_omitted_when_unset() {
    let server = OneShot::start(Reply::new(200, "{}"));
    let client = PolicyClient::new(&server.config()).unwrap();

    client
        .evaluate(
            &RequestContext::background(),
            &PolicyName::new("a/b/1"),
            &json!({}),
            &CacheKey::new("k"),
            None,
        )
        .unwrap();

    let request = server.request().unwrap();
    assert_eq!(request.header(HEADER_CACHE_TTL), None);
}

#[test]
fn non_ok_status_is_unknown_error() {
    let server = OneShot::start(Reply::new(500, "boom"));
    let client = PolicyClient::new(&server.config()).unwrap();

    let err = client
        .evaluate(
            &RequestContext::background(),
            &PolicyName::new("a/b/1"),
            &json!({}),
            &CacheKey::new("k"),
            None,
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unknown);
    assert!(err.message().starts_with("unexpected response on policy evaluation: 500"));
}

#[test]
fn canceled_context_sends_nothing() {
    let server = OneShot::start(Reply::new(200, "{}"));
    let client = PolicyClient::new(&server.config()).unwrap();
    let ctx = RequestContext::background();
    ctx.cancel_token().cancel();

    let err = client
        .evaluate(&ctx, &PolicyName::new("a/b/1"), &json!({}), &CacheKey::new("k"), None)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Canceled);
    assert!(server.untouched());
}

#[test]
fn non_http_address_is_rejected() {
    let err = PolicyClient::new(&HttpClientConfig::new("ftp://policy")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);
}

#[test]
fn unreachable_service_is_unavailable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = PolicyClient::new(&HttpClientConfig::new(format!("http://{addr}"))).unwrap();

    let err = client
        .evaluate(
            &RequestContext::background(),
            &PolicyName::new("a/b/1"),
            &json!({}),
            &CacheKey::new("k"),
            None,
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
}
