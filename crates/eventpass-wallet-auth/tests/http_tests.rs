/*
[INPUT]:  Mock HTTP responses in wrapped and unwrapped shapes
[OUTPUT]: Test results for the backend client and challenge parsing
[POS]:    Integration tests - HTTP endpoints
[UPDATE]: When HTTP endpoints or response shapes change
*/

mod common;

use std::time::Duration;

use common::{WALLET_ADDRESS, harness, setup_mock_server, wallet};
use eventpass_wallet_auth::{
    AuthChallenge, AuthError, BackendClient, BackendError, ClientConfig, Endpoints, NonceMethod,
    ProviderKind, http::normalize_response, parse_challenge,
};
use rstest::rstest;
use serde_json::{Value, json};
use tokio_test::assert_ok;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn expected_challenge() -> AuthChallenge {
    AuthChallenge {
        message: "Sign in to EventPass".to_string(),
        nonce: "n-42".to_string(),
        issued_at_unix_seconds: 1_760_000_000,
    }
}

#[rstest]
#[case::unwrapped(json!({ "message": "Sign in to EventPass", "nonce": "n-42", "timestamp": 1_760_000_000 }))]
#[case::wrapped(json!({ "success": true, "data": { "message": "Sign in to EventPass", "nonce": "n-42", "timestamp": 1_760_000_000 } }))]
#[case::split_envelope(json!({ "success": true, "issuedAt": "1760000000", "data": { "message": "Sign in to EventPass", "nonce": "n-42" } }))]
#[case::millis(json!({ "data": { "message": "Sign in to EventPass", "nonce": "n-42", "timestamp": 1_760_000_000_000_i64 } }))]
#[case::issued_at_field(json!({ "message": "Sign in to EventPass", "nonce": "n-42", "issuedAtUnixSeconds": 1_760_000_000 }))]
#[tokio::test]
async fn test_challenge_shapes_yield_same_fields(#[case] body: Value) {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/nonce"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let h = harness(&server, ProviderKind::Petra, wallet());
    let challenge = assert_ok!(h.orchestrator.request_challenge(WALLET_ADDRESS).await);
    assert_eq!(challenge, expected_challenge());
}

#[rstest]
#[case(json!({ "nonce": "n-42", "timestamp": 1 }), "message")]
#[case(json!({ "message": "m", "timestamp": 1 }), "nonce")]
#[case(json!({ "success": true, "data": { "message": "m", "nonce": "n" } }), "timestamp")]
#[case(json!({ "success": true, "message": "Nonce generated successfully", "data": { "nonce": "n", "timestamp": 1 } }), "message")]
fn test_incomplete_challenges(#[case] body: Value, #[case] field: &str) {
    let body = assert_ok!(normalize_response(body));
    let err = parse_challenge(&body).unwrap_err();
    assert!(err.to_string().contains(field), "{err}");
}

#[tokio::test]
async fn test_status_text_is_never_signed_as_challenge() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/nonce"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Nonce generated successfully",
            "data": { "nonce": "n-1", "timestamp": 1_760_000_000 },
        })))
        .mount(&server)
        .await;

    let h = harness(&server, ProviderKind::Petra, wallet());
    let err = h.orchestrator.request_challenge(WALLET_ADDRESS).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidChallengeResponse(_)), "{err:?}");
}

#[tokio::test]
async fn test_base_url_with_path_prefix() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/backend/api/auth/nonce"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "message": "Sign in to EventPass", "nonce": "n-42", "timestamp": 1_760_000_000 },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = assert_ok!(BackendClient::new(&format!("{}/backend", server.uri())));
    let body = assert_ok!(client.request_nonce(WALLET_ADDRESS).await);
    assert_eq!(assert_ok!(parse_challenge(&body)), expected_challenge());
}

#[tokio::test]
async fn test_unsuccessful_envelope_is_challenge_error() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/nonce"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "error": "address not allowed" })),
        )
        .mount(&server)
        .await;

    let h = harness(&server, ProviderKind::Petra, wallet());
    let err = h.orchestrator.request_challenge(WALLET_ADDRESS).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidChallengeResponse(_)));
}

#[tokio::test]
async fn test_get_nonce_endpoint() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/v2/nonce"))
        .and(query_param("address", WALLET_ADDRESS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Sign in to EventPass",
            "nonce": 42,
            "timestamp": 1_760_000_000,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig {
        endpoints: Endpoints {
            nonce: "/v2/nonce".to_string(),
            nonce_method: NonceMethod::Get,
            ..Endpoints::default()
        },
        ..ClientConfig::default()
    };
    let client = assert_ok!(BackendClient::with_config(config, &server.uri()));

    let body = assert_ok!(client.request_nonce(WALLET_ADDRESS).await);
    let challenge = assert_ok!(parse_challenge(&body));
    assert_eq!(challenge.nonce, "42");
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/nonce"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let config = ClientConfig {
        timeout: Duration::from_millis(50),
        ..ClientConfig::default()
    };
    let client = assert_ok!(BackendClient::with_config(config, &server.uri()));

    let err = client.request_nonce(WALLET_ADDRESS).await.unwrap_err();
    assert!(err.is_timeout());
    assert!(err.is_retryable());
}

#[test]
fn test_invalid_base_url() {
    let err = BackendClient::new("not a url").unwrap_err();
    assert!(matches!(err, BackendError::UrlParse(_)));
}
