/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for eventpass-wallet-auth tests

#![allow(dead_code)]

use std::sync::Arc;

use eventpass_wallet_auth::{
    BackendClient, Discovery, MemoryStore, MockWalletProvider, ProviderKind, ProviderRegistry,
    SessionStore, WalletAuthOrchestrator,
};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const WALLET_ADDRESS: &str = "0x8f3a1c2b4d5e6f708192a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e7f8";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Mock session token for testing
pub fn mock_token() -> String {
    "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.test.signature".to_string()
}

pub fn user_json(address: &str) -> Value {
    json!({
        "address": address,
        "displayName": "Alice",
        "email": "alice@example.com",
        "role": "attendee",
        "isVerified": false,
        "isEmailVerified": true,
    })
}

pub fn challenge_json() -> Value {
    json!({
        "message": "Sign in to EventPass",
        "nonce": "n-42",
        "timestamp": 1_760_000_000,
    })
}

/// Orchestrator wired to `server` with a single mock wallet of `kind`
pub struct Harness {
    pub orchestrator: WalletAuthOrchestrator,
    pub provider: Arc<MockWalletProvider>,
    pub kv: Arc<MemoryStore>,
}

pub fn harness(server: &MockServer, kind: ProviderKind, provider: MockWalletProvider) -> Harness {
    let provider = Arc::new(provider);
    let registry =
        ProviderRegistry::new().with_provider(kind, Discovery::Injected, provider.clone());
    let kv = Arc::new(MemoryStore::new());
    let client = BackendClient::new(&server.uri()).expect("mock server uri is valid");
    let orchestrator = WalletAuthOrchestrator::new(registry, client, SessionStore::new(kv.clone()));
    Harness {
        orchestrator,
        provider,
        kv,
    }
}

pub fn wallet() -> MockWalletProvider {
    MockWalletProvider::new(WALLET_ADDRESS, "0xsignature")
}

pub async fn mount_nonce(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/api/auth/nonce"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_login(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

pub fn session_json(address: &str) -> Value {
    json!({
        "success": true,
        "data": {
            "token": mock_token(),
            "user": user_json(address),
        }
    })
}
