/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for pkp-auth-adapter tests
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use pkp_auth_adapter::{
    AccountKind, EoaSigner, NetworkConfig, Result, WalletSigner,
};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Well-known dev key: the end user's EOA
pub const USER_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const USER_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// Second well-known dev key: the application's capacity-owner wallet
pub const APP_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const APP_ADDRESS: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Network config pointing every surface at the mock server, with the
/// given node path prefixes as bootstrap nodes.
pub fn test_config(server: &MockServer, node_prefixes: &[&str], min_nodes: usize) -> NetworkConfig {
    NetworkConfig {
        bootstrap_urls: node_prefixes
            .iter()
            .map(|prefix| format!("{}{}", server.uri(), prefix))
            .collect(),
        relay_url: format!("{}/relay", server.uri()),
        rpc_url: format!("{}/rpc", server.uri()),
        min_node_count: min_nodes,
        connect_timeout: Duration::from_secs(5),
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

/// Mount a successful handshake for a node prefix
pub async fn mount_handshake(server: &MockServer, node_prefix: &str) {
    Mock::given(method("POST"))
        .and(path(format!("{node_prefix}/web/handshake")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "serverPublicKey": "0x04server",
            "nodeVersion": "1.0.0",
        })))
        .mount(server)
        .await;
}

/// Mount a session-key signature for a node prefix
pub async fn mount_sign_session_key(server: &MockServer, node_prefix: &str, signature: &str) {
    let expiration = Utc::now() + chrono::Duration::hours(24);
    mount_sign_session_key_expiring(server, node_prefix, signature, expiration).await;
}

/// Mount a session-key signature with an explicit stated expiration
pub async fn mount_sign_session_key_expiring(
    server: &MockServer,
    node_prefix: &str,
    signature: &str,
    expiration: chrono::DateTime<Utc>,
) {
    Mock::given(method("POST"))
        .and(path(format!("{node_prefix}/web/sign-session-key")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "signature": signature,
            "derivedVia": "node.session.sig",
            "signedMessage": "session-key-challenge",
            "address": USER_ADDRESS,
            "expiration": expiration.to_rfc3339(),
        })))
        .mount(server)
        .await;
}

/// Mount a threshold-assembled PKP signature for a node prefix
pub async fn mount_pkp_sign(server: &MockServer, node_prefix: &str, signature: &str) {
    Mock::given(method("POST"))
        .and(path(format!("{node_prefix}/web/pkp/sign")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "signature": signature,
        })))
        .mount(server)
        .await;
}

/// Mount the chain-RPC blockhash read
pub async fn mount_blockhash(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(serde_json::json!({
            "method": "eth_getBlockByNumber",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": { "hash": "0x1b4dd7f1047e12ac1ba1bcfbc7bc0377c27b0e3d973b19f4b8aecf53bd6ab030" },
        })))
        .mount(server)
        .await;
}

/// Mount an eth_call scope read returning the given scope bitmap
pub async fn mount_scope_read(server: &MockServer, scopes: &[bool]) {
    Mock::given(method("POST"))
        .and(path("/rpc"))
        .and(body_partial_json(serde_json::json!({ "method": "eth_call" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": abi_bool_array(scopes),
        })))
        .mount(server)
        .await;
}

/// Mount a full successful relay mint: accept + confirmed status
pub async fn mount_relay_mint_pkp(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/relay/mint-next-and-add-auth-methods"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "requestId": "mint-req-1",
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/relay/auth/status/mint-req-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "Succeeded",
            "pkpTokenId": "42",
            "pkpPublicKey": "0x04abcd",
            "pkpEthAddress": "0xBBB0000000000000000000000000000000000000",
        })))
        .mount(server)
        .await;
}

/// Mount the relay capacity-credit mint
pub async fn mount_relay_mint_capacity(server: &MockServer, capacity_token_id: &str) {
    Mock::given(method("POST"))
        .and(path("/relay/mint-capacity-credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "capacityTokenId": capacity_token_id,
        })))
        .mount(server)
        .await;
}

/// ABI-encode a bool[] the way eth_call returns it
pub fn abi_bool_array(values: &[bool]) -> String {
    let mut out = String::from("0x");
    out.push_str(&format!("{:064x}", 32));
    out.push_str(&format!("{:064x}", values.len()));
    for value in values {
        out.push_str(&format!("{:064x}", u64::from(*value)));
    }
    out
}

/// EOA signer wrapper counting how many signatures it produces
pub struct CountingSigner {
    inner: EoaSigner,
    calls: Arc<AtomicUsize>,
}

impl CountingSigner {
    pub fn new(private_key_hex: &str) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner: EoaSigner::new(private_key_hex).unwrap(),
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl WalletSigner for CountingSigner {
    fn kind(&self) -> AccountKind {
        self.inner.kind()
    }

    fn address(&self) -> &str {
        self.inner.address()
    }

    async fn sign_message(&self, message: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.sign_message(message).await
    }
}
