/*
[INPUT]:  Engine state and challenge material
[OUTPUT]: Typed request bodies for node, relay and chain-RPC surfaces
[POS]:    Data layer - outbound wire shapes
[UPDATE]: When node or relay endpoints change their request schema
*/

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::models::{AuthMethod, AuthSig, CapacityDelegationAuthSig, ResourceAbilityRequest};

/// Handshake challenge posted to each bootstrap node
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeRequest {
    pub challenge: String,
}

/// Session-key signing request fanned out to every connected node
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignSessionKeyRequest {
    pub pkp_public_key: String,
    pub auth_sig: AuthSig,
    pub siwe_message: String,
    pub resource_ability_requests: Vec<ResourceAbilityRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_delegation_auth_sig: Option<CapacityDelegationAuthSig>,
    pub expiration: DateTime<Utc>,
}

/// PKP signing request sent to a node with that node's session signature
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PkpSignRequest {
    /// Hex-encoded 32-byte message hash
    pub to_sign: String,
    pub pkp_public_key: String,
    /// The session signature issued by the receiving node
    pub session_sig: String,
    pub auth_sig: AuthSig,
}

/// Relay mint request: mints the next PKP and attaches the given auth
/// methods with their permission scopes in the same transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintPkpRequest {
    pub key_type: u32,
    /// Signed wallet-consent proofs, one per permitted auth method
    pub auth_methods: Vec<AuthMethod>,
    pub permitted_auth_method_types: Vec<u32>,
    pub permitted_auth_method_ids: Vec<String>,
    pub permitted_auth_method_pubkeys: Vec<String>,
    /// One scope-id list per auth method
    pub permitted_auth_method_scopes: Vec<Vec<u8>>,
}

/// PKP signing request authorized by auth method proofs instead of session
/// signatures (used by PKP-backed wallets to bootstrap a session)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PkpSignWithAuthMethodRequest {
    /// Hex-encoded 32-byte message hash
    pub to_sign: String,
    pub pkp_public_key: String,
    pub auth_methods: Vec<AuthMethod>,
}

/// Generic JSON-RPC 2.0 request envelope for read-only chain calls
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: serde_json::Value,
}

impl JsonRpcRequest {
    pub fn new(method: &'static str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        }
    }
}
