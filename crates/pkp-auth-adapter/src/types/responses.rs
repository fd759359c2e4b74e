/*
[INPUT]:  JSON payloads returned by node, relay and chain-RPC surfaces
[OUTPUT]: Typed response structs with serde deserialization
[POS]:    Data layer - inbound wire shapes
[UPDATE]: When node or relay endpoints change their response schema
*/

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Node handshake acknowledgement
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeResponse {
    pub server_public_key: String,
    #[serde(default)]
    pub node_version: Option<String>,
}

/// Per-node session-key signature plus the aggregate auth signature fields
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignSessionKeyResponse {
    pub signature: String,
    pub derived_via: String,
    pub signed_message: String,
    pub address: String,
    pub expiration: DateTime<Utc>,
}

/// Threshold-assembled signature returned by a node once quorum is reached
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PkpSignResponse {
    pub signature: String,
}

/// Relay accepted a mint transaction for asynchronous processing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayMintResponse {
    pub request_id: String,
}

/// Relay mint status values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RelayMintStatus {
    InProgress,
    Succeeded,
    Failed,
}

/// Polled mint status; PKP fields are present once status is `Succeeded`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayStatusResponse {
    pub status: RelayMintStatus,
    #[serde(default)]
    pub pkp_token_id: Option<String>,
    #[serde(default)]
    pub pkp_public_key: Option<String>,
    #[serde(default)]
    pub pkp_eth_address: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Relay capacity-credit mint result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintCapacityResponse {
    pub capacity_token_id: String,
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse<T> {
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    #[serde(default = "Option::default")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// Subset of an EVM block used for nonce material
#[derive(Debug, Clone, Deserialize)]
pub struct BlockHeader {
    pub hash: String,
}
