/*
[INPUT]:  Chain RPC url and the permissions contract address
[OUTPUT]: Recent blockhash nonce material and on-chain scope state
[POS]:    HTTP layer - read-only JSON-RPC surface
[UPDATE]: When the permissions contract ABI or nonce source changes
*/

use std::str::FromStr;

use alloy_primitives::{U256, keccak256};
use tracing::debug;

use crate::http::{NetworkClient, PkpAuthError, Result};
use crate::types::{BlockHeader, JsonRpcRequest, JsonRpcResponse};

const SCOPES_FN_SIGNATURE: &str = "getPermittedAuthMethodScopes(uint256,uint256,bytes,uint256)";

impl NetworkClient {
    /// Fetch the latest blockhash for nonce material.
    ///
    /// eth_getBlockByNumber("latest", false)
    pub async fn latest_blockhash(&self) -> Result<String> {
        let request = JsonRpcRequest::new(
            "eth_getBlockByNumber",
            serde_json::json!(["latest", false]),
        );
        let response: JsonRpcResponse<BlockHeader> = self
            .send_json(self.http().post(&self.config().rpc_url).json(&request))
            .await?;

        let block = unwrap_rpc(response)?;
        if block.hash.is_empty() {
            return Err(PkpAuthError::InvalidResponse(
                "RPC returned a block without a hash".to_string(),
            ));
        }
        debug!(blockhash = %block.hash, "fetched nonce material");
        Ok(block.hash)
    }

    /// Read the permitted scopes for an auth method from the on-chain
    /// permissions contract.
    ///
    /// eth_call getPermittedAuthMethodScopes(tokenId, authMethodType, id, maxScopeId)
    /// Returns the scope bitmap indexed by scope id.
    pub async fn permitted_scopes(
        &self,
        token_id: &str,
        auth_method_type: u32,
        auth_method_id: &str,
        max_scope_id: u8,
    ) -> Result<Vec<bool>> {
        let calldata = encode_scopes_call(token_id, auth_method_type, auth_method_id, max_scope_id)?;
        let request = JsonRpcRequest::new(
            "eth_call",
            serde_json::json!([
                {
                    "to": self.config().permissions_contract,
                    "data": calldata,
                },
                "latest"
            ]),
        );
        let response: JsonRpcResponse<String> = self
            .send_json(self.http().post(&self.config().rpc_url).json(&request))
            .await?;

        decode_bool_array(&unwrap_rpc(response)?)
    }
}

fn unwrap_rpc<T>(response: JsonRpcResponse<T>) -> Result<T> {
    if let Some(error) = response.error {
        return Err(PkpAuthError::Api {
            status: 200,
            message: format!("RPC error {}: {}", error.code, error.message),
        });
    }
    response
        .result
        .ok_or_else(|| PkpAuthError::InvalidResponse("RPC response has no result".to_string()))
}

/// ABI-encode the scope read. The only dynamic argument is the auth method
/// id bytes, placed after the four head words.
fn encode_scopes_call(
    token_id: &str,
    auth_method_type: u32,
    auth_method_id: &str,
    max_scope_id: u8,
) -> Result<String> {
    let token = U256::from_str(token_id)
        .map_err(|e| PkpAuthError::Config(format!("invalid PKP token id {token_id}: {e}")))?;
    let id_bytes = hex::decode(auth_method_id.trim_start_matches("0x"))
        .map_err(|e| PkpAuthError::Config(format!("invalid auth method id: {e}")))?;

    let selector = &keccak256(SCOPES_FN_SIGNATURE.as_bytes())[..4];

    let mut data = Vec::with_capacity(4 + 32 * 6 + id_bytes.len());
    data.extend_from_slice(selector);
    data.extend_from_slice(&token.to_be_bytes::<32>());
    data.extend_from_slice(&U256::from(auth_method_type).to_be_bytes::<32>());
    // offset of the bytes argument relative to the start of the head
    data.extend_from_slice(&U256::from(128u64).to_be_bytes::<32>());
    data.extend_from_slice(&U256::from(max_scope_id as u64).to_be_bytes::<32>());
    data.extend_from_slice(&U256::from(id_bytes.len() as u64).to_be_bytes::<32>());
    data.extend_from_slice(&id_bytes);
    let padding = (32 - id_bytes.len() % 32) % 32;
    data.extend(std::iter::repeat(0u8).take(padding));

    Ok(format!("0x{}", hex::encode(data)))
}

/// Decode an ABI-encoded `bool[]` return value
fn decode_bool_array(raw: &str) -> Result<Vec<bool>> {
    let bytes = hex::decode(raw.trim_start_matches("0x"))
        .map_err(|e| PkpAuthError::InvalidResponse(format!("eth_call result is not hex: {e}")))?;

    let word = |index: usize| -> Result<u64> {
        let start = index * 32;
        let end = start + 32;
        if bytes.len() < end {
            return Err(PkpAuthError::InvalidResponse(
                "eth_call result truncated".to_string(),
            ));
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&bytes[end - 8..end]);
        Ok(u64::from_be_bytes(buf))
    };

    let offset = word(0)? as usize;
    if offset != 32 {
        return Err(PkpAuthError::InvalidResponse(format!(
            "unexpected bool[] offset {offset}"
        )));
    }
    let len = word(1)? as usize;
    let mut scopes = Vec::with_capacity(len);
    for i in 0..len {
        scopes.push(word(2 + i)? != 0);
    }
    Ok(scopes)
}
