/*
[INPUT]:  PKP identity, an auth method proof and the network client
[OUTPUT]: EIP-191 signatures produced by the threshold network
[POS]:    Signer layer - PKP-backed wallet for smart-account sessions
[UPDATE]: When the auth-method signing surface changes
*/

use std::sync::Arc;

use alloy_primitives::eip191_hash_message;
use async_trait::async_trait;

use crate::http::{NetworkClient, Result};
use crate::signer::{WalletSigner, normalize_signature};
use crate::types::{AccountKind, AuthMethod, PkpInfo};

/// Wallet signer backed by a PKP: messages are EIP-191 hashed locally and
/// signed by the threshold network, authorized by an auth method proof.
///
/// This is the session signer for smart-account users. A smart account's
/// own ERC-1271 signatures cannot pass ECDSA address recovery, so the PKP
/// signs the session challenge instead; the resulting signature recovers to
/// the PKP's eth address, which is what `address()` reports.
pub struct PkpSigner {
    network: Arc<NetworkClient>,
    pkp: PkpInfo,
    auth_method: AuthMethod,
}

impl PkpSigner {
    pub fn new(network: Arc<NetworkClient>, pkp: PkpInfo, auth_method: AuthMethod) -> Self {
        Self {
            network,
            pkp,
            auth_method,
        }
    }

    pub fn pkp_info(&self) -> &PkpInfo {
        &self.pkp
    }
}

#[async_trait]
impl WalletSigner for PkpSigner {
    fn kind(&self) -> AccountKind {
        AccountKind::Sca
    }

    fn address(&self) -> &str {
        &self.pkp.eth_address
    }

    async fn sign_message(&self, message: &str) -> Result<String> {
        let hash = eip191_hash_message(message.as_bytes());
        let raw = self
            .network
            .pkp_sign_with_auth_method(
                &self.pkp.public_key,
                &format!("0x{}", hex::encode(hash)),
                &self.auth_method,
            )
            .await?;
        normalize_signature(&raw)
    }
}
