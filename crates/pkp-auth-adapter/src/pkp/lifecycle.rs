/*
[INPUT]:  Wallet signer and requested permission scopes
[OUTPUT]: Confirmed PkpInfo with verified on-chain scopes
[POS]:    PKP layer - mint and scope verification lifecycle
[UPDATE]: When the mint flow or scope verification changes
*/

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::keccak256;
use chrono::Utc;
use tracing::{debug, info};

use crate::http::{NetworkClient, PkpAuthError, Result};
use crate::session::build_mint_statement;
use crate::signer::{WalletSigner, normalize_signature, verify_signature_address};
use crate::types::{
    AccountKind, AuthMethod, AuthMethodType, MintPkpRequest, PermissionScope, PkpInfo,
};

/// ECDSA secp256k1 key type id used by the key-management contract
const KEY_TYPE_ECDSA: u32 = 2;

/// Highest scope id read back during verification
const MAX_SCOPE_ID: u8 = 3;

/// Wait for chain-state propagation before re-reading scopes
const DEFAULT_CONFIRMATION_DELAY: Duration = Duration::from_millis(500);

/// Mints PKPs bound to a wallet auth method and verifies the attached
/// permission scopes took effect on chain.
///
/// Mint is a one-time registration event per user; callers must check for
/// an existing PkpInfo before calling `mint_pkp`.
pub struct PkpLifecycleManager {
    network: Arc<NetworkClient>,
    confirmation_delay: Duration,
}

impl PkpLifecycleManager {
    pub fn new(network: Arc<NetworkClient>) -> Self {
        Self {
            network,
            confirmation_delay: DEFAULT_CONFIRMATION_DELAY,
        }
    }

    /// Override the scope-confirmation delay (tests)
    pub fn with_confirmation_delay(mut self, delay: Duration) -> Self {
        self.confirmation_delay = delay;
        self
    }

    /// Mint a new PKP bound to the signer's wallet auth method, attaching
    /// `scopes` at mint time so no separate grant transaction is needed.
    pub async fn mint_pkp(
        &self,
        signer: &dyn WalletSigner,
        scopes: &[PermissionScope],
    ) -> Result<PkpInfo> {
        // Precondition checks surface specific error kinds before any
        // signature prompt or network call.
        match signer.kind() {
            AccountKind::Eoa => {}
            AccountKind::Sca => {
                return Err(PkpAuthError::AccountTypeUnsupported(
                    "smart-contract accounts cannot register a wallet auth method directly; \
                     mint through the account's owner key"
                        .to_string(),
                ));
            }
        }
        if signer.address().is_empty() {
            return Err(PkpAuthError::SignerNotReady(
                "signer has no address".to_string(),
            ));
        }

        let scopes = if scopes.is_empty() {
            PermissionScope::defaults()
        } else {
            scopes.to_vec()
        };

        let auth_method = self.build_auth_method(signer).await?;
        let auth_method_id = derive_auth_method_id(signer.address());

        // The signed registration statement rides along as the wallet's
        // consent proof; a mint request without it must be refused upstream.
        let request = MintPkpRequest {
            key_type: KEY_TYPE_ECDSA,
            permitted_auth_method_types: vec![auth_method.auth_method_type.into()],
            permitted_auth_method_ids: vec![auth_method_id.clone()],
            permitted_auth_method_pubkeys: vec!["0x".to_string()],
            permitted_auth_method_scopes: vec![
                scopes.iter().map(PermissionScope::scope_id).collect(),
            ],
            auth_methods: vec![auth_method],
        };

        let status = self.network.relay_mint_pkp(&request).await?;
        let info = PkpInfo {
            token_id: status.pkp_token_id.ok_or_else(|| {
                PkpAuthError::InvalidResponse("mint succeeded without a token id".to_string())
            })?,
            public_key: status.pkp_public_key.ok_or_else(|| {
                PkpAuthError::InvalidResponse("mint succeeded without a public key".to_string())
            })?,
            eth_address: status.pkp_eth_address.ok_or_else(|| {
                PkpAuthError::InvalidResponse("mint succeeded without an eth address".to_string())
            })?,
        };
        info!(token_id = %info.token_id, eth_address = %info.eth_address, "PKP minted");

        // Relays can acknowledge before state propagation; re-read the
        // scopes and refuse to hand out a PKP whose grants are not visible.
        tokio::time::sleep(self.confirmation_delay).await;
        self.verify_scopes(&info, &auth_method_id, &scopes).await?;

        Ok(info)
    }

    /// Build the one-time registration proof: a freshly timestamped
    /// statement signed by the wallet, with full integrity checks.
    async fn build_auth_method(&self, signer: &dyn WalletSigner) -> Result<AuthMethod> {
        let statement = build_mint_statement(Utc::now());
        let raw = signer.sign_message(&statement).await?;
        let sig = normalize_signature(&raw)?;
        verify_signature_address(&statement, &sig, signer.address())?;

        let access_token = serde_json::to_string(&serde_json::json!({
            "sig": sig,
            "derivedVia": "web3.eth.personal.sign",
            "signedMessage": statement,
            "address": signer.address(),
        }))?;

        Ok(AuthMethod {
            auth_method_type: AuthMethodType::EthWallet,
            access_token,
        })
    }

    async fn verify_scopes(
        &self,
        info: &PkpInfo,
        auth_method_id: &str,
        requested: &[PermissionScope],
    ) -> Result<()> {
        let on_chain = self
            .network
            .permitted_scopes(
                &info.token_id,
                AuthMethodType::EthWallet.into(),
                auth_method_id,
                MAX_SCOPE_ID,
            )
            .await?;
        debug!(token_id = %info.token_id, scopes = ?on_chain, "scope state read back");

        let missing = requested.iter().any(|scope| {
            !on_chain
                .get(scope.scope_id() as usize)
                .copied()
                .unwrap_or(false)
        });
        if missing {
            return Err(PkpAuthError::ScopeNotPersisted {
                token_id: info.token_id.clone(),
            });
        }
        Ok(())
    }
}

/// Canonical auth method id for a wallet: keccak256 over the checksummed
/// address with the protocol suffix.
pub fn derive_auth_method_id(address: &str) -> String {
    let digest = keccak256(format!("{address}:pkp-auth").as_bytes());
    format!("0x{}", hex::encode(digest.as_slice()))
}
