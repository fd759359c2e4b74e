/*
[INPUT]:  Rate-limit config and delegation parameters
[OUTPUT]: Capacity token ids and signed delegation authorizations
[POS]:    Capacity layer - rate-limited credit minting and delegation
[UPDATE]: When the capacity credential model changes
*/

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use crate::http::{NetworkClient, PkpAuthError, Result};
use crate::session::build_delegation_message;
use crate::signer::{WalletSigner, normalize_signature, verify_signature_address};
use crate::types::{CapacityDelegationAuthSig, DelegateCapacityParams, RateLimitConfig};

/// Delegation authorizations expire after this window
const DELEGATION_TTL_HOURS: i64 = 24;

/// Mints rate-limit capacity credits and delegates bounded usage of them.
///
/// Delegation is always signed by the application's own signer (the
/// capacity owner), never by the end user.
pub struct CapacityManager {
    network: Arc<NetworkClient>,
}

impl CapacityManager {
    pub fn new(network: Arc<NetworkClient>) -> Self {
        Self { network }
    }

    /// Mint a capacity credit bounded by `config`. The config is validated
    /// before any network call.
    pub async fn mint_capacity_credits(&self, config: &RateLimitConfig) -> Result<String> {
        config.validate()?;
        let capacity_token_id = self.network.relay_mint_capacity(config).await?;
        info!(capacity_token_id = %capacity_token_id, "capacity credit minted");
        Ok(capacity_token_id)
    }

    /// Produce a delegation authorization scoping the credit to a delegatee
    /// set, a maximum use count and a 24-hour expiration. Consumed by the
    /// session manager so signing draws against the shared credential.
    pub async fn delegate_capacity(
        &self,
        owner_signer: &dyn WalletSigner,
        params: &DelegateCapacityParams,
    ) -> Result<CapacityDelegationAuthSig> {
        let delegatees = resolve_delegatees(params)?;

        let expiration = Utc::now() + Duration::hours(DELEGATION_TTL_HOURS);
        let message = build_delegation_message(
            &params.capacity_token_id,
            &delegatees,
            params.uses,
            expiration,
        );

        let raw = owner_signer.sign_message(&message).await?;
        let sig = normalize_signature(&raw)?;
        verify_signature_address(&message, &sig, owner_signer.address())?;

        info!(
            capacity_token_id = %params.capacity_token_id,
            delegatees = delegatees.len(),
            uses = params.uses,
            "capacity delegated"
        );
        Ok(CapacityDelegationAuthSig {
            sig,
            derived_via: "web3.eth.personal.sign".to_string(),
            signed_message: message,
            address: owner_signer.address().to_string(),
        })
    }
}

/// Delegatees come from the explicit list or fall back to a single PKP's
/// address; an empty result is rejected before anything is signed.
fn resolve_delegatees(params: &DelegateCapacityParams) -> Result<Vec<String>> {
    if !params.delegatee_addresses.is_empty() {
        return Ok(params.delegatee_addresses.clone());
    }
    if let Some(pkp) = &params.pkp_info {
        if !pkp.eth_address.is_empty() {
            return Ok(vec![pkp.eth_address.clone()]);
        }
    }
    Err(PkpAuthError::NoDelegatees)
}
