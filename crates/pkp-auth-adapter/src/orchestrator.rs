/*
[INPUT]:  Message bytes, PKP identity and capacity delegation bounds
[OUTPUT]: Threshold-assembled signature over the message hash
[POS]:    Orchestration layer - composes the delegated signing pipeline
[UPDATE]: When the pipeline stages or their ordering change
*/

use std::sync::Arc;

use alloy_primitives::keccak256;
use tracing::debug;

use crate::capacity::CapacityManager;
use crate::http::{NetworkClient, Result, SigningStage};
use crate::session::SessionManager;
use crate::signer::{WalletSigner, normalize_signature};
use crate::types::{DelegateCapacityParams, PkpInfo, ResourceAbilityRequest};

/// Parameters for one delegated signing operation
#[derive(Debug, Clone)]
pub struct DelegatedSigningParams {
    pub message: Vec<u8>,
    pub pkp_info: PkpInfo,
    pub capacity_token_id: String,
    pub max_uses: u64,
}

/// Composes connect, capacity delegation, session authentication and the
/// signing action into one usage-capped channel. Any stage's failure aborts
/// the whole chain as a single structured error; no partial results.
pub struct DelegatedSigningOrchestrator {
    network: Arc<NetworkClient>,
    session: Arc<SessionManager>,
    capacity: CapacityManager,
}

impl DelegatedSigningOrchestrator {
    pub fn new(
        network: Arc<NetworkClient>,
        session: Arc<SessionManager>,
        capacity: CapacityManager,
    ) -> Self {
        Self {
            network,
            session,
            capacity,
        }
    }

    /// Sign an arbitrary message through the delegated, usage-capped
    /// channel. `user_signer` authenticates the session; `owner_signer` is
    /// the application's capacity-owner wallet producing the delegation.
    pub async fn sign_with_delegation(
        &self,
        user_signer: &dyn WalletSigner,
        owner_signer: &dyn WalletSigner,
        params: &DelegatedSigningParams,
    ) -> Result<String> {
        self.network
            .connect()
            .await
            .map_err(|e| e.at_stage(SigningStage::Connect))?;

        let delegation = self
            .capacity
            .delegate_capacity(
                owner_signer,
                &DelegateCapacityParams {
                    uses: params.max_uses,
                    capacity_token_id: params.capacity_token_id.clone(),
                    delegatee_addresses: vec![],
                    pkp_info: Some(params.pkp_info.clone()),
                },
            )
            .await
            .map_err(|e| e.at_stage(SigningStage::Delegate))?;

        let resources = vec![ResourceAbilityRequest::pkp_signing("*")];
        let session_sigs = self
            .session
            .get_session_sigs(
                user_signer,
                &params.pkp_info.public_key,
                &resources,
                Some(&delegation),
            )
            .await
            .map_err(|e| e.at_stage(SigningStage::Session))?;

        let hash = keccak256(&params.message);
        let hash_hex = format!("0x{}", hex::encode(hash.as_slice()));
        debug!(hash = %hash_hex, pkp = %params.pkp_info.public_key, "executing signing action");

        let signature = self
            .network
            .pkp_sign(&params.pkp_info.public_key, &hash_hex, &session_sigs)
            .await
            .map_err(|e| e.at_stage(SigningStage::Execute))?;

        normalize_signature(&signature).map_err(|e| e.at_stage(SigningStage::Execute))
    }
}
