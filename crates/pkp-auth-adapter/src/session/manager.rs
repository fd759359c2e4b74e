/*
[INPUT]:  Wallet signer, PKP public key and resource-ability requests
[OUTPUT]: Cached or freshly authenticated session signature bundles
[POS]:    Session layer - the protocol core of the auth engine
[UPDATE]: When the session authentication algorithm changes
*/

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::http::{NetworkClient, PkpAuthError, Result};
use crate::session::cache::SessionStore;
use crate::session::challenge::{ChallengeParams, build_signin_challenge};
use crate::signer::{WalletSigner, normalize_signature, verify_signature_address};
use crate::types::{
    AuthSig, CapacityDelegationAuthSig, ResourceAbilityRequest, SessionSigs,
    SignSessionKeyRequest,
};

/// Session lifetime requested from the network
pub const SESSION_TTL_HOURS: i64 = 24;

const DERIVED_VIA: &str = "web3.eth.personal.sign";

/// Application-level challenge parameters
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub domain: String,
    pub uri: String,
    pub statement: String,
    pub chain_id: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            domain: "localhost".to_string(),
            uri: "https://localhost/session".to_string(),
            statement: "Authorize a delegated signing session".to_string(),
            chain_id: 1,
        }
    }
}

/// Parameters handed to the auth callback. Validated before any signature
/// is requested from the wallet.
#[derive(Debug, Clone)]
pub struct AuthCallbackContext {
    pub uri: String,
    pub expiration: String,
    pub resources: Vec<ResourceAbilityRequest>,
}

impl AuthCallbackContext {
    pub fn validate(&self) -> Result<()> {
        if self.uri.is_empty() {
            return Err(PkpAuthError::InvalidAuthParams(
                "auth callback requires a uri".to_string(),
            ));
        }
        if self.expiration.is_empty() {
            return Err(PkpAuthError::InvalidAuthParams(
                "auth callback requires an expiration".to_string(),
            ));
        }
        if self.resources.is_empty() {
            return Err(PkpAuthError::InvalidAuthParams(
                "auth callback requires at least one resource-ability request".to_string(),
            ));
        }
        Ok(())
    }
}

/// Session Signature Manager: builds the sign-in challenge, drives the auth
/// callback, validates the produced signature and caches the result keyed
/// by PKP.
pub struct SessionManager {
    network: Arc<NetworkClient>,
    config: SessionConfig,
    store: SessionStore,
    /// Serializes authentication rounds: concurrent cache misses await the
    /// winner instead of prompting the wallet twice.
    auth_gate: tokio::sync::Mutex<()>,
}

impl SessionManager {
    pub fn new(network: Arc<NetworkClient>, config: SessionConfig) -> Self {
        Self {
            network,
            config,
            store: SessionStore::new(),
            auth_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Get session signatures for a PKP, reusing the cache when fresh.
    ///
    /// Integrity failures (address mismatch, malformed signature) propagate
    /// as hard errors; network failures are retryable after `reconnect()`.
    pub async fn get_session_sigs(
        &self,
        signer: &dyn WalletSigner,
        pkp_public_key: &str,
        resources: &[ResourceAbilityRequest],
        capacity_delegation: Option<&CapacityDelegationAuthSig>,
    ) -> Result<SessionSigs> {
        if let Some(cached) = self.cached(pkp_public_key) {
            return Ok(cached);
        }

        let _gate = self.auth_gate.lock().await;
        // The winner of the gate may have refreshed the cache already
        if let Some(cached) = self.cached(pkp_public_key) {
            return Ok(cached);
        }

        let nonce = self.network.latest_blockhash().await?;
        let issued_at = Utc::now();
        let expiration = issued_at + Duration::hours(SESSION_TTL_HOURS);
        let challenge = build_signin_challenge(&ChallengeParams {
            domain: &self.config.domain,
            address: signer.address(),
            statement: &self.config.statement,
            uri: &self.config.uri,
            chain_id: self.config.chain_id,
            nonce: &nonce,
            issued_at,
            expiration,
            resources,
        })?;

        let context = AuthCallbackContext {
            uri: self.config.uri.clone(),
            expiration: expiration.to_rfc3339(),
            resources: resources.to_vec(),
        };
        let auth_sig = run_auth_callback(signer, &context, &challenge).await?;

        let request = SignSessionKeyRequest {
            pkp_public_key: pkp_public_key.to_string(),
            auth_sig,
            siwe_message: challenge,
            resource_ability_requests: resources.to_vec(),
            capacity_delegation_auth_sig: capacity_delegation.cloned(),
            expiration,
        };
        let session_sigs = self.network.sign_session_key(&request).await?;

        self.store.insert(pkp_public_key, session_sigs.clone());
        info!(
            pkp = %pkp_public_key,
            expiration = %session_sigs.expiration,
            "session authenticated"
        );
        Ok(session_sigs)
    }

    /// Idempotent fast path: a fresh, structurally intact cache entry is
    /// returned unchanged. Structurally broken entries are evicted so the
    /// slow path re-authenticates instead of serving garbage.
    fn cached(&self, pkp_public_key: &str) -> Option<SessionSigs> {
        let cached = self.store.fresh(pkp_public_key, Utc::now())?;
        if cached.is_structurally_valid() {
            debug!(pkp = %pkp_public_key, "session cache hit");
            Some(cached)
        } else {
            debug!(pkp = %pkp_public_key, "evicting structurally invalid cache entry");
            self.store.remove(pkp_public_key);
            None
        }
    }
}

/// Drive the auth callback: validate its inputs, sign the challenge, then
/// enforce the two integrity checks before anything reaches the network.
pub async fn run_auth_callback(
    signer: &dyn WalletSigner,
    context: &AuthCallbackContext,
    challenge: &str,
) -> Result<AuthSig> {
    context.validate()?;

    let raw = signer.sign_message(challenge).await?;
    let sig = normalize_signature(&raw)?;
    verify_signature_address(challenge, &sig, signer.address())?;

    Ok(AuthSig {
        sig,
        derived_via: DERIVED_VIA.to_string(),
        signed_message: challenge.to_string(),
        address: signer.address().to_string(),
    })
}
