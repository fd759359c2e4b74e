/*
[INPUT]:  Network configuration, signer provider and caller requests
[OUTPUT]: One handle owning the session state machine and all managers
[POS]:    Engine layer - explicit per-user session state
[UPDATE]: When state transitions or the public engine surface change
*/

use std::sync::{Arc, RwLock};

use chrono::Utc;
use tracing::{info, warn};

use crate::capacity::CapacityManager;
use crate::http::{NetworkClient, NetworkConfig, PkpAuthError, Result};
use crate::orchestrator::{DelegatedSigningOrchestrator, DelegatedSigningParams};
use crate::pkp::PkpLifecycleManager;
use crate::session::{SessionConfig, SessionManager};
use crate::signer::{SignerProvider, WalletSigner};
use crate::types::{
    AccountKind, CapacityDelegationAuthSig, PermissionScope, PkpInfo, RateLimitConfig,
    ResourceAbilityRequest, SessionSigs,
};

/// Per-user session state machine.
///
/// `Unauthenticated -> SignerReady -> PkpResolved -> SessionAuthenticated`,
/// oscillating with `SessionExpired` as the cache ages out. `Broken` is
/// terminal and reached from any state on a non-retryable integrity error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    SignerReady,
    PkpResolved,
    SessionAuthenticated,
    SessionExpired,
    Broken,
}

/// Authentication engine: owns the signer, PKP identity, session cache and
/// the explicit state handle upstream callers observe. All state lives here
/// rather than in ambient module globals.
pub struct AuthEngine {
    provider: SignerProvider,
    network: Arc<NetworkClient>,
    session: Arc<SessionManager>,
    pkp: PkpLifecycleManager,
    capacity: CapacityManager,
    orchestrator: DelegatedSigningOrchestrator,
    state: RwLock<SessionState>,
    signer: RwLock<Option<Arc<dyn WalletSigner>>>,
    pkp_info: RwLock<Option<PkpInfo>>,
}

impl AuthEngine {
    pub fn new(
        network_config: NetworkConfig,
        session_config: SessionConfig,
        provider: SignerProvider,
    ) -> Result<Self> {
        let network = Arc::new(NetworkClient::with_config(network_config)?);
        let session = Arc::new(SessionManager::new(network.clone(), session_config));
        let orchestrator = DelegatedSigningOrchestrator::new(
            network.clone(),
            session.clone(),
            CapacityManager::new(network.clone()),
        );
        Ok(Self {
            provider,
            pkp: PkpLifecycleManager::new(network.clone()),
            capacity: CapacityManager::new(network.clone()),
            orchestrator,
            session,
            network,
            state: RwLock::new(SessionState::Unauthenticated),
            signer: RwLock::new(None),
            pkp_info: RwLock::new(None),
        })
    }

    pub fn network(&self) -> &Arc<NetworkClient> {
        &self.network
    }

    /// Current state. An authenticated session whose cache entry has aged
    /// past the safety margin reports `SessionExpired`.
    pub fn state(&self) -> SessionState {
        let state = *self.state.read().unwrap();
        if state == SessionState::SessionAuthenticated {
            let pkp_key = self
                .pkp_info
                .read()
                .unwrap()
                .as_ref()
                .map(|info| info.public_key.clone());
            if let Some(key) = pkp_key {
                if !self.session.store().has_fresh(&key, Utc::now()) {
                    return SessionState::SessionExpired;
                }
            }
        }
        state
    }

    /// Resolve and hold a signer for the user. The signer lives until
    /// logout.
    pub fn login(&self, kind: AccountKind) -> Result<()> {
        self.ensure_not_broken()?;
        let signer = self.provider.resolve(kind)?;
        info!(kind = ?kind, address = %signer.address(), "signer ready");
        *self.signer.write().unwrap() = Some(signer);
        *self.state.write().unwrap() = SessionState::SignerReady;
        Ok(())
    }

    /// Adopt a PKP already known from a previous run (reload path)
    pub fn set_pkp(&self, info: PkpInfo) {
        *self.pkp_info.write().unwrap() = Some(info);
        let mut state = self.state.write().unwrap();
        if *state == SessionState::SignerReady {
            *state = SessionState::PkpResolved;
        }
    }

    pub fn pkp_info(&self) -> Option<PkpInfo> {
        self.pkp_info.read().unwrap().clone()
    }

    /// Return the user's PKP, minting one if absent. The "has PKP" check
    /// lives inside the engine so a mint can never be raced twice for the
    /// same user.
    pub async fn resolve_pkp(&self, scopes: &[PermissionScope]) -> Result<PkpInfo> {
        self.ensure_not_broken()?;
        if let Some(existing) = self.pkp_info() {
            return Ok(existing);
        }

        let signer = self.current_signer()?;
        let info = match self.pkp.mint_pkp(signer.as_ref(), scopes).await {
            Ok(info) => info,
            Err(e) => return Err(self.note_failure(e)),
        };

        *self.pkp_info.write().unwrap() = Some(info.clone());
        *self.state.write().unwrap() = SessionState::PkpResolved;
        Ok(info)
    }

    /// Authenticate a session for the resolved PKP (idempotent while the
    /// cache is fresh).
    pub async fn authenticate(
        &self,
        resources: &[ResourceAbilityRequest],
        capacity_delegation: Option<&CapacityDelegationAuthSig>,
    ) -> Result<SessionSigs> {
        self.ensure_not_broken()?;
        let signer = self.current_signer()?;
        let pkp = self.pkp_info().ok_or_else(|| {
            PkpAuthError::Config("no PKP resolved for this user".to_string())
        })?;

        let sigs = match self
            .session
            .get_session_sigs(
                signer.as_ref(),
                &pkp.public_key,
                resources,
                capacity_delegation,
            )
            .await
        {
            Ok(sigs) => sigs,
            Err(e) => return Err(self.note_failure(e)),
        };

        *self.state.write().unwrap() = SessionState::SessionAuthenticated;
        Ok(sigs)
    }

    /// Mint a capacity credit owned by the application wallet
    pub async fn mint_capacity_credits(&self, config: &RateLimitConfig) -> Result<String> {
        self.capacity.mint_capacity_credits(config).await
    }

    /// Delegate capacity from the application's owner signer
    pub async fn delegate_capacity(
        &self,
        owner_signer: &dyn WalletSigner,
        params: &crate::types::DelegateCapacityParams,
    ) -> Result<CapacityDelegationAuthSig> {
        self.capacity.delegate_capacity(owner_signer, params).await
    }

    /// Sign a message through the delegated, usage-capped channel
    pub async fn sign_with_delegation(
        &self,
        owner_signer: &dyn WalletSigner,
        params: &DelegatedSigningParams,
    ) -> Result<String> {
        self.ensure_not_broken()?;
        let signer = self.current_signer()?;
        match self
            .orchestrator
            .sign_with_delegation(signer.as_ref(), owner_signer, params)
            .await
        {
            Ok(signature) => {
                *self.state.write().unwrap() = SessionState::SessionAuthenticated;
                Ok(signature)
            }
            Err(e) => Err(self.note_failure(e)),
        }
    }

    /// Destroy the signer and all cached session material
    pub fn logout(&self) {
        *self.signer.write().unwrap() = None;
        *self.pkp_info.write().unwrap() = None;
        self.session.store().clear();
        *self.state.write().unwrap() = SessionState::Unauthenticated;
    }

    fn current_signer(&self) -> Result<Arc<dyn WalletSigner>> {
        self.signer.read().unwrap().clone().ok_or_else(|| {
            PkpAuthError::SignerNotReady("no signer: call login first".to_string())
        })
    }

    fn ensure_not_broken(&self) -> Result<()> {
        if *self.state.read().unwrap() == SessionState::Broken {
            return Err(PkpAuthError::Config(
                "engine is in a broken state after a fatal integrity error".to_string(),
            ));
        }
        Ok(())
    }

    /// Fatal integrity errors move the machine to its terminal state;
    /// everything else leaves the state unchanged for a caller retry.
    fn note_failure(&self, error: PkpAuthError) -> PkpAuthError {
        if error.is_fatal() {
            warn!(error = %error, "fatal integrity error, engine broken");
            *self.state.write().unwrap() = SessionState::Broken;
        }
        error
    }
}
