/*
[INPUT]:  Account kind plus configured key material or smart-account client
[OUTPUT]: Capability-bearing wallet signer
[POS]:    Signer layer - resolves the dual EOA/SCA path for the engine
[UPDATE]: When adding new account kinds or signer sources
*/

use std::sync::Arc;

use crate::http::{PkpAuthError, Result};
use crate::signer::{EoaSigner, ScaSigner, SmartAccount, WalletSigner};
use crate::types::AccountKind;

/// Produces a signer for either wallet type.
///
/// EOA key material and the smart-account client are attached by the host
/// application at startup; `resolve` fails with `SignerNotReady` when the
/// requested kind has nothing attached.
#[derive(Default)]
pub struct SignerProvider {
    eoa_private_key: Option<String>,
    smart_account: Option<Arc<dyn SmartAccount>>,
}

impl SignerProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach raw EOA key material (test/dev paths and the application's
    /// own capacity-owner wallet).
    pub fn with_eoa_key(mut self, private_key_hex: impl Into<String>) -> Self {
        self.eoa_private_key = Some(private_key_hex.into());
        self
    }

    /// Attach an already-initialized smart-account client
    pub fn with_smart_account(mut self, account: Arc<dyn SmartAccount>) -> Self {
        self.smart_account = Some(account);
        self
    }

    /// Resolve a signer for the given account kind
    pub fn resolve(&self, kind: AccountKind) -> Result<Arc<dyn WalletSigner>> {
        match kind {
            AccountKind::Eoa => {
                let key = self.eoa_private_key.as_deref().ok_or_else(|| {
                    PkpAuthError::SignerNotReady(
                        "no EOA key material configured".to_string(),
                    )
                })?;
                Ok(Arc::new(EoaSigner::new(key)?))
            }
            AccountKind::Sca => {
                let account = self.smart_account.clone().ok_or_else(|| {
                    PkpAuthError::SignerNotReady(
                        "smart-account client is not initialized".to_string(),
                    )
                })?;
                Ok(Arc::new(ScaSigner::new(account)))
            }
        }
    }
}
