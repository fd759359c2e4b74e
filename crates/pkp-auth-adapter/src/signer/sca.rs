/*
[INPUT]:  Initialized smart-account client from the account-abstraction layer
[OUTPUT]: Signed messages and the smart-contract account address
[POS]:    Signer layer - smart-contract account implementation
[UPDATE]: When the account-abstraction seam changes
*/

use std::sync::Arc;

use async_trait::async_trait;

use crate::http::Result;
use crate::signer::WalletSigner;
use crate::types::AccountKind;

/// Seam to the external account-abstraction layer.
///
/// The wallet-connection handshake itself lives outside this engine; by the
/// time an `SmartAccount` reaches us it must already be initialized.
///
/// Session authentication validates signatures by ECDSA address recovery,
/// which ERC-1271 contract signatures cannot satisfy. Smart-account users
/// authenticate sessions through a [`PkpSigner`](crate::signer::PkpSigner)
/// instead; an `SmartAccount` passed to session flows directly must return
/// EIP-191 signatures that recover to `address()` (an owner-key signer).
#[async_trait]
pub trait SmartAccount: Send + Sync {
    /// Counterfactual or deployed account address
    fn address(&self) -> &str;

    /// Sign a message through the smart account's validation scheme
    async fn sign_message(&self, message: &str) -> Result<String>;
}

/// Signer backed by a smart-contract account
pub struct ScaSigner {
    account: Arc<dyn SmartAccount>,
    address: String,
}

impl ScaSigner {
    pub fn new(account: Arc<dyn SmartAccount>) -> Self {
        let address = account.address().to_string();
        Self { account, address }
    }
}

#[async_trait]
impl WalletSigner for ScaSigner {
    fn kind(&self) -> AccountKind {
        AccountKind::Sca
    }

    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_message(&self, message: &str) -> Result<String> {
        self.account.sign_message(message).await
    }
}
