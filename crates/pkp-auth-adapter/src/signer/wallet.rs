/*
[INPUT]:  Message to sign and account key material
[OUTPUT]: Signature string and account address
[POS]:    Signer layer - wallet integration abstraction
[UPDATE]: When adding new account kinds or changing signature format
*/

use async_trait::async_trait;

use crate::http::Result;
use crate::types::AccountKind;

/// Trait for wallet signing operations.
///
/// Exactly one signer exists per logged-in user, created at login and
/// destroyed at logout. Callers never inspect wallet-specific internals;
/// this trait is the seam that keeps the rest of the engine wallet-agnostic.
/// The trait is async to support smart accounts and external signers.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Kind of account backing this signer
    fn kind(&self) -> AccountKind;

    /// Checksummed account address
    fn address(&self) -> &str;

    /// Sign a message and return the hex-encoded 65-byte signature (0x...)
    async fn sign_message(&self, message: &str) -> Result<String>;
}

/// Mock wallet signer returning a predetermined signature, for tests
#[derive(Debug, Clone)]
pub struct MockWalletSigner {
    kind: AccountKind,
    address: String,
    signature: String,
}

impl MockWalletSigner {
    pub fn new(kind: AccountKind, address: &str, signature: &str) -> Self {
        Self {
            kind,
            address: address.to_string(),
            signature: signature.to_string(),
        }
    }
}

#[async_trait]
impl WalletSigner for MockWalletSigner {
    fn kind(&self) -> AccountKind {
        self.kind
    }

    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_message(&self, _message: &str) -> Result<String> {
        Ok(self.signature.clone())
    }
}
