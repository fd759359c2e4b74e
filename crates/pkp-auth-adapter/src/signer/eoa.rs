/*
[INPUT]:  EOA private key (hex string)
[OUTPUT]: EIP-191 signed messages and the checksummed wallet address
[POS]:    Signer layer - externally owned account implementation
[UPDATE]: When signing logic or address formatting changes
*/

use std::str::FromStr;

use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;

use crate::http::{PkpAuthError, Result};
use crate::signer::WalletSigner;
use crate::types::AccountKind;

/// Signer backed by a raw private key (test/dev paths and server-side
/// application wallets).
pub struct EoaSigner {
    signer: PrivateKeySigner,
    address: String,
}

impl EoaSigner {
    /// Create a new EOA signer from a hex-encoded private key.
    ///
    /// Supports both "0x"-prefixed and non-prefixed hex strings.
    pub fn new(private_key_hex: &str) -> Result<Self> {
        let private_key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
        let signer = PrivateKeySigner::from_str(private_key_hex)
            .map_err(|e| PkpAuthError::Config(format!("Invalid EOA private key: {e}")))?;

        let address = signer.address().to_checksum(None);

        Ok(Self { signer, address })
    }
}

#[async_trait]
impl WalletSigner for EoaSigner {
    fn kind(&self) -> AccountKind {
        AccountKind::Eoa
    }

    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_message(&self, message: &str) -> Result<String> {
        let signature = self
            .signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| PkpAuthError::Config(format!("Failed to sign EOA message: {e}")))?;

        // alloy's Signature as_bytes() returns [r, s, v]
        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }
}
