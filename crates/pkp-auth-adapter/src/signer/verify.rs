/*
[INPUT]:  Raw wallet signatures and the messages they cover
[OUTPUT]: Normalized signature hex and recovered signer addresses
[POS]:    Signer layer - cryptographic integrity checks for auth flows
[UPDATE]: When changing signature format or recovery semantics
*/

use std::str::FromStr;

use alloy_primitives::Signature;

use crate::http::{PkpAuthError, Result};

/// `0x` + 65 signature bytes as hex
const SIGNATURE_HEX_LEN: usize = 132;

/// Normalize a wallet signature to `0x` + exactly 130 hex characters.
///
/// Rejects missing prefixes, non-hex payloads and wrong lengths. A
/// signature that fails here must never reach address recovery.
pub fn normalize_signature(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| {
            PkpAuthError::MalformedSignature("missing 0x prefix".to_string())
        })?;

    if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(PkpAuthError::MalformedSignature(
            "signature contains non-hex characters".to_string(),
        ));
    }

    let normalized = format!("0x{}", body.to_ascii_lowercase());
    if normalized.len() != SIGNATURE_HEX_LEN {
        return Err(PkpAuthError::MalformedSignature(format!(
            "expected {} hex characters including prefix, got {}",
            SIGNATURE_HEX_LEN,
            normalized.len()
        )));
    }

    Ok(normalized)
}

/// Recover the checksummed signer address from an EIP-191 signature over
/// `message`.
pub fn recover_address(message: &str, signature_hex: &str) -> Result<String> {
    let signature = Signature::from_str(signature_hex).map_err(|e| {
        PkpAuthError::MalformedSignature(format!("cannot parse signature: {e}"))
    })?;

    let address = signature
        .recover_address_from_msg(message.as_bytes())
        .map_err(|e| {
            PkpAuthError::MalformedSignature(format!("recovery failed: {e}"))
        })?;

    Ok(address.to_checksum(None))
}

/// Verify that a signature over `message` recovers to `expected_address`
/// (case-insensitive). This is the single most important integrity check in
/// the engine; a mismatch is fatal and never retried.
pub fn verify_signature_address(
    message: &str,
    signature_hex: &str,
    expected_address: &str,
) -> Result<()> {
    let recovered = recover_address(message, signature_hex)?;
    if recovered.eq_ignore_ascii_case(expected_address) {
        Ok(())
    } else {
        Err(PkpAuthError::SignatureAddressMismatch {
            expected: expected_address.to_string(),
            recovered,
        })
    }
}
