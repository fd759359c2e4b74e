/*
[INPUT]:  Address, nonce material and resource-ability requests
[OUTPUT]: Sign-in challenge, mint statement and delegation message text
[POS]:    Session layer - challenge message construction
[UPDATE]: When the challenge format or resource encoding changes
*/

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};

use crate::http::Result;
use crate::types::ResourceAbilityRequest;

/// Inputs for a SIWE-style sign-in challenge
#[derive(Debug, Clone)]
pub struct ChallengeParams<'a> {
    pub domain: &'a str,
    pub address: &'a str,
    pub statement: &'a str,
    pub uri: &'a str,
    pub chain_id: u64,
    /// Blockhash-derived nonce material
    pub nonce: &'a str,
    pub issued_at: DateTime<Utc>,
    pub expiration: DateTime<Utc>,
    pub resources: &'a [ResourceAbilityRequest],
}

/// Build a structured, human-readable sign-in challenge. The serialized
/// resource-ability requests ride in a `urn:recap` resource line so the
/// network can verify the narrowest capability granted.
pub fn build_signin_challenge(params: &ChallengeParams<'_>) -> Result<String> {
    let recap = encode_resources(params.resources)?;
    Ok(format!(
        "{domain} wants you to sign in with your Ethereum account:\n\
         {address}\n\
         \n\
         {statement}\n\
         \n\
         URI: {uri}\n\
         Version: 1\n\
         Chain ID: {chain_id}\n\
         Nonce: {nonce}\n\
         Issued At: {issued_at}\n\
         Expiration Time: {expiration}\n\
         Resources:\n\
         - urn:recap:{recap}",
        domain = params.domain,
        address = params.address,
        statement = params.statement,
        uri = params.uri,
        chain_id = params.chain_id,
        nonce = params.nonce,
        issued_at = params.issued_at.to_rfc3339(),
        expiration = params.expiration.to_rfc3339(),
        recap = recap,
    ))
}

/// One-time registration statement signed at PKP mint time. Distinct from
/// the session challenge: minting is a registration event, not a session.
pub fn build_mint_statement(timestamp: DateTime<Utc>) -> String {
    format!("I am creating a key at {}", timestamp.to_rfc3339())
}

/// Delegation message signed by the capacity-credit owner, binding the
/// credit to a delegatee set, a use bound and an expiration.
pub fn build_delegation_message(
    capacity_token_id: &str,
    delegatees: &[String],
    uses: u64,
    expiration: DateTime<Utc>,
) -> String {
    format!(
        "I am delegating capacity credit {capacity_token_id} for {uses} uses \
         to: {delegatees}. Expiration Time: {expiration}",
        capacity_token_id = capacity_token_id,
        uses = uses,
        delegatees = delegatees.join(", "),
        expiration = expiration.to_rfc3339(),
    )
}

/// Base64url-encode the serialized resource-ability requests
pub fn encode_resources(resources: &[ResourceAbilityRequest]) -> Result<String> {
    let json = serde_json::to_vec(resources)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode a `urn:recap` payload back to resource-ability requests
pub fn decode_resources(recap: &str) -> Result<Vec<ResourceAbilityRequest>> {
    let bytes = URL_SAFE_NO_PAD.decode(recap).map_err(|e| {
        crate::http::PkpAuthError::InvalidResponse(format!("invalid recap payload: {e}"))
    })?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_resources() -> Vec<ResourceAbilityRequest> {
        vec![ResourceAbilityRequest::pkp_signing("*")]
    }

    #[test]
    fn test_signin_challenge_contains_required_fields() {
        let issued_at = Utc::now();
        let expiration = issued_at + Duration::hours(24);
        let resources = test_resources();
        let params = ChallengeParams {
            domain: "app.example",
            address: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            statement: "Authorize a delegated signing session",
            uri: "https://app.example/session",
            chain_id: 1,
            nonce: "0xdeadbeef",
            issued_at,
            expiration,
            resources: &resources,
        };

        let challenge = build_signin_challenge(&params).unwrap();
        assert!(challenge.contains("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"));
        assert!(challenge.contains("URI: https://app.example/session"));
        assert!(challenge.contains("Nonce: 0xdeadbeef"));
        assert!(challenge.contains(&format!("Expiration Time: {}", expiration.to_rfc3339())));
        assert!(challenge.contains("urn:recap:"));
    }

    #[test]
    fn test_resource_encoding_roundtrip() {
        let resources = test_resources();
        let encoded = encode_resources(&resources).unwrap();
        let decoded = decode_resources(&encoded).unwrap();
        assert_eq!(decoded, resources);
    }

    #[test]
    fn test_mint_statement_is_timestamped() {
        let now = Utc::now();
        let statement = build_mint_statement(now);
        assert!(statement.starts_with("I am creating a key at "));
        assert!(statement.contains(&now.to_rfc3339()));
    }

    #[test]
    fn test_delegation_message_binds_all_limits() {
        let expiration = Utc::now() + Duration::hours(24);
        let message = build_delegation_message(
            "7",
            &["0xBBB0000000000000000000000000000000000000".to_string()],
            5,
            expiration,
        );
        assert!(message.contains("capacity credit 7"));
        assert!(message.contains("for 5 uses"));
        assert!(message.contains("0xBBB0000000000000000000000000000000000000"));
        assert!(message.contains(&expiration.to_rfc3339()));
    }
}
