/*
[INPUT]:  Protocol schema and engine state definitions
[OUTPUT]: Core data model shared by all engine components
[POS]:    Data layer - PKP, auth signature and delegation models
[UPDATE]: When the node protocol changes signature or PKP payload shapes
*/

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{Ability, AuthMethodType};

/// A minted programmable key pair. Immutable once minted; the private half
/// never leaves the threshold network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PkpInfo {
    pub token_id: String,
    pub public_key: String,
    pub eth_address: String,
}

/// Transient proof material presented when registering or using a PKP.
/// Constructed fresh per attempt, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthMethod {
    pub auth_method_type: AuthMethodType,
    pub access_token: String,
}

/// A wallet-produced authentication signature over a challenge message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSig {
    pub sig: String,
    pub derived_via: String,
    pub signed_message: String,
    pub address: String,
}

impl AuthSig {
    /// Structural integrity check: every field a consumer relies on must be
    /// present. Does not re-verify the signature cryptographically.
    pub fn is_structurally_valid(&self) -> bool {
        !self.sig.is_empty() && !self.address.is_empty() && !self.signed_message.is_empty()
    }
}

/// Session signature bundle: one signature per network node plus the
/// aggregate auth signature and a stated expiration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSigs {
    /// node url -> node session signature
    pub signatures: BTreeMap<String, String>,
    pub auth_sig: AuthSig,
    pub expiration: DateTime<Utc>,
}

impl SessionSigs {
    pub fn is_structurally_valid(&self) -> bool {
        !self.signatures.is_empty() && self.auth_sig.is_structurally_valid()
    }
}

/// Delegation authorization produced by the capacity-credit owner
/// (the application's own signer, never the end user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityDelegationAuthSig {
    pub sig: String,
    pub derived_via: String,
    pub signed_message: String,
    pub address: String,
}

/// Narrowest capability granted to a session: a PKP-scoped resource plus
/// the ability requested against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAbilityRequest {
    pub resource: String,
    pub ability: Ability,
}

impl ResourceAbilityRequest {
    /// PKP signing over the given resource id (`*` for any)
    pub fn pkp_signing(resource_id: &str) -> Self {
        Self {
            resource: format!("pkp://{resource_id}"),
            ability: Ability::PkpSigning,
        }
    }

    pub fn action_execution(resource_id: &str) -> Self {
        Self {
            resource: format!("action://{resource_id}"),
            ability: Ability::ActionExecution,
        }
    }
}

/// Rate-limit configuration for minting a capacity credit.
///
/// At least one request-rate bound is required; the expiration is expressed
/// in whole days until UTC midnight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_per_second: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_per_day: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_per_kilosecond: Option<u64>,
    #[serde(rename = "daysUntilUTCMidnightExpiration")]
    pub days_until_utc_midnight_expiration: u32,
}

impl RateLimitConfig {
    /// Reject unusable configs before any network call is made
    pub fn validate(&self) -> crate::http::Result<()> {
        let has_rate = self.requests_per_second.is_some()
            || self.requests_per_day.is_some()
            || self.requests_per_kilosecond.is_some();
        if !has_rate {
            return Err(crate::http::PkpAuthError::InvalidRateLimitConfig(
                "at least one of requestsPerSecond, requestsPerDay or requestsPerKilosecond \
                 is required"
                    .to_string(),
            ));
        }
        if self.days_until_utc_midnight_expiration == 0 {
            return Err(crate::http::PkpAuthError::InvalidRateLimitConfig(
                "daysUntilUTCMidnightExpiration must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters for delegating bounded usage of a capacity credit
#[derive(Debug, Clone, Default)]
pub struct DelegateCapacityParams {
    /// Maximum number of times the network accepts this delegation
    pub uses: u64,
    pub capacity_token_id: String,
    /// Explicit delegatee addresses; may be empty when `pkp_info` is set
    pub delegatee_addresses: Vec<String>,
    /// Convenience: delegate to a single PKP's eth address
    pub pkp_info: Option<PkpInfo>,
}
