/*
[INPUT]:  Protocol schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - account kinds, abilities and permission scopes
[UPDATE]: When the node protocol adds auth method types or abilities
*/

use serde::{Deserialize, Serialize};

/// Kind of blockchain account backing a signer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Externally owned account (raw private key)
    Eoa,
    /// Smart-contract account (account-abstraction wallet)
    Sca,
}

/// Auth method types recognized by the key-management network.
///
/// Serialized as the numeric type id the network expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum AuthMethodType {
    EthWallet,
}

impl From<AuthMethodType> for u32 {
    fn from(value: AuthMethodType) -> Self {
        match value {
            AuthMethodType::EthWallet => 1,
        }
    }
}

impl TryFrom<u32> for AuthMethodType {
    type Error = String;

    fn try_from(value: u32) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(AuthMethodType::EthWallet),
            other => Err(format!("unknown auth method type id: {other}")),
        }
    }
}

/// Capability requested against a PKP-scoped resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ability {
    #[serde(rename = "pkp-signing")]
    PkpSigning,
    #[serde(rename = "action-execution")]
    ActionExecution,
}

/// Permission scopes attached to an auth method at mint time.
///
/// Scope ids match the on-chain permissions contract layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionScope {
    SignAnything,
    PersonalSign,
}

impl PermissionScope {
    /// On-chain scope id (index into the permitted-scopes bitmap)
    pub fn scope_id(&self) -> u8 {
        match self {
            PermissionScope::SignAnything => 1,
            PermissionScope::PersonalSign => 2,
        }
    }

    /// Minimum scope set attached when the caller does not ask for more
    pub fn defaults() -> Vec<PermissionScope> {
        vec![PermissionScope::SignAnything, PermissionScope::PersonalSign]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_method_type_roundtrip() {
        let json = serde_json::to_string(&AuthMethodType::EthWallet).unwrap();
        assert_eq!(json, "1");
        let back: AuthMethodType = serde_json::from_str("1").unwrap();
        assert_eq!(back, AuthMethodType::EthWallet);
        assert!(serde_json::from_str::<AuthMethodType>("99").is_err());
    }

    #[test]
    fn test_ability_wire_names() {
        assert_eq!(
            serde_json::to_string(&Ability::PkpSigning).unwrap(),
            "\"pkp-signing\""
        );
        assert_eq!(
            serde_json::to_string(&Ability::ActionExecution).unwrap(),
            "\"action-execution\""
        );
    }

    #[test]
    fn test_scope_ids() {
        assert_eq!(PermissionScope::SignAnything.scope_id(), 1);
        assert_eq!(PermissionScope::PersonalSign.scope_id(), 2);
        assert_eq!(PermissionScope::defaults().len(), 2);
    }
}
