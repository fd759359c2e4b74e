/*
[INPUT]:  Protocol schema definitions and serde requirements
[OUTPUT]: Typed data model for the auth engine
[POS]:    Data layer - type definitions shared by all components
[UPDATE]: When the node protocol or engine data model changes
*/

pub mod enums;
pub mod models;
pub mod requests;
pub mod responses;

pub use enums::{Ability, AccountKind, AuthMethodType, PermissionScope};
pub use models::{
    AuthMethod, AuthSig, CapacityDelegationAuthSig, DelegateCapacityParams, PkpInfo,
    RateLimitConfig, ResourceAbilityRequest, SessionSigs,
};
pub use requests::{
    HandshakeRequest, JsonRpcRequest, MintPkpRequest, PkpSignRequest,
    PkpSignWithAuthMethodRequest, SignSessionKeyRequest,
};
pub use responses::{
    BlockHeader, HandshakeResponse, JsonRpcError, JsonRpcResponse, MintCapacityResponse,
    PkpSignResponse, RelayMintResponse, RelayMintStatus, RelayStatusResponse,
    SignSessionKeyResponse,
};
