/*
[INPUT]:  Wallet signers and permission scopes
[OUTPUT]: Minted PKPs with verified on-chain grants
[POS]:    PKP layer - programmable key pair lifecycle
[UPDATE]: When mint or scope semantics change
*/

pub mod lifecycle;

pub use lifecycle::{PkpLifecycleManager, derive_auth_method_id};
