/*
[INPUT]:  Account configuration and key material
[OUTPUT]: Wallet signers and signature integrity checks
[POS]:    Signer layer - dual-path EOA/SCA signer abstraction
[UPDATE]: When signer sources or signature validation change
*/

pub mod eoa;
pub mod pkp;
pub mod provider;
pub mod sca;
pub mod verify;
pub mod wallet;

pub use eoa::EoaSigner;
pub use pkp::PkpSigner;
pub use provider::SignerProvider;
pub use sca::{ScaSigner, SmartAccount};
pub use verify::{normalize_signature, recover_address, verify_signature_address};
pub use wallet::{MockWalletSigner, WalletSigner};
