/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public PKP auth adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod capacity;
pub mod engine;
pub mod http;
pub mod orchestrator;
pub mod pkp;
pub mod session;
pub mod signer;
pub mod types;

// Re-export commonly used types from the engine
pub use engine::{AuthEngine, SessionState};

// Re-export commonly used types from http
pub use http::{
    Connection,
    NetworkClient,
    NetworkConfig,
    PkpAuthError,
    Result,
    SigningStage,
};

// Re-export commonly used types from signer
pub use signer::{
    EoaSigner,
    MockWalletSigner,
    PkpSigner,
    ScaSigner,
    SignerProvider,
    SmartAccount,
    WalletSigner,
};

// Re-export session, pkp and capacity managers
pub use capacity::CapacityManager;
pub use orchestrator::{DelegatedSigningOrchestrator, DelegatedSigningParams};
pub use pkp::PkpLifecycleManager;
pub use session::{SessionConfig, SessionManager, SessionStore};

// Re-export all types
pub use types::*;
