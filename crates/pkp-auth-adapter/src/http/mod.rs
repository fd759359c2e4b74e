/*
[INPUT]:  Network configuration and protocol endpoints
[OUTPUT]: HTTP responses and typed protocol results
[POS]:    HTTP layer - threshold network, relay and chain-RPC communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod relay;
pub mod rpc;
pub mod session;

pub use client::{Connection, NetworkClient, NetworkConfig};
pub use error::{PkpAuthError, Result, SigningStage};
