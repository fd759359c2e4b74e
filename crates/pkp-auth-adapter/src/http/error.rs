/*
[INPUT]:  Error sources (HTTP, node protocol, signing, validation)
[OUTPUT]: Structured error types with retry/fatality classification
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or changing propagation policy
*/

use std::fmt;

use thiserror::Error;

/// Stage of the delegated signing pipeline, used to report where a
/// composed operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningStage {
    Connect,
    Delegate,
    Session,
    Execute,
}

impl fmt::Display for SigningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SigningStage::Connect => "connect",
            SigningStage::Delegate => "delegate",
            SigningStage::Session => "session",
            SigningStage::Execute => "execute",
        };
        f.write_str(name)
    }
}

/// Main error type for the PKP auth adapter
#[derive(Error, Debug)]
pub enum PkpAuthError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A node, relay or RPC endpoint returned an error response
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// No usable signer for the requested account kind
    #[error("Signer not ready: {0}")]
    SignerNotReady(String),

    /// Account kind cannot perform the requested operation
    #[error("Unsupported account type: {0}")]
    AccountTypeUnsupported(String),

    /// Node quorum could not be reached
    #[error("Threshold network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Connection or request deadline elapsed
    #[error("Connection timeout after {duration}s")]
    Timeout { duration: u64 },

    /// Auth callback received incomplete parameters
    #[error("Invalid auth params: {0}")]
    InvalidAuthParams(String),

    /// Produced signature does not recover to the claimed address.
    /// Fatal: indicates a broken signer or a tampered flow.
    #[error("Signature recovered to {recovered}, expected {expected}")]
    SignatureAddressMismatch { expected: String, recovered: String },

    /// Signature failed hex/length normalization. Fatal.
    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    /// Requested permission scopes are not visible on chain after mint. Fatal.
    #[error("Permission scopes not persisted for PKP token {token_id}")]
    ScopeNotPersisted { token_id: String },

    /// Rate limit configuration rejected before any network call
    #[error("Invalid rate limit config: {0}")]
    InvalidRateLimitConfig(String),

    /// Capacity delegation requested with an empty delegatee set
    #[error("Capacity delegation requires at least one delegatee")]
    NoDelegatees,

    /// A stage of the delegated signing pipeline failed
    #[error("Delegated signing failed at {stage} stage: {cause}")]
    DelegatedSigning {
        stage: SigningStage,
        cause: Box<PkpAuthError>,
    },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Response is syntactically valid but semantically unusable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PkpAuthError {
    /// Check if the error is retryable after a `reconnect()`
    pub fn is_retryable(&self) -> bool {
        match self {
            PkpAuthError::Http(_)
            | PkpAuthError::NetworkUnavailable(_)
            | PkpAuthError::Timeout { .. } => true,
            PkpAuthError::Api { status, .. } => *status >= 500,
            PkpAuthError::DelegatedSigning { cause, .. } => cause.is_retryable(),
            _ => false,
        }
    }

    /// Check if the error is a cryptographic-integrity failure.
    ///
    /// Fatal errors must never be retried automatically and must never be
    /// reduced to a silent null by callers.
    pub fn is_fatal(&self) -> bool {
        match self {
            PkpAuthError::SignatureAddressMismatch { .. }
            | PkpAuthError::MalformedSignature(_)
            | PkpAuthError::ScopeNotPersisted { .. } => true,
            PkpAuthError::DelegatedSigning { cause, .. } => cause.is_fatal(),
            _ => false,
        }
    }

    /// Wrap an error as a delegated signing stage failure
    pub fn at_stage(self, stage: SigningStage) -> Self {
        PkpAuthError::DelegatedSigning {
            stage,
            cause: Box::new(self),
        }
    }
}

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, PkpAuthError>;
