/*
[INPUT]:  Signers, PKP identity and network client
[OUTPUT]: Authenticated, cached session signatures
[POS]:    Session layer - challenge construction, auth callback, caching
[UPDATE]: When the session protocol or caching policy changes
*/

pub mod cache;
pub mod challenge;
pub mod manager;

pub use cache::{SESSION_SAFETY_MARGIN_MINUTES, SessionStore};
pub use challenge::{
    ChallengeParams, build_delegation_message, build_mint_statement, build_signin_challenge,
};
pub use manager::{
    AuthCallbackContext, SESSION_TTL_HOURS, SessionConfig, SessionManager, run_auth_callback,
};
