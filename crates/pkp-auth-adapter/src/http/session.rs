/*
[INPUT]:  Signed challenge, resource requests and optional delegation sig
[OUTPUT]: Per-node session signatures and threshold-assembled signatures
[POS]:    HTTP layer - node session and signing endpoints
[UPDATE]: When the node session protocol changes
*/

use std::collections::BTreeMap;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::http::{NetworkClient, PkpAuthError, Result};
use crate::types::{
    AuthMethod, AuthSig, PkpSignRequest, PkpSignResponse, PkpSignWithAuthMethodRequest,
    SessionSigs, SignSessionKeyRequest, SignSessionKeyResponse,
};

impl NetworkClient {
    /// Submit a signed session challenge to every connected node.
    ///
    /// POST {node}/web/sign-session-key
    ///
    /// Returns one signature per node plus the aggregate auth signature and
    /// its stated expiration. Quorum applies: fewer than `min_node_count`
    /// responders is a retryable network failure.
    pub async fn sign_session_key(
        &self,
        request: &SignSessionKeyRequest,
    ) -> Result<SessionSigs> {
        let connection = self.get_client().await?;

        let attempts = connection.nodes.iter().map(|node| async move {
            let url = format!("{node}/web/sign-session-key");
            let result: Result<SignSessionKeyResponse> =
                self.send_json(self.http().post(&url).json(request)).await;
            match result {
                Ok(response) => Some((node.clone(), response)),
                Err(e) => {
                    warn!(node = %node, error = %e, "sign-session-key failed");
                    None
                }
            }
        });

        let responses: Vec<(String, SignSessionKeyResponse)> =
            join_all(attempts).await.into_iter().flatten().collect();

        if responses.len() < self.config().min_node_count {
            return Err(PkpAuthError::NetworkUnavailable(format!(
                "{}/{} nodes signed the session key (need {})",
                responses.len(),
                connection.nodes.len(),
                self.config().min_node_count
            )));
        }

        let signatures: BTreeMap<String, String> = responses
            .iter()
            .map(|(node, response)| (node.clone(), response.signature.clone()))
            .collect();

        // The aggregate auth sig and expiration are identical across nodes;
        // take them from the first responder.
        let (_, first) = &responses[0];
        let session_sigs = SessionSigs {
            signatures,
            auth_sig: AuthSig {
                sig: first.signature.clone(),
                derived_via: first.derived_via.clone(),
                signed_message: first.signed_message.clone(),
                address: first.address.clone(),
            },
            expiration: first.expiration,
        };

        debug!(
            nodes = session_sigs.signatures.len(),
            expiration = %session_sigs.expiration,
            "session signatures issued"
        );
        Ok(session_sigs)
    }

    /// Execute a signing action against the network: each node validates
    /// its session signature and contributes to the threshold signature.
    ///
    /// POST {node}/web/pkp/sign
    ///
    /// Nodes return the assembled signature once quorum is reached; the
    /// first successful response wins.
    pub async fn pkp_sign(
        &self,
        pkp_public_key: &str,
        message_hash_hex: &str,
        session_sigs: &SessionSigs,
    ) -> Result<String> {
        let connection = self.get_client().await?;

        let attempts = connection.nodes.iter().map(|node| {
            let session_sig = session_sigs
                .signatures
                .get(node)
                .cloned()
                .unwrap_or_else(|| session_sigs.auth_sig.sig.clone());
            let request = PkpSignRequest {
                to_sign: message_hash_hex.to_string(),
                pkp_public_key: pkp_public_key.to_string(),
                session_sig,
                auth_sig: session_sigs.auth_sig.clone(),
            };
            async move {
                let url = format!("{node}/web/pkp/sign");
                let result: Result<PkpSignResponse> =
                    self.send_json(self.http().post(&url).json(&request)).await;
                match result {
                    Ok(response) => Some(response.signature),
                    Err(e) => {
                        warn!(node = %node, error = %e, "pkp sign failed");
                        None
                    }
                }
            }
        });

        let signatures: Vec<String> = join_all(attempts).await.into_iter().flatten().collect();

        if signatures.len() < self.config().min_node_count {
            return Err(PkpAuthError::NetworkUnavailable(format!(
                "{}/{} nodes completed the signing action (need {})",
                signatures.len(),
                connection.nodes.len(),
                self.config().min_node_count
            )));
        }

        signatures.into_iter().next().ok_or_else(|| {
            PkpAuthError::InvalidResponse("no signature in quorum responses".to_string())
        })
    }

    /// Execute a signing action authorized by an auth method proof rather
    /// than session signatures. This is how a PKP-backed wallet signs its
    /// own session challenge before any session exists.
    ///
    /// POST {node}/web/pkp/sign
    pub async fn pkp_sign_with_auth_method(
        &self,
        pkp_public_key: &str,
        message_hash_hex: &str,
        auth_method: &AuthMethod,
    ) -> Result<String> {
        let connection = self.get_client().await?;
        let request = PkpSignWithAuthMethodRequest {
            to_sign: message_hash_hex.to_string(),
            pkp_public_key: pkp_public_key.to_string(),
            auth_methods: vec![auth_method.clone()],
        };

        let attempts = connection.nodes.iter().map(|node| {
            let request = &request;
            async move {
                let url = format!("{node}/web/pkp/sign");
                let result: Result<PkpSignResponse> =
                    self.send_json(self.http().post(&url).json(request)).await;
                match result {
                    Ok(response) => Some(response.signature),
                    Err(e) => {
                        warn!(node = %node, error = %e, "auth-method pkp sign failed");
                        None
                    }
                }
            }
        });

        let signatures: Vec<String> = join_all(attempts).await.into_iter().flatten().collect();

        if signatures.len() < self.config().min_node_count {
            return Err(PkpAuthError::NetworkUnavailable(format!(
                "{}/{} nodes completed the signing action (need {})",
                signatures.len(),
                connection.nodes.len(),
                self.config().min_node_count
            )));
        }

        signatures.into_iter().next().ok_or_else(|| {
            PkpAuthError::InvalidResponse("no signature in quorum responses".to_string())
        })
    }
}
