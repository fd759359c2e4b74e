/*
[INPUT]:  Mock node, relay and chain-RPC responses
[OUTPUT]: Test results for the delegated signing pipeline
[POS]:    Integration tests - delegated signing orchestrator
[UPDATE]: When pipeline stages or failure attribution change
*/

mod common;

use std::sync::Arc;

use common::{
    APP_KEY, USER_KEY, mount_blockhash, mount_handshake, mount_pkp_sign,
    mount_sign_session_key, setup_mock_server, test_config,
};
use pkp_auth_adapter::{
    CapacityManager, DelegatedSigningOrchestrator, DelegatedSigningParams, EoaSigner,
    NetworkClient, PkpAuthError, PkpInfo, SessionConfig, SessionManager, SigningStage,
};
use tokio_test::assert_ok;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn orchestrator(server: &wiremock::MockServer) -> DelegatedSigningOrchestrator {
    let network = Arc::new(
        NetworkClient::with_config(test_config(server, &["/n1", "/n2"], 2)).unwrap(),
    );
    let session = Arc::new(SessionManager::new(network.clone(), SessionConfig::default()));
    DelegatedSigningOrchestrator::new(network.clone(), session, CapacityManager::new(network))
}

fn signing_params() -> DelegatedSigningParams {
    DelegatedSigningParams {
        message: b"transfer 1 wei to 0xBBB".to_vec(),
        pkp_info: PkpInfo {
            token_id: "42".into(),
            public_key: "0x04abcd".into(),
            eth_address: "0xBBB0000000000000000000000000000000000000".into(),
        },
        capacity_token_id: "cap-7".to_string(),
        max_uses: 3,
    }
}

#[tokio::test]
async fn test_sign_with_delegation_happy_path() {
    let server = setup_mock_server().await;
    mount_handshake(&server, "/n1").await;
    mount_handshake(&server, "/n2").await;
    mount_blockhash(&server).await;
    mount_sign_session_key(&server, "/n1", "0xnode1sig").await;
    mount_sign_session_key(&server, "/n2", "0xnode2sig").await;
    let threshold_sig = format!("0x{}", "ab".repeat(65));
    mount_pkp_sign(&server, "/n1", &threshold_sig).await;
    mount_pkp_sign(&server, "/n2", &threshold_sig).await;

    let orchestrator = orchestrator(&server);
    let user = EoaSigner::new(USER_KEY).unwrap();
    let owner = EoaSigner::new(APP_KEY).unwrap();

    let signature = assert_ok!(
        orchestrator
            .sign_with_delegation(&user, &owner, &signing_params())
            .await
    );

    assert_eq!(signature, threshold_sig);
    assert_eq!(signature.len(), 132);
}

#[tokio::test]
async fn test_connect_failure_is_attributed_to_connect_stage() {
    let server = setup_mock_server().await;
    // no handshake mocks mounted: every node fails to connect

    let orchestrator = orchestrator(&server);
    let user = EoaSigner::new(USER_KEY).unwrap();
    let owner = EoaSigner::new(APP_KEY).unwrap();

    let err = orchestrator
        .sign_with_delegation(&user, &owner, &signing_params())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PkpAuthError::DelegatedSigning {
            stage: SigningStage::Connect,
            ..
        }
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_session_failure_is_attributed_to_session_stage() {
    let server = setup_mock_server().await;
    mount_handshake(&server, "/n1").await;
    mount_handshake(&server, "/n2").await;
    mount_blockhash(&server).await;
    for node in ["/n1", "/n2"] {
        Mock::given(method("POST"))
            .and(path(format!("{node}/web/sign-session-key")))
            .respond_with(ResponseTemplate::new(500).set_body_string("node down"))
            .mount(&server)
            .await;
    }

    let orchestrator = orchestrator(&server);
    let user = EoaSigner::new(USER_KEY).unwrap();
    let owner = EoaSigner::new(APP_KEY).unwrap();

    let err = orchestrator
        .sign_with_delegation(&user, &owner, &signing_params())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PkpAuthError::DelegatedSigning {
            stage: SigningStage::Session,
            ..
        }
    ));
}

#[tokio::test]
async fn test_execute_failure_is_attributed_to_execute_stage() {
    let server = setup_mock_server().await;
    mount_handshake(&server, "/n1").await;
    mount_handshake(&server, "/n2").await;
    mount_blockhash(&server).await;
    mount_sign_session_key(&server, "/n1", "0xnode1sig").await;
    mount_sign_session_key(&server, "/n2", "0xnode2sig").await;
    for node in ["/n1", "/n2"] {
        Mock::given(method("POST"))
            .and(path(format!("{node}/web/pkp/sign")))
            .respond_with(ResponseTemplate::new(500).set_body_string("signing refused"))
            .mount(&server)
            .await;
    }

    let orchestrator = orchestrator(&server);
    let user = EoaSigner::new(USER_KEY).unwrap();
    let owner = EoaSigner::new(APP_KEY).unwrap();

    let err = orchestrator
        .sign_with_delegation(&user, &owner, &signing_params())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PkpAuthError::DelegatedSigning {
            stage: SigningStage::Execute,
            ..
        }
    ));
}
