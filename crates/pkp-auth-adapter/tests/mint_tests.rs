/*
[INPUT]:  Mock relay and chain-RPC responses
[OUTPUT]: Test results for the PKP mint and scope verification flow
[POS]:    Integration tests - PKP lifecycle manager
[UPDATE]: When the mint flow or scope verification changes
*/

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    USER_ADDRESS, USER_KEY, mount_relay_mint_pkp, mount_scope_read, setup_mock_server,
    test_config,
};
use pkp_auth_adapter::signer::verify_signature_address;
use pkp_auth_adapter::{
    AccountKind, EoaSigner, MockWalletSigner, NetworkClient, PermissionScope, PkpAuthError,
    PkpLifecycleManager,
};
use tokio_test::assert_ok;

fn lifecycle(server: &wiremock::MockServer) -> PkpLifecycleManager {
    let network = Arc::new(
        NetworkClient::with_config(test_config(server, &["/n1"], 1)).unwrap(),
    );
    PkpLifecycleManager::new(network).with_confirmation_delay(Duration::ZERO)
}

#[tokio::test]
async fn test_mint_pkp_returns_confirmed_identity() {
    let server = setup_mock_server().await;
    mount_relay_mint_pkp(&server).await;
    // scope ids 1 and 2 (the defaults) are set on chain
    mount_scope_read(&server, &[false, true, true]).await;

    let manager = lifecycle(&server);
    let signer = EoaSigner::new(USER_KEY).unwrap();

    let info = assert_ok!(manager.mint_pkp(&signer, &[]).await);

    assert_eq!(info.token_id, "42");
    assert_eq!(info.public_key, "0x04abcd");
    assert_eq!(info.eth_address, "0xBBB0000000000000000000000000000000000000");
}

#[tokio::test]
async fn test_mint_request_carries_signed_consent_proof() {
    let server = setup_mock_server().await;
    mount_relay_mint_pkp(&server).await;
    mount_scope_read(&server, &[false, true, true]).await;

    let manager = lifecycle(&server);
    let signer = EoaSigner::new(USER_KEY).unwrap();
    assert_ok!(manager.mint_pkp(&signer, &[]).await);

    let mint_body: serde_json::Value = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .find(|request| request.url.path() == "/relay/mint-next-and-add-auth-methods")
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .expect("relay mint request was sent");

    // the wallet's signed registration statement must reach the relay
    let access_token = mint_body["authMethods"][0]["accessToken"]
        .as_str()
        .expect("auth method carries an access token");
    let proof: serde_json::Value = serde_json::from_str(access_token).unwrap();
    let statement = proof["signedMessage"].as_str().unwrap();
    let sig = proof["sig"].as_str().unwrap();

    assert!(statement.starts_with("I am creating a key at "));
    assert_eq!(proof["address"], USER_ADDRESS);
    assert_ok!(verify_signature_address(statement, sig, USER_ADDRESS));
    assert_eq!(mint_body["authMethods"][0]["authMethodType"], 1);
}

#[tokio::test]
async fn test_mint_fails_when_scopes_not_persisted() {
    let server = setup_mock_server().await;
    mount_relay_mint_pkp(&server).await;
    mount_scope_read(&server, &[false, false, false]).await;

    let manager = lifecycle(&server);
    let signer = EoaSigner::new(USER_KEY).unwrap();

    let err = manager
        .mint_pkp(&signer, &[PermissionScope::SignAnything])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PkpAuthError::ScopeNotPersisted { ref token_id } if token_id == "42"
    ));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_mint_requires_requested_scope_only() {
    let server = setup_mock_server().await;
    mount_relay_mint_pkp(&server).await;
    // only PersonalSign (id 2) is set; that is all we ask for
    mount_scope_read(&server, &[false, false, true]).await;

    let manager = lifecycle(&server);
    let signer = EoaSigner::new(USER_KEY).unwrap();

    assert_ok!(
        manager
            .mint_pkp(&signer, &[PermissionScope::PersonalSign])
            .await
    );
}

#[tokio::test]
async fn test_mint_rejects_smart_contract_accounts() {
    let server = setup_mock_server().await;
    let manager = lifecycle(&server);
    let signer = MockWalletSigner::new(
        AccountKind::Sca,
        "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
        "0xunused",
    );

    let err = manager.mint_pkp(&signer, &[]).await.unwrap_err();
    assert!(matches!(err, PkpAuthError::AccountTypeUnsupported(_)));
    // rejected before any relay traffic
    assert!(server.received_requests().await.unwrap().is_empty());
}
