//! Integration tests for the async client against a stubbed backend.

use dyson_rest::{AccountStatus, AuthOutcome, DysonClient, DysonError};
use mockito::Matcher;
use serde_json::json;

fn client_for(server: &mockito::ServerGuard, identifier: &str, country: &str) -> DysonClient {
    DysonClient::new(identifier, country)
        .unwrap()
        .with_base_url(server.url())
}

#[tokio::test]
async fn end_to_end_email_login() {
    let mut server = mockito::Server::new_async().await;
    let begin = server
        .mock(
            "POST",
            "/v3/userregistration/email/auth?country=US&culture=en-US",
        )
        .match_body(Matcher::Json(json!({ "email": "user@example.com" })))
        .with_header("content-type", "application/json")
        .with_body(r#"{"challengeId": "11111111-1111-1111-1111-111111111111"}"#)
        .create_async()
        .await;
    let complete = server
        .mock("POST", "/v3/userregistration/email/verify")
        .match_body(Matcher::Json(json!({
            "email": "user@example.com",
            "challengeId": "11111111-1111-1111-1111-111111111111",
            "otpCode": "123456",
        })))
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "account": "12345678-1234-5678-1234-567812345678",
                "token": "token_e2e",
                "tokenType": "Bearer"
            }"#,
        )
        .create_async()
        .await;

    let mut client = client_for(&server, "user@example.com", "US");
    let challenge = client.begin_login().await.unwrap();
    let credential = client
        .complete_login(Some(challenge.challenge_id), "123456")
        .await
        .unwrap();

    assert_eq!(credential.token, "token_e2e");
    assert_eq!(credential.token_type, "Bearer");
    // The vault now returns exactly the issued token.
    assert_eq!(client.auth_token(), Some("token_e2e"));
    assert_eq!(
        client.account_id().unwrap().to_string(),
        "12345678-1234-5678-1234-567812345678"
    );

    begin.assert_async().await;
    complete.assert_async().await;
}

#[tokio::test]
async fn provision_returns_version_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/provisioningservice/application/Android/version")
        .with_header("content-type", "application/json")
        .with_body("\"5.0.21061\"")
        .create_async()
        .await;

    let mut client = client_for(&server, "user@example.com", "US");
    assert!(!client.provisioned());
    let version = client.provision().await.unwrap();
    assert_eq!(version, "5.0.21061");
    assert!(client.provisioned());

    mock.assert_async().await;
}

#[tokio::test]
async fn authenticate_without_code_is_pending_and_repeatable() {
    let mut server = mockito::Server::new_async().await;
    let begin = server
        .mock(
            "POST",
            "/v3/userregistration/email/auth?country=US&culture=en-US",
        )
        .with_header("content-type", "application/json")
        .with_body(r#"{"challengeId": "11111111-1111-1111-1111-111111111111"}"#)
        .expect(2)
        .create_async()
        .await;

    let mut client = client_for(&server, "user@example.com", "US");
    for _ in 0..2 {
        let outcome = client.authenticate(None).await.unwrap();
        let AuthOutcome::Pending(challenge) = outcome else {
            panic!("expected pending outcome");
        };
        assert_eq!(
            challenge.challenge_id.to_string(),
            "11111111-1111-1111-1111-111111111111"
        );
        // Not authenticated: no credential materialized.
        assert_eq!(client.auth_token(), None);
    }

    begin.assert_async().await;
}

#[tokio::test]
async fn authenticate_with_code_completes() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock(
            "POST",
            "/v3/userregistration/email/auth?country=US&culture=en-US",
        )
        .with_header("content-type", "application/json")
        .with_body(r#"{"challengeId": "11111111-1111-1111-1111-111111111111"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/v3/userregistration/email/verify")
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "account": "12345678-1234-5678-1234-567812345678",
                "token": "token_composite",
                "tokenType": "Bearer"
            }"#,
        )
        .create_async()
        .await;

    let mut client = client_for(&server, "user@example.com", "US");
    let outcome = client.authenticate(Some("123456")).await.unwrap();
    let AuthOutcome::Authenticated(credential) = outcome else {
        panic!("expected authenticated outcome");
    };
    assert_eq!(credential.token, "token_composite");
    assert_eq!(client.auth_token(), Some("token_composite"));
}

#[tokio::test]
async fn wrong_otp_maps_to_unauthorized() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock(
            "POST",
            "/v3/userregistration/email/auth?country=US&culture=en-US",
        )
        .with_header("content-type", "application/json")
        .with_body(r#"{"challengeId": "11111111-1111-1111-1111-111111111111"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/v3/userregistration/email/verify")
        .with_status(401)
        .create_async()
        .await;

    let mut client = client_for(&server, "user@example.com", "US");
    client.begin_login().await.unwrap();
    let err = client.complete_login(None, "000000").await.unwrap_err();
    // The caller's cue to re-prompt for a code.
    assert!(matches!(err, DysonError::AuthUnauthorized(_)));
    assert_eq!(client.auth_token(), None);
}

#[tokio::test]
async fn user_status_lookup() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v3/userregistration/email/userstatus?country=US")
        .match_body(Matcher::Json(json!({ "email": "user@example.com" })))
        .with_header("content-type", "application/json")
        .with_body(r#"{"accountStatus": "ACTIVE", "authenticationMethod": "EMAIL_PWD_2FA"}"#)
        .create_async()
        .await;

    let client = client_for(&server, "user@example.com", "US");
    let status = client.get_user_status().await.unwrap();
    assert_eq!(status.account_status, AccountStatus::Active);

    mock.assert_async().await;
}

#[tokio::test]
async fn imported_token_authorizes_device_listing() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/provisioningservice/manifest")
        .match_header("authorization", "Bearer imported_token")
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {
                    "serialNumber": "JH1-EU-MCA0000A",
                    "name": "Living Room",
                    "type": "527",
                    "Version": "21.04.03",
                    "LocalCredentials": "bW9ja19ibG9i",
                    "AutoUpdate": true,
                    "NewVersionAvailable": false,
                    "ProductType": "527",
                    "ConnectionType": "wss",
                    "category": "ec",
                    "connectionCategory": "wifiOnly"
                },
                {
                    "serialNumber": "R2D-EU-NBB0000B",
                    "name": "Robot",
                    "Version": "3.1.0",
                    "ProductType": "276",
                    "connectionCategory": "lecAndWifi"
                }
            ]"#,
        )
        .create_async()
        .await;

    // No begin/complete ever ran; the imported token alone must be attached.
    let mut client = client_for(&server, "user@example.com", "US");
    client.set_auth_token(Some("imported_token".to_string()));

    let devices = client.get_devices().await.unwrap();
    assert_eq!(devices.len(), 2);
    // Backend order, not re-sorted.
    assert_eq!(devices[0].serial_number, "JH1-EU-MCA0000A");
    assert_eq!(devices[1].serial_number, "R2D-EU-NBB0000B");

    mock.assert_async().await;
}

#[tokio::test]
async fn device_listing_without_token_makes_no_request() {
    let mut server = mockito::Server::new_async().await;
    let catchall = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server, "user@example.com", "US");
    let err = client.get_devices().await.unwrap_err();
    assert!(matches!(err, DysonError::AuthUnauthorized(_)));

    catchall.assert_async().await;
}

#[tokio::test]
async fn expired_token_maps_to_unauthorized() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v2/provisioningservice/manifest")
        .with_status(401)
        .create_async()
        .await;

    let mut client = client_for(&server, "user@example.com", "US");
    client.set_auth_token(Some("expired".to_string()));
    let err = client.get_devices().await.unwrap_err();
    assert!(matches!(err, DysonError::AuthUnauthorized(_)));
}

#[tokio::test]
async fn malformed_device_payload_names_field() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v2/provisioningservice/manifest")
        .with_header("content-type", "application/json")
        .with_body(r#"[{"name": "No Serial", "Version": "1", "ProductType": "527", "connectionCategory": "wifiOnly"}]"#)
        .create_async()
        .await;

    let mut client = client_for(&server, "user@example.com", "US");
    client.set_auth_token(Some("t".to_string()));
    let err = client.get_devices().await.unwrap_err();
    let DysonError::Protocol(message) = err else {
        panic!("expected protocol error");
    };
    assert!(message.contains("serialNumber"), "got: {message}");
}

#[tokio::test]
async fn iot_credentials_lookup() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v2/authorize/iot-credentials")
        .match_body(Matcher::Json(json!({ "Serial": "JH1-EU-MCA0000A" })))
        .match_header("authorization", "Bearer t")
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "Endpoint": "a1b2c3-ats.iot.eu-west-1.amazonaws.com",
                "IoTCredentials": {
                    "ClientId": "12345678-1234-1234-1234-123456789abc",
                    "CustomAuthorizerName": "cld-iot-authorizer",
                    "TokenKey": "token",
                    "TokenSignature": "sig==",
                    "TokenValue": "87654321-4321-4321-4321-987654321abc"
                }
            }"#,
        )
        .create_async()
        .await;

    let mut client = client_for(&server, "user@example.com", "US");
    client.set_auth_token(Some("t".to_string()));
    let data = client.get_iot_credentials("JH1-EU-MCA0000A").await.unwrap();
    assert_eq!(data.endpoint, "a1b2c3-ats.iot.eu-west-1.amazonaws.com");
    assert_eq!(data.iot_credentials.custom_authorizer_name, "cld-iot-authorizer");

    mock.assert_async().await;
}

#[tokio::test]
async fn pending_release_lookup() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1/assets/devices/JH1-EU-MCA0000A/pendingrelease")
        .with_header("content-type", "application/json")
        .with_body(r#"{"version": "438MPF.00.01.007.0002", "pushed": false}"#)
        .create_async()
        .await;

    let mut client = client_for(&server, "user@example.com", "US");
    client.set_auth_token(Some("t".to_string()));
    let release = client.get_pending_release("JH1-EU-MCA0000A").await.unwrap();
    assert_eq!(release.version, "438MPF.00.01.007.0002");
    assert!(!release.pushed);
}

#[tokio::test]
async fn mobile_identifier_outside_cn_fails_without_network() {
    let mut server = mockito::Server::new_async().await;
    let catchall = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    // Rejected at construction: the begin/complete calls can never run.
    let err = DysonClient::new("+8613800000000", "US").unwrap_err();
    assert!(matches!(err, DysonError::InvalidIdentifier(_)));

    catchall.assert_async().await;
}

#[tokio::test]
async fn mobile_login_uses_mobile_path_on_cn_shard() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v3/userregistration/mobile/auth")
        .match_body(Matcher::Json(json!({ "mobile": "+8613800000000" })))
        .with_header("content-type", "application/json")
        .with_body(r#"{"challengeId": "44444444-4444-4444-4444-444444444444"}"#)
        .create_async()
        .await;

    let mut client = client_for(&server, "+8613800000000", "CN");
    let challenge = client.begin_login().await.unwrap();
    assert_eq!(
        challenge.challenge_id.to_string(),
        "44444444-4444-4444-4444-444444444444"
    );

    mock.assert_async().await;
}

#[tokio::test]
async fn connection_failure_surfaces_as_transport() {
    // Nothing listens on this port.
    let mut client = DysonClient::new("user@example.com", "US")
        .unwrap()
        .with_base_url("http://127.0.0.1:9");
    let err = client.begin_login().await.unwrap_err();
    assert!(matches!(err, DysonError::Transport(_)));
}
