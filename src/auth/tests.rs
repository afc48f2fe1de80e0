//! Tests for the auth module

use super::*;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn password_config(server: &MockServer) -> AuthConfig {
    AuthConfig::active_directory(
        &server.uri(),
        "tenant-1",
        "my-client",
        "analyst",
        "s3cret",
    )
}

#[tokio::test]
async fn test_password_grant() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("client_id=my-client"))
        .and(body_string_contains("username=analyst"))
        .and(body_string_contains("password=s3cret"))
        .and(body_string_contains("scope=https%3A%2F%2Fapi.powerbi.com"))
        .and(body_string_contains(
            "resource=https%3A%2F%2Fanalysis.windows.net%2Fpowerbi%2Fapi",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "Bearer",
            "expires_in": "3599",
            "access_token": "aad-token-123"
        })))
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(password_config(&mock_server));

    let client = reqwest::Client::new();
    let req = client.get("https://example.com/api");
    let req = auth.apply(req).await.unwrap();

    let built = req.build().unwrap();
    assert_eq!(
        built.headers().get("Authorization").unwrap(),
        "Bearer aad-token-123"
    );
}

#[tokio::test]
async fn test_password_grant_numeric_expiry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "v2-token",
            "expires_in": 3600
        })))
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(password_config(&mock_server));
    assert_eq!(auth.access_token().await.unwrap(), "v2-token");
}

#[tokio::test]
async fn test_token_caching() {
    let mock_server = MockServer::start().await;

    // This should only be called once due to caching
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "cached-token",
            "expires_in": "3600"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(password_config(&mock_server));
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let req = client.get("https://example.com/api");
        let _ = auth.apply(req).await.unwrap();
    }
}

#[tokio::test]
async fn test_expired_token_is_refreshed() {
    let mock_server = MockServer::start().await;

    // Expires inside the 30 s buffer, so every call fetches again
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "short-lived",
            "expires_in": "10"
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(password_config(&mock_server));
    auth.access_token().await.unwrap();
    auth.access_token().await.unwrap();
}

#[tokio::test]
async fn test_password_grant_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "AADSTS50126: Invalid username or password."
        })))
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(password_config(&mock_server));
    let client = reqwest::Client::new();
    let result = auth.apply(client.get("https://example.com/api")).await;

    let err = result.unwrap_err();
    assert!(matches!(err, crate::Error::OAuth2 { .. }));
    assert!(err.to_string().contains("400"));
    assert!(err.to_string().contains("invalid_grant"));
}

#[tokio::test]
async fn test_password_grant_missing_access_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token_type": "Bearer"})),
        )
        .mount(&mock_server)
        .await;

    let auth = Authenticator::new(password_config(&mock_server));
    let err = auth.access_token().await.unwrap_err();
    assert!(matches!(err, crate::Error::OAuth2 { .. }));
}

#[tokio::test]
async fn test_identity_endpoint_unreachable() {
    // Nothing listens on port 9 locally
    let auth = Authenticator::new(AuthConfig::active_directory(
        "http://127.0.0.1:9",
        "tenant-1",
        "client",
        "user",
        "pass",
    ));

    let err = auth.access_token().await.unwrap_err();
    assert!(matches!(err, crate::Error::Auth { .. }));
}
