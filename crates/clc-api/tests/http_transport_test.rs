use clc_api::{ApiError, HttpTransport, Method, Session, Transport};
use clc_config::ClientConfig;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(server: &MockServer) -> HttpTransport {
    HttpTransport::new(format!("{}/v2", server.uri()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_get_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/servers/BTDI/WA1BTDIWEB01"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "WA1BTDIWEB01",
            "name": "WA1BTDIWEB01"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let http = transport(&server).with_token("tok-123");
    let body = http
        .call(Method::Get, "servers/BTDI/WA1BTDIWEB01", None)
        .await
        .unwrap();

    assert_eq!(body["name"], "WA1BTDIWEB01");
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/antiAffinityPolicies/BTDI"))
        .and(body_json(json!({"name": "web", "location": "WA1"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "p1",
            "name": "web",
            "location": "WA1",
            "links": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let body = json!({"name": "web", "location": "WA1"});
    let response = transport(&server)
        .call(Method::Post, "antiAffinityPolicies/BTDI", Some(&body))
        .await
        .unwrap();

    assert_eq!(response["id"], "p1");
}

#[tokio::test]
async fn test_empty_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v2/antiAffinityPolicies/BTDI/p1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let response = transport(&server)
        .call(Method::Delete, "antiAffinityPolicies/BTDI/p1", None)
        .await
        .unwrap();

    assert!(response.is_null());
}

#[tokio::test]
async fn test_error_status_carries_code_and_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/operations/BTDI/servers/createSnapshot"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "snapshotExpirationDays must be between 1 and 10"
        })))
        .mount(&server)
        .await;

    let body = json!({"serverIds": ["WA1BTDIWEB01"], "snapshotExpirationDays": 15});
    let err = transport(&server)
        .call(Method::Post, "operations/BTDI/servers/createSnapshot", Some(&body))
        .await
        .unwrap_err();

    match err {
        ApiError::Failed {
            status,
            method,
            path,
            message,
        } => {
            assert_eq!(status, 400);
            assert_eq!(method, Method::Post);
            assert_eq!(path, "operations/BTDI/servers/createSnapshot");
            assert_eq!(message, "snapshotExpirationDays must be between 1 and 10");
        }
        other => panic!("Expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_with_plain_text_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/servers/BTDI/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let err = transport(&server)
        .call(Method::Get, "servers/BTDI/missing", None)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("Not Found"));
}

#[tokio::test]
async fn test_login_builds_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/authentication/login"))
        .and(body_json(json!({"username": "jdoe", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userName": "jdoe",
            "accountAlias": "BTDI",
            "locationAlias": "WA1",
            "roles": ["AccountAdmin"],
            "bearerToken": "tok-abc"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/groups/BTDI/g1"))
        .and(header("Authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "g1"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig {
        endpoint: format!("{}/v2", server.uri()),
        username: Some("jdoe".to_string()),
        password: Some("secret".to_string()),
        location: Some("VA1".to_string()),
        ..Default::default()
    };
    let session = Session::login(&config).await.unwrap();

    assert_eq!(session.alias(), "BTDI");
    // configured location wins over the login default
    assert_eq!(session.location(), "VA1");

    let group: serde_json::Value = session.get("groups/BTDI/g1").await.unwrap();
    assert_eq!(group["id"], "g1");
}

#[tokio::test]
async fn test_login_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/authentication/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "We didn't recognize the username or password you entered."
        })))
        .mount(&server)
        .await;

    let config = ClientConfig {
        endpoint: format!("{}/v2", server.uri()),
        username: Some("jdoe".to_string()),
        password: Some("wrong".to_string()),
        ..Default::default()
    };

    match Session::login(&config).await {
        Err(ApiError::AuthenticationFailed(message)) => {
            assert!(message.contains("didn't recognize"))
        }
        other => panic!("Expected AuthenticationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_without_credentials() {
    let config = ClientConfig::default();
    assert!(matches!(
        Session::login(&config).await,
        Err(ApiError::Config(_))
    ));
}
