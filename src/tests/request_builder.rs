use http::Method;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::config::services::{ServiceCredential, StaticConfig};
use crate::error::{AuthError, ConfigError, RequestError, TransportError};
use crate::requester::{Requester, ServiceRequest};
use crate::tests::common::{
    auth_ok, header, mock_requester, response, MockClient, AUTH_PATH, MOCK_SERVICE,
};

fn create_user() -> ServiceRequest {
    ServiceRequest::new(MOCK_SERVICE, Method::POST, "/user/create")
        .with_body(json!({"email": "test@test.com"}))
}

struct Unserializable;

impl Serialize for Unserializable {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom("unsupported type: func()"))
    }
}

#[tokio::test]
async fn uses_cached_token_without_calling_auth() {
    let client = MockClient::unreachable();
    let requester = mock_requester(client.clone());
    requester.tokens().set(MOCK_SERVICE, "token test").await;

    let request = requester.new_request(&create_user()).await.unwrap();

    assert_eq!(client.calls(), 0);
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.url.as_str(), "http://fake.com/user/create");
    assert_eq!(header(&request, "Authorization"), Some("token test"));
    assert_eq!(header(&request, "Context"), Some("ctx"));
    assert_eq!(header(&request, "Content-Type"), Some("application/json"));
    let body: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body, json!({"email": "test@test.com"}));
}

#[tokio::test]
async fn acquires_and_caches_token_on_miss() {
    let client = MockClient::new(|request| {
        assert_eq!(request.path(), AUTH_PATH);
        Ok(auth_ok("fresh-token"))
    });
    let requester = mock_requester(client.clone());

    let request = requester.new_request(&create_user()).await.unwrap();

    assert_eq!(header(&request, "Authorization"), Some("fresh-token"));
    assert_eq!(requester.tokens().get(MOCK_SERVICE).await.as_deref(), Some("fresh-token"));

    let sent = client.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, Method::POST);
    assert_eq!(sent[0].url.as_str(), "http://fake.com/auth/generate");
    assert_eq!(header(&sent[0], "Content-Type"), Some("application/json"));
    let payload: Value = serde_json::from_slice(&sent[0].body).unwrap();
    assert_eq!(payload, json!({"token": "token", "secret": "secret"}));
}

#[tokio::test]
async fn request_without_body_has_empty_payload() {
    let requester = mock_requester(MockClient::unreachable());
    requester.tokens().set(MOCK_SERVICE, "cached").await;

    let request = requester
        .new_request(&ServiceRequest::new(MOCK_SERVICE, Method::GET, "/user/list?limit=10"))
        .await
        .unwrap();

    assert!(request.body.is_empty());
    assert_eq!(header(&request, "Content-Type"), None);
    assert_eq!(request.url.query(), Some("limit=10"));
}

#[tokio::test]
async fn invalid_url_fails_before_sending() {
    let client = MockClient::new(|_| Ok(response(200, "")));
    let conf = StaticConfig::new().with(
        MOCK_SERVICE,
        ServiceCredential::new("token", "secret", "ctx", "://invalid-url"),
    );
    let requester = Requester::with_client(client.clone(), conf);

    let err = requester.new_request(&create_user()).await.unwrap_err();

    assert!(matches!(err, RequestError::InvalidUrl { .. }), "{:?}", err);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn auth_failure_prevents_request() {
    let client = MockClient::new(|request| {
        Err(TransportError::send(request.url.as_str(), "Error to execute request"))
    });
    let requester = mock_requester(client.clone());

    let err = requester.new_request(&create_user()).await.unwrap_err();

    assert!(matches!(err, RequestError::Auth(AuthError::Transport(_))), "{:?}", err);
    assert_eq!(client.calls_to("/user/create"), 0);
    assert_eq!(requester.tokens().get(MOCK_SERVICE).await, None);
}

#[tokio::test]
async fn empty_config_fails_fast() {
    let client = MockClient::unreachable();
    let requester = Requester::with_client(client.clone(), StaticConfig::new());

    let err = requester.new_request(&create_user()).await.unwrap_err();

    assert!(matches!(err, RequestError::Config(ConfigError::Empty)));
    assert_eq!(err.to_string(), "config map is empty");
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn unknown_service_fails_fast() {
    let client = MockClient::unreachable();
    let requester = mock_requester(client.clone());

    let err = requester
        .new_request(&ServiceRequest::new("billing", Method::GET, "/invoices"))
        .await
        .unwrap_err();

    assert!(matches!(err, RequestError::Config(ConfigError::NotFound(ref s)) if s == "billing"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn unserializable_body_fails_fast() {
    let client = MockClient::unreachable();
    let requester = mock_requester(client.clone());
    let request = ServiceRequest::new(MOCK_SERVICE, Method::POST, "/user/list").with_body(Unserializable);

    let err = requester.new_request(&request).await.unwrap_err();

    assert!(matches!(err, RequestError::Serialization(_)));
    assert!(err.to_string().contains("unsupported type: func()"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn invalid_context_is_reported() {
    let conf = StaticConfig::new().with(
        MOCK_SERVICE,
        ServiceCredential::new("token", "secret", "bad\ncontext", "http://fake.com"),
    );
    let requester = Requester::with_client(MockClient::unreachable(), conf);
    requester.tokens().set(MOCK_SERVICE, "cached").await;

    let err = requester.new_request(&create_user()).await.unwrap_err();

    assert!(matches!(err, RequestError::InvalidHeader { ref name, .. } if name.as_str() == "context"));
}
