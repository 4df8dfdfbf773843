// tests/common/mod.rs
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http::{HeaderName, HeaderValue, StatusCode};

use crate::config::services::{ServiceCredential, StaticConfig};
use crate::error::TransportError;
use crate::requester::Requester;
use crate::transport::{HttpClient, TransportRequest, TransportResponse};
use crate::utils::constants::HEADER_TOKEN;

pub const MOCK_SERVICE: &str = "mock";
pub const MOCK_BASE_URL: &str = "http://fake.com";
pub const AUTH_PATH: &str = "/auth/generate";

type Responder = dyn Fn(&TransportRequest) -> Result<TransportResponse, TransportError> + Send + Sync;

/// Transport double: answers through a closure and records every request.
#[derive(Clone)]
pub struct MockClient {
    responder: Arc<Responder>,
    sent: Arc<Mutex<Vec<TransportRequest>>>,
    delay: Option<Duration>,
}

impl MockClient {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&TransportRequest) -> Result<TransportResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            sent: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Transport that must never be reached
    pub fn unreachable() -> Self {
        Self::new(|request| Err(TransportError::send(request.url.as_str(), "transport must not be called")))
    }

    /// Sleep before answering, the request is recorded first
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn sent(&self) -> Vec<TransportRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.sent.lock().unwrap().iter().filter(|r| r.path() == path).count()
    }
}

impl HttpClient for MockClient {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(&request)
    }
}

pub fn response(status: u16, body: &str) -> TransportResponse {
    let mut response = TransportResponse::new(StatusCode::from_u16(status).unwrap());
    response.body = body.as_bytes().to_vec();
    response
}

pub fn with_header(mut response: TransportResponse, name: HeaderName, value: &str) -> TransportResponse {
    response.headers.insert(name, HeaderValue::from_str(value).unwrap());
    response
}

/// Successful credential exchange
pub fn auth_ok(token: &str) -> TransportResponse {
    with_header(response(204, ""), HEADER_TOKEN, token)
}

pub fn mock_credential(base_url: &str) -> ServiceCredential {
    ServiceCredential::new("token", "secret", "ctx", base_url)
}

pub fn mock_conf() -> StaticConfig {
    StaticConfig::new().with(MOCK_SERVICE, mock_credential(MOCK_BASE_URL))
}

pub fn mock_requester(client: MockClient) -> Requester<MockClient> {
    Requester::with_client(client, mock_conf())
}

pub fn header<'a>(request: &'a TransportRequest, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}
