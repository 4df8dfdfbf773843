//! Transport module
//!
//! The requester only talks to the network through [`HttpClient`]; the
//! production implementation lives in [`reqwest_client`].

use http::header::AsHeaderName;
use http::{HeaderMap, Method, StatusCode};
use reqwest::Url;

use crate::error::TransportError;

pub mod reqwest_client;

pub use reqwest_client::ReqwestClient;

/// Outbound request, fully built
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TransportRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, headers: HeaderMap::new(), body: Vec::new() }
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }
}

/// Completed response with the body read in full
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: StatusCode) -> Self {
        Self { status, headers: HeaderMap::new(), body: Vec::new() }
    }

    /// Header value as str; missing and non visible-ASCII values are `None`
    pub fn header(&self, name: impl AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

pub trait HttpClient: Send + Sync {
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl std::future::Future<Output = Result<TransportResponse, TransportError>> + Send;
}
