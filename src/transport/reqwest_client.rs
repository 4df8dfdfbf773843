use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::config::settings::HttpConfig;
use crate::error::TransportError;
use crate::transport::{HttpClient, TransportRequest, TransportResponse};

#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new(http_config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(http_config.timeout_ms))
            .build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl HttpClient for ReqwestClient {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = request.url.to_string();
        debug!("sending {} {}", request.method, url);

        let response = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    TransportError::Timeout { url: url.clone() }
                } else {
                    TransportError::send(url.as_str(), err)
                }
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|err| {
            if err.is_timeout() {
                TransportError::Timeout { url: url.clone() }
            } else {
                TransportError::body(url.as_str(), err)
            }
        })?;

        debug!("received [{}] from {}, {} bytes", status, url, body.len());
        Ok(TransportResponse { status, headers, body: body.to_vec() })
    }
}
