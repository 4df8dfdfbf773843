//! Authenticated requests to configured services.
//!
//! A call goes through [`Requester::do_request`]:
//! build (config lookup, body encoding, auth headers) -> execute -> on a 401
//! drop the cached token and run build + execute once more.

use std::sync::Arc;
use std::time::{Duration, Instant};

use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::cache::token_cache::TokenCache;
use crate::config::loader::RequesterConfig;
use crate::config::services::ConfigProvider;
use crate::config::settings::HttpConfig;
use crate::error::RequestError;
use crate::observability::metrics::{with_metrics, Metrics};
use crate::transport::{HttpClient, ReqwestClient};
use crate::utils::constants::{MAX_ATTEMPTS, UNKNOWN_SERVICE_LABEL};

pub mod auth;
pub mod builder;
pub mod executor;

/// Logical request to a configured service
#[derive(Debug, Clone)]
pub struct ServiceRequest<B = serde_json::Value> {
    pub service: String,
    pub method: Method,
    /// appended to the service base_url as is
    pub path: String,
    pub body: Option<B>,
}

impl ServiceRequest {
    pub fn new(service: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            method,
            path: path.into(),
            body: None,
        }
    }
}

impl<B> ServiceRequest<B> {
    pub fn with_body<T>(self, body: T) -> ServiceRequest<T> {
        ServiceRequest {
            service: self.service,
            method: self.method,
            path: self.path,
            body: Some(body),
        }
    }
}

/// Successful response. `data` is `None` for 204 No Content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope<T> {
    pub data: Option<T>,
    pub page_cursor: Option<String>,
}

/// Outcome of a single send. `status` is `None` when no response arrived.
#[derive(Debug)]
pub struct Execution<T> {
    pub status: Option<StatusCode>,
    pub result: Result<ResponseEnvelope<T>, RequestError>,
}

impl<T> Execution<T> {
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(StatusCode::UNAUTHORIZED)
    }
}

pub struct Requester<C = ReqwestClient> {
    client: C,
    tokens: TokenCache,
    confs: Arc<dyn ConfigProvider>,
    metrics_enabled: bool,
}

impl Requester<ReqwestClient> {
    pub fn new(confs: impl ConfigProvider + 'static) -> Result<Self, reqwest::Error> {
        let client = ReqwestClient::new(&HttpConfig::default())?;
        Ok(Self::with_client(client, confs))
    }

    pub fn from_config(config: &RequesterConfig) -> Result<Self, reqwest::Error> {
        let client = ReqwestClient::new(&config.settings.http)?;
        Ok(Self::with_client(client, config.services.clone())
            .with_metrics_enabled(config.settings.metrics.is_enabled))
    }
}

impl<C: HttpClient> Requester<C> {
    pub fn with_client(client: C, confs: impl ConfigProvider + 'static) -> Self {
        Self {
            client,
            tokens: TokenCache::new(),
            confs: Arc::new(confs),
            metrics_enabled: true,
        }
    }

    /// Share a token cache with other requesters
    pub fn with_token_cache(mut self, tokens: TokenCache) -> Self {
        self.tokens = tokens;
        self
    }

    /// Recording is on by default, `settings.metrics.is_enabled` decides for
    /// requesters built from a config file
    pub fn with_metrics_enabled(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    pub(crate) async fn record<F: FnOnce(&Metrics)>(&self, record: F) {
        if self.metrics_enabled {
            with_metrics(record).await;
        }
    }

    /// Service label for metrics, unconfigured ids all map to `unknown`
    fn service_label<'a>(&self, service_id: &'a str) -> &'a str {
        match self.confs.lookup(service_id) {
            Ok(_) => service_id,
            Err(_) => UNKNOWN_SERVICE_LABEL,
        }
    }

    /// Send `request` to its service and decode the response into `T`.
    ///
    /// A 401 on the first attempt invalidates the cached token and the request
    /// is rebuilt and sent once more. Any other outcome, including a second
    /// 401, is returned as is.
    pub async fn do_request<T, B>(
        &self,
        request: &ServiceRequest<B>,
    ) -> Result<ResponseEnvelope<T>, RequestError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let service_id = request.service.as_str();
        let start = Instant::now();
        let mut attempt: u32 = 1;

        let result = loop {
            let transport_request = match self.new_request(request).await {
                Ok(r) => r,
                Err(err) => break Err(err),
            };

            self.record(|m| {
                m.requests
                    .with_label_values(&[service_id, request.method.as_str()])
                    .inc();
            })
            .await;

            let execution = self.exec_request::<T>(service_id, transport_request).await;

            if execution.is_unauthorized() && attempt < MAX_ATTEMPTS {
                warn!(
                    "service '{}' rejected token for {} {} (attempt {}/{}), invalidating",
                    service_id, request.method, request.path, attempt, MAX_ATTEMPTS
                );
                self.tokens.delete(service_id).await;
                self.record(|m| m.unauthorized_retries.with_label_values(&[service_id]).inc()).await;
                attempt += 1;
                continue;
            }
            break execution.result;
        };

        let cached = self.tokens.len().await as i64;
        let label = match &result {
            Err(RequestError::Config(_)) => UNKNOWN_SERVICE_LABEL,
            _ => service_id,
        };
        self.record(|m| {
            m.request_duration
                .with_label_values(&[label])
                .observe(start.elapsed().as_secs_f64());
            m.cached_tokens.set(cached);
            if let Err(err) = &result {
                m.request_failures
                    .with_label_values(&[label, err.reason()])
                    .inc();
            }
        })
        .await;

        match &result {
            Ok(_) => info!("{} {} on service '{}' succeeded", request.method, request.path, service_id),
            Err(err) => warn!("{} {} on service '{}' failed: {}", request.method, request.path, service_id, err),
        }
        result
    }

    /// [`Requester::do_request`] bounded by `deadline`.
    ///
    /// The in-flight call is dropped when the deadline passes; cache updates
    /// only follow completed responses so none happen after that point.
    pub async fn do_request_with_deadline<T, B>(
        &self,
        request: &ServiceRequest<B>,
        deadline: Duration,
    ) -> Result<ResponseEnvelope<T>, RequestError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        match tokio::time::timeout(deadline, self.do_request(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "{} {} on service '{}' cancelled after {:?}",
                    request.method, request.path, request.service, deadline
                );
                let label = self.service_label(&request.service);
                self.record(|m| {
                    m.request_failures
                        .with_label_values(&[label, "deadline"])
                        .inc();
                })
                .await;
                Err(RequestError::DeadlineExceeded {
                    service: request.service.clone(),
                    deadline,
                })
            }
        }
    }
}
