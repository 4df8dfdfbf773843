//! # Service Requester Library
//!
//! Sends authenticated requests to configured services: resolves
//! per-service credentials, obtains and caches bearer tokens, attaches them
//! to outbound requests and retries once when a service answers 401.
//!
//! Modules:
//! - `config`: service credentials, settings and YAML loading
//! - `cache`: bearer token cache
//! - `transport`: HTTP client capability and its reqwest implementation
//! - `requester`: request building, token acquisition, execution and retry
//! - `observability`: prometheus metrics

pub mod cache;
pub mod config;
pub mod error;
pub mod observability;
pub mod requester;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::cache::token_cache::TokenCache;
pub use crate::config::loader::RequesterConfig;
pub use crate::config::services::{ConfigProvider, ServiceCredential, StaticConfig};
pub use crate::error::{AuthError, ConfigError, RequestError, TransportError};
pub use crate::requester::{Requester, ResponseEnvelope, ServiceRequest};
pub use crate::transport::{HttpClient, ReqwestClient, TransportRequest, TransportResponse};
