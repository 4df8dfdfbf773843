//! Error taxonomy of the requester.
//!
//! Every failure path ends in a [`RequestError`] returned to the caller of
//! [`crate::requester::Requester::do_request`]. Only a first-attempt 401 is
//! recovered internally.

use std::time::Duration;

use http::header::InvalidHeaderValue;
use http::{HeaderName, StatusCode};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service configuration lookup failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config map is empty")]
    Empty,
    #[error("config not found for service: {0}")]
    NotFound(String),
}

/// Network level failures, no HTTP status is available.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Send {
        url: String,
        #[source]
        source: BoxError,
    },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: BoxError,
    },
}

impl TransportError {
    pub fn send(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        TransportError::Send {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn body(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        TransportError::Body {
            url: url.into(),
            source: source.into(),
        }
    }
}

/// Token acquisition failures. The token cache is never touched when one of
/// these is produced.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to encode credential payload: {0}")]
    Payload(#[source] serde_json::Error),
    #[error("invalid auth endpoint url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("error to authenticate against {url}, empty token or invalid status code [{status}]")]
    Rejected {
        url: String,
        status: StatusCode,
        token_present: bool,
    },
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid request url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid value for header '{name}'")]
    InvalidHeader {
        name: HeaderName,
        #[source]
        source: InvalidHeaderValue,
    },
    #[error("failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("failed to deserialize response from {url} [{status}]: {source}")]
    Deserialization {
        url: String,
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("request to {url} failed [{status}]")]
    RequestFailed { url: String, status: StatusCode },
    #[error("request to service '{service}' exceeded its deadline of {deadline:?}")]
    DeadlineExceeded { service: String, deadline: Duration },
}

impl RequestError {
    /// HTTP status carried by the error, if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::RequestFailed { status, .. } => Some(*status),
            RequestError::Deserialization { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short label used for the failure metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            RequestError::Config(_) => "config",
            RequestError::InvalidUrl { .. } => "invalid_url",
            RequestError::InvalidHeader { .. } => "invalid_header",
            RequestError::Serialization(_) => "serialization",
            RequestError::Deserialization { .. } => "deserialization",
            RequestError::Auth(_) => "auth",
            RequestError::Transport(_) => "transport",
            RequestError::RequestFailed { .. } => "status",
            RequestError::DeadlineExceeded { .. } => "deadline",
        }
    }
}
