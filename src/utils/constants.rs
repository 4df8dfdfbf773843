//! Shared constants and wire contract

use http::HeaderName;

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_CONFIG_PATH: &str = "svc-requester.yaml";

/// build -> execute -> (401) invalidate -> build -> execute
pub const MAX_ATTEMPTS: u32 = 2;

// Auth endpoint
pub const AUTH_GENERATE_PATH: &str = "/auth/generate";

// Request headers
pub const HEADER_AUTHORIZATION: HeaderName = http::header::AUTHORIZATION;
pub const HEADER_CONTEXT: HeaderName = HeaderName::from_static("context");

// Response headers
pub const HEADER_TOKEN: HeaderName = HeaderName::from_static("x-token");
pub const HEADER_PAGE_CURSOR: HeaderName = HeaderName::from_static("x-page-cursor");

/// metrics label for service ids missing from the config
pub const UNKNOWN_SERVICE_LABEL: &str = "unknown";

pub const CONTENT_TYPE_JSON: &str = "application/json";
