use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::error::ConfigError;

/// ================================
/// Per-service credentials
/// ================================
#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct ServiceCredential {
    /// exchanged together with `secret` at `{base_url}/auth/generate`
    pub token: String,
    pub secret: String,
    /// forwarded as the `Context` header
    #[serde(default)]
    pub context: String,
    pub base_url: String,
}

impl ServiceCredential {
    pub fn new(
        token: impl Into<String>,
        secret: impl Into<String>,
        context: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
            context: context.into(),
            base_url: base_url.into(),
        }
    }
}

impl fmt::Debug for ServiceCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCredential")
            .field("token", &self.token)
            .field("secret", &"***")
            .field("context", &self.context)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Maps a service identifier to its credentials.
pub trait ConfigProvider: Send + Sync {
    fn lookup(&self, service_id: &str) -> Result<ServiceCredential, ConfigError>;
}

/// In-memory provider, keys are matched exactly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct StaticConfig(HashMap<String, ServiceCredential>);

impl StaticConfig {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn set(&mut self, service_id: impl Into<String>, credential: ServiceCredential) {
        self.0.insert(service_id.into(), credential);
    }

    pub fn with(mut self, service_id: impl Into<String>, credential: ServiceCredential) -> Self {
        self.set(service_id, credential);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ServiceCredential)> {
        self.0.iter()
    }
}

impl From<HashMap<String, ServiceCredential>> for StaticConfig {
    fn from(services: HashMap<String, ServiceCredential>) -> Self {
        Self(services)
    }
}

impl ConfigProvider for StaticConfig {
    fn lookup(&self, service_id: &str) -> Result<ServiceCredential, ConfigError> {
        if self.0.is_empty() {
            return Err(ConfigError::Empty);
        }
        self.0
            .get(service_id)
            .cloned()
            .ok_or_else(|| ConfigError::NotFound(service_id.to_owned()))
    }
}
