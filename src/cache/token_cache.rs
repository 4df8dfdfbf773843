use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Bearer token cache: service_id -> token
///
/// A single store shared by every clone. Readers run concurrently, a writer
/// excludes every other access to the store.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Current token for the service, `None` if nothing is cached
    pub async fn get(&self, service_id: &str) -> Option<String> {
        let map = self.inner.read().await;
        map.get(service_id).map(|token| token.to_owned())
    }

    /// Insert or overwrite the token for the service.
    /// Empty tokens are never stored, returns `false` in that case.
    pub async fn set(&self, service_id: &str, token: &str) -> bool {
        if token.is_empty() {
            warn!("refusing to cache empty token for service '{}'", service_id);
            return false;
        }
        let mut map = self.inner.write().await;
        map.insert(service_id.to_owned(), token.to_owned());
        true
    }

    /// Remove the token for the service, no-op if absent
    pub async fn delete(&self, service_id: &str) {
        let mut map = self.inner.write().await;
        if map.remove(service_id).is_some() {
            debug!("token for service '{}' invalidated", service_id);
        }
    }

    /// Replace an existing token with `token` if it differs.
    ///
    /// Never creates an entry: a service without a cached token stays without
    /// one. Check and write happen under the same lock.
    pub async fn refresh(&self, service_id: &str, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        let mut map = self.inner.write().await;
        match map.get_mut(service_id) {
            Some(current) if current.as_str() != token => {
                *current = token.to_owned();
                true
            }
            _ => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
