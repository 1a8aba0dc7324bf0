use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::FetchError;

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<Value>, FetchError>>>;

struct Entry {
    token: u64,
    fetch: SharedFetch,
}

/// URL -> in-flight or completed GET result.
///
/// Concurrent callers for the same URL share one underlying request. Failed
/// results are evicted once they settle; successes stay until cleared.
/// Entries are never expired or size-bounded.
pub struct ResponseCache {
    enabled: bool,
    entries: Mutex<HashMap<String, Entry>>,
    next_token: AtomicU64,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self { enabled: true, entries: Mutex::new(HashMap::new()), next_token: AtomicU64::new(0) }
    }

    /// A cache that never stores anything; every call goes to `fetch`.
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::new() }
    }

    pub async fn get_or_fetch<F>(&self, url: &str, fetch: F) -> Result<Arc<Value>, FetchError>
    where
        F: FnOnce() -> BoxFuture<'static, Result<Value, FetchError>>,
    {
        if !self.enabled {
            return fetch().await.map(Arc::new);
        }

        let (token, shared) = {
            let mut entries = self.lock();
            match entries.get(url) {
                Some(entry) => {
                    tracing::debug!(%url, "returning cached response");
                    (entry.token, entry.fetch.clone())
                }
                None => {
                    let token = self.next_token.fetch_add(1, Ordering::Relaxed);
                    let shared = fetch().map(|res| res.map(Arc::new)).boxed().shared();
                    entries.insert(url.to_string(), Entry { token, fetch: shared.clone() });
                    (token, shared)
                }
            }
        };

        let result = shared.await;
        if result.is_err() {
            let mut entries = self.lock();
            if entries.get(url).is_some_and(|e| e.token == token) {
                entries.remove(url);
            }
        }
        result
    }

    pub fn clear(&self) {
        tracing::debug!("clearing response cache");
        self.lock().clear();
    }

    pub fn clear_url(&self, url: &str) -> bool {
        tracing::debug!(%url, "clearing cached response");
        self.lock().remove(url).is_some()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}
