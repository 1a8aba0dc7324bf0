use futures::future::{try_join_all, FutureExt};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::error::FetchError;
use crate::transport::Transport;
use crate::types::{search_by_name, Resource};

/// Typed access to the reference API. Every GET goes through one shared
/// [`ResponseCache`] and a fixed retry budget.
pub struct SwapiClient {
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache>,
    base_url: String,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl SwapiClient {
    pub fn new(transport: Arc<dyn Transport>, config: &Config) -> Result<Self, FetchError> {
        let cache = if config.cache_enabled { ResponseCache::new() } else { ResponseCache::disabled() };
        Self::with_cache(transport, Arc::new(cache), config)
    }

    pub fn with_cache(
        transport: Arc<dyn Transport>,
        cache: Arc<ResponseCache>,
        config: &Config,
    ) -> Result<Self, FetchError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url));
        }
        Ok(Self {
            transport,
            cache,
            base_url,
            retry_attempts: config.retry_attempts,
            retry_delay: config.retry_delay(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    // --- typed operations ---

    /// Whole collection for `T`, from `<base>/<route>/`.
    pub async fn fetch_list<T: Resource>(&self) -> Result<Vec<T>, FetchError> {
        let url = self.endpoint(&format!("{}/", T::KEY.as_str()))?;
        let raw = self.get(&url).await?;
        let items = normalize_list(&raw).ok_or_else(|| {
            tracing::warn!(%url, "unexpected list response shape");
            FetchError::Shape(url.to_string())
        })?;
        items.iter().map(|item| decode(item, &url)).collect()
    }

    /// One entity from `<base>/<route>/<id>`, with the requested id attached.
    pub async fn fetch_by_id<T: Resource>(&self, id: u64) -> Result<T, FetchError> {
        let url = self.endpoint(&format!("{}/{id}", T::KEY.as_str()))?;
        let raw = self.get(&url).await?;
        decode::<T>(&raw, &url).map(|item| item.with_id(id))
    }

    /// Follow an absolute hypermedia link.
    pub async fn fetch_by_url<T: Resource>(&self, url: &str) -> Result<T, FetchError> {
        let url = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        let raw = self.get(&url).await?;
        decode(&raw, &url)
    }

    /// All links concurrently, in input order. Any failure fails the batch.
    pub async fn fetch_many_by_url<T: Resource>(&self, urls: &[String]) -> Result<Vec<T>, FetchError> {
        try_join_all(urls.iter().map(|u| self.fetch_by_url::<T>(u))).await
    }

    pub async fn search<T: Resource>(&self, query: &str) -> Result<Vec<T>, FetchError> {
        Ok(search_by_name(self.fetch_list::<T>().await?, query))
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn clear_cache_for_url(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => self.cache.clear_url(parsed.as_str()),
            Err(_) => self.cache.clear_url(url),
        }
    }

    // --- plumbing ---

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        let raw = format!("{}/{path}", self.base_url);
        Url::parse(&raw).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))
    }

    async fn get(&self, url: &Url) -> Result<Arc<Value>, FetchError> {
        let transport = self.transport.clone();
        let target = url.clone();
        let (retries, delay) = (self.retry_attempts, self.retry_delay);
        self.cache
            .get_or_fetch(url.as_str(), move || get_with_retry(transport, target, retries, delay).boxed())
            .await
    }
}

async fn get_with_retry(
    transport: Arc<dyn Transport>,
    url: Url,
    retries: u32,
    delay: Duration,
) -> Result<Value, FetchError> {
    let mut attempt = 0u32;
    loop {
        match transport.get_json(&url).await {
            Ok(body) => {
                tracing::debug!(%url, "successfully fetched");
                return Ok(body);
            }
            Err(e) if attempt < retries => {
                attempt += 1;
                tracing::warn!(%url, attempt, max = retries, error = %e, "request failed; retrying");
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) => {
                tracing::error!(%url, error = %e, "request failed after retries");
                return Err(e);
            }
        }
    }
}

/// Bare array, or an object wrapping one under `results`, `result` or `data`.
pub fn normalize_list(raw: &Value) -> Option<&Vec<Value>> {
    if let Some(items) = raw.as_array() {
        return Some(items);
    }
    let obj = raw.as_object()?;
    ["results", "result", "data"].iter().find_map(|k| obj.get(*k).and_then(Value::as_array))
}

fn decode<T: Resource>(raw: &Value, url: &Url) -> Result<T, FetchError> {
    T::deserialize(raw).map_err(|e| FetchError::Decode { url: url.to_string(), message: e.to_string() })
}
