use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use url::Url;

use crate::error::FetchError;

/// Raw JSON GET. Everything above this seam is transport-agnostic.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &Url) -> Result<Value, FetchError>;
}

/// reqwest-backed transport used against the live API.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &Url) -> Result<Value, FetchError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(%url, status = status.as_u16(), %body, "backend returned an error status");
            return Err(FetchError::Server {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Http failure response").to_string(),
            });
        }
        resp.json::<Value>().await.map_err(|e| FetchError::Decode { url: url.to_string(), message: e.to_string() })
    }
}

/// Canned responses keyed by absolute URL. Records every request in order.
///
/// Used by tests and for offline fixtures. Unknown URLs answer 404.
#[derive(Default)]
pub struct MemoryTransport {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<String>>,
}

struct Route {
    outcomes: Vec<Result<Value, FetchError>>,
    delay: Duration,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for every request to `url`.
    pub fn respond(&self, url: &str, body: Value) -> &Self {
        self.script(url, vec![Ok(body)], Duration::ZERO)
    }

    pub fn respond_after(&self, url: &str, body: Value, delay: Duration) -> &Self {
        self.script(url, vec![Ok(body)], delay)
    }

    /// Fail every request to `url`.
    pub fn fail(&self, url: &str, err: FetchError) -> &Self {
        self.script(url, vec![Err(err)], Duration::ZERO)
    }

    /// Outcomes are consumed in order; the last one repeats.
    pub fn script(&self, url: &str, outcomes: Vec<Result<Value, FetchError>>, delay: Duration) -> &Self {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        routes.insert(url.to_string(), Route { outcomes, delay });
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn get_json(&self, url: &Url) -> Result<Value, FetchError> {
        let key = url.to_string();
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(key.clone());
        let (outcome, delay) = {
            let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
            match routes.get_mut(&key) {
                Some(route) => {
                    let outcome = if route.outcomes.len() > 1 {
                        route.outcomes.remove(0)
                    } else {
                        route.outcomes.first().cloned().unwrap_or(Err(not_found()))
                    };
                    (outcome, route.delay)
                }
                None => (Err(not_found()), Duration::ZERO),
            }
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        outcome
    }
}

fn not_found() -> FetchError {
    FetchError::Server { status: 404, message: "Not Found".to_string() }
}
