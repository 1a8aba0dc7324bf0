pub mod api;
pub mod cache;
pub mod config;
pub mod definitions;
pub mod detail;
pub mod drafts;
pub mod error;
pub mod format;
pub mod images;
pub mod list;
pub mod mapping;
pub mod registry;
pub mod storage;
pub mod theme;
pub mod transport;
pub mod types;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::detail::DetailSnapshot;
    pub use crate::error::{DraftError, FetchError, RegistryError};
    pub use crate::list::{Card, ListSnapshot};
    pub use crate::registry::{Link, Phase, ResolvedBlock, Resolution, ResourceKey};
    pub use crate::types::{Film, Person, Planet, Resource, Starship};
    pub use crate::{Holocron, SearchHit};
}

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;

use crate::api::SwapiClient;
use crate::config::Config;
use crate::detail::DetailSnapshot;
use crate::drafts::{DraftDesk, DraftReceipt};
use crate::error::{DraftError, FetchError, RegistryError};
use crate::images::PlaceholderImages;
use crate::list::ListSnapshot;
use crate::registry::{CatalogResource, Link, Registry, ResourceKey};
use crate::transport::{HttpTransport, Transport};
use crate::types::{Film, Person, Planet, Resource, Starship};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub label: String,
    pub link: Link,
}

/// Async library entry point. Owns the API client, the resource registry and the draft desk.
pub struct Holocron {
    config: Config,
    client: Arc<SwapiClient>,
    registry: Registry,
    drafts: DraftDesk,
}

impl Holocron {
    /// Live HTTP transport built from `config`.
    pub fn new(config: Config) -> Result<Self> {
        let transport =
            HttpTransport::new(&config.user_agent, config.request_timeout()).context("building http client")?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Result<Self> {
        let client = SwapiClient::new(transport, &config)
            .with_context(|| format!("invalid base url: {}", config.base_url))?;
        let images = PlaceholderImages::new(&config.image_base_url)
            .with_context(|| format!("invalid image base url: {}", config.image_base_url))?;
        let (client, images) = (Arc::new(client), Arc::new(images));
        let registry = Registry::standard(client.clone(), images, &config);
        let drafts = DraftDesk::new(config.draft_delay());
        Ok(Self { config, client, registry, drafts })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &Arc<SwapiClient> {
        &self.client
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Resolve an untrusted resource key, e.g. from a route or the command line.
    pub fn resource(&self, raw: &str) -> Result<Arc<dyn CatalogResource>, RegistryError> {
        self.registry.get_str(raw)
    }

    /// One page of a resource list. Errors are reported inside the snapshot.
    pub async fn list(&self, key: ResourceKey, page: i64) -> Result<ListSnapshot, RegistryError> {
        let list = self.registry.get(key)?.open_list();
        Ok(list.load(page).await)
    }

    /// One entity with its related blocks. Errors are reported inside the snapshot.
    pub async fn show(&self, key: ResourceKey, id: u64) -> Result<DetailSnapshot, RegistryError> {
        let detail = self.registry.get(key)?.open_detail();
        Ok(detail.load(id).await)
    }

    pub async fn search(&self, key: ResourceKey, query: &str) -> Result<Vec<SearchHit>, FetchError> {
        Ok(match key {
            ResourceKey::People => hits(self.client.search::<Person>(query).await?),
            ResourceKey::Films => hits(self.client.search::<Film>(query).await?),
            ResourceKey::Planets => hits(self.client.search::<Planet>(query).await?),
            ResourceKey::Starships => hits(self.client.search::<Starship>(query).await?),
        })
    }

    pub async fn submit_draft(
        &self,
        key: ResourceKey,
        fields: &[(String, String)],
    ) -> Result<DraftReceipt, DraftError> {
        self.drafts.submit(key, fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))).await
    }

    pub fn clear_cache(&self) {
        self.client.clear_cache();
    }
}

fn hits<T: Resource>(items: Vec<T>) -> Vec<SearchHit> {
    items
        .iter()
        .map(|item| SearchHit { label: item.display_name().to_string(), link: Link::to(item) })
        .collect()
}
