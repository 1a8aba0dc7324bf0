use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::api::SwapiClient;
use crate::config::Config;
use crate::definitions;
use crate::detail::{DetailSnapshot, DetailView};
use crate::error::{FetchError, RegistryError};
use crate::images::{ImageDefinition, PlaceholderImages};
use crate::list::{ListSnapshot, ListView};
use crate::mapping::resource_id;
use crate::types::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKey {
    People,
    Films,
    Planets,
    Starships,
}

impl ResourceKey {
    pub const ALL: [ResourceKey; 4] = [Self::People, Self::Films, Self::Planets, Self::Starships];

    /// Route segment and API collection name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::People => "people",
            Self::Films => "films",
            Self::Planets => "planets",
            Self::Starships => "starships",
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKey {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| RegistryError::InvalidResourceKey(s.to_string()))
    }
}

/// Navigation target: a detail page, or the list root when there is no id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Link {
    pub resource: ResourceKey,
    pub id: Option<u64>,
}

impl Link {
    pub fn list(resource: ResourceKey) -> Self {
        Self { resource, id: None }
    }

    pub fn detail(resource: ResourceKey, id: u64) -> Self {
        Self { resource, id: Some(id) }
    }

    pub fn to<U: Resource>(item: &U) -> Self {
        Self { resource: U::KEY, id: resource_id(item) }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "/{}/{id}", self.resource),
            None => write!(f, "/{}", self.resource),
        }
    }
}

// --- view-model pieces shared by list and detail ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValue {
    pub label: String,
    pub value: String,
}

/// A labelled value rendered from an entity.
pub struct UiField<T> {
    pub label: String,
    pub value: fn(&T) -> String,
}

impl<T> UiField<T> {
    pub fn new(label: impl Into<String>, value: fn(&T) -> String) -> Self {
        Self { label: label.into(), value }
    }

    pub fn render(&self, item: &T) -> FieldValue {
        FieldValue { label: self.label.clone(), value: (self.value)(item) }
    }
}

#[derive(Debug, Clone)]
pub struct Titles {
    pub list_title: String,
    pub detail_kicker: String,
    pub document_title_list: String,
    pub document_title_detail: String,
}

// --- loaders ---

pub type ListLoader<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<T>, FetchError>> + Send + Sync>;
pub type ByIdLoader<T> = Arc<dyn Fn(u64) -> BoxFuture<'static, Result<T, FetchError>> + Send + Sync>;
pub type UrlLoader<U> = Arc<dyn Fn(String) -> BoxFuture<'static, Result<U, FetchError>> + Send + Sync>;
pub type ManyLoader<U> = Arc<dyn Fn(Vec<String>) -> BoxFuture<'static, Result<Vec<U>, FetchError>> + Send + Sync>;

pub struct ListSpec<T> {
    pub page_size: usize,
    pub loading_message: String,
    pub empty_message: String,
    pub error_message: String,
    pub get_all: ListLoader<T>,
    pub sort: Option<fn(Vec<T>) -> Vec<T>>,
    pub image: ImageDefinition<T>,
    pub card_title: fn(&T) -> String,
    pub card_fields: Vec<UiField<T>>,
}

pub struct DetailSpec<T> {
    pub loading_message: String,
    pub error_message: String,
    pub back_label: String,
    pub get_by_id: ByIdLoader<T>,
    pub title: fn(&T) -> String,
    pub subtitle: Option<fn(&T) -> String>,
    pub image: ImageDefinition<T>,
    pub fields: Vec<UiField<T>>,
    pub related: Vec<RelatedBlock<T>>,
}

/// Everything the generic list and detail views need to know about one kind.
pub struct ResourceDefinition<T> {
    pub key: ResourceKey,
    pub route_base: String,
    pub titles: Titles,
    pub list: ListSpec<T>,
    pub detail: DetailSpec<T>,
}

// --- related blocks ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedItem {
    pub label: String,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
    pub link: Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Resolution {
    Single(Option<RelatedItem>),
    List(Vec<RelatedItem>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBlock {
    pub title: String,
    pub content: Resolution,
}

/// How a related entity of kind `U` is shown once loaded.
pub struct RelatedPresenter<U> {
    pub link: fn(&U) -> Link,
    pub label: fn(&U) -> String,
    pub subtitle: Option<fn(&U) -> String>,
    pub image: Option<ImageDefinition<U>>,
}

impl<U: Resource> RelatedPresenter<U> {
    pub fn new(label: fn(&U) -> String) -> Self {
        Self { link: Link::to::<U>, label, subtitle: None, image: None }
    }

    pub fn subtitle(mut self, subtitle: fn(&U) -> String) -> Self {
        self.subtitle = Some(subtitle);
        self
    }

    pub fn image(mut self, image: ImageDefinition<U>) -> Self {
        self.image = Some(image);
        self
    }

    fn present(&self, item: &U, images: &PlaceholderImages) -> RelatedItem {
        RelatedItem {
            label: (self.label)(item),
            subtitle: self.subtitle.map(|f| f(item)),
            image_url: self.image.as_ref().map(|def| images.image_for(def, item)),
            link: (self.link)(item),
        }
    }
}

type ResolveOne =
    Arc<dyn Fn(String, Arc<PlaceholderImages>) -> BoxFuture<'static, Result<RelatedItem, FetchError>> + Send + Sync>;
type ResolveMany = Arc<
    dyn Fn(Vec<String>, Arc<PlaceholderImages>) -> BoxFuture<'static, Result<Vec<RelatedItem>, FetchError>>
        + Send
        + Sync,
>;

enum BlockKind<T> {
    Single { get_url: fn(&T) -> Option<String>, resolve: ResolveOne },
    List { get_urls: fn(&T) -> Vec<String>, limit: Option<usize>, resolve: ResolveMany },
}

/// Secondary content on a detail page. The related kind is erased at
/// construction so blocks over different kinds share one `Vec`.
pub struct RelatedBlock<T> {
    pub title: String,
    kind: BlockKind<T>,
}

impl<T: Resource> RelatedBlock<T> {
    pub fn single<U: Resource>(
        title: impl Into<String>,
        get_url: fn(&T) -> Option<String>,
        load: UrlLoader<U>,
        presenter: RelatedPresenter<U>,
    ) -> Self {
        let presenter = Arc::new(presenter);
        let resolve: ResolveOne = Arc::new(move |url: String, images: Arc<PlaceholderImages>| {
            let (load, presenter) = (load.clone(), presenter.clone());
            async move { load(url).await.map(|item| presenter.present(&item, &images)) }.boxed()
        });
        Self { title: title.into(), kind: BlockKind::Single { get_url, resolve } }
    }

    pub fn list<U: Resource>(
        title: impl Into<String>,
        get_urls: fn(&T) -> Vec<String>,
        load: ManyLoader<U>,
        presenter: RelatedPresenter<U>,
    ) -> Self {
        let presenter = Arc::new(presenter);
        let resolve: ResolveMany = Arc::new(move |urls: Vec<String>, images: Arc<PlaceholderImages>| {
            let (load, presenter) = (load.clone(), presenter.clone());
            async move {
                load(urls).await.map(|items| items.iter().map(|item| presenter.present(item, &images)).collect())
            }
            .boxed()
        });
        Self { title: title.into(), kind: BlockKind::List { get_urls, limit: None, resolve } }
    }

    /// Follow at most `n` URLs of a list block, keeping the first ones. `0` means no cap.
    pub fn limit(mut self, n: usize) -> Self {
        if let BlockKind::List { limit, .. } = &mut self.kind {
            *limit = (n > 0).then_some(n);
        }
        self
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, BlockKind::List { .. })
    }

    /// URLs this block would follow for `item`, after the cap.
    pub fn urls(&self, item: &T) -> Vec<String> {
        match &self.kind {
            BlockKind::Single { get_url, .. } => get_url(item).filter(|u| !u.is_empty()).into_iter().collect(),
            BlockKind::List { get_urls, limit, .. } => {
                let mut urls = get_urls(item);
                if let Some(n) = limit {
                    urls.truncate(*n);
                }
                urls
            }
        }
    }

    /// Never fails: a missing URL or a failed load yields an empty result.
    pub async fn resolve(&self, item: &T, images: &Arc<PlaceholderImages>) -> ResolvedBlock {
        let mut urls = self.urls(item);
        let content = match &self.kind {
            BlockKind::Single { resolve, .. } => match urls.pop() {
                None => Resolution::Single(None),
                Some(url) => match resolve(url, images.clone()).await {
                    Ok(related) => Resolution::Single(Some(related)),
                    Err(e) => {
                        tracing::warn!(block = %self.title, error = %e, "error loading related single");
                        Resolution::Single(None)
                    }
                },
            },
            BlockKind::List { .. } if urls.is_empty() => Resolution::List(Vec::new()),
            BlockKind::List { resolve, .. } => match resolve(urls, images.clone()).await {
                Ok(related) => Resolution::List(related),
                Err(e) => {
                    tracing::warn!(block = %self.title, error = %e, "error loading related list");
                    Resolution::List(Vec::new())
                }
            },
        };
        ResolvedBlock { title: self.title.clone(), content }
    }
}

// --- object-safe face of a definition ---

#[async_trait]
pub trait ListController: Send + Sync {
    /// Pages outside `[1, total_pages]` are clamped.
    async fn load(&self, page: i64) -> ListSnapshot;
    async fn next_page(&self) -> ListSnapshot;
    async fn previous_page(&self) -> ListSnapshot;
    /// Drop the cached collection and reload page 1.
    async fn retry(&self) -> ListSnapshot;
    fn snapshot(&self) -> ListSnapshot;
    /// Ignore any completion still in flight.
    fn close(&self);
}

#[async_trait]
pub trait DetailController: Send + Sync {
    async fn load(&self, id: u64) -> DetailSnapshot;
    async fn retry(&self) -> DetailSnapshot;
    fn snapshot(&self) -> DetailSnapshot;
    fn close(&self);
}

pub trait CatalogResource: Send + Sync {
    fn key(&self) -> ResourceKey;
    fn route_base(&self) -> &str;
    fn titles(&self) -> &Titles;
    fn page_size(&self) -> usize;
    fn open_list(&self) -> Box<dyn ListController>;
    fn open_detail(&self) -> Box<dyn DetailController>;
}

struct Catalog<T> {
    def: Arc<ResourceDefinition<T>>,
    images: Arc<PlaceholderImages>,
}

impl<T: Resource> CatalogResource for Catalog<T> {
    fn key(&self) -> ResourceKey {
        self.def.key
    }

    fn route_base(&self) -> &str {
        &self.def.route_base
    }

    fn titles(&self) -> &Titles {
        &self.def.titles
    }

    fn page_size(&self) -> usize {
        self.def.list.page_size
    }

    fn open_list(&self) -> Box<dyn ListController> {
        Box::new(ListView::new(self.def.clone(), self.images.clone()))
    }

    fn open_detail(&self) -> Box<dyn DetailController> {
        Box::new(DetailView::new(self.def.clone(), self.images.clone()))
    }
}

/// Key -> definition table. New kinds are added with [`Registry::register`].
pub struct Registry {
    images: Arc<PlaceholderImages>,
    entries: HashMap<ResourceKey, Arc<dyn CatalogResource>>,
}

impl Registry {
    pub fn new(images: Arc<PlaceholderImages>) -> Self {
        Self { images, entries: HashMap::new() }
    }

    /// People, films, planets and starships over `client`.
    pub fn standard(client: Arc<SwapiClient>, images: Arc<PlaceholderImages>, config: &Config) -> Self {
        let mut registry = Self::new(images);
        registry
            .register(definitions::people(&client, config))
            .register(definitions::films(&client, config))
            .register(definitions::planets(&client, config))
            .register(definitions::starships(&client, config));
        registry
    }

    /// Replaces any previous definition for the same key.
    pub fn register<T: Resource>(&mut self, def: ResourceDefinition<T>) -> &mut Self {
        let key = def.key;
        let entry = Catalog { def: Arc::new(def), images: self.images.clone() };
        if self.entries.insert(key, Arc::new(entry)).is_some() {
            tracing::debug!(%key, "replaced resource definition");
        }
        self
    }

    pub fn get(&self, key: ResourceKey) -> Result<Arc<dyn CatalogResource>, RegistryError> {
        self.entries.get(&key).cloned().ok_or(RegistryError::NotRegistered(key))
    }

    /// Resolve an untrusted key such as a route parameter.
    pub fn get_str(&self, raw: &str) -> Result<Arc<dyn CatalogResource>, RegistryError> {
        self.get(raw.parse()?)
    }

    pub fn keys(&self) -> Vec<ResourceKey> {
        let mut keys: Vec<ResourceKey> = self.entries.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn images(&self) -> &Arc<PlaceholderImages> {
        &self.images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::ImageSize;
    use crate::types::{Film, Person, Planet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn images() -> Arc<PlaceholderImages> {
        Arc::new(PlaceholderImages::new("https://picsum.photos").unwrap())
    }

    fn film(id: u64) -> Film {
        Film {
            title: format!("Film {id}"),
            episode_id: id as u32,
            url: format!("https://swapi.test/api/films/{id}"),
            ..Default::default()
        }
    }

    fn counting_films(calls: Arc<AtomicUsize>, seen: Arc<std::sync::Mutex<Vec<String>>>) -> ManyLoader<Film> {
        Arc::new(move |urls: Vec<String>| {
            calls.fetch_add(1, Ordering::SeqCst);
            seen.lock().unwrap().extend(urls.iter().cloned());
            let films: Vec<Film> =
                urls.iter().filter_map(|u| crate::mapping::extract_id_from_url(u)).map(film).collect();
            async move { Ok::<_, FetchError>(films) }.boxed()
        })
    }

    fn films_block(loader: ManyLoader<Film>) -> RelatedBlock<Person> {
        RelatedBlock::list("Filme", |p: &Person| p.films.clone(), loader, RelatedPresenter::new(|f: &Film| f.title.clone()))
    }

    #[test]
    fn keys_parse_and_display() {
        for key in ResourceKey::ALL {
            assert_eq!(key.as_str().parse::<ResourceKey>().unwrap(), key);
            assert_eq!(key.to_string(), key.as_str());
        }
        let err = "vehicles".parse::<ResourceKey>().unwrap_err();
        assert_eq!(err, RegistryError::InvalidResourceKey("vehicles".into()));
        assert_eq!(err.to_string(), "Invalid resource: 'vehicles'");
    }

    #[test]
    fn links_render_as_routes() {
        assert_eq!(Link::detail(ResourceKey::Planets, 1).to_string(), "/planets/1");
        assert_eq!(Link::list(ResourceKey::Films).to_string(), "/films");
        let nameless = Planet { name: "Hoth".into(), ..Default::default() };
        assert_eq!(Link::to(&nameless), Link::list(ResourceKey::Planets));
    }

    #[tokio::test]
    async fn empty_list_block_never_calls_loader() {
        let calls = Arc::new(AtomicUsize::new(0));
        let block = films_block(counting_films(calls.clone(), Default::default()));
        let resolved = block.resolve(&Person::default(), &images()).await;
        assert_eq!(resolved.content, Resolution::List(Vec::new()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn limit_keeps_first_urls_in_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let block = films_block(counting_films(calls.clone(), seen.clone())).limit(2);
        let person = Person {
            films: (1..=4).map(|i| format!("https://swapi.test/api/films/{i}")).collect(),
            ..Default::default()
        };
        let resolved = block.resolve(&person, &images()).await;
        let Resolution::List(items) = resolved.content else { panic!("expected list") };
        assert_eq!(items.iter().map(|i| i.label.as_str()).collect::<Vec<_>>(), vec!["Film 1", "Film 2"]);
        assert_eq!(items[0].link, Link::detail(ResourceKey::Films, 1));
        assert_eq!(*seen.lock().unwrap(), person.films[..2].to_vec());
    }

    #[tokio::test]
    async fn zero_limit_follows_every_url() {
        let calls = Arc::new(AtomicUsize::new(0));
        let block = films_block(counting_films(calls.clone(), Default::default())).limit(0);
        let person = Person {
            films: (1..=7).map(|i| format!("https://swapi.test/api/films/{i}")).collect(),
            ..Default::default()
        };
        assert_eq!(block.urls(&person).len(), 7);
        let Resolution::List(items) = block.resolve(&person, &images()).await.content else { panic!("expected list") };
        assert_eq!(items.len(), 7);
    }

    #[tokio::test]
    async fn failing_single_resolves_to_none() {
        let loader: UrlLoader<Planet> =
            Arc::new(|_url: String| async { Err::<Planet, _>(FetchError::Network("down".into())) }.boxed());
        let block = RelatedBlock::single(
            "Heimatplanet",
            |p: &Person| Some(p.homeworld.clone()),
            loader,
            RelatedPresenter::new(|p: &Planet| p.name.clone()),
        );
        let person = Person { homeworld: "https://swapi.test/api/planets/1".into(), ..Default::default() };
        assert_eq!(block.resolve(&person, &images()).await.content, Resolution::Single(None));
        assert!(block.urls(&Person::default()).is_empty());
    }

    #[tokio::test]
    async fn presenter_builds_images_and_subtitles() {
        let loader: UrlLoader<Film> = Arc::new(|_url: String| async { Ok::<_, FetchError>(film(4)) }.boxed());
        let presenter = RelatedPresenter::new(|f: &Film| f.title.clone())
            .subtitle(|f: &Film| crate::format::episode_label(f.episode_id))
            .image(ImageDefinition { seed: crate::mapping::seed_for::<Film>, size: ImageSize::THUMB });
        let url = |_p: &Person| Some("https://swapi.test/api/films/4".to_string());
        let block = RelatedBlock::single("Film", url, loader, presenter);
        let Resolution::Single(Some(item)) = block.resolve(&Person::default(), &images()).await.content else {
            panic!("expected item")
        };
        assert_eq!(item.subtitle.as_deref(), Some("Episode 4"));
        assert_eq!(item.image_url.as_deref(), Some("https://picsum.photos/seed/film-4/512/256"));
    }

    #[test]
    fn unknown_keys_are_rejected_by_the_registry() {
        let registry = Registry::new(images());
        assert_eq!(registry.get_str("droids").err(), Some(RegistryError::InvalidResourceKey("droids".into())));
        assert_eq!(registry.get(ResourceKey::People).err(), Some(RegistryError::NotRegistered(ResourceKey::People)));
    }
}
