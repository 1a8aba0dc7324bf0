use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::images::PlaceholderImages;
use crate::mapping::resource_id;
use crate::registry::{FieldValue, Link, ListController, Phase, ResourceDefinition, ResourceKey};
use crate::types::Resource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub id: Option<u64>,
    pub title: String,
    pub image_url: String,
    pub fields: Vec<FieldValue>,
    pub link: Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSnapshot {
    pub resource: ResourceKey,
    pub title: String,
    pub phase: Phase,
    pub loading_message: String,
    pub empty_message: String,
    pub cards: Vec<Card>,
    pub current_page: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

struct ListState<T> {
    generation: u64,
    phase: Phase,
    items: Option<Vec<T>>,
    current_page: usize,
}

/// Client-side paginated list over one full collection fetch.
///
/// The collection is fetched once and kept until [`ListView::retry`].
/// Each `load` starts a new generation; a completion that belongs to an
/// older generation (or arrives after `close`) is dropped.
pub struct ListView<T> {
    def: Arc<ResourceDefinition<T>>,
    images: Arc<PlaceholderImages>,
    state: Mutex<ListState<T>>,
}

impl<T: Resource> ListView<T> {
    pub fn new(def: Arc<ResourceDefinition<T>>, images: Arc<PlaceholderImages>) -> Self {
        let state = ListState { generation: 0, phase: Phase::Idle, items: None, current_page: 1 };
        Self { def, images, state: Mutex::new(state) }
    }

    pub async fn load(&self, page: i64) -> ListSnapshot {
        let generation = {
            let mut st = self.lock();
            st.generation += 1;
            if let Some(total) = st.items.as_ref().map(Vec::len) {
                st.current_page = clamp_page(page, total_pages(total, self.page_size()));
                st.phase = Phase::Ready;
                return self.render(&st);
            }
            st.phase = Phase::Loading;
            st.generation
        };

        tracing::debug!(resource = %self.def.key, page, "loading collection");
        let result = (self.def.list.get_all)().await;

        let mut st = self.lock();
        if st.generation != generation {
            tracing::debug!(resource = %self.def.key, "discarding stale list response");
            return self.render(&st);
        }
        match result {
            Ok(items) => {
                let items = match self.def.list.sort {
                    Some(sort) => sort(items),
                    None => items,
                };
                st.current_page = clamp_page(page, total_pages(items.len(), self.page_size()));
                st.items = Some(items);
                st.phase = Phase::Ready;
            }
            Err(e) => {
                tracing::error!(resource = %self.def.key, error = %e.user_message(), "error loading list");
                st.phase = Phase::Error(self.def.list.error_message.clone());
            }
        }
        self.render(&st)
    }

    pub async fn next_page(&self) -> ListSnapshot {
        let page = self.lock().current_page as i64;
        self.load(page + 1).await
    }

    pub async fn previous_page(&self) -> ListSnapshot {
        let page = self.lock().current_page as i64;
        self.load(page - 1).await
    }

    pub async fn retry(&self) -> ListSnapshot {
        {
            let mut st = self.lock();
            st.items = None;
            st.current_page = 1;
        }
        self.load(1).await
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.render(&self.lock())
    }

    pub fn close(&self) {
        let mut st = self.lock();
        st.generation += 1;
        if st.phase == Phase::Loading {
            st.phase = Phase::Idle;
        }
    }

    fn page_size(&self) -> usize {
        self.def.list.page_size.max(1)
    }

    fn render(&self, st: &ListState<T>) -> ListSnapshot {
        let list = &self.def.list;
        let page_size = self.page_size();
        let total_count = st.items.as_ref().map_or(0, Vec::len);
        let total_pages = total_pages(total_count, page_size);
        let current_page = st.current_page.clamp(1, total_pages);
        let cards = st
            .items
            .iter()
            .flat_map(|items| items.iter().skip((current_page - 1) * page_size).take(page_size))
            .map(|item| {
                let id = resource_id(item);
                Card {
                    id,
                    title: (list.card_title)(item),
                    image_url: self.images.image_for(&list.image, item),
                    fields: list.card_fields.iter().map(|f| f.render(item)).collect(),
                    link: match id {
                        Some(id) => Link::detail(self.def.key, id),
                        None => Link::list(self.def.key),
                    },
                }
            })
            .collect();
        ListSnapshot {
            resource: self.def.key,
            title: self.def.titles.list_title.clone(),
            phase: st.phase.clone(),
            loading_message: list.loading_message.clone(),
            empty_message: list.empty_message.clone(),
            cards,
            current_page,
            page_size,
            total_count,
            total_pages,
            has_next_page: current_page < total_pages,
            has_previous_page: current_page > 1,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ListState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size).max(1)
}

fn clamp_page(page: i64, total_pages: usize) -> usize {
    page.clamp(1, total_pages as i64) as usize
}

#[async_trait]
impl<T: Resource> ListController for ListView<T> {
    async fn load(&self, page: i64) -> ListSnapshot {
        ListView::load(self, page).await
    }

    async fn next_page(&self) -> ListSnapshot {
        ListView::next_page(self).await
    }

    async fn previous_page(&self) -> ListSnapshot {
        ListView::previous_page(self).await
    }

    async fn retry(&self) -> ListSnapshot {
        ListView::retry(self).await
    }

    fn snapshot(&self) -> ListSnapshot {
        ListView::snapshot(self)
    }

    fn close(&self) {
        ListView::close(self)
    }
}
