use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::images::PlaceholderImages;
use crate::registry::{DetailController, FieldValue, Link, Phase, ResolvedBlock, ResourceDefinition, ResourceKey};
use crate::types::Resource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailSnapshot {
    pub resource: ResourceKey,
    pub kicker: String,
    pub phase: Phase,
    pub loading_message: String,
    pub id: Option<u64>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
    pub fields: Vec<FieldValue>,
    pub back_label: String,
    pub back_link: Link,
    pub related: Vec<ResolvedBlock>,
}

struct DetailState<T> {
    generation: u64,
    phase: Phase,
    id: Option<u64>,
    item: Option<T>,
    related: Vec<ResolvedBlock>,
}

/// One entity plus its related blocks.
///
/// Blocks resolve concurrently once the primary entity is in; the view is
/// ready when the slowest block settles. A block never fails the page.
pub struct DetailView<T> {
    def: Arc<ResourceDefinition<T>>,
    images: Arc<PlaceholderImages>,
    state: Mutex<DetailState<T>>,
}

impl<T: Resource> DetailView<T> {
    pub fn new(def: Arc<ResourceDefinition<T>>, images: Arc<PlaceholderImages>) -> Self {
        let state = DetailState { generation: 0, phase: Phase::Idle, id: None, item: None, related: Vec::new() };
        Self { def, images, state: Mutex::new(state) }
    }

    pub async fn load(&self, id: u64) -> DetailSnapshot {
        let generation = {
            let mut st = self.lock();
            st.generation += 1;
            st.phase = Phase::Loading;
            st.id = Some(id);
            st.item = None;
            st.related.clear();
            st.generation
        };

        let item = match (self.def.detail.get_by_id)(id).await {
            Ok(item) => item,
            Err(e) => {
                let mut st = self.lock();
                if st.generation == generation {
                    tracing::error!(resource = %self.def.key, id, error = %e.user_message(), "error loading detail");
                    st.phase = Phase::Error(self.def.detail.error_message.clone());
                }
                return self.render(&st);
            }
        };

        {
            let mut st = self.lock();
            if st.generation != generation {
                tracing::debug!(resource = %self.def.key, id, "discarding stale detail response");
                return self.render(&st);
            }
            st.item = Some(item.clone());
            if self.def.detail.related.is_empty() {
                st.phase = Phase::Ready;
                return self.render(&st);
            }
        }

        let related = join_all(self.def.detail.related.iter().map(|block| block.resolve(&item, &self.images))).await;

        let mut st = self.lock();
        if st.generation != generation {
            tracing::debug!(resource = %self.def.key, id, "discarding stale related blocks");
            return self.render(&st);
        }
        st.related = related;
        st.phase = Phase::Ready;
        self.render(&st)
    }

    /// Reload the last requested id.
    pub async fn retry(&self) -> DetailSnapshot {
        let id = self.lock().id;
        match id {
            Some(id) => self.load(id).await,
            None => self.snapshot(),
        }
    }

    pub fn snapshot(&self) -> DetailSnapshot {
        self.render(&self.lock())
    }

    pub fn close(&self) {
        let mut st = self.lock();
        st.generation += 1;
        if st.phase == Phase::Loading {
            st.phase = Phase::Idle;
        }
    }

    fn render(&self, st: &DetailState<T>) -> DetailSnapshot {
        let detail = &self.def.detail;
        let item = st.item.as_ref();
        DetailSnapshot {
            resource: self.def.key,
            kicker: self.def.titles.detail_kicker.clone(),
            phase: st.phase.clone(),
            loading_message: detail.loading_message.clone(),
            id: st.id,
            title: item.map(|i| (detail.title)(i)),
            subtitle: item.and_then(|i| detail.subtitle.map(|f| f(i))),
            image_url: item.map(|i| self.images.image_for(&detail.image, i)),
            fields: item.map(|i| detail.fields.iter().map(|f| f.render(i)).collect()).unwrap_or_default(),
            back_label: detail.back_label.clone(),
            back_link: Link::list(self.def.key),
            related: st.related.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DetailState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<T: Resource> DetailController for DetailView<T> {
    async fn load(&self, id: u64) -> DetailSnapshot {
        DetailView::load(self, id).await
    }

    async fn retry(&self) -> DetailSnapshot {
        DetailView::retry(self).await
    }

    fn snapshot(&self) -> DetailSnapshot {
        DetailView::snapshot(self)
    }

    fn close(&self) {
        DetailView::close(self)
    }
}
