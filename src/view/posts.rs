use tokio::sync::Mutex;
use uuid::Uuid;

use crate::app::posts::PostService;
use crate::domain::post::{Post, PostFilter, SortBy};
use crate::view::{Generation, ViewState};

/// The post listing: every post in the current sort order.
pub struct PostsController {
    service: PostService,
    sort: Mutex<SortBy>,
    state: Mutex<ViewState<Vec<Post>>>,
    generation: Generation,
}

impl PostsController {
    pub async fn mount(service: PostService, sort: SortBy) -> Self {
        let controller = Self {
            service,
            sort: Mutex::new(sort),
            state: Mutex::new(ViewState::default()),
            generation: Generation::default(),
        };
        controller.refetch().await;
        controller
    }

    pub async fn sort(&self) -> SortBy {
        *self.sort.lock().await
    }

    /// Refetches only when the order actually changes.
    pub async fn set_sort(&self, sort: SortBy) {
        {
            let mut current = self.sort.lock().await;
            if *current == sort {
                return;
            }
            *current = sort;
        }
        self.refetch().await;
    }

    pub async fn refetch(&self) {
        let sort = self.sort().await;
        let generation = self.generation.next();
        self.state.lock().await.loading = true;

        let result = self.service.get_all(sort).await;

        let mut state = self.state.lock().await;
        if !self.generation.is_current(generation) {
            tracing::debug!(generation, sort = sort.as_str(), "discarding stale post list");
            return;
        }
        state.settle(result);
    }

    /// Upvotes and swaps the returned record into the list. On failure the
    /// list is left as it was and the error is recorded.
    pub async fn upvote_post(&self, id: Uuid, current_upvotes: i64) {
        let result = self.service.upvote(id, current_upvotes).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(updated) => {
                if let Some(slot) = state.data.iter_mut().find(|post| post.id == id) {
                    *slot = updated;
                }
            }
            Err(err) => state.error = Some(err),
        }
    }

    pub async fn state(&self) -> ViewState<Vec<Post>> {
        self.state.lock().await.clone()
    }

    /// The held list narrowed by `filter`, in the current sort order.
    pub async fn visible(&self, filter: &PostFilter) -> Vec<Post> {
        let state = self.state.lock().await;
        filter.apply(&state.data).into_iter().cloned().collect()
    }
}
