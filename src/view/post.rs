use tokio::sync::Mutex;
use uuid::Uuid;

use crate::app::posts::PostService;
use crate::domain::post::{Post, PostPatch};
use crate::error::{BoardError, BoardResult};
use crate::view::{Generation, ViewState};

pub struct PostController {
    service: PostService,
    id: Mutex<Uuid>,
    state: Mutex<ViewState<Option<Post>>>,
    generation: Generation,
}

impl PostController {
    pub async fn mount(service: PostService, id: Uuid) -> Self {
        let controller = Self {
            service,
            id: Mutex::new(id),
            state: Mutex::new(ViewState::default()),
            generation: Generation::default(),
        };
        controller.refetch().await;
        controller
    }

    pub async fn id(&self) -> Uuid {
        *self.id.lock().await
    }

    pub async fn set_id(&self, id: Uuid) {
        {
            let mut current = self.id.lock().await;
            if *current == id {
                return;
            }
            *current = id;
        }
        self.refetch().await;
    }

    pub async fn refetch(&self) {
        let id = self.id().await;
        let generation = self.generation.next();
        self.state.lock().await.loading = true;

        let result = self.service.get_by_id(id).await.map(Some);

        let mut state = self.state.lock().await;
        if !self.generation.is_current(generation) {
            tracing::debug!(generation, post_id = %id, "discarding stale post");
            return;
        }
        state.settle(result);
    }

    /// Merges fields into the held copy without going back to the store.
    /// Does nothing while no post is loaded.
    pub async fn update_post(&self, patch: PostPatch) {
        if let Some(post) = self.state.lock().await.data.as_mut() {
            post.apply(patch);
        }
    }

    /// Upvotes the held post and merges the stored result.
    pub async fn upvote(&self) -> BoardResult<Post> {
        let (id, upvotes) = {
            let state = self.state.lock().await;
            let post = state.data.as_ref().ok_or(BoardError::NotFound("post"))?;
            (post.id, post.upvotes)
        };

        let updated = self.service.upvote(id, upvotes).await?;
        if self.id().await == updated.id {
            self.update_post(updated.clone().into()).await;
        }
        Ok(updated)
    }

    pub async fn state(&self) -> ViewState<Option<Post>> {
        self.state.lock().await.clone()
    }
}
