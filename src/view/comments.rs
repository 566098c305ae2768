use std::collections::BTreeMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::app::comments::CommentService;
use crate::domain::comment::{Comment, NewCommentInput};
use crate::error::{BoardError, BoardResult};
use crate::view::{Generation, ViewState};

pub const EMPTY_COMMENT: &str = "Comment cannot be empty";

/// Comments of one post, oldest first.
pub struct CommentsController {
    service: CommentService,
    post_id: Mutex<Uuid>,
    state: Mutex<ViewState<Vec<Comment>>>,
    generation: Generation,
}

impl CommentsController {
    pub async fn mount(service: CommentService, post_id: Uuid) -> Self {
        let controller = Self {
            service,
            post_id: Mutex::new(post_id),
            state: Mutex::new(ViewState::default()),
            generation: Generation::default(),
        };
        controller.refetch().await;
        controller
    }

    pub async fn post_id(&self) -> Uuid {
        *self.post_id.lock().await
    }

    pub async fn set_post_id(&self, post_id: Uuid) {
        {
            let mut current = self.post_id.lock().await;
            if *current == post_id {
                return;
            }
            *current = post_id;
        }
        self.refetch().await;
    }

    pub async fn refetch(&self) {
        let post_id = self.post_id().await;
        let generation = self.generation.next();
        self.state.lock().await.loading = true;

        let result = self.service.get_by_post_id(post_id).await;

        let mut state = self.state.lock().await;
        if !self.generation.is_current(generation) {
            tracing::debug!(generation, post_id = %post_id, "discarding stale comments");
            return;
        }
        state.settle(result);
    }

    /// Creates a comment on the current post and appends it to the list.
    /// A failure is recorded and also returned so the caller can keep the
    /// draft around.
    pub async fn add_comment(&self, content: impl Into<String>) -> BoardResult<Comment> {
        let content = content.into();
        if content.trim().is_empty() {
            let mut fields = BTreeMap::new();
            fields.insert("content".to_string(), EMPTY_COMMENT.to_string());
            return Err(BoardError::Validation(fields));
        }

        let post_id = self.post_id().await;
        let result = self
            .service
            .create(NewCommentInput { post_id, content })
            .await;

        let mut state = self.state.lock().await;
        match result {
            Ok(comment) => {
                // The view may have moved to another post meanwhile.
                if self.post_id().await == comment.post_id {
                    state.data.push(comment.clone());
                }
                Ok(comment)
            }
            Err(err) => {
                state.error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub async fn state(&self) -> ViewState<Vec<Comment>> {
        self.state.lock().await.clone()
    }
}
