use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::comment::{Comment, NewCommentInput};
use crate::error::{BoardError, BoardResult};
use crate::infra::store::StoreClient;

#[derive(Clone)]
pub struct CommentService {
    store: StoreClient,
}

impl CommentService {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    /// Oldest first.
    pub async fn get_by_post_id(&self, post_id: Uuid) -> BoardResult<Vec<Comment>> {
        self.store
            .comments()
            .list_comments(post_id)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, post_id = %post_id, "failed to list comments");
                BoardError::from_store(err, "comment")
            })
    }

    pub async fn create(&self, input: NewCommentInput) -> BoardResult<Comment> {
        let post_id = input.post_id;
        self.store
            .comments()
            .insert_comment(input, OffsetDateTime::now_utc())
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, post_id = %post_id, "failed to create comment");
                BoardError::from_store(err, "post")
            })
    }
}
