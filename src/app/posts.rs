use subtle::ConstantTimeEq;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::post::{NewPostInput, Post, PostUpdateInput, SortBy};
use crate::error::{BoardError, BoardResult};
use crate::infra::store::StoreClient;

#[derive(Clone)]
pub struct PostService {
    store: StoreClient,
}

impl PostService {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    pub async fn get_all(&self, sort: SortBy) -> BoardResult<Vec<Post>> {
        self.store.posts().list_posts(sort).await.map_err(|err| {
            tracing::error!(error = ?err, sort = sort.as_str(), "failed to list posts");
            BoardError::from_store(err, "post")
        })
    }

    pub async fn get_by_id(&self, id: Uuid) -> BoardResult<Post> {
        self.store
            .posts()
            .find_post(id)
            .await
            .map_err(|err| BoardError::from_store(err, "post"))
    }

    pub async fn create(&self, input: NewPostInput) -> BoardResult<Post> {
        let community = input.community;
        let post = self
            .store
            .posts()
            .insert_post(input, OffsetDateTime::now_utc())
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, %community, "failed to create post");
                BoardError::from_store(err, "post")
            })?;

        tracing::info!(post_id = %post.id, %community, "post created");
        Ok(post)
    }

    /// Replaces the given fields. Callers are expected to have passed the
    /// secret-key check already.
    pub async fn update(&self, id: Uuid, changes: PostUpdateInput) -> BoardResult<Post> {
        self.store
            .posts()
            .update_post(id, changes)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, post_id = %id, "failed to update post");
                BoardError::from_store(err, "post")
            })
    }

    pub async fn delete(&self, id: Uuid) -> BoardResult<()> {
        self.store.posts().delete_post(id).await.map_err(|err| {
            tracing::error!(error = ?err, post_id = %id, "failed to delete post");
            BoardError::from_store(err, "post")
        })?;

        tracing::info!(post_id = %id, "post deleted");
        Ok(())
    }

    /// Adds one upvote. `current_upvotes` is the count the caller last saw;
    /// the store increments atomically so a stale value never loses votes.
    pub async fn upvote(&self, id: Uuid, current_upvotes: i64) -> BoardResult<Post> {
        let post = self
            .store
            .posts()
            .increment_upvotes(id)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, post_id = %id, "failed to upvote post");
                BoardError::from_store(err, "post")
            })?;

        if current_upvotes.checked_add(1) != Some(post.upvotes) {
            tracing::debug!(
                post_id = %id,
                seen = current_upvotes,
                stored = post.upvotes,
                "upvoted from a stale count"
            );
        }

        Ok(post)
    }

    pub async fn verify_secret_key(&self, id: Uuid, key: &str) -> BoardResult<bool> {
        let stored = self
            .store
            .posts()
            .secret_key(id)
            .await
            .map_err(|err| BoardError::from_store(err, "post"))?;

        Ok(stored.as_bytes().ct_eq(key.as_bytes()).into())
    }
}
