//! Table-based store client.
//!
//! The two entity tables sit behind [`PostStore`] and [`CommentStore`] so
//! the services can run against PostgreSQL in production and against
//! [`memory::MemoryStore`] in tests or local development.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::comment::{Comment, NewCommentInput};
use crate::domain::post::{NewPostInput, Post, PostUpdateInput, SortBy};
use crate::infra::db::Db;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no matching row")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn list_posts(&self, sort: SortBy) -> StoreResult<Vec<Post>>;

    /// Exactly one row, or `StoreError::NotFound`.
    async fn find_post(&self, id: Uuid) -> StoreResult<Post>;

    /// Inserts with `upvotes = 0` and the given creation time.
    async fn insert_post(&self, post: NewPostInput, created_at: OffsetDateTime)
        -> StoreResult<Post>;

    async fn update_post(&self, id: Uuid, changes: PostUpdateInput) -> StoreResult<Post>;

    /// Succeeds whether or not a row was removed.
    async fn delete_post(&self, id: Uuid) -> StoreResult<()>;

    /// Atomic `upvotes = upvotes + 1`.
    async fn increment_upvotes(&self, id: Uuid) -> StoreResult<Post>;

    async fn secret_key(&self, id: Uuid) -> StoreResult<String>;

    async fn ping(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Comments for one post, oldest first.
    async fn list_comments(&self, post_id: Uuid) -> StoreResult<Vec<Comment>>;

    async fn insert_comment(
        &self,
        comment: NewCommentInput,
        created_at: OffsetDateTime,
    ) -> StoreResult<Comment>;
}

/// Handle to both tables. Built once at startup and cloned into whatever
/// needs it.
#[derive(Clone)]
pub struct StoreClient {
    posts: Arc<dyn PostStore>,
    comments: Arc<dyn CommentStore>,
}

impl StoreClient {
    pub fn new(posts: Arc<dyn PostStore>, comments: Arc<dyn CommentStore>) -> Self {
        Self { posts, comments }
    }

    pub fn postgres(db: Db) -> Self {
        let store = Arc::new(postgres::PgStore::new(db));
        Self::new(store.clone(), store)
    }

    pub fn memory(store: memory::MemoryStore) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store)
    }

    pub fn posts(&self) -> &dyn PostStore {
        self.posts.as_ref()
    }

    pub fn comments(&self) -> &dyn CommentStore {
        self.comments.as_ref()
    }

    pub async fn ping(&self) -> StoreResult<()> {
        self.posts.ping().await
    }
}
