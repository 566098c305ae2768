use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::comment::{Comment, NewCommentInput};
use crate::domain::post::{NewPostInput, Post, PostUpdateInput, SortBy};
use crate::infra::store::{CommentStore, PostStore, StoreError, StoreResult};

#[derive(Debug, Clone)]
struct PostRow {
    seq: u64,
    post: Post,
    secret_key: String,
}

#[derive(Debug, Clone)]
struct CommentRow {
    seq: u64,
    comment: Comment,
}

#[derive(Default)]
struct Tables {
    next_seq: u64,
    posts: Vec<PostRow>,
    comments: Vec<CommentRow>,
}

impl Tables {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn post_mut(&mut self, id: Uuid) -> StoreResult<&mut PostRow> {
        self.posts
            .iter_mut()
            .find(|row| row.post.id == id)
            .ok_or(StoreError::NotFound)
    }
}

/// Process-local store. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail as if the store were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn list_posts(&self, sort: SortBy) -> StoreResult<Vec<Post>> {
        let tables = self.tables()?;
        let mut rows: Vec<&PostRow> = tables.posts.iter().collect();
        match sort {
            SortBy::Newest => rows.sort_by(|a, b| {
                (b.post.created_at, b.seq).cmp(&(a.post.created_at, a.seq))
            }),
            SortBy::Popular => rows.sort_by(|a, b| {
                (b.post.upvotes, b.post.created_at, b.seq)
                    .cmp(&(a.post.upvotes, a.post.created_at, a.seq))
            }),
        }
        Ok(rows.into_iter().map(|row| row.post.clone()).collect())
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Post> {
        let tables = self.tables()?;
        tables
            .posts
            .iter()
            .find(|row| row.post.id == id)
            .map(|row| row.post.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn insert_post(
        &self,
        post: NewPostInput,
        created_at: OffsetDateTime,
    ) -> StoreResult<Post> {
        let mut tables = self.tables()?;
        let seq = tables.next_seq();
        let row = PostRow {
            seq,
            post: Post {
                id: Uuid::new_v4(),
                title: post.title,
                content: post.content,
                image_url: post.image_url,
                community: post.community.to_string(),
                location: post.location,
                upvotes: 0,
                created_at,
            },
            secret_key: post.secret_key,
        };
        let inserted = row.post.clone();
        tables.posts.push(row);
        Ok(inserted)
    }

    async fn update_post(&self, id: Uuid, changes: PostUpdateInput) -> StoreResult<Post> {
        let mut tables = self.tables()?;
        let row = tables.post_mut(id)?;
        row.post.apply(changes.into());
        Ok(row.post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables()?;
        tables.posts.retain(|row| row.post.id != id);
        Ok(())
    }

    async fn increment_upvotes(&self, id: Uuid) -> StoreResult<Post> {
        let mut tables = self.tables()?;
        let row = tables.post_mut(id)?;
        row.post.upvotes += 1;
        Ok(row.post.clone())
    }

    async fn secret_key(&self, id: Uuid) -> StoreResult<String> {
        let tables = self.tables()?;
        tables
            .posts
            .iter()
            .find(|row| row.post.id == id)
            .map(|row| row.secret_key.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.tables().map(|_| ())
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn list_comments(&self, post_id: Uuid) -> StoreResult<Vec<Comment>> {
        let tables = self.tables()?;
        let mut rows: Vec<&CommentRow> = tables
            .comments
            .iter()
            .filter(|row| row.comment.post_id == post_id)
            .collect();
        rows.sort_by_key(|row| (row.comment.created_at, row.seq));
        Ok(rows.into_iter().map(|row| row.comment.clone()).collect())
    }

    async fn insert_comment(
        &self,
        comment: NewCommentInput,
        created_at: OffsetDateTime,
    ) -> StoreResult<Comment> {
        let mut tables = self.tables()?;
        if !tables.posts.iter().any(|row| row.post.id == comment.post_id) {
            return Err(StoreError::NotFound);
        }
        let seq = tables.next_seq();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: comment.post_id,
            content: comment.content,
            created_at,
        };
        tables.comments.push(CommentRow {
            seq,
            comment: comment.clone(),
        });
        Ok(comment)
    }
}
