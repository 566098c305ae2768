use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::comment::{Comment, NewCommentInput};
use crate::domain::post::{NewPostInput, Post, PostUpdateInput, SortBy};
use crate::infra::db::Db;
use crate::infra::store::{CommentStore, PostStore, StoreError, StoreResult};

const POST_COLUMNS: &str =
    "id, title, content, image_url, community, location, upvotes, created_at";

#[derive(Clone)]
pub struct PgStore {
    db: Db,
}

impl PgStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

fn post_from_row(row: &PgRow) -> Post {
    Post {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        image_url: row.get("image_url"),
        community: row.get("community"),
        location: row.get("location"),
        upvotes: row.get("upvotes"),
        created_at: row.get("created_at"),
    }
}

fn comment_from_row(row: &PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn list_posts(&self, sort: SortBy) -> StoreResult<Vec<Post>> {
        let order = match sort {
            SortBy::Newest => "created_at DESC, id DESC",
            SortBy::Popular => "upvotes DESC, created_at DESC, id DESC",
        };
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts ORDER BY {}",
            POST_COLUMNS, order
        ))
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Post> {
        let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(post_from_row).ok_or(StoreError::NotFound)
    }

    async fn insert_post(
        &self,
        post: NewPostInput,
        created_at: OffsetDateTime,
    ) -> StoreResult<Post> {
        let row = sqlx::query(&format!(
            "INSERT INTO posts (title, content, image_url, community, location, secret_key, upvotes, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, 0, $7) \
             RETURNING {}",
            POST_COLUMNS
        ))
        .bind(post.title)
        .bind(post.content)
        .bind(post.image_url)
        .bind(post.community.as_str())
        .bind(post.location)
        .bind(post.secret_key)
        .bind(created_at)
        .fetch_one(self.db.pool())
        .await?;

        Ok(post_from_row(&row))
    }

    async fn update_post(&self, id: Uuid, changes: PostUpdateInput) -> StoreResult<Post> {
        let row = sqlx::query(&format!(
            "UPDATE posts SET \
                title = COALESCE($2, title), \
                content = CASE WHEN $3 THEN $4 ELSE content END, \
                image_url = CASE WHEN $5 THEN $6 ELSE image_url END, \
                community = COALESCE($7, community), \
                location = CASE WHEN $8 THEN $9 ELSE location END \
             WHERE id = $1 \
             RETURNING {}",
            POST_COLUMNS
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.content.is_some())
        .bind(changes.content.flatten())
        .bind(changes.image_url.is_some())
        .bind(changes.image_url.flatten())
        .bind(changes.community.map(|community| community.as_str()))
        .bind(changes.location.is_some())
        .bind(changes.location.flatten())
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(post_from_row).ok_or(StoreError::NotFound)
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn increment_upvotes(&self, id: Uuid) -> StoreResult<Post> {
        let row = sqlx::query(&format!(
            "UPDATE posts SET upvotes = upvotes + 1 WHERE id = $1 RETURNING {}",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(post_from_row).ok_or(StoreError::NotFound)
    }

    async fn secret_key(&self, id: Uuid) -> StoreResult<String> {
        let key: Option<String> = sqlx::query_scalar("SELECT secret_key FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        key.ok_or(StoreError::NotFound)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.db.ping().await.map_err(|err| StoreError::Unavailable(err.to_string()))
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn list_comments(&self, post_id: Uuid) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, post_id, content, created_at \
             FROM comments \
             WHERE post_id = $1 \
             ORDER BY created_at ASC, seq ASC",
        )
        .bind(post_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(comment_from_row).collect())
    }

    async fn insert_comment(
        &self,
        comment: NewCommentInput,
        created_at: OffsetDateTime,
    ) -> StoreResult<Comment> {
        // comments.post_id has no foreign key so deleting a post leaves its
        // comments in place; the existence check happens here instead.
        let row = sqlx::query(
            "INSERT INTO comments (post_id, content, created_at) \
             SELECT $1, $2, $3 \
             WHERE EXISTS (SELECT 1 FROM posts WHERE id = $1) \
             RETURNING id, post_id, content, created_at",
        )
        .bind(comment.post_id)
        .bind(comment.content)
        .bind(created_at)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(comment_from_row).ok_or(StoreError::NotFound)
    }
}
