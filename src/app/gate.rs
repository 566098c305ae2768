//! Secret-key gate for destructive post operations.
//!
//! The key is checked and then the mutation is issued as a separate store
//! call; nothing binds the two, so a concurrent writer can act in between.

use uuid::Uuid;

use crate::app::posts::PostService;
use crate::domain::post::{Post, PostUpdateInput};
use crate::error::{BoardError, BoardResult};

pub const INCORRECT_SECRET_KEY: &str = "Incorrect secret key";
pub const MISSING_SECRET_KEY: &str = "Secret key is required";

pub async fn authorize(posts: &PostService, id: Uuid, key: &str) -> BoardResult<()> {
    if key.trim().is_empty() {
        return Err(BoardError::Unauthorized(MISSING_SECRET_KEY.to_string()));
    }

    if posts.verify_secret_key(id, key).await? {
        Ok(())
    } else {
        tracing::warn!(post_id = %id, "rejected incorrect secret key");
        Err(BoardError::Unauthorized(INCORRECT_SECRET_KEY.to_string()))
    }
}

pub async fn edit_post(
    posts: &PostService,
    id: Uuid,
    key: &str,
    changes: PostUpdateInput,
) -> BoardResult<Post> {
    authorize(posts, id, key).await?;
    posts.update(id, changes).await
}

pub async fn delete_post(posts: &PostService, id: Uuid, key: &str) -> BoardResult<()> {
    authorize(posts, id, key).await?;
    posts.delete(id).await
}
