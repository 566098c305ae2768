use axum::{routing::get, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn communities() -> Router<AppState> {
    Router::new()
        .route("/communities", get(handlers::list_communities))
        .route(
            "/communities/:community/posts",
            get(handlers::list_community_posts),
        )
}

pub fn posts() -> Router<AppState> {
    Router::new()
        .route("/posts", get(handlers::list_posts).post(handlers::create_post))
        .route(
            "/posts/:id",
            get(handlers::get_post)
                .patch(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route("/posts/:id/verify", post(handlers::verify_secret_key))
        .route("/posts/:id/upvote", post(handlers::upvote_post))
        .route(
            "/posts/:id/comments",
            get(handlers::list_post_comments).post(handlers::comment_post),
        )
}
