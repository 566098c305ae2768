use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::comments::CommentService;
use crate::app::gate;
use crate::app::posts::PostService;
use crate::domain::comment::{Comment, NewCommentInput};
use crate::domain::post::{Community, Post, PostFilter, SortBy};
use crate::domain::validation::PostForm;
use crate::http::{AppError, SecretKey};
use crate::AppState;

const MAX_COMMENT_LEN: usize = 1000;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.store.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse { status })
}

#[derive(Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
}

pub async fn list_communities() -> Json<ListResponse<&'static str>> {
    Json(ListResponse {
        items: Community::ALL.iter().map(Community::as_str).collect(),
    })
}

#[derive(Deserialize)]
pub struct ListPostsQuery {
    #[serde(default)]
    pub sort: SortBy,
    pub community: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub local_only: bool,
}

async fn filtered_posts(
    state: &AppState,
    sort: SortBy,
    filter: PostFilter,
) -> Result<Json<ListResponse<Post>>, AppError> {
    let service = PostService::new(state.store.clone());
    let posts = service.get_all(sort).await?;
    let items = posts.into_iter().filter(|post| filter.matches(post)).collect();

    Ok(Json(ListResponse { items }))
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<ListResponse<Post>>, AppError> {
    let filter = PostFilter {
        community: query.community,
        search: query.search,
        local_only: query.local_only,
    };
    filtered_posts(&state, query.sort, filter).await
}

pub async fn list_community_posts(
    Path(community): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<ListResponse<Post>>, AppError> {
    let community = community
        .parse::<Community>()
        .map_err(|_| AppError::not_found("community not found"))?;

    let filter = PostFilter {
        community: Some(community.to_string()),
        search: query.search,
        local_only: query.local_only,
    };
    filtered_posts(&state, query.sort, filter).await
}

pub async fn create_post(
    State(state): State<AppState>,
    Json(form): Json<PostForm>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let input = form.into_new_post().map_err(AppError::invalid_fields)?;

    let service = PostService::new(state.store.clone());
    let post = service.create(input).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Post>, AppError> {
    let service = PostService::new(state.store.clone());
    let post = service.get_by_id(id).await?;

    Ok(Json(post))
}

pub async fn update_post(
    Path(id): Path<Uuid>,
    SecretKey(key): SecretKey,
    State(state): State<AppState>,
    Json(form): Json<PostForm>,
) -> Result<Json<Post>, AppError> {
    let changes = form.into_update().map_err(AppError::invalid_fields)?;

    let service = PostService::new(state.store.clone());
    let post = gate::edit_post(&service, id, &key, changes).await?;

    Ok(Json(post))
}

pub async fn delete_post(
    Path(id): Path<Uuid>,
    SecretKey(key): SecretKey,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let service = PostService::new(state.store.clone());
    gate::delete_post(&service, id, &key).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub secret_key: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
}

pub async fn verify_secret_key(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, AppError> {
    let service = PostService::new(state.store.clone());
    let valid = service.verify_secret_key(id, &payload.secret_key).await?;

    Ok(Json(VerifyResponse { valid }))
}

#[derive(Deserialize)]
pub struct UpvoteRequest {
    pub current_upvotes: Option<i64>,
}

pub async fn upvote_post(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    payload: Option<Json<UpvoteRequest>>,
) -> Result<Json<Post>, AppError> {
    let service = PostService::new(state.store.clone());
    let current_upvotes = match payload.and_then(|Json(payload)| payload.current_upvotes) {
        Some(current) => current,
        None => service.get_by_id(id).await?.upvotes,
    };
    let post = service.upvote(id, current_upvotes).await?;

    Ok(Json(post))
}

pub async fn list_post_comments(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ListResponse<Comment>>, AppError> {
    let service = CommentService::new(state.store.clone());
    let items = service.get_by_post_id(id).await?;

    Ok(Json(ListResponse { items }))
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

pub async fn comment_post(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    if payload.content.trim().is_empty() {
        return Err(AppError::bad_request("comment cannot be empty"));
    }
    if payload.content.chars().count() > MAX_COMMENT_LEN {
        return Err(AppError::bad_request("comment exceeds 1000 characters"));
    }

    let service = CommentService::new(state.store.clone());
    let comment = service
        .create(NewCommentInput {
            post_id: id,
            content: payload.content,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}
