use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

mod auth;
mod error;
mod handlers;
mod routes;

pub use auth::{SecretKey, SECRET_KEY_HEADER};
pub use error::AppError;

#[derive(Clone, Debug, Default)]
pub struct HttpOptions {
    pub cors_allow_origin: Option<HeaderValue>,
    pub max_body_bytes: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::communities())
        .merge(routes::posts())
        .with_state(state)
}

/// [`router`] wrapped in tracing, CORS and a request body limit.
pub fn service(state: AppState, options: HttpOptions) -> Router {
    let origin = match options.cors_allow_origin {
        Some(origin) => AllowOrigin::exact(origin),
        None => AllowOrigin::any(),
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, SECRET_KEY_HEADER]);

    router(state).layer(
        ServiceBuilder::new()
            .layer(RequestBodyLimitLayer::new(options.max_body_bytes))
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
}
