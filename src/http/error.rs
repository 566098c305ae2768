use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::validation::FieldErrors;
use crate::error::BoardError;

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    fields: Option<FieldErrors>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl AppError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn invalid_fields(fields: FieldErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "validation failed".to_string(),
            fields: Some(fields),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<BoardError> for AppError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::NotFound(entity) => Self::not_found(format!("{} not found", entity)),
            BoardError::Validation(fields) => Self::invalid_fields(fields),
            BoardError::StoreUnavailable(_) => Self::unavailable("store unavailable"),
            BoardError::Unauthorized(message) => Self::unauthorized(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
            fields: self.fields,
        });
        (self.status, body).into_response()
    }
}
