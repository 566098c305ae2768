use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderName;

use crate::app::gate::MISSING_SECRET_KEY;
use crate::http::AppError;

/// The post's secret key as sent in the `x-secret-key` header. Whether it
/// matches is decided by the gate, not here.
#[derive(Debug, Clone)]
pub struct SecretKey(pub String);

pub const SECRET_KEY_HEADER: HeaderName = HeaderName::from_static("x-secret-key");

#[axum::async_trait]
impl<S> FromRequestParts<S> for SecretKey
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(SECRET_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::unauthorized(MISSING_SECRET_KEY))?;

        Ok(SecretKey(key.to_string()))
    }
}
