use thiserror::Error;

use crate::domain::validation::FieldErrors;
use crate::infra::store::StoreError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoardError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("{0}")]
    Unauthorized(String),
}

impl BoardError {
    /// Converts a store failure, naming the entity for `NotFound`.
    pub fn from_store(err: StoreError, entity: &'static str) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound(entity),
            other => Self::StoreUnavailable(other.to_string()),
        }
    }
}

pub type BoardResult<T> = Result<T, BoardError>;
