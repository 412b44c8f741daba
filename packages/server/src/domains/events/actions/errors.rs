use thiserror::Error;

use crate::common::utils::ValidationError;
use crate::common::{AuthError, PaginationError};

#[derive(Error, Debug)]
pub enum EventError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error("Event not found")]
    NotFound,

    #[error("Cast not found")]
    CastNotFound,

    #[error("days must be between 1 and {max}")]
    InvalidWindow { max: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl EventError {
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, EventError::Validation(_))
    }
}
