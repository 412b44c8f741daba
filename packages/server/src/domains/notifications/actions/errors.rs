use thiserror::Error;

use crate::common::PaginationError;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error("Notification not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl NotificationError {
    pub fn is_user_correctable(&self) -> bool {
        false
    }
}
