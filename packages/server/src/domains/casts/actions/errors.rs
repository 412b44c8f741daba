use thiserror::Error;

use crate::common::utils::ValidationError;
use crate::common::{AuthError, PaginationError};
use crate::domains::casts::ledger::MembershipError;
use crate::domains::casts::models::LedgerError;

/// Everything a cast action can fail with
#[derive(Error, Debug)]
pub enum CastError {
    #[error(transparent)]
    Membership(#[from] MembershipError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error("Cast not found")]
    NotFound,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Page section not found")]
    SectionNotFound,

    #[error("Casts must have at least one manager")]
    TooFewManagers,

    #[error("You cannot remove yourself")]
    CannotRemoveSelf,

    #[error("{0} is a manager and must be removed as a manager before being blocked")]
    ManagerCannotBeBlocked(String),

    #[error("Could not find an account for \"{0}\"")]
    UnknownUsername(String),

    #[error("A cast named \"{0}\" already exists")]
    NameTaken(String),

    #[error("The name you entered does not match the cast name")]
    NameMismatch,

    #[error("Casts can only be deleted by their last remaining manager")]
    DeleteNeedsSoleManager,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CastError {
    /// Errors the user can fix by changing their request. These become an
    /// error notice on a redirect rather than an error status.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            CastError::Membership(_)
                | CastError::Validation(_)
                | CastError::TooFewManagers
                | CastError::CannotRemoveSelf
                | CastError::ManagerCannotBeBlocked(_)
                | CastError::UnknownUsername(_)
                | CastError::NameTaken(_)
                | CastError::NameMismatch
                | CastError::DeleteNeedsSoleManager
        )
    }
}

impl From<LedgerError> for CastError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Membership(e) => CastError::Membership(e),
            LedgerError::Database(e) => CastError::Database(e),
        }
    }
}
