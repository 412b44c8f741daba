use thiserror::Error;

use crate::common::utils::ValidationError;
use crate::common::AuthError;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Signup is currently disabled")]
    SignupDisabled,

    #[error("You must be at least {0} years old to sign up")]
    TooYoung(u32),

    #[error("That username or email is already in use")]
    AccountTaken,

    #[error("Your username does not match")]
    ConfirmationMismatch,

    #[error("Profile not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ProfileError {
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            ProfileError::Validation(_)
                | ProfileError::TooYoung(_)
                | ProfileError::AccountTaken
                | ProfileError::ConfirmationMismatch
        )
    }
}
