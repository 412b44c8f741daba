use thiserror::Error;

/// Authorization errors for cast management
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Cast manager access required")]
    ManagerRequired,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}
