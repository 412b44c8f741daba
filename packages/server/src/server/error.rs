//! Mapping domain failures onto HTTP responses.

use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::common::AuthError;
use crate::domains::casts::actions::CastError;
use crate::domains::events::actions::EventError;
use crate::domains::notifications::actions::NotificationError;
use crate::domains::profiles::actions::ProfileError;
use crate::domains::search::SearchError;
use crate::server::notice::Redirect;

/// A request that cannot be answered with a redirect
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Unprocessable(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn internal(err: impl Display) -> Self {
        error!(error = %err, "Request failed");
        ApiError::Internal("Internal server error".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Unauthorized(m)
            | ApiError::Forbidden(m)
            | ApiError::NotFound(m)
            | ApiError::Unprocessable(m)
            | ApiError::Internal(m) => m,
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationRequired => ApiError::Unauthorized(err.to_string()),
            AuthError::ManagerRequired => ApiError::Forbidden(err.to_string()),
            AuthError::DatabaseError(e) => ApiError::internal(e),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::internal(err)
    }
}

impl From<CastError> for ApiError {
    fn from(err: CastError) -> Self {
        match err {
            CastError::Auth(e) => e.into(),
            CastError::NotFound | CastError::ProfileNotFound | CastError::SectionNotFound => {
                ApiError::NotFound(err.to_string())
            }
            CastError::Database(e) => ApiError::internal(e),
            other => ApiError::Unprocessable(other.to_string()),
        }
    }
}

impl From<EventError> for ApiError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Auth(e) => e.into(),
            EventError::NotFound | EventError::CastNotFound => ApiError::NotFound(err.to_string()),
            EventError::Database(e) => ApiError::internal(e),
            other => ApiError::Unprocessable(other.to_string()),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::Auth(e) => e.into(),
            ProfileError::SignupDisabled => ApiError::Forbidden(err.to_string()),
            ProfileError::NotFound => ApiError::NotFound(err.to_string()),
            ProfileError::Database(e) => ApiError::internal(e),
            other => ApiError::Unprocessable(other.to_string()),
        }
    }
}

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::Pagination(e) => ApiError::Unprocessable(e.to_string()),
            NotificationError::NotFound => ApiError::NotFound(err.to_string()),
            NotificationError::Database(e) => ApiError::internal(e),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Pagination(e) => ApiError::Unprocessable(e.to_string()),
            SearchError::Database(e) => ApiError::internal(e),
        }
    }
}

/// Domain errors that split into "tell the user" and "fail the request"
pub trait UserCorrectable: Display + Into<ApiError> {
    fn is_user_correctable(&self) -> bool;
}

impl UserCorrectable for CastError {
    fn is_user_correctable(&self) -> bool {
        CastError::is_user_correctable(self)
    }
}

impl UserCorrectable for EventError {
    fn is_user_correctable(&self) -> bool {
        EventError::is_user_correctable(self)
    }
}

impl UserCorrectable for ProfileError {
    fn is_user_correctable(&self) -> bool {
        ProfileError::is_user_correctable(self)
    }
}

impl UserCorrectable for NotificationError {
    fn is_user_correctable(&self) -> bool {
        NotificationError::is_user_correctable(self)
    }
}

/// Finish a mutating handler.
///
/// Success redirects wherever `on_success` says. User-correctable failures
/// redirect to `back` with the error as the notice; anything else becomes
/// an error status.
pub fn respond<T, E>(
    result: Result<T, E>,
    back: impl Into<String>,
    on_success: impl FnOnce(T) -> Redirect,
) -> Result<Redirect, ApiError>
where
    E: UserCorrectable,
{
    match result {
        Ok(value) => Ok(on_success(value)),
        Err(err) if err.is_user_correctable() => Ok(Redirect::error(back, err.to_string())),
        Err(err) => Err(err.into()),
    }
}
