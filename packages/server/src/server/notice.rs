//! Redirect-with-notice responses for mutating endpoints.
//!
//! Every POST answers `303 See Other` with a `Location` header and a JSON
//! body naming the same location plus an optional flash-style notice.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub redirect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl Redirect {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            redirect: location.into(),
            notice: None,
        }
    }

    pub fn success(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_notice(location, NoticeLevel::Success, message)
    }

    pub fn error(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_notice(location, NoticeLevel::Error, message)
    }

    fn with_notice(location: impl Into<String>, level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            redirect: location.into(),
            notice: Some(Notice {
                level,
                message: message.into(),
            }),
        }
    }
}

impl IntoResponse for Redirect {
    fn into_response(self) -> Response {
        (
            StatusCode::SEE_OTHER,
            [(header::LOCATION, self.redirect.clone())],
            Json(self),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_response() {
        let response = Redirect::success("/casts/midnight-players", "You have left Midnight Players")
            .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/casts/midnight-players"
        );
    }

    #[test]
    fn test_notice_serialization() {
        let body = serde_json::to_value(Redirect::error("/", "nope")).unwrap();
        assert_eq!(body["notice"]["level"], "error");
        assert_eq!(body["notice"]["message"], "nope");

        let bare = serde_json::to_value(Redirect::to("/")).unwrap();
        assert!(bare.get("notice").is_none());
    }
}
