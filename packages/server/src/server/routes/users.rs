//! Account routes. All but signup require a signed-in user.

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::common::{NotificationId, PageArgs};
use crate::domains::notifications::actions::{dismiss, inbox, mark_all_read, Inbox};
use crate::domains::profiles::actions::{
    account_settings, delete_account, edit_profile, edit_user, signup, AccountSettings,
};
use crate::domains::profiles::models::{EditUser, NewAccount, ProfileUpdate};
use crate::server::app::AppState;
use crate::server::error::{respond, ApiError};
use crate::server::middleware::AuthUser;
use crate::server::notice::Redirect;

const SETTINGS_PATH: &str = "/users/settings";
const NOTIFICATIONS_PATH: &str = "/users/notifications";

#[derive(Debug, Deserialize)]
pub struct ConfirmUsernameForm {
    pub username: String,
}

pub async fn signup_handler(
    Extension(state): Extension<AppState>,
    Json(account): Json<NewAccount>,
) -> Result<Redirect, ApiError> {
    let result = signup(
        account,
        state.signup_enabled,
        Utc::now().date_naive(),
        &state.db_pool,
    )
    .await;

    respond(result, "/", |(user, _)| {
        Redirect::success(
            format!("/profiles/{}", user.username),
            format!("Welcome to Rocky Rollcall, {}", user.first_name),
        )
    })
}

pub async fn settings_handler(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
) -> Result<Json<AccountSettings>, ApiError> {
    Ok(Json(
        account_settings(auth.user_id, Utc::now().date_naive(), &state.db_pool).await?,
    ))
}

pub async fn edit_user_handler(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    Json(edit): Json<EditUser>,
) -> Result<Redirect, ApiError> {
    let result = edit_user(auth.user_id, edit, &state.db_pool).await;
    respond(result, SETTINGS_PATH, |_| {
        Redirect::success(SETTINGS_PATH, "User account updated")
    })
}

pub async fn edit_profile_handler(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Redirect, ApiError> {
    let result = edit_profile(auth.user_id, update, &state.db_pool).await;
    respond(result, SETTINGS_PATH, |_| {
        Redirect::success(SETTINGS_PATH, "User profile updated")
    })
}

pub async fn delete_account_handler(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    Json(form): Json<ConfirmUsernameForm>,
) -> Result<Redirect, ApiError> {
    let result = delete_account(auth.user_id, &form.username, &state.db_pool).await;
    respond(result, SETTINGS_PATH, |_| {
        Redirect::success("/", "You successfully deleted your account")
    })
}

pub async fn notifications_handler(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    Query(args): Query<PageArgs>,
) -> Result<Json<Inbox>, ApiError> {
    Ok(Json(inbox(auth.profile_id, &args, &state.db_pool).await?))
}

pub async fn read_notifications_handler(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
) -> Result<Redirect, ApiError> {
    let result = mark_all_read(auth.profile_id, &state.db_pool).await;
    respond(result, NOTIFICATIONS_PATH, |_| {
        Redirect::success(NOTIFICATIONS_PATH, "All notifications marked as read")
    })
}

pub async fn dismiss_notification_handler(
    Extension(state): Extension<AppState>,
    auth: AuthUser,
    Path(id): Path<NotificationId>,
) -> Result<Redirect, ApiError> {
    let result = dismiss(auth.profile_id, id, &state.db_pool).await;
    respond(result, NOTIFICATIONS_PATH, |_| {
        Redirect::success(NOTIFICATIONS_PATH, "Notification deleted")
    })
}
