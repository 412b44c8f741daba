//! Manager-only cast administration routes.
//!
//! Handlers load the cast by slug and hand the caller's profile to the
//! action, which authorizes it. Ledger refusals and the caller rules come
//! back as error notices on the page the form lives on.

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Deserialize;

use super::casts::cast_path;
use crate::common::{PageSectionId, ProfileId};
use crate::domains::casts::actions::{self, find_cast};
use crate::domains::casts::ledger::Subject;
use crate::domains::casts::models::{CastInput, SectionInput};
use crate::domains::profiles::models::ProfileCard;
use crate::server::app::AppState;
use crate::server::error::{respond, ApiError};
use crate::server::middleware::{ActingProfile, AuthUser};
use crate::server::notice::Redirect;

#[derive(Debug, Deserialize)]
pub struct UsernameForm {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmNameForm {
    pub name: String,
}

fn admin_path(slug: &str, page: &str) -> String {
    format!("/casts/{}/admin/{}", slug, page)
}

// =============================================================================
// Cast info
// =============================================================================

pub async fn edit_cast_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path(slug): Path<String>,
    Json(input): Json<CastInput>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result = actions::update_cast(&cast, auth.profile_id(), input, &state.db_pool).await;

    respond(result, cast_path(&cast.slug), |updated| {
        Redirect::success(cast_path(&updated.slug), "Cast info has been updated")
    })
}

pub async fn delete_cast_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path(slug): Path<String>,
    Json(form): Json<ConfirmNameForm>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result = actions::delete_cast(&cast, auth.profile_id(), &form.name, &state.db_pool).await;

    respond(result, cast_path(&cast.slug), |_| {
        Redirect::success("/", format!("{} has been deleted", cast.name))
    })
}

// =============================================================================
// Page sections
// =============================================================================

pub async fn new_section_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path(slug): Path<String>,
    Json(input): Json<SectionInput>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result = actions::add_section(&cast, auth.profile_id(), input, &state.db_pool).await;

    respond(result, cast_path(&cast.slug), |section| {
        Redirect::success(cast_path(&cast.slug), format!("\"{}\" has been added", section.title))
    })
}

pub async fn edit_section_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path((slug, section_id)): Path<(String, PageSectionId)>,
    Json(input): Json<SectionInput>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result =
        actions::edit_section(&cast, auth.profile_id(), section_id, input, &state.db_pool).await;

    respond(result, cast_path(&cast.slug), |section| {
        Redirect::success(cast_path(&cast.slug), format!("\"{}\" has been updated", section.title))
    })
}

pub async fn delete_section_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path((slug, section_id)): Path<(String, PageSectionId)>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result = actions::delete_section(&cast, auth.profile_id(), section_id, &state.db_pool).await;

    respond(result, cast_path(&cast.slug), |_| Redirect::to(cast_path(&cast.slug)))
}

// =============================================================================
// Managers
// =============================================================================

pub async fn managers_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<ProfileCard>>, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    Ok(Json(
        actions::list_managers(&cast, auth.profile_id(), &state.db_pool).await?,
    ))
}

pub async fn add_manager_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path(slug): Path<String>,
    Json(form): Json<UsernameForm>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result =
        actions::add_manager(&cast, auth.profile_id(), &form.username, &state.db_pool).await;
    let back = admin_path(&cast.slug, "managers");

    respond(result, back.clone(), |profile| {
        Redirect::success(back, format!("{} has been added as a manager", profile.display_name()))
    })
}

pub async fn remove_manager_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path((slug, profile_id)): Path<(String, ProfileId)>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result =
        actions::remove_manager(&cast, auth.profile_id(), profile_id, &state.db_pool).await;
    let back = admin_path(&cast.slug, "managers");

    respond(result, back.clone(), |profile| {
        Redirect::success(back, format!("{} is no longer a manager", profile.username))
    })
}

// =============================================================================
// Membership requests
// =============================================================================

pub async fn requests_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<ProfileCard>>, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    Ok(Json(
        actions::list_requests(&cast, auth.profile_id(), &state.db_pool).await?,
    ))
}

pub async fn approve_request_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path((slug, profile_id)): Path<(String, ProfileId)>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result =
        actions::approve_request(&cast, auth.profile_id(), profile_id, &state.db_pool).await;
    let back = admin_path(&cast.slug, "requests");

    respond(result, back.clone(), |profile| {
        Redirect::success(
            back,
            format!("{} is now a member of {}", profile.display_name(), cast.name),
        )
    })
}

pub async fn deny_request_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path((slug, profile_id)): Path<(String, ProfileId)>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result = actions::deny_request(&cast, auth.profile_id(), profile_id, &state.db_pool).await;
    let back = admin_path(&cast.slug, "requests");

    respond(result, back.clone(), |profile| {
        Redirect::success(
            back,
            format!("The request from {} has been denied", profile.display_name()),
        )
    })
}

// =============================================================================
// Members
// =============================================================================

pub async fn add_member_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path(slug): Path<String>,
    Json(form): Json<UsernameForm>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result = actions::add_member(&cast, auth.profile_id(), &form.username, &state.db_pool).await;
    let back = format!("{}/members", cast_path(&cast.slug));

    respond(result, back.clone(), |profile| {
        Redirect::success(
            back,
            format!("{} is now a member of {}", profile.display_name(), cast.name),
        )
    })
}

pub async fn remove_member_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path((slug, profile_id)): Path<(String, ProfileId)>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result =
        actions::remove_member(&cast, auth.profile_id(), profile_id, &state.db_pool).await;
    let back = format!("{}/members", cast_path(&cast.slug));

    respond(result, back.clone(), |profile| {
        Redirect::success(
            back,
            format!("{} has been removed from {}", profile.display_name(), cast.name),
        )
    })
}

// =============================================================================
// Blocking
// =============================================================================

pub async fn blocked_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<ProfileCard>>, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    Ok(Json(
        actions::list_blocked(&cast, auth.profile_id(), &state.db_pool).await?,
    ))
}

pub async fn block_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path((slug, profile_id)): Path<(String, ProfileId)>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result = actions::block_user(&cast, auth.profile_id(), profile_id, &state.db_pool).await;
    let back = admin_path(&cast.slug, "blocked");

    respond(result, back.clone(), |profile| {
        Redirect::success(
            back,
            format!("{} has been blocked from {}", profile.display_name(), cast.name),
        )
    })
}

pub async fn unblock_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path((slug, profile_id)): Path<(String, ProfileId)>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result = actions::unblock_user(&cast, auth.profile_id(), profile_id, &state.db_pool).await;
    let back = admin_path(&cast.slug, "blocked");

    respond(result, back.clone(), |profile| {
        Redirect::success(
            back,
            format!("{} has been unblocked from {}", profile.display_name(), cast.name),
        )
    })
}
