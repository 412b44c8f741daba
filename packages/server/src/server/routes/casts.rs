//! Public cast pages and member self-service

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use chrono::Utc;

use crate::common::{Page, PageArgs};
use crate::domains::casts::actions::{
    cast_events, cast_home, create_cast, find_cast, leave_cast, request_membership, roster,
    withdraw_request, CastHome,
};
use crate::domains::casts::models::CastInput;
use crate::domains::events::models::EventListing;
use crate::domains::profiles::models::ProfileCard;
use crate::server::app::AppState;
use crate::server::error::{respond, ApiError};
use crate::server::middleware::{ActingProfile, AuthUser};
use crate::server::notice::Redirect;

pub fn cast_path(slug: &str) -> String {
    format!("/casts/{}", slug)
}

pub async fn create_cast_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Json(input): Json<CastInput>,
) -> Result<Redirect, ApiError> {
    let result = create_cast(input, auth.profile_id(), &state.db_pool).await;
    respond(result, "/", |cast| {
        Redirect::success(cast_path(&cast.slug), format!("{} has been created", cast.name))
    })
}

pub async fn cast_home_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path(slug): Path<String>,
) -> Result<Json<CastHome>, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let home = cast_home(cast, auth.profile_id(), Utc::now().date_naive(), &state.db_pool).await?;
    Ok(Json(home))
}

pub async fn roster_handler(
    Extension(state): Extension<AppState>,
    Path(slug): Path<String>,
    Query(args): Query<PageArgs>,
) -> Result<Json<Page<ProfileCard>>, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    Ok(Json(roster(&cast, &args, &state.db_pool).await?))
}

pub async fn cast_events_handler(
    Extension(state): Extension<AppState>,
    Path(slug): Path<String>,
    Query(args): Query<PageArgs>,
) -> Result<Json<Page<EventListing>>, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let events = cast_events(&cast, &args, Utc::now().date_naive(), &state.db_pool).await?;
    Ok(Json(events))
}

pub async fn join_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path(slug): Path<String>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result = request_membership(&cast, auth.profile_id(), &state.db_pool).await;
    let home = cast_path(&cast.slug);

    respond(result, home.clone(), |_| {
        Redirect::success(home, format!("A request has been sent to {} managers", cast.name))
    })
}

pub async fn leave_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path(slug): Path<String>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result = leave_cast(&cast, auth.profile_id(), &state.db_pool).await;
    let home = cast_path(&cast.slug);

    respond(result, home.clone(), |_| {
        Redirect::success(home, format!("You have left {}", cast.name))
    })
}

pub async fn withdraw_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path(slug): Path<String>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result = withdraw_request(&cast, auth.profile_id(), &state.db_pool).await;
    let home = cast_path(&cast.slug);

    respond(result, home.clone(), |_| {
        Redirect::success(home, format!("Your request to join {} has been withdrawn", cast.name))
    })
}
