//! Public read-only pages: landing, search, profiles

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use chrono::Utc;

use crate::common::Page;
use crate::domains::casts::models::Cast;
use crate::domains::landing::{landing, Landing};
use crate::domains::profiles::actions::{public_profile, PublicProfile};
use crate::domains::profiles::models::ProfileCard;
use crate::domains::search::{search_casts, search_profiles, SearchArgs};
use crate::server::app::AppState;
use crate::server::error::ApiError;

pub async fn landing_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Landing>, ApiError> {
    Ok(Json(landing(Utc::now().date_naive(), &state.db_pool).await?))
}

pub async fn search_casts_handler(
    Extension(state): Extension<AppState>,
    Query(args): Query<SearchArgs>,
) -> Result<Json<Page<Cast>>, ApiError> {
    Ok(Json(search_casts(&args, &state.db_pool).await?))
}

pub async fn search_profiles_handler(
    Extension(state): Extension<AppState>,
    Query(args): Query<SearchArgs>,
) -> Result<Json<Page<ProfileCard>>, ApiError> {
    Ok(Json(
        search_profiles(&args, Utc::now().date_naive(), &state.db_pool).await?,
    ))
}

pub async fn profile_handler(
    Extension(state): Extension<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PublicProfile>, ApiError> {
    Ok(Json(public_profile(&username, &state.db_pool).await?))
}
