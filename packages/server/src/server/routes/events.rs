use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use chrono::Utc;

use super::casts::cast_path;
use crate::common::{EventId, Page, PageArgs};
use crate::domains::casts::actions::find_cast;
use crate::domains::events::actions::{
    create_event, delete_event, find_event, future_events, update_event, upcoming_calendar,
    UpcomingArgs,
};
use crate::domains::events::models::{CalendarDay, EventInput, EventListing};
use crate::server::app::AppState;
use crate::server::error::{respond, ApiError};
use crate::server::middleware::{ActingProfile, AuthUser};
use crate::server::notice::Redirect;

fn event_path(id: EventId) -> String {
    format!("/events/{}", id)
}

pub async fn events_handler(
    Extension(state): Extension<AppState>,
    Query(args): Query<PageArgs>,
) -> Result<Json<Page<EventListing>>, ApiError> {
    Ok(Json(
        future_events(&args, Utc::now().date_naive(), &state.db_pool).await?,
    ))
}

pub async fn upcoming_handler(
    Extension(state): Extension<AppState>,
    Query(args): Query<UpcomingArgs>,
) -> Result<Json<Vec<CalendarDay>>, ApiError> {
    Ok(Json(
        upcoming_calendar(&args, Utc::now().date_naive(), &state.db_pool).await?,
    ))
}

pub async fn event_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<EventListing>, ApiError> {
    Ok(Json(find_event(id, &state.db_pool).await?))
}

pub async fn new_event_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path(slug): Path<String>,
    Json(input): Json<EventInput>,
) -> Result<Redirect, ApiError> {
    let cast = find_cast(&slug, &state.db_pool).await?;
    let result = create_event(cast.id, auth.profile_id(), input, &state.db_pool).await;

    respond(result, format!("{}/events", cast_path(&cast.slug)), |event| {
        Redirect::success(event_path(event.id), format!("\"{}\" has been created", event.name))
    })
}

pub async fn edit_event_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path(id): Path<EventId>,
    Json(input): Json<EventInput>,
) -> Result<Redirect, ApiError> {
    let result = update_event(id, auth.profile_id(), input, &state.db_pool).await;

    respond(result, event_path(id), |event| {
        Redirect::success(event_path(event.id), format!("\"{}\" has been updated", event.name))
    })
}

pub async fn delete_event_handler(
    Extension(state): Extension<AppState>,
    auth: Option<AuthUser>,
    Path(id): Path<EventId>,
) -> Result<Redirect, ApiError> {
    let result = delete_event(id, auth.profile_id(), &state.db_pool).await;

    respond(result, event_path(id), |deleted| {
        Redirect::success(
            format!("{}/events", cast_path(&deleted.cast_slug)),
            format!("\"{}\" has been deleted", deleted.event.name),
        )
    })
}
