use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info};

use super::errors::EventError;
use crate::common::{Page, PageArgs, PaginationError, MAX_PER_PAGE};
use crate::domains::casts::models::Cast;
use crate::domains::events::models::{group_by_date, CalendarDay, Event, EventListing};

pub const EVENTS_PER_PAGE: i64 = 12;
pub const UPCOMING_DAYS: i64 = 14;
pub const UPCOMING_LIMIT: i64 = 12;
const MAX_UPCOMING_DAYS: i64 = 366;

/// Query parameters of the upcoming-events calendar
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpcomingArgs {
    pub days: Option<i64>,
    pub limit: Option<i64>,
    /// Cast slug to restrict the calendar to
    pub cast: Option<String>,
}

/// Every future event across all casts, soonest first.
pub async fn future_events(
    args: &PageArgs,
    today: NaiveDate,
    pool: &PgPool,
) -> Result<Page<EventListing>, EventError> {
    let page = args.validate(EVENTS_PER_PAGE)?;
    let (events, total) = Event::find_future_paginated(today, None, &page, pool).await?;
    Ok(Page::new(events, total, &page))
}

/// Events from `today` through `today + days`, grouped by date.
pub async fn upcoming_calendar(
    args: &UpcomingArgs,
    today: NaiveDate,
    pool: &PgPool,
) -> Result<Vec<CalendarDay>, EventError> {
    let days = args.days.unwrap_or(UPCOMING_DAYS);
    if !(1..=MAX_UPCOMING_DAYS).contains(&days) {
        return Err(EventError::InvalidWindow { max: MAX_UPCOMING_DAYS });
    }
    let limit = args.limit.unwrap_or(UPCOMING_LIMIT);
    if !(1..=MAX_PER_PAGE).contains(&limit) {
        return Err(PaginationError::InvalidPerPage.into());
    }

    let cast_id = match args.cast.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => Some(
            Cast::find_by_slug(slug, pool)
                .await?
                .ok_or(EventError::CastNotFound)?
                .id,
        ),
        None => None,
    };

    let events = Event::find_between(today, today + Duration::days(days), cast_id, limit, pool).await?;
    debug!(days, limit, count = events.len(), "Loaded upcoming events");
    Ok(group_by_date(events))
}

/// Outcome of an expired-event sweep
#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    pub expired: usize,
    pub deleted: u64,
    pub dry_run: bool,
}

/// Delete every event more than 90 days past its date.
///
/// With `dry_run` the expired events are only counted.
pub async fn clean_expired_events(
    today: NaiveDate,
    dry_run: bool,
    pool: &PgPool,
) -> Result<CleanupReport, EventError> {
    let expired = Event::find_expired(today, pool).await?;
    for event in &expired {
        debug!(event_id = %event.id, date = %event.date, name = %event.name, "Expired event");
    }

    let deleted = if dry_run {
        0
    } else {
        Event::delete_expired(today, pool).await?
    };

    info!(expired = expired.len(), deleted, dry_run, "Expired event cleanup finished");
    Ok(CleanupReport {
        expired: expired.len(),
        deleted,
        dry_run,
    })
}
