//! Landing page summary

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;

use crate::common::ValidatedPage;
use crate::domains::casts::models::Cast;
use crate::domains::events::models::{Event, EventListing};

/// Events previewed on the landing page
pub const LANDING_EVENTS: i64 = 3;

#[derive(Debug, Clone, Serialize)]
pub struct Landing {
    pub casts: Vec<Cast>,
    pub upcoming_events: Vec<EventListing>,
}

/// Every cast by name plus the next few events across all casts.
pub async fn landing(today: NaiveDate, pool: &PgPool) -> sqlx::Result<Landing> {
    let casts = Cast::find_all(pool).await?;
    let (upcoming_events, _) =
        Event::find_future_paginated(today, None, &ValidatedPage::first(LANDING_EVENTS), pool).await?;

    Ok(Landing {
        casts,
        upcoming_events,
    })
}
