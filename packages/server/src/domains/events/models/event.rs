use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::utils::{limit_text, require_text, ValidationError};
use crate::common::{CastId, EventId, ValidatedPage};

/// Days after its date that an event becomes eligible for cleanup
pub const EXPIRES_AFTER_DAYS: i64 = 90;

/// Event model - a dated performance on a cast's calendar
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Event {
    pub id: EventId,
    pub cast_id: CastId,
    pub name: String,
    pub description: String,
    pub venue: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

/// An event together with the cast it belongs to, for public listings
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct EventListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub cast_name: String,
    pub cast_slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub venue: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
}

impl EventInput {
    pub fn clean(self) -> Result<Self, ValidationError> {
        let input = Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            venue: self.venue.trim().to_string(),
            ..self
        };
        require_text("name", &input.name, 128)?;
        require_text("venue", &input.venue, 256)?;
        limit_text("description", &input.description, 4096)?;
        Ok(input)
    }
}

/// One day of the upcoming-events calendar
#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub events: Vec<EventListing>,
}

/// Group date-ordered listings into calendar days, earliest first.
pub fn group_by_date(listings: Vec<EventListing>) -> Vec<CalendarDay> {
    let mut days: BTreeMap<NaiveDate, Vec<EventListing>> = BTreeMap::new();
    for listing in listings {
        days.entry(listing.event.date).or_default().push(listing);
    }
    days.into_iter()
        .map(|(date, events)| CalendarDay { date, events })
        .collect()
}

const LISTING_SELECT: &str = "SELECT e.*, c.name AS cast_name, c.slug AS cast_slug \
     FROM events e JOIN casts c ON c.id = e.cast_id";

impl Event {
    /// Ready for deletion: more than `EXPIRES_AFTER_DAYS` past its date.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        today > self.date + Duration::days(EXPIRES_AFTER_DAYS)
    }

    pub async fn find_by_id(id: EventId, pool: &PgPool) -> sqlx::Result<Option<EventListing>> {
        sqlx::query_as::<_, EventListing>(&format!("{} WHERE e.id = $1", LISTING_SELECT))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(cast_id: CastId, input: &EventInput, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO events (id, cast_id, name, description, venue, date, start_time)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(EventId::new())
        .bind(cast_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.venue)
        .bind(input.date)
        .bind(input.start_time)
        .fetch_one(pool)
        .await
    }

    pub async fn update(id: EventId, input: &EventInput, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE events
             SET name = $2, description = $3, venue = $4, date = $5, start_time = $6
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.venue)
        .bind(input.date)
        .bind(input.start_time)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(id: EventId, pool: &PgPool) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Events on or after `today`, optionally limited to one cast
    pub async fn find_future_paginated(
        today: NaiveDate,
        cast_id: Option<CastId>,
        page: &ValidatedPage,
        pool: &PgPool,
    ) -> sqlx::Result<(Vec<EventListing>, i64)> {
        let events = sqlx::query_as::<_, EventListing>(&format!(
            "{} WHERE e.date >= $1 AND ($2::uuid IS NULL OR e.cast_id = $2)
             ORDER BY e.date, e.start_time
             LIMIT $3 OFFSET $4",
            LISTING_SELECT
        ))
        .bind(today)
        .bind(cast_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM events WHERE date >= $1 AND ($2::uuid IS NULL OR cast_id = $2)",
        )
        .bind(today)
        .bind(cast_id)
        .fetch_one(pool)
        .await?;

        Ok((events, total))
    }

    /// Events dated within `[from, to]`, earliest first
    pub async fn find_between(
        from: NaiveDate,
        to: NaiveDate,
        cast_id: Option<CastId>,
        limit: i64,
        pool: &PgPool,
    ) -> sqlx::Result<Vec<EventListing>> {
        sqlx::query_as::<_, EventListing>(&format!(
            "{} WHERE e.date >= $1 AND e.date <= $2 AND ($3::uuid IS NULL OR e.cast_id = $3)
             ORDER BY e.date, e.start_time
             LIMIT $4",
            LISTING_SELECT
        ))
        .bind(from)
        .bind(to)
        .bind(cast_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Events whose date is more than `EXPIRES_AFTER_DAYS` before `today`
    pub async fn find_expired(today: NaiveDate, pool: &PgPool) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM events WHERE date < $1 ORDER BY date, start_time",
        )
        .bind(today - Duration::days(EXPIRES_AFTER_DAYS))
        .fetch_all(pool)
        .await
    }

    pub async fn delete_expired(today: NaiveDate, pool: &PgPool) -> sqlx::Result<u64> {
        let result = sqlx::query("DELETE FROM events WHERE date < $1")
            .bind(today - Duration::days(EXPIRES_AFTER_DAYS))
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
