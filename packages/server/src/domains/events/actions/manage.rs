//! Event CRUD, authorized against the owning cast

use sqlx::PgPool;
use tracing::info;

use super::errors::EventError;
use crate::common::{Actor, CastCapability, CastId, EventId, ProfileId};
use crate::domains::events::models::{Event, EventInput, EventListing};

async fn authorize_on(
    actor: Option<ProfileId>,
    cast_id: CastId,
    pool: &PgPool,
) -> Result<ProfileId, EventError> {
    Ok(Actor::new(actor)
        .can(CastCapability::EditCast)
        .on(cast_id)
        .check(pool)
        .await?)
}

pub async fn find_event(id: EventId, pool: &PgPool) -> Result<EventListing, EventError> {
    Event::find_by_id(id, pool).await?.ok_or(EventError::NotFound)
}

pub async fn create_event(
    cast_id: CastId,
    actor: Option<ProfileId>,
    input: EventInput,
    pool: &PgPool,
) -> Result<Event, EventError> {
    let actor = authorize_on(actor, cast_id, pool).await?;
    let input = input.clean()?;

    let event = Event::create(cast_id, &input, pool).await?;
    info!(event_id = %event.id, cast_id = %cast_id, by = %actor, date = %event.date, "Event created");
    Ok(event)
}

pub async fn update_event(
    id: EventId,
    actor: Option<ProfileId>,
    input: EventInput,
    pool: &PgPool,
) -> Result<Event, EventError> {
    let existing = find_event(id, pool).await?;
    let actor = authorize_on(actor, existing.event.cast_id, pool).await?;
    let input = input.clean()?;

    let event = Event::update(id, &input, pool).await?;
    info!(event_id = %id, by = %actor, "Event updated");
    Ok(event)
}

/// Delete an event, returning it so the caller can redirect to its cast.
pub async fn delete_event(
    id: EventId,
    actor: Option<ProfileId>,
    pool: &PgPool,
) -> Result<EventListing, EventError> {
    let existing = find_event(id, pool).await?;
    let actor = authorize_on(actor, existing.event.cast_id, pool).await?;

    Event::delete(id, pool).await?;
    info!(event_id = %id, by = %actor, "Event deleted");
    Ok(existing)
}
