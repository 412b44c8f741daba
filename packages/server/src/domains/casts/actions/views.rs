//! Read-side assembly for the public cast pages

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;

use super::errors::CastError;
use crate::common::{Page, PageArgs, ProfileId, ValidatedPage};
use crate::domains::casts::ledger::{MembershipKind, Standing};
use crate::domains::casts::models::{Cast, CastMembership, PageSection};
use crate::domains::events::actions::EVENTS_PER_PAGE;
use crate::domains::events::models::{Event, EventListing};
use crate::domains::profiles::models::ProfileCard;

pub const ROSTER_PER_PAGE: i64 = 24;

/// Events previewed on a cast's home page
pub const HOME_UPCOMING_EVENTS: i64 = 3;

/// What the cast page needs to know about whoever is looking at it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewerStanding {
    pub show_management: bool,
    pub is_member: bool,
    pub is_blocked: bool,
    pub has_requested_membership: bool,
}

impl From<Standing> for ViewerStanding {
    fn from(standing: Standing) -> Self {
        Self {
            show_management: standing.manager,
            is_member: standing.member,
            is_blocked: standing.blocked,
            has_requested_membership: standing.requested,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CastHome {
    pub cast: Cast,
    pub sections: Vec<PageSection>,
    pub upcoming_events: Vec<EventListing>,
    pub member_count: i64,
    pub manager_count: i64,
    pub viewer: ViewerStanding,
}

pub async fn cast_home(
    cast: Cast,
    viewer: Option<ProfileId>,
    today: NaiveDate,
    pool: &PgPool,
) -> Result<CastHome, CastError> {
    let member_count = CastMembership::count_kind(cast.id, MembershipKind::Member, pool).await?;
    let manager_count = CastMembership::count_kind(cast.id, MembershipKind::Manager, pool).await?;
    let sections = PageSection::find_for_cast(cast.id, pool).await?;
    let (upcoming_events, _) = Event::find_future_paginated(
        today,
        Some(cast.id),
        &ValidatedPage::first(HOME_UPCOMING_EVENTS),
        pool,
    )
    .await?;

    let viewer = match viewer {
        Some(profile_id) => {
            ViewerStanding::from(CastMembership::standing(cast.id, profile_id, pool).await?)
        }
        None => ViewerStanding::default(),
    };

    Ok(CastHome {
        member_count,
        manager_count,
        cast,
        sections,
        upcoming_events,
        viewer,
    })
}

/// Members sorted by display name
pub async fn roster(
    cast: &Cast,
    args: &PageArgs,
    pool: &PgPool,
) -> Result<Page<ProfileCard>, CastError> {
    let page = args.validate(ROSTER_PER_PAGE)?;
    let (profiles, total) =
        CastMembership::profiles_with_kind_paginated(cast.id, MembershipKind::Member, &page, pool)
            .await?;

    Ok(Page::new(profiles, total, &page).map(ProfileCard::from))
}

pub async fn cast_events(
    cast: &Cast,
    args: &PageArgs,
    today: NaiveDate,
    pool: &PgPool,
) -> Result<Page<EventListing>, CastError> {
    let page = args.validate(EVENTS_PER_PAGE)?;
    let (events, total) = Event::find_future_paginated(today, Some(cast.id), &page, pool).await?;
    Ok(Page::new(events, total, &page))
}
