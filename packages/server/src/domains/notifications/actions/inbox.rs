//! A profile's notification inbox and the periodic purge of deleted rows

use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use super::errors::NotificationError;
use crate::common::{NotificationId, Page, PageArgs, ProfileId};
use crate::domains::notifications::models::{Notification, NotificationListing};

pub const NOTIFICATIONS_PER_PAGE: i64 = 20;

#[derive(Debug, Clone, Serialize)]
pub struct NotificationItem {
    #[serde(flatten)]
    pub listing: NotificationListing,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Inbox {
    pub unread: i64,
    #[serde(flatten)]
    pub page: Page<NotificationItem>,
}

pub async fn inbox(
    recipient_id: ProfileId,
    args: &PageArgs,
    pool: &PgPool,
) -> Result<Inbox, NotificationError> {
    let page = args.validate(NOTIFICATIONS_PER_PAGE)?;
    let (items, total) = Notification::find_for_recipient_paginated(recipient_id, &page, pool).await?;
    let unread = Notification::count_unread(recipient_id, pool).await?;

    let page = Page::new(items, total, &page).map(|listing| NotificationItem {
        message: listing.message(),
        listing,
    });
    Ok(Inbox { unread, page })
}

pub async fn mark_all_read(recipient_id: ProfileId, pool: &PgPool) -> Result<u64, NotificationError> {
    let marked = Notification::mark_all_read(recipient_id, pool).await?;
    info!(profile_id = %recipient_id, marked, "Notifications marked read");
    Ok(marked)
}

/// Remove a notification from its recipient's inbox.
pub async fn dismiss(
    recipient_id: ProfileId,
    id: NotificationId,
    pool: &PgPool,
) -> Result<(), NotificationError> {
    if !Notification::mark_deleted(id, recipient_id, pool).await? {
        return Err(NotificationError::NotFound);
    }
    info!(profile_id = %recipient_id, notification_id = %id, "Notification dismissed");
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationCleanup {
    pub marked: i64,
    pub deleted: u64,
    pub dry_run: bool,
}

/// Permanently delete notifications their recipients dismissed.
///
/// With `dry_run` they are only counted.
pub async fn clean_notifications(
    dry_run: bool,
    pool: &PgPool,
) -> Result<NotificationCleanup, NotificationError> {
    let marked = Notification::count_deleted(pool).await?;
    let deleted = if dry_run {
        0
    } else {
        Notification::purge_deleted(pool).await?
    };

    info!(marked, deleted, dry_run, "Notification cleanup finished");
    Ok(NotificationCleanup {
        marked,
        deleted,
        dry_run,
    })
}
