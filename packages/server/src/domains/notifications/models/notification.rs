use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{CastId, NotificationId, ProfileId, ValidatedPage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CastMemberRequest,
}

impl NotificationKind {
    pub fn verb(&self) -> &'static str {
        match self {
            NotificationKind::CastMemberRequest => "requested",
        }
    }
}

/// Notification model - one message to one recipient profile
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: ProfileId,
    pub actor_id: Option<ProfileId>,
    pub kind: NotificationKind,
    pub verb: String,
    pub cast_id: Option<CastId>,
    pub read: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification with the names needed to render it
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct NotificationListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub notification: Notification,
    pub actor_username: Option<String>,
    pub cast_name: Option<String>,
    pub cast_slug: Option<String>,
}

impl NotificationListing {
    /// One-line text, e.g. "riff requested to join Midnight Players"
    pub fn message(&self) -> String {
        let actor = self.actor_username.as_deref().unwrap_or("Someone");
        match self.notification.kind {
            NotificationKind::CastMemberRequest => format!(
                "{} {} to join {}",
                actor,
                self.notification.verb,
                self.cast_name.as_deref().unwrap_or("a cast")
            ),
        }
    }
}

const LISTING_SELECT: &str = "SELECT n.*, u.username AS actor_username, \
     c.name AS cast_name, c.slug AS cast_slug \
     FROM notifications n \
     LEFT JOIN profiles p ON p.id = n.actor_id \
     LEFT JOIN users u ON u.id = p.user_id \
     LEFT JOIN casts c ON c.id = n.cast_id";

impl Notification {
    /// Send `kind` about `cast_id` to each of the cast's managers.
    ///
    /// Runs on the caller's connection so it commits with the ledger change
    /// that triggered it. Returns the number of notifications written.
    pub async fn notify_managers(
        cast_id: CastId,
        actor_id: ProfileId,
        kind: NotificationKind,
        conn: &mut PgConnection,
    ) -> sqlx::Result<usize> {
        let managers = sqlx::query_scalar::<_, ProfileId>(
            "SELECT profile_id FROM cast_memberships WHERE cast_id = $1 AND kind = 'manager'",
        )
        .bind(cast_id)
        .fetch_all(&mut *conn)
        .await?;

        for recipient_id in &managers {
            sqlx::query(
                "INSERT INTO notifications (id, recipient_id, actor_id, kind, verb, cast_id)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(NotificationId::new())
            .bind(recipient_id)
            .bind(actor_id)
            .bind(kind)
            .bind(kind.verb())
            .bind(cast_id)
            .execute(&mut *conn)
            .await?;
        }

        Ok(managers.len())
    }

    /// A recipient's notifications that have not been deleted, newest first
    pub async fn find_for_recipient_paginated(
        recipient_id: ProfileId,
        page: &ValidatedPage,
        pool: &PgPool,
    ) -> sqlx::Result<(Vec<NotificationListing>, i64)> {
        let items = sqlx::query_as::<_, NotificationListing>(&format!(
            "{} WHERE n.recipient_id = $1 AND NOT n.deleted
             ORDER BY n.created_at DESC, n.id DESC
             LIMIT $2 OFFSET $3",
            LISTING_SELECT
        ))
        .bind(recipient_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND NOT deleted",
        )
        .bind(recipient_id)
        .fetch_one(pool)
        .await?;

        Ok((items, total))
    }

    pub async fn count_unread(recipient_id: ProfileId, pool: &PgPool) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications
             WHERE recipient_id = $1 AND NOT read AND NOT deleted",
        )
        .bind(recipient_id)
        .fetch_one(pool)
        .await
    }

    pub async fn mark_all_read(recipient_id: ProfileId, pool: &PgPool) -> sqlx::Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE
             WHERE recipient_id = $1 AND NOT read AND NOT deleted",
        )
        .bind(recipient_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Hide one notification from its recipient. The row stays until cleanup.
    pub async fn mark_deleted(
        id: NotificationId,
        recipient_id: ProfileId,
        pool: &PgPool,
    ) -> sqlx::Result<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET deleted = TRUE
             WHERE id = $1 AND recipient_id = $2 AND NOT deleted",
        )
        .bind(id)
        .bind(recipient_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_deleted(pool: &PgPool) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE deleted")
            .fetch_one(pool)
            .await
    }

    pub async fn purge_deleted(pool: &PgPool) -> sqlx::Result<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE deleted")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
