//! Storage for the cast membership ledger.
//!
//! One row per (cast, profile, kind). [`CastMembership::apply`] runs a ledger
//! operation inside a transaction with the cast row locked, so the guard and
//! the write see the same state even under concurrent requests. The primary
//! key catches anything that slips past.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgExecutor, PgPool};
use thiserror::Error;
use tracing::{debug, info};

use crate::common::{CastId, ProfileId, ValidatedPage};
use crate::domains::casts::ledger::{
    plan, Change, LedgerOp, MembershipError, MembershipKind, MembershipLedger, Standing, Subject,
};
use crate::domains::casts::models::cast::Cast;
use crate::domains::profiles::models::Profile;

/// A ledger operation that could not be applied
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Membership(#[from] MembershipError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct CastMembership {
    pub cast_id: CastId,
    pub profile_id: ProfileId,
    pub kind: MembershipKind,
    pub created_at: DateTime<Utc>,
}

/// Case-insensitive display name, matching `Profile::name()`
const PROFILE_NAME_ORDER: &str = "lower(COALESCE(NULLIF(trim(p.alt), ''), \
     NULLIF(trim(trim(u.first_name) || ' ' || trim(u.last_name)), ''), u.username))";

impl CastMembership {
    /// Current standing of a profile within a cast
    pub async fn standing<'e>(
        cast_id: CastId,
        profile_id: ProfileId,
        executor: impl PgExecutor<'e>,
    ) -> sqlx::Result<Standing> {
        let kinds = sqlx::query_scalar::<_, MembershipKind>(
            "SELECT kind FROM cast_memberships WHERE cast_id = $1 AND profile_id = $2",
        )
        .bind(cast_id)
        .bind(profile_id)
        .fetch_all(executor)
        .await?;

        Ok(Standing::from_kinds(kinds))
    }

    /// Run one ledger operation against storage.
    ///
    /// Returns the pair's standing after the operation. A refusal rolls back
    /// and leaves every set untouched.
    pub async fn apply(
        op: LedgerOp,
        cast: &Cast,
        profile: &Profile,
        pool: &PgPool,
    ) -> Result<Standing, LedgerError> {
        Self::apply_guarded(op, cast, profile, pool, |_, _| Ok::<(), LedgerError>(())).await
    }

    /// [`apply`](Self::apply) with a caller rule checked under the same lock.
    ///
    /// `guard` sees the pair's standing and the cast's manager count before
    /// the ledger plan runs; an `Err` aborts the transaction.
    pub async fn apply_guarded<E, G>(
        op: LedgerOp,
        cast: &Cast,
        profile: &Profile,
        pool: &PgPool,
        guard: G,
    ) -> Result<Standing, E>
    where
        E: From<MembershipError> + From<sqlx::Error>,
        G: FnOnce(&Standing, i64) -> Result<(), E>,
    {
        let mut tx = pool.begin().await?;
        let standing = Self::apply_in(op, cast, profile, &mut *tx, guard).await?;
        tx.commit().await?;

        info!(
            cast_id = %cast.id,
            profile_id = %profile.id,
            op = %op,
            "Ledger operation applied"
        );
        Ok(standing)
    }

    /// Lock the cast, check `guard`, plan and write on an open transaction.
    ///
    /// Nothing is committed here, so callers can record follow-up rows that
    /// stand or fall with the ledger change.
    pub async fn apply_in<E, G>(
        op: LedgerOp,
        cast: &Cast,
        profile: &Profile,
        conn: &mut PgConnection,
        guard: G,
    ) -> Result<Standing, E>
    where
        E: From<MembershipError> + From<sqlx::Error>,
        G: FnOnce(&Standing, i64) -> Result<(), E>,
    {
        // Serialize ledger operations per cast
        sqlx::query("SELECT id FROM casts WHERE id = $1 FOR UPDATE")
            .bind(cast.id)
            .fetch_one(&mut *conn)
            .await?;

        let mut standing = Self::standing(cast.id, profile.id, &mut *conn).await?;
        let managers = Self::count_kind(cast.id, MembershipKind::Manager, &mut *conn).await?;
        guard(&standing, managers)?;

        let changes = plan(op, &standing).map_err(|refusal| {
            debug!(
                cast_id = %cast.id,
                profile_id = %profile.id,
                op = %op,
                refusal = ?refusal,
                "Ledger operation refused"
            );
            MembershipError::new(op, refusal, &profile.display_name(), &cast.name)
        })?;

        for change in &changes {
            match *change {
                Change::Insert(kind) => {
                    sqlx::query(
                        "INSERT INTO cast_memberships (cast_id, profile_id, kind)
                         VALUES ($1, $2, $3)
                         ON CONFLICT DO NOTHING",
                    )
                    .bind(cast.id)
                    .bind(profile.id)
                    .bind(kind)
                    .execute(&mut *conn)
                    .await?;
                }
                Change::Delete(kind) => {
                    sqlx::query(
                        "DELETE FROM cast_memberships
                         WHERE cast_id = $1 AND profile_id = $2 AND kind = $3",
                    )
                    .bind(cast.id)
                    .bind(profile.id)
                    .bind(kind)
                    .execute(&mut *conn)
                    .await?;
                }
            }
        }

        standing.apply(&changes);
        Ok(standing)
    }

    /// Load the whole ledger of a cast into memory
    pub async fn ledger_for(cast: &Cast, pool: &PgPool) -> sqlx::Result<MembershipLedger> {
        let rows = sqlx::query_as::<_, Self>(
            "SELECT * FROM cast_memberships WHERE cast_id = $1",
        )
        .bind(cast.id)
        .fetch_all(pool)
        .await?;

        Ok(MembershipLedger::from_rows(
            cast.name.clone(),
            rows.into_iter().map(|row| (row.profile_id, row.kind)),
        ))
    }

    pub async fn count_kind<'e>(
        cast_id: CastId,
        kind: MembershipKind,
        executor: impl PgExecutor<'e>,
    ) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM cast_memberships WHERE cast_id = $1 AND kind = $2",
        )
        .bind(cast_id)
        .bind(kind)
        .fetch_one(executor)
        .await
    }

    /// Every profile holding `kind` in the cast, sorted by display name
    pub async fn profiles_with_kind(
        cast_id: CastId,
        kind: MembershipKind,
        pool: &PgPool,
    ) -> sqlx::Result<Vec<Profile>> {
        let query = Profile::base_query(&format!(
            "JOIN cast_memberships m ON m.profile_id = p.id
             WHERE m.cast_id = $1 AND m.kind = $2
             ORDER BY {}",
            PROFILE_NAME_ORDER
        ));

        sqlx::query_as::<_, Profile>(&query)
            .bind(cast_id)
            .bind(kind)
            .fetch_all(pool)
            .await
    }

    /// One page of profiles holding `kind`, sorted by display name
    pub async fn profiles_with_kind_paginated(
        cast_id: CastId,
        kind: MembershipKind,
        page: &ValidatedPage,
        pool: &PgPool,
    ) -> sqlx::Result<(Vec<Profile>, i64)> {
        let query = Profile::base_query(&format!(
            "JOIN cast_memberships m ON m.profile_id = p.id
             WHERE m.cast_id = $1 AND m.kind = $2
             ORDER BY {}
             LIMIT $3 OFFSET $4",
            PROFILE_NAME_ORDER
        ));

        let profiles = sqlx::query_as::<_, Profile>(&query)
            .bind(cast_id)
            .bind(kind)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let total = Self::count_kind(cast_id, kind, pool).await?;
        Ok((profiles, total))
    }

    /// Casts in which the profile holds `kind`, alphabetically
    pub async fn casts_for_profile(
        profile_id: ProfileId,
        kind: MembershipKind,
        pool: &PgPool,
    ) -> sqlx::Result<Vec<Cast>> {
        sqlx::query_as::<_, Cast>(
            "SELECT c.* FROM casts c
             JOIN cast_memberships m ON m.cast_id = c.id
             WHERE m.profile_id = $1 AND m.kind = $2
             ORDER BY lower(c.name)",
        )
        .bind(profile_id)
        .bind(kind)
        .fetch_all(pool)
        .await
    }
}
