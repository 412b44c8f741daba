//! Actions a profile takes on its own standing in a cast

use sqlx::PgPool;
use tracing::info;

use super::errors::CastError;
use super::lifecycle::authorize;
use crate::common::{CastCapability, ProfileId};
use crate::domains::casts::ledger::{LedgerOp, Standing};
use crate::domains::casts::models::{Cast, CastMembership};
use crate::domains::notifications::models::{Notification, NotificationKind};
use crate::domains::profiles::models::Profile;

async fn acting_profile(
    cast: &Cast,
    actor: Option<ProfileId>,
    pool: &PgPool,
) -> Result<Profile, CastError> {
    let profile_id = authorize(actor, CastCapability::SelfService, cast, pool).await?;
    Profile::find_by_id(profile_id, pool)
        .await?
        .ok_or(CastError::ProfileNotFound)
}

async fn apply_to_self(
    op: LedgerOp,
    cast: &Cast,
    actor: Option<ProfileId>,
    pool: &PgPool,
) -> Result<Standing, CastError> {
    let profile = acting_profile(cast, actor, pool).await?;
    Ok(CastMembership::apply(op, cast, &profile, pool).await?)
}

/// Ask to join the cast and notify its managers. Blocked profiles are refused.
pub async fn request_membership(
    cast: &Cast,
    actor: Option<ProfileId>,
    pool: &PgPool,
) -> Result<Standing, CastError> {
    let profile = acting_profile(cast, actor, pool).await?;

    let mut tx = pool.begin().await?;
    let standing = CastMembership::apply_in(
        LedgerOp::AddMemberRequest,
        cast,
        &profile,
        &mut *tx,
        |_, _| Ok::<(), CastError>(()),
    )
    .await?;
    let notified = Notification::notify_managers(
        cast.id,
        profile.id,
        NotificationKind::CastMemberRequest,
        &mut *tx,
    )
    .await?;
    tx.commit().await?;

    info!(cast_id = %cast.id, profile_id = %profile.id, notified, "Membership requested");
    Ok(standing)
}

/// Leave the cast. Managers must step down first.
pub async fn leave_cast(
    cast: &Cast,
    actor: Option<ProfileId>,
    pool: &PgPool,
) -> Result<Standing, CastError> {
    apply_to_self(LedgerOp::RemoveMember, cast, actor, pool).await
}

pub async fn withdraw_request(
    cast: &Cast,
    actor: Option<ProfileId>,
    pool: &PgPool,
) -> Result<Standing, CastError> {
    apply_to_self(LedgerOp::RemoveMemberRequest, cast, actor, pool).await
}
