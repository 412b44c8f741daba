//! Manager-only roster administration.
//!
//! Every action authorizes the actor against the cast before touching the
//! ledger. Rules the ledger itself does not know about (keeping one manager,
//! never blocking a manager) are checked here under the ledger's lock.

use sqlx::PgPool;
use tracing::info;

use super::errors::CastError;
use super::lifecycle::authorize;
use crate::common::{CastCapability, ProfileId};
use crate::domains::casts::ledger::{LedgerOp, MembershipError, MembershipKind, Refusal, Subject};
use crate::domains::casts::models::{Cast, CastMembership};
use crate::domains::profiles::models::{Profile, ProfileCard};

async fn profile_by_id(profile_id: ProfileId, pool: &PgPool) -> Result<Profile, CastError> {
    Profile::find_by_id(profile_id, pool)
        .await?
        .ok_or(CastError::ProfileNotFound)
}

async fn profile_by_username(username: &str, pool: &PgPool) -> Result<Profile, CastError> {
    let username = username.trim();
    Profile::find_by_username(username, pool)
        .await?
        .ok_or_else(|| CastError::UnknownUsername(username.to_string()))
}

async fn list_kind(
    cast: &Cast,
    actor: Option<ProfileId>,
    capability: CastCapability,
    kind: MembershipKind,
    pool: &PgPool,
) -> Result<Vec<ProfileCard>, CastError> {
    authorize(actor, capability, cast, pool).await?;
    let profiles = CastMembership::profiles_with_kind(cast.id, kind, pool).await?;
    Ok(profiles.iter().map(ProfileCard::from).collect())
}

// =============================================================================
// Managers
// =============================================================================

pub async fn list_managers(
    cast: &Cast,
    actor: Option<ProfileId>,
    pool: &PgPool,
) -> Result<Vec<ProfileCard>, CastError> {
    list_kind(cast, actor, CastCapability::ManageManagers, MembershipKind::Manager, pool).await
}

/// Promote an existing member, found by username.
pub async fn add_manager(
    cast: &Cast,
    actor: Option<ProfileId>,
    username: &str,
    pool: &PgPool,
) -> Result<Profile, CastError> {
    let actor = authorize(actor, CastCapability::ManageManagers, cast, pool).await?;
    let profile = profile_by_username(username, pool).await?;

    CastMembership::apply(LedgerOp::AddManager, cast, &profile, pool).await?;
    info!(cast_id = %cast.id, profile_id = %profile.id, by = %actor, "Manager added");
    Ok(profile)
}

/// Demote a manager. The cast keeps at least one manager, and managers
/// cannot demote themselves.
pub async fn remove_manager(
    cast: &Cast,
    actor: Option<ProfileId>,
    profile_id: ProfileId,
    pool: &PgPool,
) -> Result<Profile, CastError> {
    let actor = authorize(actor, CastCapability::ManageManagers, cast, pool).await?;
    let profile = profile_by_id(profile_id, pool).await?;

    CastMembership::apply_guarded(LedgerOp::RemoveManager, cast, &profile, pool, |_, managers| {
        if managers < 2 {
            return Err(CastError::TooFewManagers);
        }
        if profile.id == actor {
            return Err(CastError::CannotRemoveSelf);
        }
        Ok(())
    })
    .await?;

    info!(cast_id = %cast.id, profile_id = %profile.id, by = %actor, "Manager removed");
    Ok(profile)
}

// =============================================================================
// Requests
// =============================================================================

pub async fn list_requests(
    cast: &Cast,
    actor: Option<ProfileId>,
    pool: &PgPool,
) -> Result<Vec<ProfileCard>, CastError> {
    list_kind(cast, actor, CastCapability::ManageRoster, MembershipKind::Requested, pool).await
}

/// Accept a pending request: the request is cleared and the profile joins.
pub async fn approve_request(
    cast: &Cast,
    actor: Option<ProfileId>,
    profile_id: ProfileId,
    pool: &PgPool,
) -> Result<Profile, CastError> {
    let actor = authorize(actor, CastCapability::ManageRoster, cast, pool).await?;
    let profile = profile_by_id(profile_id, pool).await?;

    // AddMember clears the request itself; it only has to be pending
    CastMembership::apply_guarded(LedgerOp::AddMember, cast, &profile, pool, |standing, _| {
        if !standing.requested {
            return Err(CastError::Membership(MembershipError::new(
                LedgerOp::RemoveMemberRequest,
                Refusal::NotRequested,
                &profile.display_name(),
                &cast.name,
            )));
        }
        Ok(())
    })
    .await?;

    info!(cast_id = %cast.id, profile_id = %profile.id, by = %actor, "Request approved");
    Ok(profile)
}

pub async fn deny_request(
    cast: &Cast,
    actor: Option<ProfileId>,
    profile_id: ProfileId,
    pool: &PgPool,
) -> Result<Profile, CastError> {
    let actor = authorize(actor, CastCapability::ManageRoster, cast, pool).await?;
    let profile = profile_by_id(profile_id, pool).await?;

    CastMembership::apply(LedgerOp::RemoveMemberRequest, cast, &profile, pool).await?;
    info!(cast_id = %cast.id, profile_id = %profile.id, by = %actor, "Request denied");
    Ok(profile)
}

// =============================================================================
// Members
// =============================================================================

/// Add a member directly, found by username.
pub async fn add_member(
    cast: &Cast,
    actor: Option<ProfileId>,
    username: &str,
    pool: &PgPool,
) -> Result<Profile, CastError> {
    let actor = authorize(actor, CastCapability::ManageRoster, cast, pool).await?;
    let profile = profile_by_username(username, pool).await?;

    CastMembership::apply(LedgerOp::AddMember, cast, &profile, pool).await?;
    info!(cast_id = %cast.id, profile_id = %profile.id, by = %actor, "Member added");
    Ok(profile)
}

pub async fn remove_member(
    cast: &Cast,
    actor: Option<ProfileId>,
    profile_id: ProfileId,
    pool: &PgPool,
) -> Result<Profile, CastError> {
    let actor = authorize(actor, CastCapability::ManageRoster, cast, pool).await?;
    let profile = profile_by_id(profile_id, pool).await?;

    CastMembership::apply(LedgerOp::RemoveMember, cast, &profile, pool).await?;
    info!(cast_id = %cast.id, profile_id = %profile.id, by = %actor, "Member removed");
    Ok(profile)
}

// =============================================================================
// Blocking
// =============================================================================

pub async fn list_blocked(
    cast: &Cast,
    actor: Option<ProfileId>,
    pool: &PgPool,
) -> Result<Vec<ProfileCard>, CastError> {
    list_kind(cast, actor, CastCapability::ManageRoster, MembershipKind::Blocked, pool).await
}

/// Block a profile, dropping any membership or pending request.
/// Managers have to be demoted first.
pub async fn block_user(
    cast: &Cast,
    actor: Option<ProfileId>,
    profile_id: ProfileId,
    pool: &PgPool,
) -> Result<Profile, CastError> {
    let actor = authorize(actor, CastCapability::ManageRoster, cast, pool).await?;
    let profile = profile_by_id(profile_id, pool).await?;

    CastMembership::apply_guarded(LedgerOp::BlockUser, cast, &profile, pool, |standing, _| {
        if standing.manager {
            return Err(CastError::ManagerCannotBeBlocked(profile.display_name()));
        }
        Ok(())
    })
    .await?;

    info!(cast_id = %cast.id, profile_id = %profile.id, by = %actor, "Profile blocked");
    Ok(profile)
}

pub async fn unblock_user(
    cast: &Cast,
    actor: Option<ProfileId>,
    profile_id: ProfileId,
    pool: &PgPool,
) -> Result<Profile, CastError> {
    let actor = authorize(actor, CastCapability::ManageRoster, cast, pool).await?;
    let profile = profile_by_id(profile_id, pool).await?;

    CastMembership::apply(LedgerOp::UnblockUser, cast, &profile, pool).await?;
    info!(cast_id = %cast.id, profile_id = %profile.id, by = %actor, "Profile unblocked");
    Ok(profile)
}
