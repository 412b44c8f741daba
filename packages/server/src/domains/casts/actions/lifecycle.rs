//! Cast lifecycle actions: lookup, create, edit, delete

use sqlx::PgPool;
use tracing::info;

use super::errors::CastError;
use crate::common::utils::{is_unique_violation, slugify};
use crate::common::{Actor, AuthError, CastCapability, ProfileId};
use crate::domains::casts::ledger::MembershipKind;
use crate::domains::casts::models::{Cast, CastInput, CastMembership};

pub async fn find_cast(slug: &str, pool: &PgPool) -> Result<Cast, CastError> {
    Cast::find_by_slug(slug, pool).await?.ok_or(CastError::NotFound)
}

/// Check that `actor` holds `capability` on `cast`, returning their profile id.
pub async fn authorize(
    actor: Option<ProfileId>,
    capability: CastCapability,
    cast: &Cast,
    pool: &PgPool,
) -> Result<ProfileId, CastError> {
    Ok(Actor::new(actor)
        .can(capability)
        .on(cast.id)
        .check(pool)
        .await?)
}

/// Register a new cast with `founder` as its first member and manager.
pub async fn create_cast(
    input: CastInput,
    founder: Option<ProfileId>,
    pool: &PgPool,
) -> Result<Cast, CastError> {
    let founder = founder.ok_or(AuthError::AuthenticationRequired)?;
    let input = input.clean()?;

    if Cast::slug_taken(&slugify(&input.name), None, pool).await? {
        return Err(CastError::NameTaken(input.name));
    }

    let cast = Cast::create_with_founder(&input, founder, pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CastError::NameTaken(input.name.clone())
            } else {
                CastError::Database(e)
            }
        })?;

    info!(cast_id = %cast.id, slug = %cast.slug, founder = %founder, "Cast created");
    Ok(cast)
}

/// Save new cast info. The slug follows the name.
pub async fn update_cast(
    cast: &Cast,
    actor: Option<ProfileId>,
    input: CastInput,
    pool: &PgPool,
) -> Result<Cast, CastError> {
    authorize(actor, CastCapability::EditCast, cast, pool).await?;
    let input = input.clean()?;

    if Cast::slug_taken(&slugify(&input.name), Some(cast.id), pool).await? {
        return Err(CastError::NameTaken(input.name));
    }

    let updated = Cast::update(cast.id, &input, pool).await.map_err(|e| {
        if is_unique_violation(&e) {
            CastError::NameTaken(input.name.clone())
        } else {
            CastError::Database(e)
        }
    })?;

    info!(cast_id = %cast.id, old_slug = %cast.slug, slug = %updated.slug, "Cast updated");
    Ok(updated)
}

/// Delete a cast. Only its last remaining manager may do this, and only
/// after typing the cast name.
pub async fn delete_cast(
    cast: &Cast,
    actor: Option<ProfileId>,
    confirm_name: &str,
    pool: &PgPool,
) -> Result<(), CastError> {
    let actor = authorize(actor, CastCapability::DeleteCast, cast, pool).await?;

    let managers = CastMembership::count_kind(cast.id, MembershipKind::Manager, pool).await?;
    if managers != 1 {
        return Err(CastError::DeleteNeedsSoleManager);
    }
    if confirm_name.trim() != cast.name {
        return Err(CastError::NameMismatch);
    }

    Cast::delete(cast.id, pool).await?;
    info!(cast_id = %cast.id, slug = %cast.slug, deleted_by = %actor, "Cast deleted");
    Ok(())
}
