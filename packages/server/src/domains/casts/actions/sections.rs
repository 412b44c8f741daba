use sqlx::PgPool;
use tracing::info;

use super::errors::CastError;
use super::lifecycle::authorize;
use crate::common::{CastCapability, PageSectionId, ProfileId};
use crate::domains::casts::models::{Cast, PageSection, SectionInput};

pub async fn add_section(
    cast: &Cast,
    actor: Option<ProfileId>,
    input: SectionInput,
    pool: &PgPool,
) -> Result<PageSection, CastError> {
    authorize(actor, CastCapability::EditCast, cast, pool).await?;
    let input = input.clean()?;

    let section = PageSection::create(cast.id, &input, pool).await?;
    info!(cast_id = %cast.id, section_id = %section.id, "Page section added");
    Ok(section)
}

/// Edit a section. Sections of other casts are reported as not found.
pub async fn edit_section(
    cast: &Cast,
    actor: Option<ProfileId>,
    section_id: PageSectionId,
    input: SectionInput,
    pool: &PgPool,
) -> Result<PageSection, CastError> {
    authorize(actor, CastCapability::EditCast, cast, pool).await?;
    let input = input.clean()?;

    PageSection::update(section_id, cast.id, &input, pool)
        .await?
        .ok_or(CastError::SectionNotFound)
}

pub async fn delete_section(
    cast: &Cast,
    actor: Option<ProfileId>,
    section_id: PageSectionId,
    pool: &PgPool,
) -> Result<(), CastError> {
    authorize(actor, CastCapability::EditCast, cast, pool).await?;

    if !PageSection::delete(section_id, cast.id, pool).await? {
        return Err(CastError::SectionNotFound);
    }
    info!(cast_id = %cast.id, section_id = %section_id, "Page section deleted");
    Ok(())
}
