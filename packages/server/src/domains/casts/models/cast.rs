use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::utils::{blank_to_none, limit_text, optional_url, require_text, slugify, ValidationError};
use crate::common::{CastId, ProfileId, ValidatedPage};
use crate::domains::casts::ledger::MembershipKind;

/// Cast model - a registered performance troupe
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Cast {
    pub id: CastId,
    pub name: String,
    /// Always `slugify(name)`; recomputed on every save
    pub slug: String,
    pub description: String,

    // Social links
    pub external_url: Option<String>,
    pub facebook_url: Option<String>,
    pub twitter_user: Option<String>,
    pub instagram_user: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Cast info as submitted by the create/edit forms
#[derive(Debug, Clone, Deserialize)]
pub struct CastInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub twitter_user: Option<String>,
    #[serde(default)]
    pub instagram_user: Option<String>,
}

impl CastInput {
    /// Trim fields, drop blank optionals, and check lengths.
    pub fn clean(self) -> Result<Self, ValidationError> {
        let input = Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            external_url: blank_to_none(self.external_url),
            facebook_url: blank_to_none(self.facebook_url),
            twitter_user: blank_to_none(self.twitter_user)
                .map(|u| u.trim_start_matches('@').to_string()),
            instagram_user: blank_to_none(self.instagram_user)
                .map(|u| u.trim_start_matches('@').to_string()),
        };

        require_text("name", &input.name, 128)?;
        if slugify(&input.name).is_empty() {
            return Err(ValidationError::new(
                "name",
                "Cast names need at least one letter or number",
            ));
        }
        optional_url("external_url", input.external_url.as_deref())?;
        optional_url("facebook_url", input.facebook_url.as_deref())?;
        limit_text("twitter_user", input.twitter_user.as_deref().unwrap_or(""), 15)?;
        limit_text("instagram_user", input.instagram_user.as_deref().unwrap_or(""), 30)?;

        Ok(input)
    }
}

impl Cast {
    pub async fn find_by_id(id: CastId, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM casts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM casts WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Whether another cast already owns this name's slug.
    pub async fn slug_taken(slug: &str, except: Option<CastId>, pool: &PgPool) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM casts WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)
             )",
        )
        .bind(slug)
        .bind(except)
        .fetch_one(pool)
        .await
    }

    /// All casts, alphabetically
    pub async fn find_all(pool: &PgPool) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM casts ORDER BY lower(name)")
            .fetch_all(pool)
            .await
    }

    /// Casts whose name is trigram-similar to `name`, best match first.
    pub async fn search_by_name(
        name: &str,
        page: &ValidatedPage,
        pool: &PgPool,
    ) -> sqlx::Result<(Vec<Self>, i64)> {
        let casts = sqlx::query_as::<_, Self>(
            "SELECT * FROM casts
             WHERE name % $1
             ORDER BY similarity(name, $1) DESC, lower(name)
             LIMIT $2 OFFSET $3",
        )
        .bind(name)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM casts WHERE name % $1")
            .bind(name)
            .fetch_one(pool)
            .await?;

        Ok((casts, total))
    }

    /// Create a cast with its founder as member and manager, atomically.
    pub async fn create_with_founder(
        input: &CastInput,
        founder: ProfileId,
        pool: &PgPool,
    ) -> sqlx::Result<Self> {
        let mut tx = pool.begin().await?;

        let cast = sqlx::query_as::<_, Self>(
            "INSERT INTO casts (
                id, name, slug, description,
                external_url, facebook_url, twitter_user, instagram_user
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(CastId::new())
        .bind(&input.name)
        .bind(slugify(&input.name))
        .bind(&input.description)
        .bind(&input.external_url)
        .bind(&input.facebook_url)
        .bind(&input.twitter_user)
        .bind(&input.instagram_user)
        .fetch_one(&mut *tx)
        .await?;

        for kind in [MembershipKind::Member, MembershipKind::Manager] {
            sqlx::query(
                "INSERT INTO cast_memberships (cast_id, profile_id, kind) VALUES ($1, $2, $3)",
            )
            .bind(cast.id)
            .bind(founder)
            .bind(kind)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(cast)
    }

    /// Save edited cast info. The slug follows the new name.
    pub async fn update(id: CastId, input: &CastInput, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE casts
             SET name = $2, slug = $3, description = $4, external_url = $5,
                 facebook_url = $6, twitter_user = $7, instagram_user = $8
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&input.name)
        .bind(slugify(&input.name))
        .bind(&input.description)
        .bind(&input.external_url)
        .bind(&input.facebook_url)
        .bind(&input.twitter_user)
        .bind(&input.instagram_user)
        .fetch_one(pool)
        .await
    }

    /// Delete the cast; sections, events and memberships cascade.
    pub async fn delete(id: CastId, pool: &PgPool) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM casts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
