use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::utils::{blank_to_none, limit_text, optional_url, ValidationError};
use crate::common::{ProfileId, UserId, ValidatedPage};
use crate::domains::casts::ledger::Subject;

/// Minimum age to appear in profile search.
pub const SEARCHABLE_AGE: u32 = 18;

/// Profile model - the per-user record every cast relationship points at.
///
/// Loaded joined with its user so display names are always at hand.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: UserId,

    // From the owning user
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,

    pub alt: Option<String>,
    pub bio: String,
    pub location: String,
    pub birth_date: Option<NaiveDate>,

    // Social links
    pub external_url: Option<String>,
    pub facebook_url: Option<String>,
    pub twitter_user: Option<String>,
    pub instagram_user: Option<String>,

    // Privacy
    pub show_email: bool,
    pub searchable: bool,

    pub created_at: DateTime<Utc>,
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub twitter_user: Option<String>,
    #[serde(default)]
    pub instagram_user: Option<String>,
    #[serde(default)]
    pub show_email: bool,
    #[serde(default = "default_searchable")]
    pub searchable: bool,
}

fn default_searchable() -> bool {
    true
}

impl ProfileUpdate {
    pub fn clean(self) -> Result<Self, ValidationError> {
        let update = Self {
            alt: blank_to_none(self.alt),
            bio: self.bio.trim().to_string(),
            location: self.location.trim().to_string(),
            external_url: blank_to_none(self.external_url),
            facebook_url: blank_to_none(self.facebook_url),
            twitter_user: blank_to_none(self.twitter_user)
                .map(|u| u.trim_start_matches('@').to_string()),
            instagram_user: blank_to_none(self.instagram_user)
                .map(|u| u.trim_start_matches('@').to_string()),
            ..self
        };

        limit_text("alt", update.alt.as_deref().unwrap_or(""), 128)?;
        limit_text("bio", &update.bio, 500)?;
        limit_text("location", &update.location, 30)?;
        optional_url("external_url", update.external_url.as_deref())?;
        optional_url("facebook_url", update.facebook_url.as_deref())?;
        limit_text("twitter_user", update.twitter_user.as_deref().unwrap_or(""), 15)?;
        limit_text("instagram_user", update.instagram_user.as_deref().unwrap_or(""), 30)?;

        Ok(update)
    }
}

impl Profile {
    pub(crate) fn base_query(suffix: &str) -> String {
        format!(
            "SELECT p.id, p.user_id, u.username, u.email, u.first_name, u.last_name, \
             p.alt, p.bio, p.location, p.birth_date, p.external_url, p.facebook_url, \
             p.twitter_user, p.instagram_user, p.show_email, p.searchable, p.created_at \
             FROM profiles p JOIN users u ON u.id = p.user_id {}",
            suffix
        )
    }

    pub async fn find_by_id(id: ProfileId, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(&Self::base_query("WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_user_id(user_id: UserId, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(&Self::base_query("WHERE p.user_id = $1"))
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(username: &str, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(&Self::base_query("WHERE u.username = $1"))
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(id: ProfileId, update: &ProfileUpdate, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query(
            "UPDATE profiles
             SET alt = $2, bio = $3, location = $4, external_url = $5, facebook_url = $6,
                 twitter_user = $7, instagram_user = $8, show_email = $9, searchable = $10
             WHERE id = $1",
        )
        .bind(id)
        .bind(&update.alt)
        .bind(&update.bio)
        .bind(&update.location)
        .bind(&update.external_url)
        .bind(&update.facebook_url)
        .bind(&update.twitter_user)
        .bind(&update.instagram_user)
        .bind(update.show_email)
        .bind(update.searchable)
        .execute(pool)
        .await?;

        Self::find_by_id(id, pool)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Searchable adults whose names match every term, by display name.
    ///
    /// `born_by` is the latest birth date that counts as an adult today.
    pub async fn search_by_name(
        terms: &[String],
        born_by: NaiveDate,
        page: &ValidatedPage,
        pool: &PgPool,
    ) -> sqlx::Result<(Vec<Self>, i64)> {
        let patterns: Vec<String> = terms.iter().map(|t| format!("%{}%", escape_like(t))).collect();
        let filter = "WHERE p.searchable AND p.birth_date <= $2
             AND NOT EXISTS (
                SELECT 1 FROM unnest($1::text[]) AS term
                WHERE NOT (u.first_name ILIKE term OR u.last_name ILIKE term
                           OR COALESCE(p.alt, '') ILIKE term)
             )";

        let profiles = sqlx::query_as::<_, Self>(&Self::base_query(&format!(
            "{} ORDER BY lower(COALESCE(NULLIF(trim(p.alt), ''), u.first_name || ' ' || u.last_name)) \
             LIMIT $3 OFFSET $4",
            filter
        )))
        .bind(&patterns)
        .bind(born_by)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM profiles p JOIN users u ON u.id = p.user_id {}",
            filter
        ))
        .bind(&patterns)
        .bind(born_by)
        .fetch_one(pool)
        .await?;

        Ok((profiles, total))
    }

    /// The name shown across the site: the alternate display name when set,
    /// otherwise the full name, otherwise the username.
    pub fn name(&self) -> String {
        if let Some(alt) = self.alt.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            return alt.to_string();
        }
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    /// Age in whole years on `today`, when a birth date is known.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.birth_date.map(|born| age_between(born, today))
    }

    /// Opted into search and known to be an adult.
    pub fn is_searchable_on(&self, today: NaiveDate) -> bool {
        self.searchable && self.age_on(today).is_some_and(|age| age >= SEARCHABLE_AGE)
    }
}

/// Public summary used in rosters and admin lists; never carries the email.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileCard {
    pub id: ProfileId,
    pub username: String,
    pub name: String,
    pub location: String,
}

impl From<&Profile> for ProfileCard {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            username: profile.username.clone(),
            name: profile.name(),
            location: profile.location.clone(),
        }
    }
}

impl From<Profile> for ProfileCard {
    fn from(profile: Profile) -> Self {
        Self::from(&profile)
    }
}

impl Subject for Profile {
    fn profile_id(&self) -> ProfileId {
        self.id
    }

    fn display_name(&self) -> String {
        self.name()
    }
}

/// Whole years from `born` to `today`.
pub fn age_between(born: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Latest birth date of someone at least `SEARCHABLE_AGE` on `today`.
pub fn adult_born_by(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(SEARCHABLE_AGE * 12))
        .unwrap_or(NaiveDate::MIN)
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
