use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::utils::{blank_to_none, limit_text, require_text, ValidationError};
use crate::common::{ProfileId, UserId};
use crate::domains::profiles::models::profile::Profile;

/// Login account. Credentials live with the identity provider; this row is
/// what tokens and profiles point at.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Everything signup collects.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub alt: Option<String>,
    pub birth_date: NaiveDate,
}

/// Editable subset of account fields.
#[derive(Debug, Clone, Deserialize)]
pub struct EditUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

lazy_static! {
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[\w.@+-]+$").unwrap();
}

fn clean_username(username: &str) -> Result<String, ValidationError> {
    let username = username.trim();
    require_text("username", username, 150)?;
    if !USERNAME_REGEX.is_match(username) {
        return Err(ValidationError::new(
            "username",
            "Usernames may contain only letters, numbers, and @/./+/-/_ characters",
        ));
    }
    Ok(username.to_string())
}

fn clean_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    require_text("email", email, 254)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email.to_string()),
        _ => Err(ValidationError::new("email", "Enter a valid email address")),
    }
}

fn clean_name(field: &'static str, name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    require_text(field, name, 30)?;
    Ok(name.to_string())
}

impl NewAccount {
    pub fn clean(self) -> Result<Self, ValidationError> {
        let alt = blank_to_none(self.alt);
        limit_text("alt", alt.as_deref().unwrap_or(""), 128)?;

        Ok(Self {
            username: clean_username(&self.username)?,
            email: clean_email(&self.email)?,
            first_name: clean_name("first_name", &self.first_name)?,
            last_name: clean_name("last_name", &self.last_name)?,
            alt,
            birth_date: self.birth_date,
        })
    }
}

impl EditUser {
    pub fn clean(self) -> Result<Self, ValidationError> {
        Ok(Self {
            username: clean_username(&self.username)?,
            email: clean_email(&self.email)?,
            first_name: clean_name("first_name", &self.first_name)?,
            last_name: clean_name("last_name", &self.last_name)?,
        })
    }
}

impl User {
    pub async fn find_by_id(id: UserId, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(username: &str, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Username or email already used by an account other than `except`.
    pub async fn is_taken(
        username: &str,
        email: &str,
        except: Option<UserId>,
        pool: &PgPool,
    ) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM users
                WHERE (username = $1 OR lower(email) = lower($2))
                  AND ($3::uuid IS NULL OR id <> $3)
             )",
        )
        .bind(username)
        .bind(email)
        .bind(except)
        .fetch_one(pool)
        .await
    }

    /// Insert the account and its profile in one transaction.
    pub async fn create_with_profile(
        account: &NewAccount,
        pool: &PgPool,
    ) -> sqlx::Result<(Self, Profile)> {
        let mut tx = pool.begin().await?;

        let user = sqlx::query_as::<_, Self>(
            "INSERT INTO users (id, username, email, first_name, last_name, is_active)
             VALUES ($1, $2, $3, $4, $5, true)
             RETURNING *",
        )
        .bind(UserId::new())
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .fetch_one(&mut *tx)
        .await?;

        let profile_id = ProfileId::new();
        sqlx::query(
            "INSERT INTO profiles (id, user_id, alt, birth_date)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(profile_id)
        .bind(user.id)
        .bind(&account.alt)
        .bind(account.birth_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let profile = Profile::find_by_id(profile_id, pool)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok((user, profile))
    }

    pub async fn update(id: UserId, edit: &EditUser, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            "UPDATE users
             SET username = $2, email = $3, first_name = $4, last_name = $5
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&edit.username)
        .bind(&edit.email)
        .bind(&edit.first_name)
        .bind(&edit.last_name)
        .fetch_one(pool)
        .await
    }

    /// Delete the account. The profile and every cast relationship cascade.
    pub async fn delete(id: UserId, pool: &PgPool) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
