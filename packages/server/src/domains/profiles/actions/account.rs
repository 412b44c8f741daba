//! Actions on the caller's own account

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use super::errors::ProfileError;
use crate::common::utils::is_unique_violation;
use crate::common::{AuthError, UserId};
use crate::domains::profiles::models::profile::age_between;
use crate::domains::profiles::models::{EditUser, NewAccount, Profile, ProfileUpdate, User};

/// Youngest age allowed to create an account
pub const MINIMUM_SIGNUP_AGE: u32 = 13;

fn taken_or_database(err: sqlx::Error) -> ProfileError {
    if is_unique_violation(&err) {
        ProfileError::AccountTaken
    } else {
        ProfileError::Database(err)
    }
}

/// Create an account and its profile together.
pub async fn signup(
    account: NewAccount,
    signup_enabled: bool,
    today: NaiveDate,
    pool: &PgPool,
) -> Result<(User, Profile), ProfileError> {
    if !signup_enabled {
        return Err(ProfileError::SignupDisabled);
    }
    let account = account.clean()?;

    if account.birth_date > today || age_between(account.birth_date, today) < MINIMUM_SIGNUP_AGE {
        return Err(ProfileError::TooYoung(MINIMUM_SIGNUP_AGE));
    }
    if User::is_taken(&account.username, &account.email, None, pool).await? {
        return Err(ProfileError::AccountTaken);
    }

    let (user, profile) = User::create_with_profile(&account, pool)
        .await
        .map_err(taken_or_database)?;

    info!(user_id = %user.id, profile_id = %profile.id, username = %user.username, "Account created");
    Ok((user, profile))
}

/// The caller's account and profile, for the settings page
#[derive(Debug, Clone, Serialize)]
pub struct AccountSettings {
    pub user: User,
    pub profile: Profile,
    pub appears_in_search: bool,
}

async fn load_account(user_id: UserId, pool: &PgPool) -> Result<(User, Profile), ProfileError> {
    let user = User::find_by_id(user_id, pool)
        .await?
        .ok_or(AuthError::AuthenticationRequired)?;
    let profile = Profile::find_by_user_id(user_id, pool)
        .await?
        .ok_or(ProfileError::NotFound)?;
    Ok((user, profile))
}

pub async fn account_settings(
    user_id: UserId,
    today: NaiveDate,
    pool: &PgPool,
) -> Result<AccountSettings, ProfileError> {
    let (user, profile) = load_account(user_id, pool).await?;
    Ok(AccountSettings {
        appears_in_search: profile.is_searchable_on(today),
        user,
        profile,
    })
}

pub async fn edit_user(
    user_id: UserId,
    edit: EditUser,
    pool: &PgPool,
) -> Result<User, ProfileError> {
    let edit = edit.clean()?;
    if User::is_taken(&edit.username, &edit.email, Some(user_id), pool).await? {
        return Err(ProfileError::AccountTaken);
    }

    let user = User::update(user_id, &edit, pool)
        .await
        .map_err(taken_or_database)?;
    info!(user_id = %user.id, "User account updated");
    Ok(user)
}

pub async fn edit_profile(
    user_id: UserId,
    update: ProfileUpdate,
    pool: &PgPool,
) -> Result<Profile, ProfileError> {
    let (_, profile) = load_account(user_id, pool).await?;
    let update = update.clean()?;

    let profile = Profile::update(profile.id, &update, pool).await?;
    info!(user_id = %user_id, profile_id = %profile.id, "Profile updated");
    Ok(profile)
}

/// Delete the caller's account once they have typed their username.
/// The profile and every cast relationship go with it.
pub async fn delete_account(
    user_id: UserId,
    confirm_username: &str,
    pool: &PgPool,
) -> Result<(), ProfileError> {
    let (user, _) = load_account(user_id, pool).await?;
    if confirm_username.trim() != user.username {
        return Err(ProfileError::ConfirmationMismatch);
    }

    User::delete(user.id, pool).await?;
    info!(user_id = %user.id, username = %user.username, "Account deleted");
    Ok(())
}
