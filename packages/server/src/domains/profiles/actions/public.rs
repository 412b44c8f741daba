use serde::Serialize;
use sqlx::PgPool;

use super::errors::ProfileError;
use crate::common::ProfileId;
use crate::domains::casts::ledger::MembershipKind;
use crate::domains::casts::models::{Cast, CastMembership};
use crate::domains::profiles::models::Profile;

/// Cast reference shown on a profile page
#[derive(Debug, Clone, Serialize)]
pub struct CastLink {
    pub name: String,
    pub slug: String,
}

impl From<Cast> for CastLink {
    fn from(cast: Cast) -> Self {
        Self {
            name: cast.name,
            slug: cast.slug,
        }
    }
}

/// What anyone can see of a profile
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub id: ProfileId,
    pub username: String,
    pub name: String,
    pub bio: String,
    pub location: String,
    pub external_url: Option<String>,
    pub facebook_url: Option<String>,
    pub twitter_user: Option<String>,
    pub instagram_user: Option<String>,
    /// Only present when the owner opted in
    pub email: Option<String>,
    pub casts: Vec<CastLink>,
    pub managed_casts: Vec<CastLink>,
}

impl PublicProfile {
    fn new(profile: Profile, casts: Vec<Cast>, managed: Vec<Cast>) -> Self {
        Self {
            id: profile.id,
            name: profile.name(),
            email: profile.show_email.then(|| profile.email.clone()),
            username: profile.username,
            bio: profile.bio,
            location: profile.location,
            external_url: profile.external_url,
            facebook_url: profile.facebook_url,
            twitter_user: profile.twitter_user,
            instagram_user: profile.instagram_user,
            casts: casts.into_iter().map(CastLink::from).collect(),
            managed_casts: managed.into_iter().map(CastLink::from).collect(),
        }
    }
}

pub async fn public_profile(username: &str, pool: &PgPool) -> Result<PublicProfile, ProfileError> {
    let profile = Profile::find_by_username(username, pool)
        .await?
        .ok_or(ProfileError::NotFound)?;

    let casts = CastMembership::casts_for_profile(profile.id, MembershipKind::Member, pool).await?;
    let managed = CastMembership::casts_for_profile(profile.id, MembershipKind::Manager, pool).await?;
    Ok(PublicProfile::new(profile, casts, managed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::UserId;
    use chrono::Utc;

    fn profile(show_email: bool) -> Profile {
        Profile {
            id: ProfileId::new(),
            user_id: UserId::new(),
            username: "magenta".to_string(),
            email: "magenta@castle.example".to_string(),
            first_name: "Magenta".to_string(),
            last_name: String::new(),
            alt: None,
            bio: String::new(),
            location: String::new(),
            birth_date: None,
            external_url: None,
            facebook_url: None,
            twitter_user: None,
            instagram_user: None,
            show_email,
            searchable: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_email_hidden_unless_shown() {
        assert_eq!(PublicProfile::new(profile(false), vec![], vec![]).email, None);
        assert_eq!(
            PublicProfile::new(profile(true), vec![], vec![]).email.as_deref(),
            Some("magenta@castle.example")
        );
    }

    #[test]
    fn test_name_is_display_name() {
        assert_eq!(PublicProfile::new(profile(false), vec![], vec![]).name, "Magenta");
    }
}
