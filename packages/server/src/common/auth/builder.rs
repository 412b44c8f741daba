use async_trait::async_trait;
use sqlx::PgPool;

use super::{AuthError, CastCapability};
use crate::common::entity_ids::{CastId, ProfileId};

/// Entry point for authorization checks
///
/// Usage:
/// ```ignore
/// let actor = Actor::new(auth_user.map(|u| u.profile_id))
///     .can(CastCapability::ManageRoster)
///     .on(cast.id)
///     .check(pool)
///     .await?;
/// ```
///
/// Each cast action runs this check before touching the ledger.
pub struct Actor {
    profile_id: Option<ProfileId>,
}

impl Actor {
    /// `None` means the request carried no valid identity.
    pub fn new(profile_id: Option<ProfileId>) -> Self {
        Self { profile_id }
    }

    pub fn can(self, capability: CastCapability) -> CapabilityBuilder {
        CapabilityBuilder {
            profile_id: self.profile_id,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    profile_id: Option<ProfileId>,
    capability: CastCapability,
}

impl CapabilityBuilder {
    pub fn on(self, cast_id: CastId) -> CastCheck {
        CastCheck {
            profile_id: self.profile_id,
            capability: self.capability,
            cast_id,
        }
    }
}

/// Fully specified check
pub struct CastCheck {
    profile_id: Option<ProfileId>,
    capability: CastCapability,
    cast_id: CastId,
}

impl CastCheck {
    /// Perform the authorization check, returning the acting profile.
    pub async fn check<L>(self, lookup: &L) -> Result<ProfileId, AuthError>
    where
        L: ManagerLookup + ?Sized,
    {
        let profile_id = self.profile_id.ok_or(AuthError::AuthenticationRequired)?;

        if self.capability.requires_manager()
            && !lookup.is_manager(self.cast_id, profile_id).await?
        {
            tracing::debug!(
                cast_id = %self.cast_id,
                profile_id = %profile_id,
                capability = ?self.capability,
                "Rejected non-manager"
            );
            return Err(AuthError::ManagerRequired);
        }

        Ok(profile_id)
    }
}

/// Answers "does this profile manage this cast?"
#[async_trait]
pub trait ManagerLookup: Send + Sync {
    async fn is_manager(&self, cast_id: CastId, profile_id: ProfileId) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl ManagerLookup for PgPool {
    async fn is_manager(&self, cast_id: CastId, profile_id: ProfileId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM cast_memberships
                WHERE cast_id = $1 AND profile_id = $2 AND kind = 'manager'
             )",
        )
        .bind(cast_id)
        .bind(profile_id)
        .fetch_one(self)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedManagers {
        managers: Vec<(CastId, ProfileId)>,
    }

    #[async_trait]
    impl ManagerLookup for FixedManagers {
        async fn is_manager(
            &self,
            cast_id: CastId,
            profile_id: ProfileId,
        ) -> Result<bool, sqlx::Error> {
            Ok(self.managers.contains(&(cast_id, profile_id)))
        }
    }

    #[tokio::test]
    async fn test_manager_passes() {
        let cast_id = CastId::new();
        let manager = ProfileId::new();
        let lookup = FixedManagers {
            managers: vec![(cast_id, manager)],
        };

        let result = Actor::new(Some(manager))
            .can(CastCapability::ManageRoster)
            .on(cast_id)
            .check(&lookup)
            .await;

        assert_eq!(result.unwrap(), manager);
    }

    #[tokio::test]
    async fn test_non_manager_rejected() {
        let cast_id = CastId::new();
        let lookup = FixedManagers {
            managers: vec![(cast_id, ProfileId::new())],
        };

        let result = Actor::new(Some(ProfileId::new()))
            .can(CastCapability::EditCast)
            .on(cast_id)
            .check(&lookup)
            .await;

        assert!(matches!(result, Err(AuthError::ManagerRequired)));
    }

    #[tokio::test]
    async fn test_manager_of_other_cast_rejected() {
        let profile = ProfileId::new();
        let lookup = FixedManagers {
            managers: vec![(CastId::new(), profile)],
        };

        let result = Actor::new(Some(profile))
            .can(CastCapability::DeleteCast)
            .on(CastId::new())
            .check(&lookup)
            .await;

        assert!(matches!(result, Err(AuthError::ManagerRequired)));
    }

    #[tokio::test]
    async fn test_self_service_needs_identity_only() {
        let lookup = FixedManagers { managers: vec![] };
        let profile = ProfileId::new();

        let ok = Actor::new(Some(profile))
            .can(CastCapability::SelfService)
            .on(CastId::new())
            .check(&lookup)
            .await;
        assert_eq!(ok.unwrap(), profile);

        let anonymous = Actor::new(None)
            .can(CastCapability::SelfService)
            .on(CastId::new())
            .check(&lookup)
            .await;
        assert!(matches!(anonymous, Err(AuthError::AuthenticationRequired)));
    }
}
