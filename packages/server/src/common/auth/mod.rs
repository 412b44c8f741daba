//! Authorization for cast management
//!
//! Provides a fluent capability check that every cast action runs first:
//!
//! ```ignore
//! use crate::common::auth::{Actor, CastCapability};
//!
//! Actor::new(Some(profile_id))
//!     .can(CastCapability::ManageManagers)
//!     .on(cast.id)
//!     .check(pool)
//!     .await?;
//! ```

mod builder;
mod capability;
mod errors;

pub use builder::{Actor, CapabilityBuilder, CastCheck, ManagerLookup};
pub use capability::CastCapability;
pub use errors::AuthError;
