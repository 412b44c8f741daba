//! Typed ID definitions for all domain entities.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for User entities (login accounts).
pub struct User;

/// Marker type for Profile entities (the subject of cast memberships).
pub struct Profile;

/// Marker type for Cast entities (performance troupes).
pub struct Cast;

/// Marker type for PageSection entities (cast home page blocks).
pub struct PageSection;

/// Marker type for Event entities (cast calendar events).
pub struct Event;

/// Marker type for Notification entities (in-app messages to a profile).
pub struct Notification;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type UserId = Id<User>;

pub type ProfileId = Id<Profile>;

pub type CastId = Id<Cast>;

pub type PageSectionId = Id<PageSection>;

pub type EventId = Id<Event>;

pub type NotificationId = Id<Notification>;
