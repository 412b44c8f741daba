//! Notifications domain - in-app messages to profiles, e.g. join requests
//! sent to a cast's managers

pub mod actions;
pub mod models;

pub use models::{Notification, NotificationKind, NotificationListing};
