// Business domains
pub mod auth;
pub mod casts;
pub mod events;
pub mod landing;
pub mod notifications;
pub mod profiles;
pub mod search;
