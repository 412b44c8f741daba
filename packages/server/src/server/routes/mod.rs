// HTTP routes
pub mod cast_admin;
pub mod casts;
pub mod events;
pub mod health;
pub mod public;
pub mod users;

pub use health::*;
