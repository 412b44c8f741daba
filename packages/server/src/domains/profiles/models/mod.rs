pub mod profile;
pub mod user;

pub use profile::{Profile, ProfileCard, ProfileUpdate, SEARCHABLE_AGE};
pub use user::{EditUser, NewAccount, User};
