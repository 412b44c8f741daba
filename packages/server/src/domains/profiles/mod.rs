//! Profiles domain - accounts, profiles, signup and account management

pub mod actions;
pub mod models;

pub use models::{EditUser, NewAccount, Profile, ProfileCard, ProfileUpdate, User};
