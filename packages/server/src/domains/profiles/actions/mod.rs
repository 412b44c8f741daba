pub mod account;
pub mod errors;
pub mod public;

pub use account::{
    account_settings, delete_account, edit_profile, edit_user, signup, AccountSettings,
    MINIMUM_SIGNUP_AGE,
};
pub use errors::ProfileError;
pub use public::{public_profile, CastLink, PublicProfile};
