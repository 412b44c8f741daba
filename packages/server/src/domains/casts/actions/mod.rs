//! Cast actions - entry-point business logic called from the HTTP routes.
//!
//! Actions take the loaded cast and the caller's profile id (if any),
//! authorize, and return domain models or a `CastError`.

pub mod admin;
pub mod errors;
pub mod lifecycle;
pub mod sections;
pub mod self_service;
pub mod views;

pub use admin::*;
pub use errors::CastError;
pub use lifecycle::{authorize, create_cast, delete_cast, find_cast, update_cast};
pub use sections::{add_section, delete_section, edit_section};
pub use self_service::{leave_cast, request_membership, withdraw_request};
pub use views::{cast_events, cast_home, roster, CastHome, ViewerStanding, ROSTER_PER_PAGE};
