pub mod errors;
pub mod listings;
pub mod manage;

pub use errors::EventError;
pub use listings::*;
pub use manage::{create_event, delete_event, find_event, update_event};
