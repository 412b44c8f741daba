//! Events domain - cast calendars, listings and expiry cleanup

pub mod actions;
pub mod models;

pub use models::{CalendarDay, Event, EventInput, EventListing};
