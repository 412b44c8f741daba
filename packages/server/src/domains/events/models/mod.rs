pub mod event;

pub use event::{group_by_date, CalendarDay, Event, EventInput, EventListing, EXPIRES_AFTER_DAYS};
