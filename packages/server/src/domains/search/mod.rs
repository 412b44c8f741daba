//! Search domain - find casts by name similarity and adult profiles by name

pub mod actions;

pub use actions::{search_casts, search_profiles, SearchArgs, SearchError, SEARCH_PER_PAGE};
