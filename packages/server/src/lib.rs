// Rocky Rollcall - API Core
//
// This crate provides the backend for a community of performance casts:
// cast pages and calendars, and the membership ledger that decides who
// manages, belongs to, has requested to join, or is blocked from each cast.

pub mod common;
pub mod config;
pub mod domains;
pub mod server;

pub use config::*;
