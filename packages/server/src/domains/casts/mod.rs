//! Casts domain - troupes, their home pages, and the membership ledger
//!
//! Architecture:
//!   routes → actions (authorization + orchestration) → models (SQL)
//!   membership rules live in `ledger` and are shared by both storage paths

pub mod actions;
pub mod ledger;
pub mod models;

pub use ledger::{LedgerOp, MembershipError, MembershipKind, MembershipLedger, Refusal, Standing};
pub use models::{Cast, CastInput, CastMembership, PageSection, SectionInput};
