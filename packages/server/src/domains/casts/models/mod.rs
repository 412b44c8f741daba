pub mod cast;
pub mod membership;
pub mod page_section;

pub use cast::{Cast, CastInput};
pub use membership::{CastMembership, LedgerError};
pub use page_section::{PageSection, SectionInput};
