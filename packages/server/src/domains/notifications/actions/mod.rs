pub mod errors;
pub mod inbox;

pub use errors::NotificationError;
pub use inbox::*;
